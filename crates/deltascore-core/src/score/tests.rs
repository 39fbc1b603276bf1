//! Tests for score types.

use super::*;

// ============================================================================
// SimpleScore Tests
// ============================================================================

mod simple_score {
    use super::*;

    #[test]
    fn test_zero_is_default() {
        assert_eq!(SimpleScore::zero(), SimpleScore::default());
        assert!(SimpleScore::of(0).is_zero());
        assert!(!SimpleScore::of(-1).is_zero());
    }

    #[test]
    fn test_arithmetic() {
        let s1 = SimpleScore::of(10);
        let s2 = SimpleScore::of(3);

        assert_eq!(s1 + s2, SimpleScore::of(13));
        assert_eq!(s1 - s2, SimpleScore::of(7));
        assert_eq!(-s1, SimpleScore::of(-10));
        assert_eq!(s2.multiply(4), SimpleScore::of(12));
    }

    #[test]
    fn test_parse() {
        assert_eq!(SimpleScore::parse("42").unwrap(), SimpleScore::of(42));
        assert_eq!(SimpleScore::parse("-10").unwrap(), SimpleScore::of(-10));
        assert_eq!(SimpleScore::parse("0init").unwrap(), SimpleScore::of(0));
        assert!(SimpleScore::parse("1.5").is_err());
    }

    #[test]
    fn test_display_is_bare_value() {
        let score = SimpleScore::of(-5);
        assert_eq!(score.to_string(), "-5");
        assert_eq!(score.value(), -5);
        assert_eq!(format!("{:?}", score), "SimpleScore(-5)");
    }
}

// ============================================================================
// HardSoftScore Tests
// ============================================================================

mod hard_soft_score {
    use super::*;

    #[test]
    fn test_comparison() {
        let infeasible = HardSoftScore::of(-1, 0);
        let feasible = HardSoftScore::of(0, -1000);
        assert!(feasible > infeasible);
        assert!(HardSoftScore::of(0, -5) > HardSoftScore::of(0, -10));
    }

    #[test]
    fn test_multiply_is_per_level() {
        assert_eq!(
            HardSoftScore::of(1, 3).multiply(-2),
            HardSoftScore::of(-2, -6)
        );
    }

    #[test]
    fn test_parse_round_trip() {
        let score = HardSoftScore::parse("-2hard/-15soft").unwrap();
        assert_eq!(score, HardSoftScore::of(-2, -15));
        assert_eq!(score.to_string_repr(), "-2hard/-15soft");
        assert_eq!(score.to_string(), "-2hard/-15soft");
    }

    #[test]
    fn test_parse_errors() {
        assert!(HardSoftScore::parse("-2hard").is_err());
        assert!(HardSoftScore::parse("-2/-15soft").is_err());
        assert!(HardSoftScore::parse("xhard/0soft").is_err());
        assert!(HardSoftScore::parse("0hard/0soft/0soft").is_err());
    }

    #[test]
    fn test_single_level_constructors() {
        assert_eq!(HardSoftScore::of_hard(-2), HardSoftScore::of(-2, 0));
        assert_eq!(HardSoftScore::of_soft(3).soft(), 3);
        assert_eq!(format!("{:?}", HardSoftScore::of(1, -1)), "HardSoftScore(1hard/-1soft)");
    }
}

// ============================================================================
// HardMediumSoftScore Tests
// ============================================================================

mod hard_medium_soft_score {
    use super::*;

    #[test]
    fn test_comparison_order() {
        let a = HardMediumSoftScore::of(0, -1, 0);
        let b = HardMediumSoftScore::of(0, 0, -1000);
        assert!(b > a);
    }

    #[test]
    fn test_parse() {
        let score = HardMediumSoftScore::parse("0hard/-3medium/-7soft").unwrap();
        assert_eq!(score, HardMediumSoftScore::of(0, -3, -7));
        assert_eq!(score.medium(), -3);
        assert_eq!(score.to_string_repr(), "0hard/-3medium/-7soft");
        assert!(HardMediumSoftScore::parse("0hard/-3soft/-7medium").is_err());
    }
}

// ============================================================================
// HardSoftDecimalScore Tests
// ============================================================================

mod hard_soft_decimal_score {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_scaling() {
        let score = HardSoftDecimalScore::of(-1, -100);
        assert_eq!(score.hard_scaled(), -100_000);
        assert_eq!(score.soft_scaled(), -10_000_000);
    }

    #[test]
    fn test_fractional_weights_do_not_drift() {
        let tenth = HardSoftDecimalScore::parse("0hard/0.1soft").unwrap();
        let mut total = HardSoftDecimalScore::zero();
        for _ in 0..10 {
            total = total + tenth;
        }
        assert_eq!(total, HardSoftDecimalScore::of(0, 1));
        for _ in 0..10 {
            total = total - tenth;
        }
        assert!(total.is_zero());
    }

    #[test]
    fn test_parse_rejects_excess_precision() {
        assert!(HardSoftDecimalScore::parse("0hard/0.000001soft").is_err());
    }

    #[test]
    fn test_decimal_accessors() {
        let score = HardSoftDecimalScore::of_scaled(-150_000, 250_000);
        assert_eq!(score.hard(), Decimal::new(-15, 1));
        assert_eq!(score.soft(), Decimal::new(25, 1));
        assert_eq!(score.to_string(), "-1.5hard/2.5soft");
    }
}
