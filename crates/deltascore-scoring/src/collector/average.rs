//! Average collector.

use rust_decimal::Decimal;

use super::Accumulator;
use crate::value::Value;

/// Keeps an exact decimal sum and a member count; the mean is derived on
/// read, so retraction never accumulates rounding error.
#[derive(Debug, Default)]
pub struct AverageAccumulator {
    sum: Decimal,
    count: i64,
}

impl Accumulator for AverageAccumulator {
    fn accumulate(&mut self, value: &Value) {
        let d = value
            .as_decimal()
            .unwrap_or_else(|| panic!("average collector cannot add non-numeric value {}", value));
        self.sum += d;
        self.count += 1;
    }

    fn retract(&mut self, value: &Value) {
        let d = value.as_decimal().unwrap_or_else(|| {
            panic!("average collector cannot retract non-numeric value {}", value)
        });
        assert!(self.count > 0, "average collector retracted below zero");
        self.sum -= d;
        self.count -= 1;
    }

    fn result(&self) -> Value {
        if self.count == 0 {
            Value::None
        } else {
            Value::Decimal((self.sum / Decimal::from(self.count)).normalize())
        }
    }
}
