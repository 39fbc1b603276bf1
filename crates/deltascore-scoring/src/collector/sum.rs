//! Sum collector over integer and decimal values.

use rust_decimal::Decimal;

use super::Accumulator;
use crate::value::Value;

/// Exact running sum.
///
/// Integers and decimals are kept apart so an all-integer bucket reports an
/// [`Value::Int`]; once any decimal member is present the result widens to
/// [`Value::Decimal`].
#[derive(Debug, Default)]
pub struct SumAccumulator {
    ints: i64,
    decimals: Decimal,
    decimal_members: usize,
}

impl Accumulator for SumAccumulator {
    fn accumulate(&mut self, value: &Value) {
        match value {
            Value::None => {}
            Value::Int(i) => self.ints += i,
            Value::Decimal(d) => {
                self.decimals += d;
                self.decimal_members += 1;
            }
            other => panic!("sum collector cannot add non-numeric value {}", other),
        }
    }

    fn retract(&mut self, value: &Value) {
        match value {
            Value::None => {}
            Value::Int(i) => self.ints -= i,
            Value::Decimal(d) => {
                assert!(
                    self.decimal_members > 0,
                    "sum collector retracted a decimal it never added"
                );
                self.decimals -= d;
                self.decimal_members -= 1;
            }
            other => panic!("sum collector cannot retract non-numeric value {}", other),
        }
    }

    fn result(&self) -> Value {
        if self.decimal_members > 0 {
            Value::Decimal(Decimal::from(self.ints) + self.decimals)
        } else {
            Value::Int(self.ints)
        }
    }
}
