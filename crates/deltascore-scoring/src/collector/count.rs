//! Count collector for counting group members.

use super::Accumulator;
use crate::value::Value;

/// Accumulator for counting members.
#[derive(Debug, Default)]
pub struct CountAccumulator {
    count: i64,
}

impl CountAccumulator {
    /// Returns the current count.
    #[inline]
    pub fn get(&self) -> i64 {
        self.count
    }
}

impl Accumulator for CountAccumulator {
    #[inline]
    fn accumulate(&mut self, _: &Value) {
        self.count += 1;
    }

    #[inline]
    fn retract(&mut self, _: &Value) {
        assert!(self.count > 0, "count collector retracted below zero");
        self.count -= 1;
    }

    #[inline]
    fn result(&self) -> Value {
        Value::Int(self.count)
    }
}
