//! Count-distinct collector.

use std::collections::HashMap;

use super::Accumulator;
use crate::value::Value;

#[derive(Debug, Default)]
pub struct CountDistinctAccumulator {
    counts: HashMap<Value, usize>,
}

impl Accumulator for CountDistinctAccumulator {
    fn accumulate(&mut self, value: &Value) {
        *self.counts.entry(value.clone()).or_insert(0) += 1;
    }

    fn retract(&mut self, value: &Value) {
        match self.counts.get_mut(value) {
            Some(n) if *n > 1 => *n -= 1,
            Some(_) => {
                self.counts.remove(value);
            }
            None => panic!(
                "count_distinct collector retracted {} which it never accumulated",
                value
            ),
        }
    }

    fn result(&self) -> Value {
        Value::Int(self.counts.len() as i64)
    }
}
