//! Min and max collectors backed by an ordered multiset.

use std::collections::BTreeMap;

use super::Accumulator;
use crate::value::Value;

/// Tracks the smallest or largest member value with O(log n) retraction.
#[derive(Debug)]
pub struct ExtremeAccumulator {
    counts: BTreeMap<Value, usize>,
    largest: bool,
}

impl ExtremeAccumulator {
    pub fn min() -> Self {
        Self {
            counts: BTreeMap::new(),
            largest: false,
        }
    }

    pub fn max() -> Self {
        Self {
            counts: BTreeMap::new(),
            largest: true,
        }
    }
}

impl Accumulator for ExtremeAccumulator {
    fn accumulate(&mut self, value: &Value) {
        *self.counts.entry(value.clone()).or_insert(0) += 1;
    }

    fn retract(&mut self, value: &Value) {
        super::list::remove_one(&mut self.counts, value, "min/max");
    }

    fn result(&self) -> Value {
        let entry = if self.largest {
            self.counts.last_key_value()
        } else {
            self.counts.first_key_value()
        };
        entry.map_or(Value::None, |(value, _)| value.clone())
    }
}
