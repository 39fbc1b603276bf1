//! Collect-to-list collector.

use std::collections::BTreeMap;

use super::Accumulator;
use crate::value::Value;

/// Sorted multiset of member values, reported as a [`Value::List`].
///
/// Sorting makes the result independent of the order members arrived in.
#[derive(Debug, Default)]
pub struct ToListAccumulator {
    counts: BTreeMap<Value, usize>,
}

impl Accumulator for ToListAccumulator {
    fn accumulate(&mut self, value: &Value) {
        *self.counts.entry(value.clone()).or_insert(0) += 1;
    }

    fn retract(&mut self, value: &Value) {
        remove_one(&mut self.counts, value, "to_list");
    }

    fn result(&self) -> Value {
        Value::List(
            self.counts
                .iter()
                .flat_map(|(value, n)| std::iter::repeat(value.clone()).take(*n))
                .collect(),
        )
    }
}

pub(super) fn remove_one(counts: &mut BTreeMap<Value, usize>, value: &Value, collector: &str) {
    match counts.get_mut(value) {
        Some(n) if *n > 1 => *n -= 1,
        Some(_) => {
            counts.remove(value);
        }
        None => panic!(
            "{} collector retracted {} which it never accumulated",
            collector, value
        ),
    }
}
