//! Collectors for grouping and aggregating tuples.
//!
//! A [`Collector`] pairs an optional extractor (tuple → [`Value`]) with a
//! factory for the [`Accumulator`] that keeps one bucket's running result.
//! Every accumulator supports exact retraction, so a group node never has to
//! rescan a bucket's members.

mod average;
mod count;
mod distinct;
mod extreme;
mod list;
mod sum;


pub use average::AverageAccumulator;
pub use count::CountAccumulator;
pub use distinct::CountDistinctAccumulator;
pub use extreme::ExtremeAccumulator;
pub use list::ToListAccumulator;
pub use sum::SumAccumulator;

use std::fmt;
use std::sync::Arc;

use crate::fact::Fact;
use crate::node::ValueFn;
use crate::tuple::TupleView;
use crate::value::Value;

/// Running aggregate for a single group bucket.
pub trait Accumulator: Send {
    /// Adds one member's extracted value.
    fn accumulate(&mut self, value: &Value);

    /// Removes a value previously passed to [`accumulate`](Self::accumulate).
    ///
    /// # Panics
    /// Panics if the value was never accumulated.
    fn retract(&mut self, value: &Value);

    /// Returns the current aggregate.
    fn result(&self) -> Value;
}

/// Extractor plus accumulator factory used by a group node.
pub struct Collector<F> {
    name: &'static str,
    extractor: Option<ValueFn<F>>,
    factory: fn() -> Box<dyn Accumulator>,
}

impl<F> Clone for Collector<F> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            extractor: self.extractor.clone(),
            factory: self.factory,
        }
    }
}

impl<F> fmt::Debug for Collector<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collector").field("name", &self.name).finish()
    }
}

impl<F> Collector<F> {
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<F: Fact> Collector<F> {
    fn new(
        name: &'static str,
        extractor: Option<ValueFn<F>>,
        factory: fn() -> Box<dyn Accumulator>,
    ) -> Self {
        Self {
            name,
            extractor,
            factory,
        }
    }

    /// Extracts the value a tuple contributes; [`Value::None`] for
    /// collectors that ignore their members' content.
    pub fn extract(&self, tuple: &TupleView<'_, F>) -> Value {
        self.extractor
            .as_ref()
            .map_or(Value::None, |extract| extract(tuple))
    }

    pub fn create_accumulator(&self) -> Box<dyn Accumulator> {
        (self.factory)()
    }
}

/// Counts the members of each group.
///
/// # Example
///
/// ```
/// use deltascore_scoring::collector::{count, Accumulator};
/// use deltascore_scoring::Value;
///
/// # struct Shift;
/// # impl deltascore_scoring::Fact for Shift { fn class_name(&self) -> &'static str { "Shift" } }
/// let collector = count::<Shift>();
/// let mut acc = collector.create_accumulator();
/// acc.accumulate(&Value::None);
/// acc.accumulate(&Value::None);
/// acc.retract(&Value::None);
/// assert_eq!(acc.result(), Value::Int(1));
/// ```
pub fn count<F: Fact>() -> Collector<F> {
    Collector::new("count", None, || -> Box<dyn Accumulator> {
        Box::new(CountAccumulator::default())
    })
}

/// Sums integer or decimal values exactly; [`Value::None`] is skipped.
pub fn sum<F, E>(extract: E) -> Collector<F>
where
    F: Fact,
    E: Fn(&TupleView<'_, F>) -> Value + Send + Sync + 'static,
{
    Collector::new("sum", Some(Arc::new(extract)), || -> Box<dyn Accumulator> {
        Box::new(SumAccumulator::default())
    })
}

/// Smallest extracted value, or [`Value::None`] for an empty bucket.
pub fn min<F, E>(extract: E) -> Collector<F>
where
    F: Fact,
    E: Fn(&TupleView<'_, F>) -> Value + Send + Sync + 'static,
{
    Collector::new("min", Some(Arc::new(extract)), || -> Box<dyn Accumulator> {
        Box::new(ExtremeAccumulator::min())
    })
}

/// Largest extracted value, or [`Value::None`] for an empty bucket.
pub fn max<F, E>(extract: E) -> Collector<F>
where
    F: Fact,
    E: Fn(&TupleView<'_, F>) -> Value + Send + Sync + 'static,
{
    Collector::new("max", Some(Arc::new(extract)), || -> Box<dyn Accumulator> {
        Box::new(ExtremeAccumulator::max())
    })
}

/// Exact decimal mean of the extracted numbers.
pub fn average<F, E>(extract: E) -> Collector<F>
where
    F: Fact,
    E: Fn(&TupleView<'_, F>) -> Value + Send + Sync + 'static,
{
    Collector::new("average", Some(Arc::new(extract)), || -> Box<dyn Accumulator> {
        Box::new(AverageAccumulator::default())
    })
}

/// Sorted list of the extracted values, duplicates kept.
pub fn to_list<F, E>(extract: E) -> Collector<F>
where
    F: Fact,
    E: Fn(&TupleView<'_, F>) -> Value + Send + Sync + 'static,
{
    Collector::new("to_list", Some(Arc::new(extract)), || -> Box<dyn Accumulator> {
        Box::new(ToListAccumulator::default())
    })
}

/// Number of distinct extracted values.
pub fn count_distinct<F, E>(extract: E) -> Collector<F>
where
    F: Fact,
    E: Fn(&TupleView<'_, F>) -> Value + Send + Sync + 'static,
{
    Collector::new("count_distinct", Some(Arc::new(extract)), || -> Box<dyn Accumulator> {
        Box::new(CountDistinctAccumulator::default())
    })
}
