//! Tuples: the unit of data flowing through the propagation network.
//!
//! A tuple is owned by the node that produced it. It carries ordered
//! elements, a lifecycle [`TupleState`] and a scratch store with one slot per
//! consumer of its producer; the slot indices are fixed when the graph is
//! compiled. Tuples are identified by [`TupleId`], never by content.

mod arena;
mod state;

pub use arena::TupleArena;
pub use state::{Propagation, Transition, TupleState};

use std::fmt;

use indexmap::IndexMap;
use smallvec::SmallVec;

use crate::fact::{Fact, FactHandle, FactStore};
use crate::node::NodeId;
use crate::value::Value;

/// Inline storage for tuple elements; most tuples have arity four or less.
pub type Elements = SmallVec<[Value; 4]>;

/// Identity of a tuple: arena index plus generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TupleId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl fmt::Display for TupleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tuple#{}.{}", self.index, self.generation)
    }
}

/// Per-consumer bookkeeping stored on an upstream tuple.
#[derive(Debug, Clone)]
pub enum Scratch<Sc> {
    Empty,
    /// The single downstream tuple derived from this one (filter, map).
    Child(TupleId),
    /// This tuple's membership on one side of a join: its key and, for every
    /// partner on the other side, the combined tuple they produced.
    JoinSide {
        key: Value,
        matches: IndexMap<TupleId, TupleId>,
    },
    /// Group key and the value this tuple contributed to its bucket.
    Group { key: Value, extracted: Value },
    /// Expansion items paired with the tuples they produced (flatten).
    Expansion(Vec<(Value, TupleId)>),
    /// Score contributed by this tuple as a constraint match.
    Contribution(Sc),
}

impl<Sc> Default for Scratch<Sc> {
    fn default() -> Self {
        Scratch::Empty
    }
}

/// A tuple in the arena.
#[derive(Debug)]
pub struct Tuple<Sc> {
    pub(crate) elements: Elements,
    pub(crate) state: TupleState,
    pub(crate) producer: NodeId,
    pub(crate) store: Box<[Scratch<Sc>]>,
}

impl<Sc> Tuple<Sc> {
    pub fn elements(&self) -> &[Value] {
        &self.elements
    }

    pub fn state(&self) -> TupleState {
        self.state
    }

    pub fn producer(&self) -> NodeId {
        self.producer
    }

    pub fn arity(&self) -> usize {
        self.elements.len()
    }

    pub(crate) fn slot(&self, slot: usize) -> &Scratch<Sc> {
        &self.store[slot]
    }

    pub(crate) fn slot_mut(&mut self, slot: usize) -> &mut Scratch<Sc> {
        &mut self.store[slot]
    }

    pub(crate) fn take_slot(&mut self, slot: usize) -> Scratch<Sc> {
        std::mem::take(&mut self.store[slot])
    }
}

/// Read-only view of a tuple handed to node functions.
///
/// Element positions follow the order the tuple was built in: a join of a
/// one-element left tuple with a one-element right tuple reads the left fact
/// at `0` and the right fact at `1`.
pub struct TupleView<'a, F> {
    elements: &'a [Value],
    facts: &'a FactStore<F>,
}

impl<'a, F: Fact> TupleView<'a, F> {
    pub fn new(elements: &'a [Value], facts: &'a FactStore<F>) -> Self {
        Self { elements, facts }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Returns the element at `index`.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    pub fn value(&self, index: usize) -> &'a Value {
        &self.elements[index]
    }

    pub fn values(&self) -> &'a [Value] {
        self.elements
    }

    /// Returns the fact handle at `index`, if that element is a fact.
    pub fn handle(&self, index: usize) -> Option<FactHandle> {
        self.elements.get(index).and_then(Value::as_fact)
    }

    /// Resolves the fact referenced at `index`.
    ///
    /// # Panics
    /// Panics if the element is not a fact reference or the fact has been
    /// retracted. Source elements are always live; a handle copied into a
    /// derived element may outlive its fact until the next flush, which is
    /// what [`try_fact`](Self::try_fact) is for.
    pub fn fact(&self, index: usize) -> &'a F {
        match self.try_fact(index) {
            Some(fact) => fact,
            None => panic!(
                "tuple element {} is not a live fact (found {})",
                index,
                self.elements
                    .get(index)
                    .map_or_else(|| "nothing".to_string(), Value::to_string)
            ),
        }
    }

    /// Resolves the fact referenced at `index`, if any.
    pub fn try_fact(&self, index: usize) -> Option<&'a F> {
        self.handle(index).and_then(|h| self.facts.get(h))
    }
}

impl<F> fmt::Debug for TupleView<'_, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TupleView")
            .field("elements", &self.elements)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    struct Shift(u32);

    impl Fact for Shift {
        fn class_name(&self) -> &'static str {
            "Shift"
        }
    }

    #[test]
    fn test_view_resolves_facts() {
        let mut facts = FactStore::new();
        let h = facts.insert(Shift(7));
        let elements: Elements = smallvec![Value::Fact(h), Value::Int(3)];

        let view = TupleView::new(&elements, &facts);
        assert_eq!(view.len(), 2);
        assert_eq!(view.fact(0).0, 7);
        assert_eq!(view.value(1), &Value::Int(3));
        assert!(view.try_fact(1).is_none());
    }

    #[test]
    #[should_panic(expected = "not a live fact")]
    fn test_view_panics_on_retracted_fact() {
        let mut facts = FactStore::new();
        let h = facts.insert(Shift(1));
        facts.remove(h);
        let elements: Elements = smallvec![Value::Fact(h)];
        TupleView::new(&elements, &facts).fact(0);
    }
}
