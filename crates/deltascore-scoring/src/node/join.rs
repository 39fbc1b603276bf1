//! Equality join nodes.
//!
//! Each side keeps an index from key to the insertion-ordered set of its
//! live input tuples. Every input tuple also records, in its side's scratch
//! slot, its key and the combined tuple produced with each partner, so a
//! retraction never has to search the opposite index.
//!
//! After every single event the join's live outputs are exactly the
//! equal-key cross product of the two sides.

use std::collections::HashMap;

use indexmap::{IndexMap, IndexSet};

use super::{Event, Outbox, ValueFn};
use crate::fact::{Fact, FactStore};
use crate::tuple::{Elements, Scratch, TupleArena, TupleId, TupleView};
use crate::value::Value;

const LEFT: usize = 0;
const RIGHT: usize = 1;

pub(crate) struct JoinState {
    /// Scratch slot claimed on the left and right producers.
    slots: [usize; 2],
    indexes: [HashMap<Value, IndexSet<TupleId>>; 2],
}

impl JoinState {
    pub(crate) fn new(left_slot: usize, right_slot: usize) -> Self {
        Self {
            slots: [left_slot, right_slot],
            indexes: [HashMap::new(), HashMap::new()],
        }
    }

    pub(super) fn on_event<F: Fact, Sc>(
        &mut self,
        keys: [&ValueFn<F>; 2],
        side: usize,
        event: Event,
        input: TupleId,
        facts: &FactStore<F>,
        out: &mut Outbox<'_, Sc>,
    ) {
        match event {
            Event::Insert => {
                let key = key_of(keys[side], input, facts, out.tuples);
                self.attach(side, input, key, out);
            }
            Event::Retract => self.detach(side, input, out),
            Event::Update => {
                let key = key_of(keys[side], input, facts, out.tuples);
                let (old_key, partners) = match out.tuples.get(input).slot(self.slots[side]) {
                    Scratch::JoinSide { key, matches } => (
                        key.clone(),
                        matches
                            .iter()
                            .map(|(p, c)| (*p, *c))
                            .collect::<Vec<_>>(),
                    ),
                    _ => panic!("join input {} has no join membership", input),
                };
                if key == old_key {
                    for (partner, combined) in partners {
                        let elements = combine(side, input, partner, out.tuples);
                        out.refresh(combined, elements);
                    }
                } else {
                    self.detach(side, input, out);
                    self.attach(side, input, key, out);
                }
            }
        }
    }

    /// Indexes `input` under `key` and emits one combined tuple per partner
    /// already indexed under the same key on the other side.
    fn attach<Sc>(&mut self, side: usize, input: TupleId, key: Value, out: &mut Outbox<'_, Sc>) {
        let other = 1 - side;
        let partners: Vec<TupleId> = self.indexes[other]
            .get(&key)
            .map(|bucket| bucket.iter().copied().collect())
            .unwrap_or_default();
        self.indexes[side]
            .entry(key.clone())
            .or_default()
            .insert(input);
        *out.tuples.get_mut(input).slot_mut(self.slots[side]) = Scratch::JoinSide {
            key,
            matches: IndexMap::with_capacity(partners.len()),
        };

        for partner in partners {
            let elements = combine(side, input, partner, out.tuples);
            let combined = out.insert(elements);
            matches_mut(out.tuples, input, self.slots[side]).insert(partner, combined);
            matches_mut(out.tuples, partner, self.slots[other]).insert(input, combined);
        }
    }

    /// Retracts every combined tuple of `input`, unlinks it from its
    /// partners and removes it from its side's index.
    fn detach<Sc>(&mut self, side: usize, input: TupleId, out: &mut Outbox<'_, Sc>) {
        let other = 1 - side;
        let (key, matches) = match out.tuples.get_mut(input).take_slot(self.slots[side]) {
            Scratch::JoinSide { key, matches } => (key, matches),
            _ => panic!("join input {} has no join membership", input),
        };

        let bucket = match self.indexes[side].get_mut(&key) {
            Some(bucket) => bucket,
            None => panic!("join index has no bucket for key {}", key),
        };
        bucket.swap_remove(&input);
        if bucket.is_empty() {
            self.indexes[side].remove(&key);
        }

        for (partner, combined) in matches {
            out.retract(combined);
            matches_mut(out.tuples, partner, self.slots[other]).swap_remove(&input);
        }
    }

    /// Iterates `(side, key, members)` over both indexes.
    pub(crate) fn buckets(&self) -> impl Iterator<Item = (usize, &Value, &IndexSet<TupleId>)> + '_ {
        self.indexes.iter().enumerate().flat_map(|(side, index)| {
            index.iter().map(move |(key, members)| (side, key, members))
        })
    }

    pub(crate) fn slot(&self, side: usize) -> usize {
        self.slots[side]
    }

    /// Number of combined tuples the indexes imply.
    pub(crate) fn expected_matches(&self) -> usize {
        self.indexes[LEFT]
            .iter()
            .map(|(key, left)| left.len() * self.indexes[RIGHT].get(key).map_or(0, IndexSet::len))
            .sum()
    }
}

fn key_of<F: Fact, Sc>(
    key: &ValueFn<F>,
    input: TupleId,
    facts: &FactStore<F>,
    tuples: &TupleArena<Sc>,
) -> Value {
    key(&TupleView::new(&tuples.get(input).elements, facts))
}

fn combine<Sc>(side: usize, input: TupleId, partner: TupleId, tuples: &TupleArena<Sc>) -> Elements {
    let (left, right) = if side == LEFT {
        (input, partner)
    } else {
        (partner, input)
    };
    let mut elements = tuples.get(left).elements.clone();
    elements.extend(tuples.get(right).elements.iter().cloned());
    elements
}

fn matches_mut<Sc>(
    tuples: &mut TupleArena<Sc>,
    tuple: TupleId,
    slot: usize,
) -> &mut IndexMap<TupleId, TupleId> {
    match tuples.get_mut(tuple).slot_mut(slot) {
        Scratch::JoinSide { matches, .. } => matches,
        _ => panic!("join partner {} has no join membership", tuple),
    }
}
