//! Group/aggregate nodes.
//!
//! Buckets are created on their first member and dropped with their last,
//! so no empty group is ever visible downstream. Each bucket owns one output
//! tuple `[key, aggregate]`, which is only updated when the aggregate
//! actually changes.

use std::collections::HashMap;

use indexmap::IndexSet;
use smallvec::smallvec;

use super::{Event, Outbox, ValueFn};
use crate::collector::{Accumulator, Collector};
use crate::fact::{Fact, FactStore};
use crate::tuple::{Scratch, TupleArena, TupleId, TupleView};
use crate::value::Value;

pub(crate) struct Bucket {
    pub(crate) members: IndexSet<TupleId>,
    pub(crate) accumulator: Box<dyn Accumulator>,
    pub(crate) output: TupleId,
}

pub(crate) struct GroupState {
    slot: usize,
    buckets: HashMap<Value, Bucket>,
}

impl GroupState {
    pub(crate) fn new(slot: usize) -> Self {
        Self {
            slot,
            buckets: HashMap::new(),
        }
    }

    pub(super) fn on_event<F: Fact, Sc>(
        &mut self,
        key_fn: &ValueFn<F>,
        collector: &Collector<F>,
        event: Event,
        input: TupleId,
        facts: &FactStore<F>,
        out: &mut Outbox<'_, Sc>,
    ) {
        match event {
            Event::Insert => {
                let (key, extracted) = extract(key_fn, collector, input, facts, out.tuples);
                self.attach(collector, input, &key, &extracted, out);
                *out.tuples.get_mut(input).slot_mut(self.slot) = Scratch::Group { key, extracted };
            }
            Event::Retract => {
                let (key, extracted) = self.membership(input, out.tuples);
                out.tuples.get_mut(input).take_slot(self.slot);
                self.detach(input, &key, &extracted, out);
            }
            Event::Update => {
                let (key, extracted) = extract(key_fn, collector, input, facts, out.tuples);
                let (old_key, old_extracted) = self.membership(input, out.tuples);
                if key == old_key {
                    if extracted != old_extracted {
                        let bucket = self.bucket_mut(&key);
                        bucket.accumulator.retract(&old_extracted);
                        bucket.accumulator.accumulate(&extracted);
                        publish(bucket, out);
                    }
                } else {
                    self.detach(input, &old_key, &old_extracted, out);
                    self.attach(collector, input, &key, &extracted, out);
                }
                *out.tuples.get_mut(input).slot_mut(self.slot) = Scratch::Group { key, extracted };
            }
        }
    }

    fn attach<F: Fact, Sc>(
        &mut self,
        collector: &Collector<F>,
        input: TupleId,
        key: &Value,
        extracted: &Value,
        out: &mut Outbox<'_, Sc>,
    ) {
        match self.buckets.get_mut(key) {
            Some(bucket) => {
                bucket.members.insert(input);
                bucket.accumulator.accumulate(extracted);
                publish(bucket, out);
            }
            None => {
                let mut accumulator = collector.create_accumulator();
                accumulator.accumulate(extracted);
                let output = out.insert(smallvec![key.clone(), accumulator.result()]);
                let mut members = IndexSet::new();
                members.insert(input);
                self.buckets.insert(
                    key.clone(),
                    Bucket {
                        members,
                        accumulator,
                        output,
                    },
                );
            }
        }
    }

    fn detach<Sc>(&mut self, input: TupleId, key: &Value, extracted: &Value, out: &mut Outbox<'_, Sc>) {
        let bucket = self.bucket_mut(key);
        assert!(
            bucket.members.swap_remove(&input),
            "group member {} missing from bucket {}",
            input,
            key
        );
        bucket.accumulator.retract(extracted);
        if bucket.members.is_empty() {
            let output = bucket.output;
            self.buckets.remove(key);
            out.retract(output);
        } else {
            publish(bucket, out);
        }
    }

    fn bucket_mut(&mut self, key: &Value) -> &mut Bucket {
        match self.buckets.get_mut(key) {
            Some(bucket) => bucket,
            None => panic!("group has no bucket for key {}", key),
        }
    }

    fn membership<Sc>(&self, input: TupleId, tuples: &TupleArena<Sc>) -> (Value, Value) {
        match tuples.get(input).slot(self.slot) {
            Scratch::Group { key, extracted } => (key.clone(), extracted.clone()),
            _ => panic!("group input {} has no group membership", input),
        }
    }

    pub(crate) fn slot(&self) -> usize {
        self.slot
    }

    pub(crate) fn buckets(&self) -> impl Iterator<Item = (&Value, &Bucket)> + '_ {
        self.buckets.iter()
    }

    pub(crate) fn len(&self) -> usize {
        self.buckets.len()
    }
}

fn extract<F: Fact, Sc>(
    key_fn: &ValueFn<F>,
    collector: &Collector<F>,
    input: TupleId,
    facts: &FactStore<F>,
    tuples: &TupleArena<Sc>,
) -> (Value, Value) {
    let view = TupleView::new(&tuples.get(input).elements, facts);
    (key_fn(&view), collector.extract(&view))
}

/// Pushes a changed aggregate to the bucket's output tuple.
fn publish<Sc>(bucket: &Bucket, out: &mut Outbox<'_, Sc>) {
    let result = bucket.accumulator.result();
    let output = out.tuples.get_mut(bucket.output);
    if output.elements[1] != result {
        output.elements[1] = result;
        out.update(bucket.output);
    }
}
