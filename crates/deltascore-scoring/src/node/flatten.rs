//! Flatten nodes: one output per expansion item.
//!
//! On update the new items are matched against the previous ones by value
//! (as a multiset): matched outputs are updated in place, leftovers on the
//! old side are retracted and leftovers on the new side inserted.

use std::collections::{HashMap, HashSet};

use super::{Event, ExpandFn, Outbox};
use crate::fact::{Fact, FactStore};
use crate::tuple::{Elements, Scratch, TupleId, TupleView};
use crate::value::Value;

pub(super) fn on_event<F: Fact, Sc>(
    expand: &ExpandFn<F>,
    slot: usize,
    event: Event,
    input: TupleId,
    facts: &FactStore<F>,
    out: &mut Outbox<'_, Sc>,
) {
    match event {
        Event::Insert => {
            let (base, items) = expansion(expand, input, facts, out);
            let children = items
                .into_iter()
                .map(|item| {
                    let child = out.insert(with_item(&base, &item));
                    (item, child)
                })
                .collect();
            *out.tuples.get_mut(input).slot_mut(slot) = Scratch::Expansion(children);
        }
        Event::Retract => {
            for (_, child) in take_expansion(input, slot, out) {
                out.retract(child);
            }
        }
        Event::Update => {
            let (base, items) = expansion(expand, input, facts, out);
            let previous = take_expansion(input, slot, out);

            // Reversed so that pop() hands out the earliest output per value.
            let mut unmatched: HashMap<&Value, Vec<TupleId>> = HashMap::new();
            for (item, child) in previous.iter().rev() {
                unmatched.entry(item).or_default().push(*child);
            }

            let mut reused = HashSet::new();
            let mut children = Vec::with_capacity(items.len());
            for item in items {
                let elements = with_item(&base, &item);
                let child = match unmatched.get_mut(&item).and_then(Vec::pop) {
                    Some(child) => {
                        reused.insert(child);
                        out.refresh(child, elements);
                        child
                    }
                    None => out.insert(elements),
                };
                children.push((item, child));
            }
            for (_, child) in &previous {
                if !reused.contains(child) {
                    out.retract(*child);
                }
            }
            *out.tuples.get_mut(input).slot_mut(slot) = Scratch::Expansion(children);
        }
    }
}

fn expansion<F: Fact, Sc>(
    expand: &ExpandFn<F>,
    input: TupleId,
    facts: &FactStore<F>,
    out: &Outbox<'_, Sc>,
) -> (Elements, Vec<Value>) {
    let tuple = out.tuples.get(input);
    let items = expand(&TupleView::new(&tuple.elements, facts));
    (tuple.elements.clone(), items)
}

fn with_item(base: &Elements, item: &Value) -> Elements {
    let mut elements = base.clone();
    elements.push(item.clone());
    elements
}

fn take_expansion<Sc>(input: TupleId, slot: usize, out: &mut Outbox<'_, Sc>) -> Vec<(Value, TupleId)> {
    match out.tuples.get_mut(input).take_slot(slot) {
        Scratch::Expansion(children) => children,
        _ => panic!("flatten input {} has no expansion", input),
    }
}
