//! Map nodes: one arity-1 output per input, re-derived on every update.

use smallvec::smallvec;

use super::{Event, Outbox, ValueFn};
use crate::fact::{Fact, FactStore};
use crate::tuple::{Scratch, TupleId, TupleView};

pub(super) fn on_event<F: Fact, Sc>(
    mapper: &ValueFn<F>,
    slot: usize,
    event: Event,
    input: TupleId,
    facts: &FactStore<F>,
    out: &mut Outbox<'_, Sc>,
) {
    match event {
        Event::Insert => {
            let value = mapper(&TupleView::new(&out.tuples.get(input).elements, facts));
            let child = out.insert(smallvec![value]);
            *out.tuples.get_mut(input).slot_mut(slot) = Scratch::Child(child);
        }
        Event::Update => {
            let tuple = out.tuples.get(input);
            let value = mapper(&TupleView::new(&tuple.elements, facts));
            let child = match tuple.slot(slot) {
                Scratch::Child(child) => *child,
                other => panic!("map input {} has no child (slot holds {})", input, kind(other)),
            };
            out.refresh(child, smallvec![value]);
        }
        Event::Retract => match out.tuples.get_mut(input).take_slot(slot) {
            Scratch::Child(child) => out.retract(child),
            other => panic!("map input {} has no child (slot holds {})", input, kind(&other)),
        },
    }
}

fn kind<Sc>(scratch: &Scratch<Sc>) -> &'static str {
    match scratch {
        Scratch::Empty => "nothing",
        Scratch::Child(_) => "child",
        Scratch::JoinSide { .. } => "join side",
        Scratch::Group { .. } => "group membership",
        Scratch::Expansion(_) => "expansion",
        Scratch::Contribution(_) => "contribution",
    }
}
