//! Filter nodes.
//!
//! The scratch slot on the input tuple holds the forwarded child, if any; its
//! presence is the only record of whether the predicate held last time.

use super::{Event, Outbox, Predicate};
use crate::fact::{Fact, FactStore};
use crate::tuple::{Scratch, TupleId, TupleView};

pub(super) fn on_event<F: Fact, Sc>(
    predicate: &Predicate<F>,
    slot: usize,
    event: Event,
    input: TupleId,
    facts: &FactStore<F>,
    out: &mut Outbox<'_, Sc>,
) {
    match event {
        Event::Insert => {
            let tuple = out.tuples.get(input);
            if !predicate(&TupleView::new(&tuple.elements, facts)) {
                return;
            }
            let elements = tuple.elements.clone();
            let child = out.insert(elements);
            *out.tuples.get_mut(input).slot_mut(slot) = Scratch::Child(child);
        }
        Event::Retract => {
            if let Scratch::Child(child) = out.tuples.get_mut(input).take_slot(slot) {
                out.retract(child);
            }
        }
        Event::Update => {
            let tuple = out.tuples.get(input);
            let passes = predicate(&TupleView::new(&tuple.elements, facts));
            let child = match tuple.slot(slot) {
                Scratch::Child(child) => Some(*child),
                _ => None,
            };
            match (child, passes) {
                (None, false) => {}
                (Some(child), true) => {
                    let elements = tuple.elements.clone();
                    out.refresh(child, elements);
                }
                (None, true) => {
                    let elements = tuple.elements.clone();
                    let child = out.insert(elements);
                    *out.tuples.get_mut(input).slot_mut(slot) = Scratch::Child(child);
                }
                (Some(child), false) => {
                    out.tuples.get_mut(input).take_slot(slot);
                    out.retract(child);
                }
            }
        }
    }
}
