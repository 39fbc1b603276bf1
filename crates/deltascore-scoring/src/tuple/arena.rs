//! Generational arena holding every live tuple of a network.

use super::{Elements, Scratch, Tuple, TupleId, TupleState};
use crate::node::NodeId;

struct Slot<Sc> {
    generation: u32,
    tuple: Option<Tuple<Sc>>,
}

/// Index-based tuple storage.
///
/// Access through a stale [`TupleId`] is a propagation defect and panics.
pub struct TupleArena<Sc> {
    slots: Vec<Slot<Sc>>,
    free: Vec<u32>,
    len: usize,
}

impl<Sc> Default for TupleArena<Sc> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Sc> TupleArena<Sc> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            len: 0,
        }
    }

    /// Allocates a tuple in the `Creating` state with `store_size` empty
    /// scratch slots.
    pub fn create(&mut self, producer: NodeId, elements: Elements, store_size: usize) -> TupleId {
        let tuple = Tuple {
            elements,
            state: TupleState::Creating,
            producer,
            store: (0..store_size).map(|_| Scratch::Empty).collect(),
        };
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.tuple = Some(tuple);
            return TupleId {
                index,
                generation: slot.generation,
            };
        }
        let index = u32::try_from(self.slots.len())
            .unwrap_or_else(|_| panic!("tuple arena exceeded {} slots", u32::MAX));
        self.slots.push(Slot {
            generation: 0,
            tuple: Some(tuple),
        });
        TupleId {
            index,
            generation: 0,
        }
    }

    /// Returns the tuple if `id` is still live.
    pub fn try_get(&self, id: TupleId) -> Option<&Tuple<Sc>> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.tuple.as_ref())
    }

    /// # Panics
    /// Panics if `id` is stale.
    pub fn get(&self, id: TupleId) -> &Tuple<Sc> {
        match self.try_get(id) {
            Some(tuple) => tuple,
            None => panic!("stale tuple id {}", id),
        }
    }

    /// # Panics
    /// Panics if `id` is stale.
    pub fn get_mut(&mut self, id: TupleId) -> &mut Tuple<Sc> {
        match self
            .slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.tuple.as_mut())
        {
            Some(tuple) => tuple,
            None => panic!("stale tuple id {}", id),
        }
    }

    /// Releases a settled-dead tuple and retires its id.
    ///
    /// # Panics
    /// Panics if `id` is stale or the tuple has not reached `Dead`.
    pub fn free(&mut self, id: TupleId) -> Tuple<Sc> {
        let slot = match self
            .slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
        {
            Some(slot) => slot,
            None => panic!("stale tuple id {}", id),
        };
        let tuple = match slot.tuple.take() {
            Some(tuple) => tuple,
            None => panic!("stale tuple id {}", id),
        };
        assert_eq!(
            tuple.state,
            TupleState::Dead,
            "freeing {} while it is {}",
            id,
            tuple.state
        );
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.len -= 1;
        tuple
    }

    /// Number of live tuples.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterates live tuples in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (TupleId, &Tuple<Sc>)> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.tuple.as_ref().map(|tuple| {
                (
                    TupleId {
                        index: index as u32,
                        generation: slot.generation,
                    },
                    tuple,
                )
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;
    use smallvec::smallvec;

    #[test]
    fn test_create_get_free() {
        let mut arena: TupleArena<i64> = TupleArena::new();
        let id = arena.create(NodeId::new(0), smallvec![Value::Int(1)], 2);

        let tuple = arena.get(id);
        assert_eq!(tuple.state(), TupleState::Creating);
        assert_eq!(tuple.store.len(), 2);
        assert_eq!(arena.len(), 1);

        arena.get_mut(id).state = TupleState::Dead;
        arena.free(id);
        assert!(arena.try_get(id).is_none());
        assert!(arena.is_empty());
    }

    #[test]
    fn test_slot_reuse_bumps_generation() {
        let mut arena: TupleArena<i64> = TupleArena::new();
        let a = arena.create(NodeId::new(0), smallvec![], 0);
        arena.get_mut(a).state = TupleState::Dead;
        arena.free(a);
        let b = arena.create(NodeId::new(0), smallvec![], 0);

        assert_eq!(a.index, b.index);
        assert_ne!(a, b);
        assert_eq!(arena.iter().count(), 1);
    }

    #[test]
    #[should_panic(expected = "stale tuple id")]
    fn test_stale_access_panics() {
        let mut arena: TupleArena<i64> = TupleArena::new();
        let a = arena.create(NodeId::new(0), smallvec![], 0);
        arena.get_mut(a).state = TupleState::Dead;
        arena.free(a);
        arena.get(a);
    }

    #[test]
    #[should_panic(expected = "while it is ok")]
    fn test_free_requires_dead() {
        let mut arena: TupleArena<i64> = TupleArena::new();
        let a = arena.create(NodeId::new(0), smallvec![], 0);
        arena.get_mut(a).state = TupleState::Ok;
        arena.free(a);
    }
}
