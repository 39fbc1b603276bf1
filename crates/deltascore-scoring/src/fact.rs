//! Facts and the generational store that owns them.
//!
//! A fact is identified by the [`FactHandle`] minted when it is inserted,
//! never by its value. Handles carry a generation so a handle kept after
//! its fact was retracted is detected instead of aliasing a newer fact that
//! reuses the slot.

use std::fmt;

/// A value the session scores.
///
/// Usually implemented by an enum over the problem's fact classes; the class
/// name routes each fact to the source nodes declared for it.
///
/// # Example
///
/// ```
/// use deltascore_scoring::Fact;
///
/// enum Timetable {
///     Lesson { room: u32 },
///     Room { capacity: u32 },
/// }
///
/// impl Fact for Timetable {
///     fn class_name(&self) -> &'static str {
///         match self {
///             Timetable::Lesson { .. } => "Lesson",
///             Timetable::Room { .. } => "Room",
///         }
///     }
/// }
///
/// assert_eq!(Timetable::Room { capacity: 30 }.class_name(), "Room");
/// ```
pub trait Fact: 'static {
    /// Returns the class this fact belongs to.
    fn class_name(&self) -> &'static str;
}

/// Identity of an inserted fact: slot index plus generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FactHandle {
    index: u32,
    generation: u32,
}

impl FactHandle {
    /// Returns the slot index.
    #[inline]
    pub fn index(self) -> usize {
        self.index as usize
    }

    /// Returns the slot generation this handle was minted for.
    #[inline]
    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for FactHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fact#{}.{}", self.index, self.generation)
    }
}

#[derive(Debug, Clone)]
struct FactSlot<F> {
    generation: u32,
    fact: Option<F>,
}

/// Slab of live facts addressed by [`FactHandle`].
///
/// Freed slots are reused with a bumped generation.
#[derive(Debug, Clone)]
pub struct FactStore<F> {
    slots: Vec<FactSlot<F>>,
    free: Vec<u32>,
    len: usize,
}

impl<F> Default for FactStore<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F> FactStore<F> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }

    /// Stores a fact and mints a fresh handle for it.
    pub fn insert(&mut self, fact: F) -> FactHandle {
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.fact = Some(fact);
            return FactHandle {
                index,
                generation: slot.generation,
            };
        }
        let index = u32::try_from(self.slots.len())
            .unwrap_or_else(|_| panic!("fact store exceeded {} slots", u32::MAX));
        self.slots.push(FactSlot {
            generation: 0,
            fact: Some(fact),
        });
        FactHandle {
            index,
            generation: 0,
        }
    }

    fn slot(&self, handle: FactHandle) -> Option<&FactSlot<F>> {
        self.slots
            .get(handle.index())
            .filter(|slot| slot.generation == handle.generation)
    }

    /// Returns true if the handle refers to a live fact.
    pub fn contains(&self, handle: FactHandle) -> bool {
        self.get(handle).is_some()
    }

    pub fn get(&self, handle: FactHandle) -> Option<&F> {
        self.slot(handle).and_then(|slot| slot.fact.as_ref())
    }

    pub fn get_mut(&mut self, handle: FactHandle) -> Option<&mut F> {
        self.slots
            .get_mut(handle.index())
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.fact.as_mut())
    }

    /// Replaces a live fact, returning the previous value.
    pub fn replace(&mut self, handle: FactHandle, fact: F) -> Option<F> {
        self.get_mut(handle).map(|slot| std::mem::replace(slot, fact))
    }

    /// Removes a live fact and retires its handle.
    pub fn remove(&mut self, handle: FactHandle) -> Option<F> {
        let slot = self
            .slots
            .get_mut(handle.index())
            .filter(|slot| slot.generation == handle.generation)?;
        let fact = slot.fact.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        self.len -= 1;
        Some(fact)
    }

    /// Number of live facts.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterates live facts in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (FactHandle, &F)> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.fact.as_ref().map(|fact| {
                (
                    FactHandle {
                        index: index as u32,
                        generation: slot.generation,
                    },
                    fact,
                )
            })
        })
    }
}
