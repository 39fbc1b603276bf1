//! Tuple lifecycle state machine.
//!
//! Events arriving between flushes only move a tuple between pending states;
//! the flush settles each pending tuple exactly once and tells the producer
//! what to propagate.
//!
//! | state      | update            | retract          | settle           |
//! |------------|-------------------|------------------|------------------|
//! | `Creating` | `Creating`        | `Aborting`       | `Ok`, insert     |
//! | `Ok`       | `Updating`, queue | `Dying`, queue   | violation        |
//! | `Updating` | `Updating`        | `Dying`          | `Ok`, update     |
//! | `Dying`    | violation         | violation        | `Dead`, retract  |
//! | `Aborting` | violation         | violation        | `Dead`, nothing  |
//! | `Dead`     | violation         | violation        | violation        |

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TupleState {
    /// Inserted since the last flush; not yet visible downstream.
    Creating,
    /// Settled and visible downstream.
    Ok,
    /// Changed since the last flush.
    Updating,
    /// Retracted since the last flush after having been visible downstream.
    Dying,
    /// Retracted before it was ever propagated.
    Aborting,
    /// Settled as removed; the slot is about to be freed.
    Dead,
}

/// Result of applying an event between flushes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub next: TupleState,
    /// True when the tuple was settled before the event and must now be
    /// placed on its producer's queue.
    pub enqueue: bool,
}

/// What a flush propagates for a pending tuple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Propagation {
    Insert,
    Update,
    Retract,
    /// Nothing was ever propagated; the tuple is dropped silently.
    Abort,
}

impl TupleState {
    /// Applies an update event.
    ///
    /// # Panics
    /// Panics if the tuple is already on its way out.
    pub fn on_update(self) -> Transition {
        match self {
            TupleState::Creating => Transition {
                next: TupleState::Creating,
                enqueue: false,
            },
            TupleState::Ok => Transition {
                next: TupleState::Updating,
                enqueue: true,
            },
            TupleState::Updating => Transition {
                next: TupleState::Updating,
                enqueue: false,
            },
            TupleState::Dying | TupleState::Aborting | TupleState::Dead => {
                panic!("illegal tuple transition: update on {} tuple", self)
            }
        }
    }

    /// Applies a retract event.
    ///
    /// # Panics
    /// Panics if the tuple is already on its way out.
    pub fn on_retract(self) -> Transition {
        match self {
            TupleState::Creating => Transition {
                next: TupleState::Aborting,
                enqueue: false,
            },
            TupleState::Ok => Transition {
                next: TupleState::Dying,
                enqueue: true,
            },
            TupleState::Updating => Transition {
                next: TupleState::Dying,
                enqueue: false,
            },
            TupleState::Dying | TupleState::Aborting | TupleState::Dead => {
                panic!("illegal tuple transition: retract on {} tuple", self)
            }
        }
    }

    /// Settles a queued tuple during a flush.
    ///
    /// # Panics
    /// Panics if the tuple was queued without a pending event.
    pub fn settle(self) -> (TupleState, Propagation) {
        match self {
            TupleState::Creating => (TupleState::Ok, Propagation::Insert),
            TupleState::Updating => (TupleState::Ok, Propagation::Update),
            TupleState::Dying => (TupleState::Dead, Propagation::Retract),
            TupleState::Aborting => (TupleState::Dead, Propagation::Abort),
            TupleState::Ok | TupleState::Dead => {
                panic!("illegal tuple transition: settle on {} tuple", self)
            }
        }
    }

    /// Returns true while an event is waiting for the next flush.
    pub fn is_pending(self) -> bool {
        matches!(
            self,
            TupleState::Creating
                | TupleState::Updating
                | TupleState::Dying
                | TupleState::Aborting
        )
    }

    /// Returns true once the tuple has been retracted.
    pub fn is_retracted(self) -> bool {
        matches!(
            self,
            TupleState::Dying | TupleState::Aborting | TupleState::Dead
        )
    }
}

impl fmt::Display for TupleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TupleState::Creating => "creating",
            TupleState::Ok => "ok",
            TupleState::Updating => "updating",
            TupleState::Dying => "dying",
            TupleState::Aborting => "aborting",
            TupleState::Dead => "dead",
        };
        f.write_str(name)
    }
}
