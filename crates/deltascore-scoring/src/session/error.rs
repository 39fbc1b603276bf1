use deltascore_core::{ConstraintRef, DeltaScoreError};
use thiserror::Error;

use crate::fact::FactHandle;

/// Misuse of a [`ScoreSession`](super::ScoreSession), reported at the
/// offending call. The session is left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The handle was never issued by this session or its fact has been
    /// retracted.
    #[error("{0} does not refer to a live fact")]
    UnknownFact(FactHandle),

    /// `update` would move the fact to a different class; use `modify` or
    /// retract and re-insert instead.
    #[error("{handle} cannot change class from {from} to {to} through update")]
    ClassChanged {
        handle: FactHandle,
        from: &'static str,
        to: &'static str,
    },

    #[error("constraint '{0}' is not part of the graph")]
    UnknownConstraint(ConstraintRef),
}

impl From<SessionError> for DeltaScoreError {
    fn from(err: SessionError) -> Self {
        DeltaScoreError::Usage(err.to_string())
    }
}

/// Result type alias for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;
