//! Source nodes: where fact changes enter the network.
//!
//! A source keeps no state of its own. The network records, per fact, the
//! tuple each matching source emitted, and routes later updates and
//! retractions of that fact to the same tuple.

use smallvec::smallvec;

use super::Outbox;
use crate::fact::FactHandle;
use crate::tuple::TupleId;
use crate::value::Value;

/// Emits the arity-1 tuple for a newly inserted fact.
pub(crate) fn source_insert<Sc>(handle: FactHandle, out: &mut Outbox<'_, Sc>) -> TupleId {
    out.insert(smallvec![Value::Fact(handle)])
}

/// Marks a fact's tuple as changed; its elements (the handle) stay the same.
pub(crate) fn source_update<Sc>(tuple: TupleId, out: &mut Outbox<'_, Sc>) {
    out.update(tuple);
}

pub(crate) fn source_retract<Sc>(tuple: TupleId, out: &mut Outbox<'_, Sc>) {
    out.retract(tuple);
}
