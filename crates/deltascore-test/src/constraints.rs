//! Constraint graphs over [`MeetingFact`]s.
//!
//! Each `add_*` function declares one constraint on an existing builder and
//! returns its scoring node, so tests can assemble exactly the graph they
//! need. [`meeting_graph`] declares all of them.

use std::sync::Arc;

use deltascore_core::HardSoftScore;
use deltascore_scoring::collector::count;
use deltascore_scoring::{ConstraintGraph, GraphBuilder, NodeId, Value};

use crate::meeting::{MeetingFact, ASSIGNMENT, ATTENDANCE, ROOM};

pub const PACKAGE: &str = "meetings";

pub const ROOM_CONFLICT: &str = "Room conflict";
pub const OVERLAPPING_MEETINGS: &str = "Overlapping meetings";
pub const REQUIRED_ATTENDANCE_CONFLICT: &str = "Required attendance conflict";
pub const ROOM_CAPACITY: &str = "Required room capacity";
pub const GRAIN_OCCUPANCY: &str = "Room grain occupancy";

/// Constraint names in the order [`meeting_graph`] declares them.
pub const ALL_CONSTRAINTS: [&str; 5] = [
    ROOM_CONFLICT,
    OVERLAPPING_MEETINGS,
    REQUIRED_ATTENDANCE_CONFLICT,
    ROOM_CAPACITY,
    GRAIN_OCCUPANCY,
];

pub type MeetingBuilder = GraphBuilder<MeetingFact, HardSoftScore>;
pub type MeetingGraph = Arc<ConstraintGraph<MeetingFact, HardSoftScore>>;

/// Graph with every meeting constraint.
pub fn meeting_graph() -> MeetingGraph {
    let mut builder = MeetingBuilder::with_package(PACKAGE);
    add_room_conflict(&mut builder);
    add_overlapping_meetings(&mut builder);
    add_required_attendance_conflict(&mut builder);
    add_room_capacity(&mut builder);
    add_grain_occupancy(&mut builder);
    builder.build().expect("meeting graph is valid")
}

/// Graph with only the room conflict constraint.
pub fn room_conflict_graph() -> MeetingGraph {
    let mut builder = MeetingBuilder::with_package(PACKAGE);
    add_room_conflict(&mut builder);
    builder.build().expect("room conflict graph is valid")
}

/// Assignments with both a start and a room.
pub fn add_assigned(builder: &mut MeetingBuilder) -> NodeId {
    let assignments = builder.for_each(ASSIGNMENT);
    builder.filter(assignments, |t| t.fact(0).assignment().is_assigned())
}

/// Two meetings in the same room: one hard point per shared grain.
pub fn add_room_conflict(builder: &mut MeetingBuilder) -> NodeId {
    let assigned = add_assigned(builder);
    let same_room = builder.join(
        assigned,
        assigned,
        |t| t.fact(0).assignment().room,
        |t| t.fact(0).assignment().room,
    );
    let conflicts = builder.filter(same_room, |t| {
        let (left, right) = (t.fact(0).assignment(), t.fact(1).assignment());
        left.id < right.id && left.overlap(right) > 0
    });
    builder.penalize_by(conflicts, ROOM_CONFLICT, HardSoftScore::of_hard(1), |t| {
        t.fact(0).assignment().overlap(t.fact(1).assignment())
    })
}

/// Any two meetings at the same time: one soft point per shared grain.
pub fn add_overlapping_meetings(builder: &mut MeetingBuilder) -> NodeId {
    let assigned = add_assigned(builder);
    let pairs = builder.join(assigned, assigned, |_| true, |_| true);
    let overlapping = builder.filter(pairs, |t| {
        let (left, right) = (t.fact(0).assignment(), t.fact(1).assignment());
        left.id < right.id && left.overlap(right) > 0
    });
    builder.penalize_by(overlapping, OVERLAPPING_MEETINGS, HardSoftScore::of_soft(1), |t| {
        t.fact(0).assignment().overlap(t.fact(1).assignment())
    })
}

/// A required attendee booked into two overlapping meetings.
///
/// Tuples downstream of the second join read
/// `[attendance, attendance, assignment, assignment]`.
pub fn add_required_attendance_conflict(builder: &mut MeetingBuilder) -> NodeId {
    let attendance = builder.for_each(ATTENDANCE);
    let required = builder.filter(attendance, |t| t.fact(0).attendance().required);
    let same_person = builder.join(
        required,
        required,
        |t| t.fact(0).attendance().person,
        |t| t.fact(0).attendance().person,
    );
    let same_person = builder.filter(same_person, |t| {
        t.fact(0).attendance().id < t.fact(1).attendance().id
    });

    let assigned = add_assigned(builder);
    let first = builder.join(
        same_person,
        assigned,
        |t| t.fact(0).attendance().meeting,
        |t| t.fact(0).assignment().meeting,
    );
    let both = builder.join(
        first,
        assigned,
        |t| t.fact(1).attendance().meeting,
        |t| t.fact(0).assignment().meeting,
    );
    let conflicts = builder.filter(both, |t| {
        t.fact(2).assignment().overlap(t.fact(3).assignment()) > 0
    });
    builder.penalize_by(
        conflicts,
        REQUIRED_ATTENDANCE_CONFLICT,
        HardSoftScore::of_hard(1),
        |t| t.fact(2).assignment().overlap(t.fact(3).assignment()),
    )
}

/// More attendees than seats: one hard point per missing seat.
///
/// Attendance is counted per meeting by a group node, so tuples downstream
/// read `[meeting, attendee count, assignment, room]`.
pub fn add_room_capacity(builder: &mut MeetingBuilder) -> NodeId {
    let attendance = builder.for_each(ATTENDANCE);
    let attendees = builder.group_by(attendance, |t| t.fact(0).attendance().meeting, count());

    let assigned = add_assigned(builder);
    let placed = builder.join(
        attendees,
        assigned,
        |t| t.value(0).clone(),
        |t| Value::from(t.fact(0).assignment().meeting),
    );

    let rooms = builder.for_each(ROOM);
    let in_room = builder.join(
        placed,
        rooms,
        |t| t.fact(2).assignment().room,
        |t| Some(t.fact(0).room().id),
    );
    let overfull = builder.filter(in_room, |t| missing_seats(t.value(1), t.fact(3).room().capacity) > 0);
    builder.penalize_by(overfull, ROOM_CAPACITY, HardSoftScore::of_hard(1), |t| {
        missing_seats(t.value(1), t.fact(3).room().capacity)
    })
}

/// Room grains booked more than once: one soft point per extra booking.
///
/// Each assigned meeting is flattened into the `[room, grain]` pairs it
/// occupies, which are then counted per pair.
pub fn add_grain_occupancy(builder: &mut MeetingBuilder) -> NodeId {
    let assigned = add_assigned(builder);
    let grains = builder.flatten(assigned, |t| {
        let assignment = t.fact(0).assignment();
        assignment
            .grains()
            .map(|grain| Value::List(vec![Value::from(assignment.room), Value::from(grain)]))
            .collect::<Vec<_>>()
    });
    let bookings = builder.group_by(grains, |t| t.value(1).clone(), count());
    let overbooked = builder.filter(bookings, |t| bookings_of(t.value(1)) > 1);
    builder.penalize_by(overbooked, GRAIN_OCCUPANCY, HardSoftScore::of_soft(1), |t| {
        bookings_of(t.value(1)) - 1
    })
}

fn missing_seats(attendees: &Value, capacity: i64) -> i64 {
    attendees.as_int().unwrap_or(0) - capacity
}

fn bookings_of(count: &Value) -> i64 {
    count.as_int().unwrap_or(0)
}
