//! Brute-force scoring of meeting facts.
//!
//! Recomputes every constraint of [`meeting_graph`](crate::meeting_graph)
//! with plain loops over the whole fact set. Slow, obvious and independent
//! of the propagation network, which makes it the ground truth for
//! incremental scores.

use std::collections::BTreeMap;

use deltascore_core::{HardSoftScore, Score};

use crate::constraints::{
    GRAIN_OCCUPANCY, OVERLAPPING_MEETINGS, REQUIRED_ATTENDANCE_CONFLICT, ROOM_CAPACITY,
    ROOM_CONFLICT,
};
use crate::meeting::{Attendance, MeetingAssignment, MeetingFact, Room};

/// Total score of `facts` under every meeting constraint.
pub fn reference_score<'a>(facts: impl IntoIterator<Item = &'a MeetingFact>) -> HardSoftScore {
    reference_constraint_scores(facts)
        .into_iter()
        .fold(HardSoftScore::zero(), |total, (_, score)| total + score)
}

/// Score of each meeting constraint, keyed by constraint name.
pub fn reference_constraint_scores<'a>(
    facts: impl IntoIterator<Item = &'a MeetingFact>,
) -> BTreeMap<&'static str, HardSoftScore> {
    let mut assigned: Vec<&MeetingAssignment> = Vec::new();
    let mut attendance: Vec<&Attendance> = Vec::new();
    let mut rooms: Vec<&Room> = Vec::new();
    for fact in facts {
        match fact {
            MeetingFact::Assignment(a) if a.is_assigned() => assigned.push(a),
            MeetingFact::Assignment(_) => {}
            MeetingFact::Attendance(a) => attendance.push(a),
            MeetingFact::Room(r) => rooms.push(r),
        }
    }

    let mut scores = BTreeMap::new();
    scores.insert(ROOM_CONFLICT, HardSoftScore::of_hard(-room_conflict(&assigned)));
    scores.insert(
        OVERLAPPING_MEETINGS,
        HardSoftScore::of_soft(-overlapping_meetings(&assigned)),
    );
    scores.insert(
        REQUIRED_ATTENDANCE_CONFLICT,
        HardSoftScore::of_hard(-required_attendance_conflict(&assigned, &attendance)),
    );
    scores.insert(
        ROOM_CAPACITY,
        HardSoftScore::of_hard(-room_capacity(&assigned, &attendance, &rooms)),
    );
    scores.insert(GRAIN_OCCUPANCY, HardSoftScore::of_soft(-grain_occupancy(&assigned)));
    scores
}

fn room_conflict(assigned: &[&MeetingAssignment]) -> i64 {
    let mut penalty = 0;
    for left in assigned {
        for right in assigned {
            if left.room == right.room && left.id < right.id {
                penalty += left.overlap(right);
            }
        }
    }
    penalty
}

fn overlapping_meetings(assigned: &[&MeetingAssignment]) -> i64 {
    let mut penalty = 0;
    for left in assigned {
        for right in assigned {
            if left.id < right.id {
                penalty += left.overlap(right);
            }
        }
    }
    penalty
}

fn required_attendance_conflict(
    assigned: &[&MeetingAssignment],
    attendance: &[&Attendance],
) -> i64 {
    let mut penalty = 0;
    for a in attendance.iter().filter(|a| a.required) {
        for b in attendance.iter().filter(|b| b.required) {
            if a.person != b.person || a.id >= b.id {
                continue;
            }
            for first in assigned.iter().filter(|m| m.meeting == a.meeting) {
                for second in assigned.iter().filter(|m| m.meeting == b.meeting) {
                    penalty += first.overlap(second);
                }
            }
        }
    }
    penalty
}

fn room_capacity(
    assigned: &[&MeetingAssignment],
    attendance: &[&Attendance],
    rooms: &[&Room],
) -> i64 {
    let mut penalty = 0;
    for assignment in assigned {
        let attendees = attendance
            .iter()
            .filter(|a| a.meeting == assignment.meeting)
            .count() as i64;
        if attendees == 0 {
            continue;
        }
        for room in rooms.iter().filter(|r| Some(r.id) == assignment.room) {
            penalty += (attendees - room.capacity).max(0);
        }
    }
    penalty
}

fn grain_occupancy(assigned: &[&MeetingAssignment]) -> i64 {
    let mut bookings: BTreeMap<(Option<i64>, i64), i64> = BTreeMap::new();
    for assignment in assigned {
        for grain in assignment.grains() {
            *bookings.entry((assignment.room, grain)).or_default() += 1;
        }
    }
    bookings.values().map(|count| (count - 1).max(0)).sum()
}
