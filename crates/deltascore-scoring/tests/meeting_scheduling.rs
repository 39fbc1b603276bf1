//! Meeting scheduling scenarios scored incrementally and checked against the
//! brute-force reference.

use std::sync::Arc;
use std::thread;

use deltascore_config::{EnvironmentMode, SessionConfig};
use deltascore_core::{ConstraintRef, HardSoftScore, Score};
use deltascore_scoring::{FactHandle, ScoreSession, SessionError};
use deltascore_test::constraints::{
    add_grain_occupancy, add_required_attendance_conflict, add_room_capacity, meeting_graph,
    room_conflict_graph, MeetingBuilder, MeetingGraph, GRAIN_OCCUPANCY, OVERLAPPING_MEETINGS,
    PACKAGE, REQUIRED_ATTENDANCE_CONFLICT, ROOM_CAPACITY, ROOM_CONFLICT,
};
use deltascore_test::{
    reference_constraint_scores, reference_score, Attendance, MeetingAssignment, MeetingFact, Room,
};

type MeetingSession = ScoreSession<MeetingFact, HardSoftScore>;

fn asserted() -> SessionConfig {
    SessionConfig::new().with_environment_mode(EnvironmentMode::FullAssert)
}

fn session(graph: MeetingGraph) -> MeetingSession {
    ScoreSession::new(graph, &asserted()).unwrap()
}

fn graph_with(add: fn(&mut MeetingBuilder) -> deltascore_scoring::NodeId) -> MeetingGraph {
    let mut builder = MeetingBuilder::with_package(PACKAGE);
    add(&mut builder);
    builder.build().unwrap()
}

fn attendance(id: i64, person: i64, meeting: i64, required: bool) -> MeetingFact {
    Attendance {
        id,
        person,
        meeting,
        required,
    }
    .into()
}

fn move_to(session: &mut MeetingSession, handle: FactHandle, start: i64) {
    session
        .modify(handle, |fact| {
            if let Some(assignment) = fact.as_assignment_mut() {
                assignment.start = Some(start);
            }
        })
        .unwrap();
}

fn live_facts(session: &MeetingSession) -> Vec<MeetingFact> {
    session.facts().map(|(_, fact)| fact.clone()).collect()
}

fn assert_matches_reference(session: &mut MeetingSession) {
    let facts = live_facts(session);
    let expected = reference_constraint_scores(&facts);
    let mut total = HardSoftScore::zero();
    for score in session.constraint_scores() {
        assert_eq!(
            Some(&score.score),
            expected.get(score.constraint_ref.name.as_str()),
            "{}",
            score.constraint_ref
        );
        total = total + score.score;
    }
    assert_eq!(session.calculate_score(), total);
}

#[test]
fn test_room_conflict_penalizes_shared_grains() {
    let mut session = session(room_conflict_graph());
    session.insert(MeetingAssignment::new(0, 10, 4).placed(0, 1).into());
    let second = session.insert(MeetingAssignment::new(1, 11, 4).placed(2, 1).into());

    assert_eq!(session.calculate_score(), HardSoftScore::of_hard(-2));

    move_to(&mut session, second, 4);
    assert_eq!(session.calculate_score(), HardSoftScore::zero());
}

#[test]
fn test_moving_a_meeting_only_changes_affected_constraints() {
    let mut session = session(meeting_graph());
    session.insert(Room { id: 1, capacity: 1 }.into());
    session.insert(MeetingAssignment::new(0, 10, 4).placed(0, 1).into());
    let second = session.insert(MeetingAssignment::new(1, 11, 4).placed(2, 1).into());
    session.insert(attendance(0, 7, 10, true));
    session.insert(attendance(1, 8, 11, false));
    session.insert(attendance(2, 9, 11, false));

    assert_matches_reference(&mut session);
    let before = session.constraint_scores();

    move_to(&mut session, second, 4);
    assert_matches_reference(&mut session);
    let after = session.constraint_scores();

    for (old, new) in before.iter().zip(&after) {
        match old.constraint_ref.name.as_str() {
            ROOM_CONFLICT => {
                assert_eq!(old.score, HardSoftScore::of_hard(-2));
                assert_eq!(new.score, HardSoftScore::zero());
            }
            OVERLAPPING_MEETINGS | GRAIN_OCCUPANCY => {
                assert_eq!(old.score, HardSoftScore::of_soft(-2));
                assert_eq!(new.score, HardSoftScore::zero());
            }
            _ => assert_eq!(old, new),
        }
    }
    assert_eq!(session.calculate_score(), HardSoftScore::of_hard(-1));
}

#[test]
fn test_required_attendance_conflict_fans_out_per_pair() {
    let mut session = session(graph_with(add_required_attendance_conflict));
    let conflict = ConstraintRef::new(PACKAGE, REQUIRED_ATTENDANCE_CONFLICT);

    session.insert(MeetingAssignment::new(0, 10, 2).placed(0, 1).into());
    session.insert(MeetingAssignment::new(1, 11, 2).placed(0, 2).into());
    let third = session.insert(MeetingAssignment::new(2, 12, 2).placed(1, 3).into());
    for (id, meeting) in [(0, 10), (1, 11), (2, 12)] {
        session.insert(attendance(id, 7, meeting, true));
    }
    // preferred attendees never conflict
    session.insert(attendance(3, 8, 10, false));
    session.insert(attendance(4, 8, 11, false));

    // pairs (10,11) overlap 2, (10,12) and (11,12) overlap 1
    assert_eq!(session.calculate_score(), HardSoftScore::of_hard(-4));
    assert_eq!(session.constraint_matches(&conflict).unwrap().len(), 3);

    session.retract(third).unwrap();
    assert_eq!(session.calculate_score(), HardSoftScore::of_hard(-2));
    let matches = session.constraint_matches(&conflict).unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].elements.len(), 4);
    assert_eq!(matches[0].score, HardSoftScore::of_hard(-2));
}

#[test]
fn test_room_capacity_follows_attendee_count() {
    let mut session = session(graph_with(add_room_capacity));
    session.insert(Room { id: 1, capacity: 2 }.into());
    session.insert(MeetingAssignment::new(0, 10, 2).placed(0, 1).into());

    let mut attendees: Vec<FactHandle> = (0..3)
        .map(|id| session.insert(attendance(id, id, 10, id == 0)))
        .collect();
    assert_eq!(session.calculate_score(), HardSoftScore::of_hard(-1));

    let dropped = attendees.remove(1);
    session.retract(dropped).unwrap();
    assert_eq!(session.calculate_score(), HardSoftScore::zero());

    for id in 3..5 {
        attendees.push(session.insert(attendance(id, id, 10, false)));
    }
    assert_eq!(session.calculate_score(), HardSoftScore::of_hard(-2));
    let overfull = session
        .constraint_matches(&ConstraintRef::new(PACKAGE, ROOM_CAPACITY))
        .unwrap();
    assert_eq!(overfull.len(), 1);
    assert_eq!(overfull[0].elements[1], deltascore_scoring::Value::Int(4));

    for handle in attendees {
        session.retract(handle).unwrap();
    }
    assert_eq!(session.calculate_score(), HardSoftScore::zero());
    assert_eq!(session.constraint_scores()[0].match_count, 0);
}

#[test]
fn test_room_capacity_rejoins_when_room_changes() {
    let mut session = session(graph_with(add_room_capacity));
    session.insert(Room { id: 1, capacity: 1 }.into());
    session.insert(Room { id: 2, capacity: 5 }.into());
    let meeting = session.insert(MeetingAssignment::new(0, 10, 2).placed(0, 1).into());
    session.insert(attendance(0, 0, 10, true));
    session.insert(attendance(1, 1, 10, true));
    assert_eq!(session.calculate_score(), HardSoftScore::of_hard(-1));

    session
        .modify(meeting, |fact| {
            if let Some(assignment) = fact.as_assignment_mut() {
                assignment.room = Some(2);
            }
        })
        .unwrap();
    assert_eq!(session.calculate_score(), HardSoftScore::zero());
}

#[test]
fn test_attendance_edits_move_groups_and_flip_filters() {
    let mut session = session(meeting_graph());
    session.insert(Room { id: 1, capacity: 1 }.into());
    session.insert(Room { id: 2, capacity: 1 }.into());
    session.insert(MeetingAssignment::new(0, 10, 2).placed(0, 1).into());
    session.insert(MeetingAssignment::new(1, 11, 2).placed(1, 2).into());
    session.insert(attendance(0, 7, 10, true));
    let mover = session.insert(attendance(1, 8, 10, false));
    assert_matches_reference(&mut session);

    // one attendee per meeting, but not yet a required one
    session
        .modify(mover, |fact| {
            if let MeetingFact::Attendance(a) = fact {
                a.person = 7;
                a.meeting = 11;
            }
        })
        .unwrap();
    assert_matches_reference(&mut session);
    let conflict = ConstraintRef::new(PACKAGE, REQUIRED_ATTENDANCE_CONFLICT);
    assert!(session.constraint_matches(&conflict).unwrap().is_empty());

    session
        .modify(mover, |fact| {
            if let MeetingFact::Attendance(a) = fact {
                a.required = true;
            }
        })
        .unwrap();
    assert_matches_reference(&mut session);
    let matches = session.constraint_matches(&conflict).unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].score, HardSoftScore::of_hard(-1));

    session
        .modify(mover, |fact| {
            if let MeetingFact::Attendance(a) = fact {
                a.meeting = 10;
            }
        })
        .unwrap();
    assert_matches_reference(&mut session);
    // a meeting overlaps itself for its whole duration
    let matches = session.constraint_matches(&conflict).unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].score, HardSoftScore::of_hard(-2));
    let overfull = session
        .constraint_matches(&ConstraintRef::new(PACKAGE, ROOM_CAPACITY))
        .unwrap();
    assert_eq!(overfull.len(), 1);
    assert_eq!(overfull[0].elements[1], deltascore_scoring::Value::Int(2));
}

#[test]
fn test_grain_occupancy_counts_extra_bookings() {
    let mut session = session(graph_with(add_grain_occupancy));
    session.insert(MeetingAssignment::new(0, 10, 4).placed(0, 1).into());
    session.insert(MeetingAssignment::new(1, 11, 4).placed(2, 1).into());
    let third = session.insert(MeetingAssignment::new(2, 12, 2).placed(3, 1).into());
    // a different room never shares a grain
    session.insert(MeetingAssignment::new(3, 13, 8).placed(0, 2).into());

    // grain 2 booked twice, grain 3 three times, grain 4 twice
    assert_eq!(session.calculate_score(), HardSoftScore::of_soft(-4));

    move_to(&mut session, third, 6);
    assert_eq!(session.calculate_score(), HardSoftScore::of_soft(-2));
    assert_matches_reference(&mut session.rebuild());
}

#[test]
fn test_unassigned_meetings_are_not_matched() {
    let mut session = session(meeting_graph());
    let pending = session.insert(MeetingAssignment::new(0, 10, 4).into());
    session.insert(MeetingAssignment::new(1, 11, 4).placed(0, 1).into());
    assert_eq!(session.calculate_score(), HardSoftScore::zero());

    session
        .modify(pending, |fact| {
            if let Some(assignment) = fact.as_assignment_mut() {
                assignment.start = Some(1);
                assignment.room = Some(1);
            }
        })
        .unwrap();
    assert_matches_reference(&mut session);
    assert_eq!(session.calculate_score(), HardSoftScore::of(-3, -6));
}

#[test]
fn test_insert_then_retract_before_flush_does_no_work() {
    let mut session = session(meeting_graph());
    let handle = session.insert(MeetingAssignment::new(0, 10, 4).placed(0, 1).into());
    session.retract(handle).unwrap();

    assert_eq!(session.calculate_score(), HardSoftScore::zero());
    let stats = session.stats();
    assert_eq!(stats.tuples_created, 1);
    assert_eq!(stats.tuples_aborted, 1);
    assert_eq!(stats.events_propagated, 0);
    assert_eq!(session.tuple_count(), 0);
}

#[test]
fn test_stale_handles_are_rejected() {
    let mut session = session(meeting_graph());
    let handle = session.insert(Room { id: 1, capacity: 4 }.into());
    session.retract(handle).unwrap();

    assert_eq!(
        session.retract(handle).unwrap_err(),
        SessionError::UnknownFact(handle)
    );
    assert!(session.modify(handle, |_| ()).is_err());
    // the freed slot is reused under a new generation
    let reused = session.insert(Room { id: 2, capacity: 4 }.into());
    assert_ne!(reused, handle);
    assert!(session.fact(handle).is_none());
}

#[test]
fn test_update_cannot_change_class_but_modify_can() {
    let mut session = session(meeting_graph());
    session.insert(MeetingAssignment::new(0, 10, 4).placed(0, 1).into());
    let handle = session.insert(MeetingAssignment::new(1, 11, 4).placed(2, 1).into());
    assert_eq!(session.calculate_score(), HardSoftScore::of(-2, -4));

    let err = session
        .update(handle, Room { id: 1, capacity: 1 }.into())
        .unwrap_err();
    assert!(matches!(err, SessionError::ClassChanged { .. }));
    assert_eq!(session.calculate_score(), HardSoftScore::of(-2, -4));

    session
        .modify(handle, |fact| *fact = Room { id: 1, capacity: 1 }.into())
        .unwrap();
    assert_eq!(session.calculate_score(), HardSoftScore::zero());
    assert_matches_reference(&mut session);
}

#[test]
fn test_config_weights_override_declared_weights() {
    let config = SessionConfig::from_toml_str(
        r#"
        environment_mode = "full_assert"

        [constraint_weights]
        "Room conflict" = "3hard/0soft"
        "meetings/Overlapping meetings" = "0hard/0soft"
        "Unknown constraint" = "1hard/0soft"
        "#,
    )
    .unwrap();
    let mut session = ScoreSession::new(meeting_graph(), &config).unwrap();
    session.insert(MeetingAssignment::new(0, 10, 4).placed(0, 1).into());
    session.insert(MeetingAssignment::new(1, 11, 4).placed(2, 1).into());

    // room conflict 3 x 2 grains, grain occupancy 2, overlap disabled
    assert_eq!(session.calculate_score(), HardSoftScore::of(-6, -2));
    let overlap = session
        .constraint_scores()
        .into_iter()
        .find(|c| c.constraint_ref.name == OVERLAPPING_MEETINGS)
        .unwrap();
    assert_eq!(overlap.weight, HardSoftScore::zero());
    assert_eq!(overlap.match_count, 1);
}

#[test]
fn test_invalid_config_weight_fails_session_creation() {
    let config = SessionConfig::new().with_constraint_weight(ROOM_CONFLICT, "lots");
    assert!(ScoreSession::new(meeting_graph(), &config).is_err());
}

#[test]
fn test_explanation_lists_every_constraint() {
    let mut session = session(meeting_graph());
    session.insert(MeetingAssignment::new(0, 10, 4).placed(0, 1).into());
    session.insert(MeetingAssignment::new(1, 11, 4).placed(2, 1).into());

    let explanation = session.explain();
    assert_eq!(explanation.score, HardSoftScore::of(-2, -4));
    assert_eq!(explanation.constraint_analyses.len(), 5);
    assert_eq!(explanation.non_zero_constraints().len(), 3);

    let room = explanation
        .constraint(&ConstraintRef::new(PACKAGE, ROOM_CONFLICT))
        .unwrap();
    assert_eq!(room.match_count(), 1);
    assert_eq!(room.matches[0].fact_handles().len(), 2);
    assert!(explanation
        .to_string()
        .contains("meetings/Room conflict: -2hard/0soft (1 match)"));
}

#[test]
fn test_graph_is_shared_between_threads() {
    let graph = meeting_graph();
    let workers: Vec<_> = (0..4)
        .map(|offset| {
            let graph = Arc::clone(&graph);
            thread::spawn(move || {
                let mut session = session(graph);
                let facts: Vec<MeetingFact> = vec![
                    Room { id: 1, capacity: 1 }.into(),
                    MeetingAssignment::new(0, 10, 4).placed(0, 1).into(),
                    MeetingAssignment::new(1, 11, 4).placed(offset, 1).into(),
                    attendance(0, 7, 10, true),
                    attendance(1, 7, 11, true),
                ];
                for fact in facts.iter().cloned() {
                    session.insert(fact);
                }
                (session.calculate_score(), reference_score(&facts))
            })
        })
        .collect();

    for worker in workers {
        let (incremental, reference) = worker.join().unwrap();
        assert_eq!(incremental, reference);
    }
}
