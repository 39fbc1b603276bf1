//! Random fact change sequences: the incremental score must never drift
//! from a from-scratch evaluation.

use deltascore_config::{EnvironmentMode, SessionConfig};
use deltascore_core::{HardSoftScore, Score};
use deltascore_scoring::{FactHandle, ScoreSession};
use deltascore_test::{
    meeting_graph, reference_constraint_scores, reference_score, Attendance, MeetingAssignment,
    MeetingFact, Room,
};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Insert(MeetingFact),
    Place {
        target: usize,
        start: Option<i64>,
        room: Option<i64>,
    },
    /// Rewrites every field of the target except its id.
    Rewrite {
        target: usize,
        meeting: i64,
        amount: i64,
        required: bool,
    },
    Retract(usize),
    Score,
}

fn fact_strategy() -> impl Strategy<Value = MeetingFact> {
    prop_oneof![
        3 => (
            0i64..4,
            1i64..4,
            proptest::option::of(0i64..8),
            proptest::option::of(0i64..3),
        )
            .prop_map(|(meeting, duration, start, room)| {
                MeetingFact::from(MeetingAssignment {
                    id: 0,
                    meeting,
                    duration,
                    start,
                    room,
                })
            }),
        2 => (0i64..3, 0i64..4, any::<bool>()).prop_map(|(person, meeting, required)| {
            MeetingFact::from(Attendance {
                id: 0,
                person,
                meeting,
                required,
            })
        }),
        1 => (0i64..3, 0i64..3).prop_map(|(id, capacity)| MeetingFact::from(Room { id, capacity })),
    ]
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => fact_strategy().prop_map(Op::Insert),
        3 => (
            any::<usize>(),
            proptest::option::of(0i64..8),
            proptest::option::of(0i64..3),
        )
            .prop_map(|(target, start, room)| Op::Place { target, start, room }),
        3 => (any::<usize>(), 0i64..4, 1i64..4, any::<bool>()).prop_map(
            |(target, meeting, amount, required)| Op::Rewrite {
                target,
                meeting,
                amount,
                required,
            }
        ),
        2 => any::<usize>().prop_map(Op::Retract),
        1 => Just(Op::Score),
    ]
}

/// Session plus the handles of its live facts.
struct Harness {
    session: ScoreSession<MeetingFact, HardSoftScore>,
    live: Vec<FactHandle>,
    next_id: i64,
}

impl Harness {
    fn new(mode: EnvironmentMode) -> Self {
        let config = SessionConfig::new().with_environment_mode(mode);
        Self {
            session: ScoreSession::new(meeting_graph(), &config).unwrap(),
            live: Vec::new(),
            next_id: 0,
        }
    }

    fn apply(&mut self, op: &Op) {
        match op {
            Op::Insert(fact) => {
                let mut fact = fact.clone();
                match &mut fact {
                    MeetingFact::Assignment(a) => a.id = self.next_id,
                    MeetingFact::Attendance(a) => a.id = self.next_id,
                    MeetingFact::Room(_) => {}
                }
                self.next_id += 1;
                self.live.push(self.session.insert(fact));
            }
            Op::Place {
                target,
                start,
                room,
            } => {
                if self.live.is_empty() {
                    return;
                }
                let handle = self.live[target % self.live.len()];
                let (start, room) = (*start, *room);
                self.session
                    .modify(handle, |fact| {
                        if let Some(assignment) = fact.as_assignment_mut() {
                            assignment.start = start;
                            assignment.room = room;
                        }
                    })
                    .unwrap();
            }
            Op::Rewrite {
                target,
                meeting,
                amount,
                required,
            } => {
                if self.live.is_empty() {
                    return;
                }
                let handle = self.live[target % self.live.len()];
                let (meeting, amount, required) = (*meeting, *amount, *required);
                self.session
                    .modify(handle, |fact| match fact {
                        MeetingFact::Assignment(a) => {
                            a.meeting = meeting;
                            a.duration = amount;
                        }
                        MeetingFact::Attendance(a) => {
                            a.meeting = meeting;
                            a.person = amount - 1;
                            a.required = required;
                        }
                        MeetingFact::Room(room) => {
                            room.id = meeting % 3;
                            room.capacity = amount - 1;
                        }
                    })
                    .unwrap();
            }
            Op::Retract(target) => {
                if self.live.is_empty() {
                    return;
                }
                let handle = self.live.swap_remove(target % self.live.len());
                self.session.retract(handle).unwrap();
            }
            Op::Score => {
                self.session.calculate_score();
            }
        }
    }

    fn facts(&self) -> Vec<MeetingFact> {
        self.session.facts().map(|(_, fact)| fact.clone()).collect()
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

    #[test]
    fn retracting_everything_returns_to_zero(ops in prop::collection::vec(op_strategy(), 0..40)) {
        let mut harness = Harness::new(EnvironmentMode::FastAssert);
        for op in &ops {
            harness.apply(op);
        }
        for handle in std::mem::take(&mut harness.live) {
            harness.session.retract(handle).unwrap();
        }

        prop_assert_eq!(harness.session.calculate_score(), HardSoftScore::zero());
        prop_assert_eq!(harness.session.tuple_count(), 0);
        prop_assert_eq!(harness.session.fact_count(), 0);
    }

    #[test]
    fn incremental_score_matches_reference(ops in prop::collection::vec(op_strategy(), 0..40)) {
        let mut harness = Harness::new(EnvironmentMode::FullAssert);
        for op in &ops {
            harness.apply(op);
        }

        let facts = harness.facts();
        let score = harness.session.calculate_score();
        prop_assert_eq!(score, reference_score(&facts));
        prop_assert_eq!(score, harness.session.rebuild().calculate_score());

        let expected = reference_constraint_scores(&facts);
        for tally in harness.session.constraint_scores() {
            prop_assert_eq!(
                Some(&tally.score),
                expected.get(tally.constraint_ref.name.as_str())
            );
        }
    }

    #[test]
    fn reset_matches_incremental_score(ops in prop::collection::vec(op_strategy(), 0..30)) {
        let mut harness = Harness::new(EnvironmentMode::FastAssert);
        for op in &ops {
            harness.apply(op);
        }

        let score = harness.session.calculate_score();
        harness.session.reset();
        prop_assert_eq!(harness.session.calculate_score(), score);
    }
}
