//! Scoring nodes: the terminals of the network.
//!
//! Every live input tuple is a constraint match. Its contribution is computed
//! once on insert or update and stored on the tuple, so a retraction
//! subtracts exactly what was added without evaluating anything.

use deltascore_core::{ImpactType, Score};
use indexmap::IndexSet;

use super::{Event, MatchWeightFn};
use crate::fact::{Fact, FactStore};
use crate::tuple::{Scratch, TupleArena, TupleId, TupleView};

pub(crate) struct ScorerState<Sc> {
    slot: usize,
    weight: Sc,
    score: Sc,
    matches: IndexSet<TupleId>,
}

impl<Sc: Score> ScorerState<Sc> {
    pub(crate) fn new(slot: usize, weight: Sc) -> Self {
        Self {
            slot,
            weight,
            score: Sc::zero(),
            matches: IndexSet::new(),
        }
    }

    pub(super) fn on_event<F: Fact>(
        &mut self,
        impact: ImpactType,
        match_weight: Option<&MatchWeightFn<F>>,
        event: Event,
        input: TupleId,
        facts: &FactStore<F>,
        tuples: &mut TupleArena<Sc>,
    ) {
        match event {
            Event::Insert => {
                let contribution = self.contribution(impact, match_weight, input, facts, tuples);
                self.score = self.score + contribution;
                self.matches.insert(input);
                *tuples.get_mut(input).slot_mut(self.slot) = Scratch::Contribution(contribution);
            }
            Event::Update => {
                let contribution = self.contribution(impact, match_weight, input, facts, tuples);
                let previous = self.take_contribution(input, tuples);
                self.score = self.score - previous + contribution;
                *tuples.get_mut(input).slot_mut(self.slot) = Scratch::Contribution(contribution);
            }
            Event::Retract => {
                let previous = self.take_contribution(input, tuples);
                self.score = self.score - previous;
                self.matches.swap_remove(&input);
            }
        }
    }

    fn contribution<F: Fact>(
        &self,
        impact: ImpactType,
        match_weight: Option<&MatchWeightFn<F>>,
        input: TupleId,
        facts: &FactStore<F>,
        tuples: &TupleArena<Sc>,
    ) -> Sc {
        let multiplier = match match_weight {
            Some(weigh) => weigh(&TupleView::new(&tuples.get(input).elements, facts)),
            None => 1,
        };
        impact.apply(self.weight.multiply(multiplier))
    }

    fn take_contribution(&self, input: TupleId, tuples: &mut TupleArena<Sc>) -> Sc {
        match tuples.get_mut(input).take_slot(self.slot) {
            Scratch::Contribution(score) => score,
            _ => panic!("scorer input {} has no recorded contribution", input),
        }
    }

    /// Sum of the contributions of every live match.
    pub(crate) fn score(&self) -> Sc {
        self.score
    }

    pub(crate) fn weight(&self) -> Sc {
        self.weight
    }

    pub(crate) fn match_count(&self) -> usize {
        self.matches.len()
    }

    pub(crate) fn matches(&self) -> impl Iterator<Item = TupleId> + '_ {
        self.matches.iter().copied()
    }

    /// Contribution recorded on a live match.
    pub(crate) fn contribution_of(&self, input: TupleId, tuples: &TupleArena<Sc>) -> Sc {
        match tuples.get(input).slot(self.slot) {
            Scratch::Contribution(score) => *score,
            _ => panic!("scorer input {} has no recorded contribution", input),
        }
    }
}
