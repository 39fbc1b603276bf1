//! Score analysis types.
//!
//! Snapshots of the per-constraint tallies and live matches of a session,
//! taken after a flush.

use std::fmt;

use deltascore_core::{ConstraintRef, Score};

use crate::fact::FactHandle;
use crate::value::Value;

/// Running tally of one constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintScore<Sc: Score> {
    pub constraint_ref: ConstraintRef,
    /// Effective weight per match, after overrides.
    pub weight: Sc,
    /// Sum of the contributions of all live matches.
    pub score: Sc,
    pub match_count: usize,
}

/// One live match of a constraint: the tuple that reached its scoring node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintMatch<Sc: Score> {
    pub constraint_ref: ConstraintRef,
    /// Signed contribution of this match.
    pub score: Sc,
    /// Tuple elements, in the order the graph built them.
    pub elements: Vec<Value>,
}

impl<Sc: Score> ConstraintMatch<Sc> {
    /// Facts referenced directly by the match, in element order.
    pub fn fact_handles(&self) -> Vec<FactHandle> {
        self.elements.iter().filter_map(Value::as_fact).collect()
    }
}

/// Per-constraint breakdown in a score explanation.
#[derive(Debug, Clone)]
pub struct ConstraintAnalysis<Sc: Score> {
    pub constraint_ref: ConstraintRef,
    pub weight: Sc,
    pub score: Sc,
    pub matches: Vec<ConstraintMatch<Sc>>,
}

impl<Sc: Score> ConstraintAnalysis<Sc> {
    pub fn match_count(&self) -> usize {
        self.matches.len()
    }

    /// Returns the constraint name.
    pub fn name(&self) -> &str {
        &self.constraint_ref.name
    }
}

/// Complete score explanation with per-constraint breakdown.
#[derive(Debug, Clone)]
pub struct ScoreExplanation<Sc: Score> {
    /// The total score.
    pub score: Sc,
    /// One entry per constraint, in graph declaration order.
    pub constraint_analyses: Vec<ConstraintAnalysis<Sc>>,
}

impl<Sc: Score> ScoreExplanation<Sc> {
    pub fn new(score: Sc, constraint_analyses: Vec<ConstraintAnalysis<Sc>>) -> Self {
        Self {
            score,
            constraint_analyses,
        }
    }

    /// Returns the total match count across all constraints.
    pub fn total_match_count(&self) -> usize {
        self.constraint_analyses.iter().map(|a| a.match_count()).sum()
    }

    /// Returns constraints with non-zero scores.
    pub fn non_zero_constraints(&self) -> Vec<&ConstraintAnalysis<Sc>> {
        self.constraint_analyses
            .iter()
            .filter(|a| !a.score.is_zero())
            .collect()
    }

    /// Returns all matches across all constraints.
    pub fn all_matches(&self) -> Vec<&ConstraintMatch<Sc>> {
        self.constraint_analyses
            .iter()
            .flat_map(|a| &a.matches)
            .collect()
    }

    /// Looks up the analysis of one constraint.
    pub fn constraint(&self, constraint_ref: &ConstraintRef) -> Option<&ConstraintAnalysis<Sc>> {
        self.constraint_analyses
            .iter()
            .find(|a| &a.constraint_ref == constraint_ref)
    }
}

impl<Sc: Score> fmt::Display for ScoreExplanation<Sc> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Score: {}", self.score)?;
        for analysis in &self.constraint_analyses {
            let count = analysis.match_count();
            writeln!(
                f,
                "  {}: {} ({} match{})",
                analysis.constraint_ref,
                analysis.score,
                count,
                if count == 1 { "" } else { "es" }
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deltascore_core::HardSoftScore;

    fn analysis(name: &str, score: HardSoftScore, matches: usize) -> ConstraintAnalysis<HardSoftScore> {
        let constraint_ref = ConstraintRef::new("", name);
        ConstraintAnalysis {
            constraint_ref: constraint_ref.clone(),
            weight: HardSoftScore::of(0, 1),
            score,
            matches: (0..matches)
                .map(|i| ConstraintMatch {
                    constraint_ref: constraint_ref.clone(),
                    score: HardSoftScore::zero(),
                    elements: vec![Value::Int(i as i64)],
                })
                .collect(),
        }
    }

    #[test]
    fn test_explanation_totals() {
        let explanation = ScoreExplanation::new(
            HardSoftScore::of(-2, 0),
            vec![
                analysis("Room conflict", HardSoftScore::of(-2, 0), 1),
                analysis("Overlap", HardSoftScore::zero(), 0),
            ],
        );

        assert_eq!(explanation.total_match_count(), 1);
        assert_eq!(explanation.non_zero_constraints().len(), 1);
        assert_eq!(explanation.all_matches().len(), 1);
        assert!(explanation
            .constraint(&ConstraintRef::new("", "Overlap"))
            .is_some());
    }

    #[test]
    fn test_explanation_display() {
        let explanation = ScoreExplanation::new(
            HardSoftScore::of(-2, -3),
            vec![
                analysis("Room conflict", HardSoftScore::of(-2, 0), 1),
                analysis("Overlap", HardSoftScore::of(0, -3), 3),
            ],
        );

        assert_eq!(
            explanation.to_string(),
            "Score: -2hard/-3soft\n  Room conflict: -2hard/0soft (1 match)\n  Overlap: 0hard/-3soft (3 matches)\n"
        );
    }
}
