use std::cmp::Ordering;

use crate::candidate::ProcessedCandidate;
use crate::stage::Stage;

/// Sorts candidates by descending adjusted probability and fills in the
/// running cumulative probability.
///
/// The sort is stable, so exact ties keep their input order. Summation runs in
/// ascending rank order; top-P boundary decisions depend on that order.
pub struct RankStage;

impl RankStage {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RankStage {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage for RankStage {
    fn name(&self) -> &str {
        "rank"
    }

    fn apply(&self, candidates: &mut [ProcessedCandidate]) {
        candidates.sort_by(|a, b| {
            b.adjusted_prob
                .partial_cmp(&a.adjusted_prob)
                .unwrap_or(Ordering::Equal)
        });

        let mut running = 0.0f64;
        for c in candidates.iter_mut() {
            running += c.adjusted_prob;
            c.cumulative_prob = running;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::Candidate;
    use approx::assert_abs_diff_eq;

    fn ranked(probs: &[f64]) -> Vec<ProcessedCandidate> {
        let mut c: Vec<ProcessedCandidate> = probs
            .iter()
            .enumerate()
            .map(|(i, &p)| {
                let mut pc = ProcessedCandidate::from(&Candidate::new(i as u32, "t", p));
                pc.adjusted_prob = p;
                pc
            })
            .collect();
        RankStage::new().apply(&mut c);
        c
    }

    #[test]
    fn test_sorts_descending() {
        let c = ranked(&[0.1, 0.6, 0.3]);
        let ids: Vec<u32> = c.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 2, 0]);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let c = ranked(&[0.25, 0.5, 0.25]);
        let ids: Vec<u32> = c.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 0, 2]);
    }

    #[test]
    fn test_cumulative_is_inclusive() {
        let c = ranked(&[0.2, 0.5, 0.3]);
        assert_abs_diff_eq!(c[0].cumulative_prob, 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(c[1].cumulative_prob, 0.8, epsilon = 1e-12);
        assert_abs_diff_eq!(c[2].cumulative_prob, 1.0, epsilon = 1e-12);
    }
}
