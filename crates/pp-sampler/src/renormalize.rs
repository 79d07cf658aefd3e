use crate::candidate::ProcessedCandidate;
use crate::stage::Stage;

/// Computes final sampling probabilities over the candidates kept by both
/// filters.
///
/// If no candidate survives, the top-ranked candidate is forced to
/// probability 1 so a draw can always succeed.
pub struct RenormalizeStage;

impl RenormalizeStage {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RenormalizeStage {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage for RenormalizeStage {
    fn name(&self) -> &str {
        "renormalize"
    }

    fn apply(&self, candidates: &mut [ProcessedCandidate]) {
        let valid_sum: f64 = candidates
            .iter()
            .filter(|c| c.is_active())
            .map(|c| c.adjusted_prob)
            .sum();

        if valid_sum > 0.0 && valid_sum.is_finite() {
            for c in candidates.iter_mut() {
                c.final_prob = if c.is_active() {
                    c.adjusted_prob / valid_sum
                } else {
                    0.0
                };
            }
            return;
        }

        for c in candidates.iter_mut() {
            c.final_prob = 0.0;
        }
        if let Some(top) = candidates.first_mut() {
            log::warn!(
                "no candidate passed both filters, forcing '{}' (id {})",
                top.token,
                top.id
            );
            top.final_prob = 1.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::Candidate;
    use approx::assert_abs_diff_eq;

    fn candidates(rows: &[(f64, bool, bool)]) -> Vec<ProcessedCandidate> {
        rows.iter()
            .enumerate()
            .map(|(i, &(p, k, tp))| {
                let mut c = ProcessedCandidate::from(&Candidate::new(i as u32, "t", p));
                c.adjusted_prob = p;
                c.kept_by_top_k = k;
                c.kept_by_top_p = tp;
                c
            })
            .collect()
    }

    #[test]
    fn test_renormalizes_active_set() {
        let mut c = candidates(&[(0.5, true, true), (0.3, true, true), (0.2, false, true)]);
        RenormalizeStage::new().apply(&mut c);
        assert_abs_diff_eq!(c[0].final_prob, 0.625, epsilon = 1e-12);
        assert_abs_diff_eq!(c[1].final_prob, 0.375, epsilon = 1e-12);
        assert_eq!(c[2].final_prob, 0.0);
    }

    #[test]
    fn test_requires_both_flags() {
        let mut c = candidates(&[(0.5, true, true), (0.3, true, false), (0.2, false, true)]);
        RenormalizeStage::new().apply(&mut c);
        assert_eq!(c[0].final_prob, 1.0);
        assert_eq!(c[1].final_prob, 0.0);
        assert_eq!(c[2].final_prob, 0.0);
    }

    #[test]
    fn test_empty_active_set_forces_top() {
        let mut c = candidates(&[(0.5, false, true), (0.3, true, false), (0.2, false, false)]);
        c[1].final_prob = 0.4;
        RenormalizeStage::new().apply(&mut c);
        assert_eq!(c[0].final_prob, 1.0);
        assert_eq!(c[1].final_prob, 0.0);
        assert_eq!(c[2].final_prob, 0.0);
    }

    #[test]
    fn test_empty_input_is_noop() {
        let mut c: Vec<ProcessedCandidate> = Vec::new();
        RenormalizeStage::new().apply(&mut c);
        assert!(c.is_empty());
    }
}
