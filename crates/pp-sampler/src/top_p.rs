use crate::candidate::ProcessedCandidate;
use crate::stage::Stage;

/// Nucleus filter: a candidate is kept when the cumulative probability of the
/// candidates ranked strictly above it is below `p`.
///
/// The candidate that crosses the threshold is therefore still kept. This can
/// keep one more candidate than the smallest set whose mass reaches `p`.
pub struct TopPStage {
    p: f64,
}

impl TopPStage {
    /// Create a new top-P stage with the given probability threshold.
    pub fn new(p: f64) -> Self {
        Self { p }
    }
}

impl Stage for TopPStage {
    fn name(&self) -> &str {
        "top_p"
    }

    fn apply(&self, candidates: &mut [ProcessedCandidate]) {
        // Sum of everything ranked above the current candidate, taken from the
        // previous candidate's cumulative value rather than by subtraction.
        let mut before = 0.0f64;
        for c in candidates.iter_mut() {
            c.kept_by_top_p = before < self.p;
            before = c.cumulative_prob;
        }
    }
}
