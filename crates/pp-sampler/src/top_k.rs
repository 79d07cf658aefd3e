use crate::candidate::ProcessedCandidate;
use crate::stage::Stage;

/// Marks the `k` highest-ranked candidates as kept by top-K.
///
/// Candidates must already be in rank order. Nothing is removed; the flag is
/// combined with the top-P flag when computing final probabilities.
pub struct TopKStage {
    k: usize,
}

impl TopKStage {
    /// Create a new top-K stage that keeps the `k` highest-ranked candidates.
    pub fn new(k: usize) -> Self {
        Self { k }
    }
}

impl Stage for TopKStage {
    fn name(&self) -> &str {
        "top_k"
    }

    fn apply(&self, candidates: &mut [ProcessedCandidate]) {
        for (rank, c) in candidates.iter_mut().enumerate() {
            c.kept_by_top_k = rank < self.k;
        }
    }
}
