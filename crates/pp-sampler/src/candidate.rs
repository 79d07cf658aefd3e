/// A candidate next token with the probability the model assigned to it.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub id: u32,
    pub token: String,
    pub base_prob: f64,
}

impl Candidate {
    pub fn new(id: u32, token: impl Into<String>, base_prob: f64) -> Self {
        Self {
            id,
            token: token.into(),
            base_prob,
        }
    }
}

/// A candidate annotated by every stage of the transform pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedCandidate {
    pub id: u32,
    pub token: String,
    pub base_prob: f64,
    /// Temperature-reweighted probability, normalized over the whole set.
    pub adjusted_prob: f64,
    /// Running sum of `adjusted_prob` in rank order, including this candidate.
    pub cumulative_prob: f64,
    pub kept_by_top_k: bool,
    pub kept_by_top_p: bool,
    /// Probability used for the actual draw (0 if filtered out).
    pub final_prob: f64,
}

impl ProcessedCandidate {
    /// Kept by both filters, i.e. eligible for sampling.
    pub fn is_active(&self) -> bool {
        self.kept_by_top_k && self.kept_by_top_p
    }
}

impl From<&Candidate> for ProcessedCandidate {
    fn from(c: &Candidate) -> Self {
        Self {
            id: c.id,
            token: c.token.clone(),
            base_prob: c.base_prob,
            adjusted_prob: 0.0,
            cumulative_prob: 0.0,
            kept_by_top_k: false,
            kept_by_top_p: false,
            final_prob: 0.0,
        }
    }
}
