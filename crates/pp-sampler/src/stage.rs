use crate::candidate::{Candidate, ProcessedCandidate};

/// A single step of the probability pipeline.
///
/// Stages annotate the candidate list in place. Stages that depend on rank
/// order (top-K, top-P, renormalization) must run after [`crate::RankStage`].
pub trait Stage: Send + Sync {
    /// Returns the name of this stage.
    fn name(&self) -> &str;

    /// Annotate or reorder candidates in place.
    fn apply(&self, candidates: &mut [ProcessedCandidate]);
}

/// Composes stages into an ordered pipeline.
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    /// Create a new empty pipeline.
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// Add a stage to the end of the pipeline. Returns self for builder-style usage.
    pub fn with(mut self, stage: Box<dyn Stage>) -> Self {
        self.stages.push(stage);
        self
    }

    /// Names of the stages in execution order.
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Run every stage in order over a fresh copy of `candidates`.
    pub fn run(&self, candidates: &[Candidate]) -> Vec<ProcessedCandidate> {
        let mut processed: Vec<ProcessedCandidate> =
            candidates.iter().map(ProcessedCandidate::from).collect();

        for stage in &self.stages {
            stage.apply(&mut processed);
            log::trace!("stage '{}' applied to {} candidates", stage.name(), processed.len());
        }

        processed
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}
