use crate::candidate::{Candidate, ProcessedCandidate};
use crate::params::SamplingParams;
use crate::rank::RankStage;
use crate::renormalize::RenormalizeStage;
use crate::stage::Pipeline;
use crate::temperature::TemperatureStage;
use crate::top_k::TopKStage;
use crate::top_p::TopPStage;

impl Pipeline {
    /// The standard pipeline: temperature, rank, top-K, top-P, renormalize.
    pub fn standard(params: &SamplingParams) -> Self {
        Pipeline::new()
            .with(Box::new(TemperatureStage::new(params.temperature)))
            .with(Box::new(RankStage::new()))
            .with(Box::new(TopKStage::new(params.top_k)))
            .with(Box::new(TopPStage::new(params.top_p)))
            .with(Box::new(RenormalizeStage::new()))
    }
}

/// Turn base probabilities into the annotated sampling distribution.
///
/// The result is sorted by descending adjusted probability. Parameters are
/// used as given apart from the temperature floor; callers clamp top-K and
/// top-P to their valid ranges.
pub fn transform(
    candidates: &[Candidate],
    temperature: f64,
    top_k: usize,
    top_p: f64,
) -> Vec<ProcessedCandidate> {
    transform_with(candidates, &SamplingParams::new(temperature, top_k, top_p))
}

/// Same as [`transform`], taking the parameters as one value.
pub fn transform_with(candidates: &[Candidate], params: &SamplingParams) -> Vec<ProcessedCandidate> {
    let processed = Pipeline::standard(params).run(candidates);

    log::debug!(
        "transform t={} k={} p={}: {} of {} candidates active",
        params.temperature,
        params.top_k,
        params.top_p,
        processed.iter().filter(|c| c.is_active()).count(),
        processed.len()
    );
    for c in &processed {
        log::trace!(
            "  {} '{}' adjusted={:.6} cumulative={:.6} k={} p={} final={:.6}",
            c.id,
            c.token,
            c.adjusted_prob,
            c.cumulative_prob,
            c.kept_by_top_k,
            c.kept_by_top_p,
            c.final_prob
        );
    }

    processed
}
