//! `pp-sampler` - The probability pipeline behind parameter-playground.
//!
//! A fixed set of candidate tokens with base probabilities is reweighted by
//! temperature, ranked, filtered by top-K and top-P, and renormalized into the
//! distribution a single token is drawn from. Everything here is pure apart
//! from the one random draw made by [`sample`].

pub mod candidate;
pub mod params;
pub mod rank;
pub mod renormalize;
pub mod sample;
pub mod stage;
pub mod temperature;
pub mod top_k;
pub mod top_p;
pub mod transform;

pub use candidate::{Candidate, ProcessedCandidate};
pub use params::{SamplingParams, TEMPERATURE_FLOOR};
pub use rank::RankStage;
pub use renormalize::RenormalizeStage;
pub use sample::{sample, sample_with};
pub use stage::{Pipeline, Stage};
pub use temperature::TemperatureStage;
pub use top_k::TopKStage;
pub use top_p::TopPStage;
pub use transform::{transform, transform_with};
