use crate::candidate::ProcessedCandidate;
use crate::params::TEMPERATURE_FLOOR;
use crate::stage::Stage;

/// Reweights base probabilities by `p ^ (1 / temperature)` and normalizes the
/// result over the whole candidate set.
///
/// Temperatures below 1 sharpen the distribution toward the mode, while
/// temperatures above 1 flatten it toward uniform. The input is already a
/// probability, so this is a power transform rather than a softmax over logits.
pub struct TemperatureStage {
    temperature: f64,
}

impl TemperatureStage {
    /// Create a new temperature stage with the given temperature.
    pub fn new(temperature: f64) -> Self {
        Self { temperature }
    }

    /// Temperature actually used, floored to avoid an infinite exponent.
    pub fn effective_temperature(&self) -> f64 {
        self.temperature.max(TEMPERATURE_FLOOR)
    }
}

impl Stage for TemperatureStage {
    fn name(&self) -> &str {
        "temperature"
    }

    fn apply(&self, candidates: &mut [ProcessedCandidate]) {
        if candidates.is_empty() {
            return;
        }

        let t = self.effective_temperature();
        let mut weights: Vec<f64> = candidates
            .iter()
            .map(|c| c.base_prob.powf(1.0 / t))
            .collect();
        let mut sum: f64 = weights.iter().sum();

        // Every weight underflowed (or overflowed): redo it in log space
        // relative to the largest base probability, so the mode weighs 1.
        if !(sum > 0.0 && sum.is_finite()) {
            log::debug!("power weights degenerate at t={}, using log-space weights", t);
            let max_ln = candidates
                .iter()
                .map(|c| c.base_prob.ln())
                .fold(f64::NEG_INFINITY, f64::max);
            weights = candidates
                .iter()
                .map(|c| ((c.base_prob.ln() - max_ln) / t).exp())
                .collect();
            sum = weights.iter().sum();
        }

        for (c, w) in candidates.iter_mut().zip(weights) {
            c.adjusted_prob = w / sum;
        }
    }
}
