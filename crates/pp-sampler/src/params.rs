/// Lowest temperature the transform will use. Smaller values would make the
/// exponent `1 / t` blow up.
pub const TEMPERATURE_FLOOR: f64 = 0.01;

/// Temperature range exposed to interactive callers.
pub const TEMPERATURE_MIN: f64 = 0.1;
pub const TEMPERATURE_MAX: f64 = 2.0;

/// Top-P range exposed to interactive callers.
pub const TOP_P_MIN: f64 = 0.05;
pub const TOP_P_MAX: f64 = 1.0;

/// The three decoding parameters fed to the transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingParams {
    pub temperature: f64,
    pub top_k: usize,
    pub top_p: f64,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            temperature: 1.0,
            top_k: usize::MAX,
            top_p: 1.0,
        }
    }
}

impl SamplingParams {
    pub fn new(temperature: f64, top_k: usize, top_p: f64) -> Self {
        Self {
            temperature,
            top_k,
            top_p,
        }
    }

    /// Neutral parameters for a set of `n` candidates: every candidate kept,
    /// probabilities unchanged.
    pub fn for_candidates(n: usize) -> Self {
        Self {
            top_k: n.max(1),
            ..Self::default()
        }
    }

    /// Clamp into the ranges an interactive caller may select:
    /// temperature in [0.1, 2.0], top-K in [1, n], top-P in [0.05, 1.0].
    ///
    /// NaN values are replaced by the neutral default.
    pub fn clamped(&self, n: usize) -> Self {
        let temperature = if self.temperature.is_nan() {
            1.0
        } else {
            self.temperature.clamp(TEMPERATURE_MIN, TEMPERATURE_MAX)
        };
        let top_p = if self.top_p.is_nan() {
            TOP_P_MAX
        } else {
            self.top_p.clamp(TOP_P_MIN, TOP_P_MAX)
        };
        let clamped = Self {
            temperature,
            top_k: self.top_k.clamp(1, n.max(1)),
            top_p,
        };

        if clamped != *self {
            log::warn!("sampling params {:?} clamped to {:?}", self, clamped);
        }
        clamped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_candidates() {
        let p = SamplingParams::for_candidates(10);
        assert_eq!(p, SamplingParams::new(1.0, 10, 1.0));
    }

    #[test]
    fn test_in_range_unchanged() {
        let p = SamplingParams::new(0.7, 3, 0.9);
        assert_eq!(p.clamped(10), p);
    }

    #[test]
    fn test_clamps_each_field() {
        let p = SamplingParams::new(0.0, 0, 0.0).clamped(10);
        assert_eq!(p, SamplingParams::new(TEMPERATURE_MIN, 1, TOP_P_MIN));

        let p = SamplingParams::new(5.0, 50, 3.0).clamped(10);
        assert_eq!(p, SamplingParams::new(TEMPERATURE_MAX, 10, TOP_P_MAX));
    }

    #[test]
    fn test_nan_becomes_neutral() {
        let p = SamplingParams::new(f64::NAN, 2, f64::NAN).clamped(4);
        assert_eq!(p, SamplingParams::new(1.0, 2, 1.0));
    }

    #[test]
    fn test_default_top_k_clamps_to_set_size() {
        assert_eq!(SamplingParams::default().clamped(7).top_k, 7);
    }
}
