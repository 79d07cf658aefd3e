use pp_sampler::{ProcessedCandidate, SamplingParams};

/// Status codes returned by all FFI functions.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PPStatus {
    Ok = 0,
    ErrorInvalidArgument = 1,
    ErrorScenarioLoad = 2,
    ErrorBusy = 3,
    ErrorBufferTooSmall = 4,
    ErrorInternal = 5,
}

/// Decoding parameters selected by the presentation layer.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct PPParams {
    pub temperature: f64,
    pub top_k: u32,
    pub top_p: f64,
    /// Reseeds the sampling RNG when nonzero.
    pub seed: u64,
}

impl Default for PPParams {
    fn default() -> Self {
        Self {
            temperature: 1.0,
            top_k: u32::MAX,
            top_p: 1.0,
            seed: 0,
        }
    }
}

impl PPParams {
    pub fn to_sampling(&self) -> SamplingParams {
        SamplingParams::new(self.temperature, self.top_k as usize, self.top_p)
    }

    pub fn from_sampling(params: &SamplingParams, seed: u64) -> Self {
        Self {
            temperature: params.temperature,
            top_k: crate::count_u32(params.top_k),
            top_p: params.top_p,
            seed,
        }
    }
}

/// One row of the transform output. Token text is fetched separately with
/// `pp_candidate_token`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PPProcessedCandidate {
    pub id: u32,
    pub base_prob: f64,
    pub adjusted_prob: f64,
    pub cumulative_prob: f64,
    pub kept_by_top_k: bool,
    pub kept_by_top_p: bool,
    pub final_prob: f64,
}

impl From<&ProcessedCandidate> for PPProcessedCandidate {
    fn from(c: &ProcessedCandidate) -> Self {
        Self {
            id: c.id,
            base_prob: c.base_prob,
            adjusted_prob: c.adjusted_prob,
            cumulative_prob: c.cumulative_prob,
            kept_by_top_k: c.kept_by_top_k,
            kept_by_top_p: c.kept_by_top_p,
            final_prob: c.final_prob,
        }
    }
}

/// Callback for the visual roulette ticks that precede a draw.
/// Receives the highlighted candidate id and the tick index.
/// Returns true to keep ticking, false to skip straight to the draw.
pub type PPRouletteCallback = Option<
    extern "C" fn(
        candidate_id: u32,
        tick: u32,
        user_data: *mut std::os::raw::c_void,
    ) -> bool,
>;
