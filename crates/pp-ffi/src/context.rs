use pp_sampler::{sample_with, transform_with, ProcessedCandidate, SamplingParams};
use pp_scenario::Scenario;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{Result, SessionError};

/// Number of visual ticks before the real draw.
pub const DEFAULT_ROULETTE_TICKS: u32 = 15;

/// Opaque context handle holding one playground session: the scenario, the
/// selected parameters, and the generated history.
///
/// Generation is split into `begin_generate` and `finish_generate` so the FFI
/// layer can report visual ticks without holding a borrow of the context.
/// While a generation is in progress, parameter and scenario changes are
/// rejected with [`SessionError::Busy`].
pub struct PPContext {
    scenario: Scenario,
    params: SamplingParams,
    history: Vec<String>,
    selected: Option<u32>,
    generating: bool,
    /// Drives the one authoritative draw per generation.
    rng: StdRng,
    /// Drives the roulette highlights only.
    visual_rng: StdRng,
    processed: Vec<ProcessedCandidate>,
    processed_for: Option<SamplingParams>,
}

impl Default for PPContext {
    fn default() -> Self {
        Self::new()
    }
}

impl PPContext {
    /// A session on the built-in scenario with entropy-seeded RNGs.
    pub fn new() -> Self {
        Self::with_rngs(StdRng::from_entropy(), StdRng::from_entropy())
    }

    /// A session on the built-in scenario with reproducible draws.
    pub fn with_seed(seed: u64) -> Self {
        let (rng, visual_rng) = seeded_rngs(seed);
        Self::with_rngs(rng, visual_rng)
    }

    fn with_rngs(rng: StdRng, visual_rng: StdRng) -> Self {
        let scenario = Scenario::builtin();
        Self {
            params: scenario.default_params(),
            scenario,
            history: Vec::new(),
            selected: None,
            generating: false,
            rng,
            visual_rng,
            processed: Vec::new(),
            processed_for: None,
        }
    }

    /// Reseed both RNGs.
    pub fn reseed(&mut self, seed: u64) {
        let (rng, visual_rng) = seeded_rngs(seed);
        self.rng = rng;
        self.visual_rng = visual_rng;
    }

    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    /// Replace the scenario, resetting parameters and history.
    pub fn set_scenario(&mut self, scenario: Scenario) -> Result<()> {
        if self.generating {
            return Err(SessionError::Busy);
        }
        self.params = scenario.default_params();
        self.scenario = scenario;
        self.history.clear();
        self.selected = None;
        self.processed_for = None;
        Ok(())
    }

    pub fn params(&self) -> SamplingParams {
        self.params
    }

    /// Set new parameters, clamped to the ranges the playground offers.
    pub fn set_params(&mut self, params: SamplingParams) -> Result<()> {
        if self.generating {
            return Err(SessionError::Busy);
        }
        self.params = params.clamped(self.scenario.len());
        log::debug!("params set to {:?}", self.params);
        Ok(())
    }

    /// The transform output for the current parameters, recomputed only
    /// when the parameters or scenario changed.
    pub fn processed(&mut self) -> &[ProcessedCandidate] {
        self.refresh();
        &self.processed
    }

    fn refresh(&mut self) {
        if self.processed_for != Some(self.params) {
            self.processed = transform_with(self.scenario.candidates(), &self.params);
            self.processed_for = Some(self.params);
        }
    }

    pub fn is_generating(&self) -> bool {
        self.generating
    }

    /// Id of the candidate highlighted last, by a visual tick or a draw.
    pub fn selected(&self) -> Option<u32> {
        self.selected
    }

    /// Start a generation and return the ids to highlight, one per tick.
    ///
    /// Highlights are uniform over candidates with nonzero final probability
    /// and come from a separate RNG, so they never influence the real draw.
    pub fn begin_generate(&mut self, ticks: u32) -> Result<Vec<u32>> {
        if self.generating {
            return Err(SessionError::Busy);
        }
        self.refresh();
        self.generating = true;
        self.selected = None;

        let eligible: Vec<u32> = self
            .processed
            .iter()
            .filter(|c| c.final_prob > 0.0)
            .map(|c| c.id)
            .collect();
        if eligible.is_empty() {
            return Ok(Vec::new());
        }

        Ok((0..ticks)
            .map(|_| eligible[self.visual_rng.gen_range(0..eligible.len())])
            .collect())
    }

    /// Record a visual highlight.
    pub fn highlight(&mut self, id: u32) {
        self.selected = Some(id);
    }

    /// Draw the token, append it to the history and end the generation.
    pub fn finish_generate(&mut self) -> Result<ProcessedCandidate> {
        if !self.generating {
            return Err(SessionError::NotGenerating);
        }
        self.generating = false;
        self.refresh();

        let winner = sample_with(&self.processed, &mut self.rng)
            .cloned()
            .ok_or(SessionError::NoCandidates)?;
        log::info!("generated '{}' (id {}, p={:.4})", winner.token, winner.id, winner.final_prob);

        self.selected = Some(winner.id);
        self.history.push(winner.token.clone());
        Ok(winner)
    }

    /// Run a whole generation, reporting each visual tick to `on_tick`.
    /// `on_tick` returns false to skip the remaining ticks.
    pub fn generate<F>(&mut self, ticks: u32, mut on_tick: F) -> Result<ProcessedCandidate>
    where
        F: FnMut(u32, u32) -> bool,
    {
        let picks = self.begin_generate(ticks)?;
        for (tick, id) in picks.into_iter().enumerate() {
            self.highlight(id);
            if !on_tick(id, tick as u32) {
                break;
            }
        }
        self.finish_generate()
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn reset_history(&mut self) {
        self.history.clear();
        self.selected = None;
    }

    /// The prompt followed by every generated token.
    pub fn text(&self) -> String {
        let mut text = self.scenario.prompt().to_string();
        for token in &self.history {
            text.push_str(token);
        }
        text
    }
}

fn seeded_rngs(seed: u64) -> (StdRng, StdRng) {
    (
        StdRng::seed_from_u64(seed),
        StdRng::seed_from_u64(seed.rotate_left(32) ^ 0x9E37_79B9_7F4A_7C15),
    )
}
