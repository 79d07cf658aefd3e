use std::collections::HashSet;
use std::fs;
use std::path::Path;

use pp_sampler::{Candidate, SamplingParams};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScenarioError};

/// Prompt of the built-in scenario ("The weather today is really ...").
pub const BUILTIN_PROMPT: &str = "今天天气真";

const BUILTIN_CANDIDATES: [(&str, f64); 10] = [
    ("好", 0.50),
    ("不错", 0.30),
    ("热", 0.15),
    ("怪", 0.04),
    ("糟糕", 0.005),
    ("冷", 0.002),
    ("棒", 0.001),
    ("一般", 0.001),
    ("晴", 0.0005),
    ("蓝", 0.0005),
];

/// On-disk form of a scenario.
///
/// ```json
/// { "prompt": "...", "candidates": [{ "id": 1, "token": "好", "base_prob": 0.5 }] }
/// ```
///
/// `id` may be omitted, in which case candidates are numbered from 1 in file
/// order.
#[derive(Debug, Serialize, Deserialize)]
struct ScenarioFile {
    prompt: String,
    candidates: Vec<CandidateEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CandidateEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<u32>,
    token: String,
    base_prob: f64,
}

/// A prompt and the static candidate set for its next token.
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    prompt: String,
    candidates: Vec<Candidate>,
}

impl Scenario {
    /// Build a scenario, validating the candidate set.
    ///
    /// Candidates must be non-empty, have unique ids, non-empty token text and
    /// a base probability in (0, 1]. Base probabilities need not sum to 1.
    pub fn new(prompt: impl Into<String>, candidates: Vec<Candidate>) -> Result<Scenario> {
        if candidates.is_empty() {
            return Err(ScenarioError::Empty);
        }

        let mut seen = HashSet::with_capacity(candidates.len());
        for c in &candidates {
            if !seen.insert(c.id) {
                return Err(ScenarioError::DuplicateId(c.id));
            }
            if c.token.is_empty() {
                return Err(ScenarioError::EmptyToken { id: c.id });
            }
            if !(c.base_prob > 0.0 && c.base_prob <= 1.0) {
                return Err(ScenarioError::InvalidProbability {
                    id: c.id,
                    prob: c.base_prob,
                });
            }
        }

        let mass: f64 = candidates.iter().map(|c| c.base_prob).sum();
        if (mass - 1.0).abs() > 1e-6 {
            log::debug!("scenario base probabilities sum to {}, not 1", mass);
        }

        Ok(Scenario {
            prompt: prompt.into(),
            candidates,
        })
    }

    /// The "今天天气真" scenario with ten candidates.
    pub fn builtin() -> Scenario {
        Scenario {
            prompt: BUILTIN_PROMPT.to_string(),
            candidates: BUILTIN_CANDIDATES
                .iter()
                .enumerate()
                .map(|(i, &(token, p))| Candidate::new(i as u32 + 1, token, p))
                .collect(),
        }
    }

    /// Parse and validate a scenario from JSON text.
    pub fn from_json(text: &str) -> Result<Scenario> {
        let file: ScenarioFile = serde_json::from_str(text)?;
        let candidates = file
            .candidates
            .into_iter()
            .enumerate()
            .map(|(i, e)| Candidate::new(e.id.unwrap_or(i as u32 + 1), e.token, e.base_prob))
            .collect();
        Scenario::new(file.prompt, candidates)
    }

    /// Load a scenario from a JSON file.
    pub fn open(path: &Path) -> Result<Scenario> {
        let text = fs::read_to_string(path)?;
        let scenario = Scenario::from_json(&text)?;
        log::info!(
            "loaded scenario '{}' with {} candidates from {}",
            scenario.prompt,
            scenario.len(),
            path.display()
        );
        Ok(scenario)
    }

    /// Serialize back to the JSON file format.
    pub fn to_json(&self) -> Result<String> {
        let file = ScenarioFile {
            prompt: self.prompt.clone(),
            candidates: self
                .candidates
                .iter()
                .map(|c| CandidateEntry {
                    id: Some(c.id),
                    token: c.token.clone(),
                    base_prob: c.base_prob,
                })
                .collect(),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Number of candidates.
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Always false for a validated scenario.
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Look up a candidate by id.
    pub fn candidate(&self, id: u32) -> Option<&Candidate> {
        self.candidates.iter().find(|c| c.id == id)
    }

    /// Starting parameters: temperature 1, every candidate kept.
    pub fn default_params(&self) -> SamplingParams {
        SamplingParams::for_candidates(self.len())
    }
}

impl Default for Scenario {
    fn default() -> Self {
        Self::builtin()
    }
}
