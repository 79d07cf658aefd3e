use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScenarioError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid scenario JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("scenario has no candidates")]
    Empty,
    #[error("duplicate candidate id: {0}")]
    DuplicateId(u32),
    #[error("candidate {id} has empty token text")]
    EmptyToken { id: u32 },
    #[error("candidate {id} has base probability {prob}, expected a value in (0, 1]")]
    InvalidProbability { id: u32, prob: f64 },
}

pub type Result<T> = std::result::Result<T, ScenarioError>;
