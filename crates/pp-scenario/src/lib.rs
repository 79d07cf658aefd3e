//! `pp-scenario` - Candidate sets for parameter-playground.
//!
//! A scenario is a prompt plus the fixed candidates for its next token. The
//! built-in scenario continues "今天天气真"; others can be loaded from JSON.

pub mod error;
pub mod scenario;

pub use error::{Result, ScenarioError};
pub use scenario::Scenario;
