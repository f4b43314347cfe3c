use serde::{Deserialize, Serialize};
use std::fmt;

/// Retry controller state machine states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SolveState {
    /// No attempt made yet
    NotStarted,
    /// Assignment attempts in progress
    Attempting,
    /// An attempt produced a squad that passed validation
    Passed,
    /// Attempt budget spent, or the pool cannot be reordered
    ExhaustedRetries,
}

impl SolveState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SolveState::NotStarted => "NOT_STARTED",
            SolveState::Attempting => "ATTEMPTING",
            SolveState::Passed => "PASSED",
            SolveState::ExhaustedRetries => "EXHAUSTED_RETRIES",
        }
    }

    /// Check if this state can transition to another state
    pub fn can_transition_to(&self, target: SolveState) -> bool {
        use SolveState::*;

        match (self, target) {
            (NotStarted, Attempting) => true,

            (Attempting, Passed) => true,
            (Attempting, ExhaustedRetries) => true,

            // Terminal states and everything backwards
            _ => false,
        }
    }

    /// Get valid next states from current state
    pub fn valid_transitions(&self) -> Vec<SolveState> {
        use SolveState::*;

        match self {
            NotStarted => vec![Attempting],
            Attempting => vec![Passed, ExhaustedRetries],
            Passed | ExhaustedRetries => vec![],
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SolveState::Passed | SolveState::ExhaustedRetries)
    }
}

impl fmt::Display for SolveState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for SolveState {
    type Error = String;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s.to_uppercase().as_str() {
            "NOT_STARTED" => Ok(SolveState::NotStarted),
            "ATTEMPTING" => Ok(SolveState::Attempting),
            "PASSED" => Ok(SolveState::Passed),
            "EXHAUSTED_RETRIES" => Ok(SolveState::ExhaustedRetries),
            _ => Err(format!("Unknown state: {}", s)),
        }
    }
}
