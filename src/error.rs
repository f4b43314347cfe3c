use thiserror::Error;

/// Main error type for the solver
#[derive(Error, Debug)]
pub enum SolverError {
    // Input errors
    #[error("Invalid solve request: {0}")]
    InputValidation(String),

    // Price source errors (recovered inside the price cache)
    #[error("Price source unavailable: {0}")]
    PriceSourceUnavailable(String),

    // State machine errors
    #[error("Invalid state transition: from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    // Network errors
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Generic errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Result type alias for SolverError
pub type Result<T> = std::result::Result<T, SolverError>;
