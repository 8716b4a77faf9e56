//! Error types for Echo Metrics

use thiserror::Error;

/// Errors that can occur during analysis
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("Failed to parse payload: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Conversation must contain at least two participants.")]
    InsufficientParticipants,

    #[error("Missing required payload: {0}")]
    MissingPayload(String),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Export tree exceeds maximum nesting depth of {limit}")]
    DepthExceeded { limit: usize },

    #[error("Sentiment scoring failed: {0}")]
    Sentiment(String),

    #[error("Analysis not found: {0}")]
    NotFound(u64),

    #[error("Store error: {0}")]
    StoreError(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ComputeError>;
