//! Error types for suggestion strategies

use thiserror::Error;

/// Raised when a suggestion strategy cannot produce candidates.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("LLM endpoint is not configured")]
    NotConfigured,

    #[error("LLM request failed: {0}")]
    Transport(String),

    #[error("LLM response decode failed: {0}")]
    Decode(String),

    #[error("LLM response contains no valid candidates")]
    NoCandidates,

    #[error("unsupported suggestion engine '{0}'")]
    UnsupportedMode(String),
}

pub type EngineResult<T> = Result<T, EngineError>;
