//! Error types for MixMind core models

use thiserror::Error;

use crate::EffectKind;

/// Core error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("unknown parameter '{param_id}' for effect '{kind}'")]
    UnknownParameter { kind: EffectKind, param_id: String },

    #[error("unsupported mix profile '{0}'")]
    UnsupportedProfile(String),

    #[error("unsupported analysis mode '{0}'")]
    UnsupportedAnalysisMode(String),
}

/// Result type alias
pub type CoreResult<T> = Result<T, CoreError>;
