//! Service-level error taxonomy

use thiserror::Error;

use mx_analysis::JobError;
use mx_core::CoreError;
use mx_suggest::EngineError;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("unknown analysis id '{0}'")]
    AnalysisNotFound(String),

    #[error("unknown suggestion id '{0}'")]
    SuggestionNotFound(String),

    #[error("unknown command id '{0}'")]
    CommandNotFound(String),

    #[error("track '{track_id}' is not part of analysis '{analysis_id}'")]
    TrackNotInAnalysis {
        analysis_id: String,
        track_id: String,
    },

    #[error("suggestion '{suggestion_id}' belongs to track '{owner}', not '{requested}'")]
    SuggestionTrackMismatch {
        suggestion_id: String,
        owner: String,
        requested: String,
    },

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Job(#[from] JobError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;
