//! Error types for audio file I/O

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AudioError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("wav error: {0}")]
    Wav(#[from] hound::Error),

    #[error("source file not found: {0}")]
    SourceNotFound(String),

    #[error("unsupported bit depth: {0}")]
    UnsupportedBitDepth(u16),

    #[error("unsupported sample format (only integer PCM is handled)")]
    UnsupportedSampleFormat,

    #[error("invalid channel count in wav file")]
    InvalidChannelCount,
}

pub type AudioResult<T> = Result<T, AudioError>;
