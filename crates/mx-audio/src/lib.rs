//! mx-audio: WAV file I/O and waveform storage for MixMind
//!
//! Covers the offline audition path (render a track's mixer state to a
//! preview file) and the analysis input path (mono waveform loading and the
//! per-track repository the sample provider reads from).

mod error;
mod loader;
mod repository;
mod wav;

pub use error::*;
pub use loader::*;
pub use repository::*;
pub use wav::*;
