//! mx-analysis: offline feature extraction for the Analyze action
//!
//! `extract` turns a mono sample buffer into a fixed feature vector in
//! "quick" or "full" fidelity; `AnalysisPool` runs extraction jobs on a
//! small bounded worker pool owned by the caller.
//!
//! The spectral-centroid and loudness formulas are deliberate cheap
//! approximations (no FFT, no BS.1770); suggestion scoring downstream is
//! tuned against this exact arithmetic.

mod extract;
mod pool;

pub use extract::*;
pub use pool::*;
