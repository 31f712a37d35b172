//! mx-core: Shared types for the MixMind mixing automation engine
//!
//! This crate provides the foundational types used across all MixMind crates:
//! the built-in FX registry, mixer graph state, analysis models, and the
//! suggestion/command models that back the preview/apply/revert flow.

mod error;
mod features;
mod fx;
mod suggestion;
mod track;

pub use error::*;
pub use features::*;
pub use fx::*;
pub use suggestion::*;
pub use track::*;

/// Decibels to linear gain.
#[inline]
pub fn db_to_gain(db: f64) -> f64 {
    10.0_f64.powf(db / 20.0)
}

/// Linear amplitude to decibels, floored at -160 dB.
#[inline]
pub fn amp_to_db(value: f64) -> f64 {
    20.0 * value.max(1e-8).log10()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_gain_roundtrip() {
        assert!((db_to_gain(0.0) - 1.0).abs() < 1e-12);
        assert!((db_to_gain(-6.0) - 0.501187).abs() < 1e-5);
        assert!((amp_to_db(1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_amp_to_db_floor() {
        assert_eq!(amp_to_db(0.0), amp_to_db(1e-8));
    }
}
