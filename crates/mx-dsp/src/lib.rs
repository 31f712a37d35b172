//! mx-dsp: deterministic DSP render pipeline for MixMind
//!
//! Block-based, run-once-per-call processing over in-memory buffers.
//! No realtime or streaming paths live here.
//!
//! ## Modules
//! - `eq` - Three-band shelving EQ built from one-pole low-pass filters
//! - `dynamics` - Envelope follower, compressor, gate
//! - `saturation` - tanh soft clipper with dry/wet blend
//! - `render` - Full track render: gain -> FX chain -> fader/pan -> clip
//! - `codec` - Linear PCM sample codec (8/16/24/32-bit)

pub mod codec;
pub mod dynamics;
pub mod eq;
pub mod render;
pub mod saturation;

/// Activity threshold: a parameter within this distance of its default is
/// treated as untouched.
pub const EPSILON: f64 = 1e-6;

/// One-pole low-pass coefficient for a cutoff frequency.
/// Degenerate cutoffs or sample rates yield 0.0 (identity-ish filter).
#[inline]
pub fn one_pole_alpha(cutoff_hz: f64, sample_rate: u32) -> f64 {
    if cutoff_hz <= 0.0 || sample_rate == 0 {
        return 0.0;
    }
    ((-2.0 * std::f64::consts::PI * cutoff_hz) / sample_rate as f64).exp()
}

/// Attack/release smoothing coefficient for a time constant in milliseconds.
#[inline]
pub fn time_coeff(time_ms: f64, sample_rate: u32) -> f64 {
    if time_ms <= 0.0 || sample_rate == 0 {
        return 0.0;
    }
    (-1.0 / (time_ms * 0.001 * sample_rate as f64)).exp()
}

/// Hard clip to [-1, 1].
#[inline]
pub fn clip(value: f64) -> f64 {
    value.clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degenerate_coefficients() {
        assert_eq!(one_pole_alpha(0.0, 48000), 0.0);
        assert_eq!(one_pole_alpha(120.0, 0), 0.0);
        assert_eq!(time_coeff(0.0, 48000), 0.0);
        assert_eq!(time_coeff(12.0, 0), 0.0);
    }

    #[test]
    fn test_clip_bounds() {
        assert_eq!(clip(1.5), 1.0);
        assert_eq!(clip(-2.0), -1.0);
        assert_eq!(clip(0.25), 0.25);
    }
}
