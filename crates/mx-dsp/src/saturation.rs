//! Soft-clip saturator: tanh waveshaper with dry/wet blend
//!
//! `shape = 1 + drive * 8`; wet = tanh(x * shape) / tanh(shape). The
//! normalizer keeps unity response at full scale so drive changes color,
//! not level. `mix = 0` is the identity transform for any drive.

use crate::EPSILON;

#[derive(Debug, Clone)]
pub struct Saturator {
    shape: f64,
    normalizer: f64,
    mix: f64,
}

impl Saturator {
    pub fn new(drive: f64, mix: f64) -> Self {
        let drive = drive.clamp(0.0, 1.0);
        let shape = 1.0 + drive * 8.0;
        Self {
            shape,
            normalizer: shape.tanh(),
            mix: mix.clamp(0.0, 1.0),
        }
    }

    /// True when this instance is a pass-through.
    pub fn is_identity(&self) -> bool {
        self.mix <= EPSILON || self.normalizer.abs() <= EPSILON
    }

    #[inline]
    pub fn process_sample(&self, sample: f64) -> f64 {
        let wet = (sample * self.shape).tanh() / self.normalizer;
        sample + (wet - sample) * self.mix
    }

    pub fn process_block(&self, samples: &mut [f64]) {
        if self.is_identity() {
            return;
        }
        for sample in samples.iter_mut() {
            *sample = self.process_sample(*sample);
        }
    }
}
