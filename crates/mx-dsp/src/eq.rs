//! Three-band shelving EQ built from two one-pole low-pass filters
//!
//! Band split: low = lowpass(low_freq); high = signal - lowpass(high_freq);
//! mid = signal - low - high. Each band is scaled by its own linear gain and
//! summed. Deliberately cheap; the band edges are gentle 6 dB/oct slopes.

use mx_core::db_to_gain;

use crate::one_pole_alpha;

/// Block-mode three-band EQ.
#[derive(Debug, Clone)]
pub struct ThreeBandEq {
    low_gain: f64,
    mid_gain: f64,
    high_gain: f64,
    low_alpha: f64,
    high_alpha: f64,
    low_state: f64,
    high_lp_state: f64,
}

impl ThreeBandEq {
    pub fn new(
        sample_rate: u32,
        low_gain_db: f64,
        mid_gain_db: f64,
        high_gain_db: f64,
        low_freq_hz: f64,
        high_freq_hz: f64,
    ) -> Self {
        let low_freq = low_freq_hz.max(20.0);
        let high_freq = high_freq_hz.max(low_freq + 10.0);
        Self {
            low_gain: db_to_gain(low_gain_db),
            mid_gain: db_to_gain(mid_gain_db),
            high_gain: db_to_gain(high_gain_db),
            low_alpha: one_pole_alpha(low_freq, sample_rate),
            high_alpha: one_pole_alpha(high_freq, sample_rate),
            low_state: 0.0,
            high_lp_state: 0.0,
        }
    }

    pub fn reset(&mut self) {
        self.low_state = 0.0;
        self.high_lp_state = 0.0;
    }

    #[inline]
    pub fn process_sample(&mut self, sample: f64) -> f64 {
        self.low_state = (1.0 - self.low_alpha) * sample + self.low_alpha * self.low_state;
        self.high_lp_state =
            (1.0 - self.high_alpha) * sample + self.high_alpha * self.high_lp_state;
        let low = self.low_state;
        let high = sample - self.high_lp_state;
        let mid = sample - low - high;
        low * self.low_gain + mid * self.mid_gain + high * self.high_gain
    }

    pub fn process_block(&mut self, samples: &mut [f64]) {
        for sample in samples.iter_mut() {
            *sample = self.process_sample(*sample);
        }
    }
}
