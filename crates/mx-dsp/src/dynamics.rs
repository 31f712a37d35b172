//! Dynamics processors: envelope follower, compressor, gate
//!
//! Both processors share the same one-pole envelope shape with independent
//! attack/release coefficients: the attack coefficient is selected while the
//! instantaneous level exceeds the envelope, release otherwise.

use mx_core::{amp_to_db, db_to_gain};

use crate::time_coeff;

/// One-pole envelope follower with independent attack/release coefficients.
#[derive(Debug, Clone)]
pub struct EnvelopeFollower {
    attack_coeff: f64,
    release_coeff: f64,
    envelope: f64,
}

impl EnvelopeFollower {
    pub fn new(attack_ms: f64, release_ms: f64, sample_rate: u32) -> Self {
        Self {
            attack_coeff: time_coeff(attack_ms, sample_rate),
            release_coeff: time_coeff(release_ms, sample_rate),
            envelope: 0.0,
        }
    }

    pub fn reset(&mut self) {
        self.envelope = 0.0;
    }

    /// Track an instantaneous level. Returns the smoothed envelope.
    #[inline]
    pub fn track(&mut self, level: f64) -> f64 {
        let coeff = if level > self.envelope {
            self.attack_coeff
        } else {
            self.release_coeff
        };
        self.envelope = coeff * self.envelope + (1.0 - coeff) * level;
        self.envelope
    }

    #[inline]
    pub fn attack_coeff(&self) -> f64 {
        self.attack_coeff
    }

    #[inline]
    pub fn release_coeff(&self) -> f64 {
        self.release_coeff
    }
}

/// Feed-forward compressor: gain reduction computed in dB above threshold
/// divided by ratio, applied as linear gain, followed by linear makeup.
#[derive(Debug, Clone)]
pub struct Compressor {
    threshold_db: f64,
    threshold_lin: f64,
    ratio: f64,
    makeup_gain: f64,
    follower: EnvelopeFollower,
}

impl Compressor {
    pub fn new(
        sample_rate: u32,
        threshold_db: f64,
        ratio: f64,
        attack_ms: f64,
        release_ms: f64,
        makeup_db: f64,
    ) -> Self {
        Self {
            threshold_db,
            threshold_lin: db_to_gain(threshold_db),
            ratio: ratio.max(1.0),
            makeup_gain: db_to_gain(makeup_db),
            follower: EnvelopeFollower::new(attack_ms.max(0.1), release_ms.max(0.1), sample_rate),
        }
    }

    #[inline]
    pub fn process_sample(&mut self, sample: f64) -> f64 {
        let level = sample.abs() + 1e-12;
        let env = self.follower.track(level);

        let gain = if env <= self.threshold_lin || self.threshold_lin <= 0.0 {
            1.0
        } else {
            let over_db = (amp_to_db(env) - self.threshold_db).max(0.0);
            let reduced_db = over_db / self.ratio;
            db_to_gain(-(over_db - reduced_db))
        };
        sample * gain * self.makeup_gain
    }

    pub fn process_block(&mut self, samples: &mut [f64]) {
        for sample in samples.iter_mut() {
            *sample = self.process_sample(*sample);
        }
    }
}

/// Gate: hard 0/1 target above/below threshold, smoothed through the same
/// attack/release one-pole to avoid clicks, multiplied into the signal.
#[derive(Debug, Clone)]
pub struct Gate {
    threshold_lin: f64,
    follower: EnvelopeFollower,
    gate: f64,
}

impl Gate {
    pub fn new(sample_rate: u32, threshold_db: f64, attack_ms: f64, release_ms: f64) -> Self {
        Self {
            threshold_lin: db_to_gain(threshold_db),
            follower: EnvelopeFollower::new(attack_ms.max(0.1), release_ms.max(0.1), sample_rate),
            gate: 0.0,
        }
    }

    #[inline]
    pub fn process_sample(&mut self, sample: f64) -> f64 {
        let env = self.follower.track(sample.abs());
        let target = if env >= self.threshold_lin { 1.0 } else { 0.0 };
        let smooth = if target > self.gate {
            self.follower.attack_coeff()
        } else {
            self.follower.release_coeff()
        };
        self.gate = smooth * self.gate + (1.0 - smooth) * target;
        sample * self.gate
    }

    pub fn process_block(&mut self, samples: &mut [f64]) {
        for sample in samples.iter_mut() {
            *sample = self.process_sample(*sample);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_rises_and_falls() {
        let mut follower = EnvelopeFollower::new(1.0, 50.0, 48000);
        let rising = follower.track(1.0);
        assert!(rising > 0.0 && rising <= 1.0);
        let mut last = rising;
        for _ in 0..100 {
            last = follower.track(1.0);
        }
        assert!(last > rising);
        let falling = follower.track(0.0);
        assert!(falling < last);
    }

    #[test]
    fn test_compressor_never_boosts_without_makeup() {
        let mut comp = Compressor::new(48000, -20.0, 4.0, 1.0, 50.0, 0.0);
        let mut buffer: Vec<f64> = (0..512).map(|i| ((i as f64) * 0.3).sin() * 0.9).collect();
        let input = buffer.clone();
        comp.process_block(&mut buffer);
        for (x, y) in input.iter().zip(&buffer) {
            assert!(y.abs() <= x.abs() + 1e-12);
        }
    }

    #[test]
    fn test_gate_attenuates_quiet_signal() {
        let mut gate = Gate::new(48000, -20.0, 0.5, 20.0);
        let mut buffer = vec![0.001; 2048];
        let input = buffer.clone();
        gate.process_block(&mut buffer);
        let in_energy: f64 = input.iter().map(|s| s * s).sum();
        let out_energy: f64 = buffer.iter().map(|s| s * s).sum();
        assert!(out_energy < in_energy);
        for (x, y) in input.iter().zip(&buffer) {
            assert!(y.abs() <= x.abs() + 1e-12);
        }
    }

    #[test]
    fn test_gate_passes_loud_signal_after_attack() {
        let mut gate = Gate::new(48000, -40.0, 0.1, 50.0);
        let mut buffer = vec![0.5; 4096];
        gate.process_block(&mut buffer);
        // Tail of a steady loud signal should be nearly unattenuated.
        assert!(buffer[4095] > 0.45);
    }
}
