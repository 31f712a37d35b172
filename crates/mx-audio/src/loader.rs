//! Mono waveform loading for analysis input

use std::path::Path;

use crate::error::AudioResult;
use crate::wav::read_wav;

/// Channel-averaged mono waveform.
#[derive(Debug, Clone)]
pub struct LoadedWaveform {
    pub sample_rate: u32,
    pub channels: usize,
    pub frame_count: usize,
    pub samples: Vec<f64>,
}

impl LoadedWaveform {
    pub fn duration_sec(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frame_count as f64 / self.sample_rate as f64
    }
}

/// Load a WAV file as a mono f64 buffer in [-1, 1], averaging channels.
pub fn load_wav_mono(path: impl AsRef<Path>) -> AudioResult<LoadedWaveform> {
    let buffer = read_wav(path)?;
    let channel_count = buffer.channels.len();
    let frame_count = buffer.frame_count();

    let mut samples = Vec::with_capacity(frame_count);
    for index in 0..frame_count {
        let total: f64 = buffer.channels.iter().map(|c| c[index]).sum();
        samples.push((total / channel_count as f64).clamp(-1.0, 1.0));
    }

    Ok(LoadedWaveform {
        sample_rate: buffer.sample_rate,
        channels: channel_count,
        frame_count,
        samples,
    })
}
