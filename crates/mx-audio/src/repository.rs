//! Track-to-waveform mapping for analysis and playback
//!
//! The repository is the backing store for the service's sample provider:
//! shared read access from analysis threads, occasional writes on load.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;

use crate::error::AudioResult;
use crate::loader::load_wav_mono;

/// Loaded waveform bound to a track id.
#[derive(Debug, Clone)]
pub struct WaveformTrackData {
    pub track_id: String,
    pub path: PathBuf,
    pub sample_rate: u32,
    pub duration_sec: f64,
    pub samples: Vec<f64>,
}

/// In-memory waveform store keyed by track id.
#[derive(Debug, Default)]
pub struct WaveformRepository {
    items: RwLock<HashMap<String, WaveformTrackData>>,
}

impl WaveformRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a WAV file and bind its mono waveform to `track_id`, replacing
    /// any previous binding.
    pub fn load_track_wav(
        &self,
        track_id: &str,
        path: impl AsRef<Path>,
    ) -> AudioResult<WaveformTrackData> {
        let loaded = load_wav_mono(path.as_ref())?;
        let item = WaveformTrackData {
            track_id: track_id.to_string(),
            path: path.as_ref().to_path_buf(),
            sample_rate: loaded.sample_rate,
            duration_sec: loaded.duration_sec(),
            samples: loaded.samples,
        };
        log::debug!(
            "loaded waveform for track '{}': {} frames @ {} Hz",
            track_id,
            item.samples.len(),
            item.sample_rate
        );
        self.items.write().insert(track_id.to_string(), item.clone());
        Ok(item)
    }

    /// Detached copy of a track's samples, if loaded.
    pub fn samples(&self, track_id: &str) -> Option<Vec<f64>> {
        self.items.read().get(track_id).map(|i| i.samples.clone())
    }

    pub fn item(&self, track_id: &str) -> Option<WaveformTrackData> {
        self.items.read().get(track_id).cloned()
    }

    pub fn track_ids(&self) -> Vec<String> {
        self.items.read().keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wav::{WavBuffer, write_wav};
    use mx_dsp::codec::BitDepth;

    #[test]
    fn test_repository_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kick.wav");
        write_wav(
            &path,
            &WavBuffer {
                sample_rate: 44100,
                depth: BitDepth::Bits16,
                channels: vec![vec![0.25; 64]],
            },
        )
        .unwrap();

        let repo = WaveformRepository::new();
        assert!(repo.samples("kick").is_none());
        repo.load_track_wav("kick", &path).unwrap();
        let samples = repo.samples("kick").unwrap();
        assert_eq!(samples.len(), 64);
        assert_eq!(repo.track_ids(), vec!["kick".to_string()]);
    }
}
