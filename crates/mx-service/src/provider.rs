//! Sample provider seam between the service and audio storage
//!
//! Analysis never reads mixer state; it reads raw per-track signals through
//! this trait. Production wires the waveform repository in, tests substitute
//! synthetic signals.

use mx_audio::WaveformRepository;

/// Supplies the mono signal the analyzer sees for a track. A track with no
/// audio yields a silent buffer rather than an error; silence analyzes to the
/// floor feature vector.
pub trait TrackSignalProvider: Send + Sync {
    fn signal(&self, track_id: &str) -> Vec<f64>;
}

/// Fallback provider used when no audio storage is wired in.
#[derive(Debug, Clone, Copy)]
pub struct SilentProvider {
    pub frames: usize,
}

impl Default for SilentProvider {
    fn default() -> Self {
        Self { frames: 2048 }
    }
}

impl TrackSignalProvider for SilentProvider {
    fn signal(&self, _track_id: &str) -> Vec<f64> {
        vec![0.0; self.frames]
    }
}

impl TrackSignalProvider for WaveformRepository {
    fn signal(&self, track_id: &str) -> Vec<f64> {
        self.samples(track_id)
            .unwrap_or_else(|| SilentProvider::default().signal(track_id))
    }
}
