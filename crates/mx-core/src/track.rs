//! Mixer graph: fixed-topology per-track mutable state
//!
//! The graph is the single source of truth for committed track state.
//! Everything else (preview, apply, render) operates on detached copies.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::fx::{FxChainState, default_chain};

/// Send from a track to a bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendState {
    pub target_bus_id: String,
    pub level_db: f64,
    pub pre_fader: bool,
}

impl SendState {
    pub fn new(target_bus_id: impl Into<String>) -> Self {
        Self {
            target_bus_id: target_bus_id.into(),
            level_db: -12.0,
            pre_fader: false,
        }
    }
}

/// Mutable mixer state of one track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackState {
    pub track_id: String,
    pub input_gain_db: f64,
    pub fader_db: f64,
    /// Stereo position in [-1, 1].
    pub pan: f64,
    pub fx_chain: FxChainState,
    pub sends: Vec<SendState>,
}

impl TrackState {
    /// Fresh track with zeroed gains/pan and the bypassed default chain.
    pub fn new(track_id: impl Into<String>) -> Self {
        Self {
            track_id: track_id.into(),
            input_gain_db: 0.0,
            fader_db: 0.0,
            pan: 0.0,
            fx_chain: default_chain(),
            sends: Vec::new(),
        }
    }
}

/// Fixed mixer graph addressed by track id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MixerGraph {
    pub tracks: BTreeMap<String, TrackState>,
}

impl MixerGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the existing track or creates one with default state.
    /// Idempotent, never errors.
    pub fn ensure_track(&mut self, track_id: &str) -> &mut TrackState {
        self.tracks
            .entry(track_id.to_string())
            .or_insert_with(|| TrackState::new(track_id))
    }

    pub fn track(&self, track_id: &str) -> Option<&TrackState> {
        self.tracks.get(track_id)
    }

    pub fn track_ids(&self) -> impl Iterator<Item = &str> {
        self.tracks.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fx::EffectKind;

    #[test]
    fn test_ensure_track_is_idempotent() {
        let mut graph = MixerGraph::new();
        graph.ensure_track("kick").fader_db = -3.0;
        let again = graph.ensure_track("kick");
        assert_eq!(again.fader_db, -3.0);
        assert_eq!(graph.tracks.len(), 1);
    }

    #[test]
    fn test_new_track_uses_default_chain() {
        let mut graph = MixerGraph::new();
        let track = graph.ensure_track("bass");
        assert_eq!(track.input_gain_db, 0.0);
        assert_eq!(track.pan, 0.0);
        assert_eq!(
            track.fx_chain.param(EffectKind::Compressor, "ratio"),
            Some(3.0)
        );
        assert!(track.sends.is_empty());
    }
}
