//! Analysis models: modes, feature vectors, snapshots

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;

/// Analysis fidelity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMode {
    Quick,
    Full,
}

impl AnalysisMode {
    pub fn as_str(self) -> &'static str {
        match self {
            AnalysisMode::Quick => "quick",
            AnalysisMode::Full => "full",
        }
    }

    pub fn parse(mode: &str) -> Result<Self, CoreError> {
        match mode.trim().to_ascii_lowercase().as_str() {
            "quick" => Ok(AnalysisMode::Quick),
            "full" => Ok(AnalysisMode::Full),
            other => Err(CoreError::UnsupportedAnalysisMode(other.to_string())),
        }
    }
}

impl fmt::Display for AnalysisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable per-track feature vector extracted by the analyzer.
///
/// `lufs` is a simplified RMS-derived loudness proxy, not true ITU-R BS.1770
/// loudness; the spectral centroid is a bucket-weighted brightness proxy, not
/// an FFT measurement. Downstream suggestion scoring is tuned against these
/// exact approximations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackFeatures {
    pub lufs: f64,
    pub peak_dbfs: f64,
    pub rms_dbfs: f64,
    pub crest_factor_db: f64,
    pub spectral_centroid_hz: f64,
    pub band_energy_low: f64,
    pub band_energy_mid: f64,
    pub band_energy_high: f64,
    pub dynamic_range_db: f64,
    pub loudness_range_db: f64,
    pub transient_density: f64,
    pub zero_crossing_rate: f64,
}

/// Result of one analyze call. Immutable after creation; kept in memory
/// keyed by id until process end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSnapshot {
    pub analysis_id: String,
    pub mode: AnalysisMode,
    pub created_at: DateTime<Utc>,
    pub track_features: BTreeMap<String, TrackFeatures>,
}

impl AnalysisSnapshot {
    pub fn new(
        analysis_id: impl Into<String>,
        mode: AnalysisMode,
        track_features: BTreeMap<String, TrackFeatures>,
    ) -> Self {
        Self {
            analysis_id: analysis_id.into(),
            mode,
            created_at: Utc::now(),
            track_features,
        }
    }
}

/// Opaque unique analysis identifier.
pub fn new_analysis_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parse() {
        assert_eq!(AnalysisMode::parse("quick").unwrap(), AnalysisMode::Quick);
        assert_eq!(AnalysisMode::parse(" FULL ").unwrap(), AnalysisMode::Full);
        assert!(AnalysisMode::parse("deep").is_err());
    }
}
