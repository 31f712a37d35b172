//! Analyze / snapshot lifecycle through the service.

mod common;

use mx_core::AnalysisMode;
use mx_service::{AutomationService, ServiceError};

use common::{init_logs, service_with_tone};

#[test]
fn test_analysis_id_roundtrip() {
    let mut service = service_with_tone();
    let analysis_id = service
        .analyze(&["kick", "snare"], AnalysisMode::Quick)
        .unwrap();

    let snapshot = service.get_snapshot(&analysis_id).unwrap();
    assert_eq!(snapshot.analysis_id, analysis_id);
    assert_eq!(snapshot.mode, AnalysisMode::Quick);
    assert_eq!(snapshot.track_features.len(), 2);
    assert!(snapshot.track_features.contains_key("kick"));

    // Cached on second read, same content.
    let again = service.get_snapshot(&analysis_id).unwrap();
    assert_eq!(again, snapshot);
}

#[test]
fn test_unknown_analysis_id() {
    let mut service = service_with_tone();
    assert!(matches!(
        service.get_snapshot("missing"),
        Err(ServiceError::AnalysisNotFound(_))
    ));
}

#[test]
fn test_silent_track_analyzes_to_floor_vector() {
    init_logs();
    // Default provider supplies digital silence.
    let mut service = AutomationService::new();
    let analysis_id = service.analyze(&["quiet"], AnalysisMode::Quick).unwrap();
    let snapshot = service.get_snapshot(&analysis_id).unwrap();
    let features = &snapshot.track_features["quiet"];

    assert_eq!(features.lufs, -70.0);
    assert_eq!(features.peak_dbfs, -70.0);
    assert_eq!(features.rms_dbfs, -70.0);
    assert_eq!(features.band_energy_low, 0.0);
    assert_eq!(features.band_energy_mid, 0.0);
    assert_eq!(features.band_energy_high, 0.0);
    assert_eq!(features.transient_density, 0.0);
}

#[test]
fn test_analyze_creates_tracks_with_default_state() {
    let mut service = service_with_tone();
    assert!(service.get_track_state("new-track").is_none());
    service.analyze(&["new-track"], AnalysisMode::Full).unwrap();
    let state = service.get_track_state("new-track").unwrap();
    assert_eq!(state.input_gain_db, 0.0);
    assert_eq!(state.pan, 0.0);
}

#[test]
fn test_suggest_with_foreign_snapshot_rejects_missing_track() {
    let mut service = service_with_tone();
    let analysis_id = service.analyze(&["kick"], AnalysisMode::Quick).unwrap();
    let err = service
        .suggest(
            "snare",
            mx_core::MixProfile::Clean,
            Some(&analysis_id),
            AnalysisMode::Quick,
            None,
        )
        .unwrap_err();
    assert!(matches!(err, ServiceError::TrackNotInAnalysis { .. }));
}

#[test]
fn test_suggest_reuses_referenced_snapshot() {
    let mut service = service_with_tone();
    let analysis_id = service
        .analyze(&["kick", "snare"], AnalysisMode::Full)
        .unwrap();
    // Both tracks resolve against the one snapshot.
    let a = service
        .suggest(
            "kick",
            mx_core::MixProfile::Punch,
            Some(&analysis_id),
            AnalysisMode::Full,
            None,
        )
        .unwrap();
    let b = service
        .suggest(
            "snare",
            mx_core::MixProfile::Punch,
            Some(&analysis_id),
            AnalysisMode::Full,
            None,
        )
        .unwrap();
    assert_eq!(a.len(), 3);
    assert_eq!(b.len(), 3);
    // Same signal, same snapshot, so the scores line up across tracks.
    assert_eq!(a[0].score, b[0].score);
}
