//! Preview, apply, and revert transaction laws.

mod common;

use approx::assert_abs_diff_eq;
use mx_core::{AnalysisMode, EffectKind, MixProfile};
use mx_service::ServiceError;

use common::service_with_tone;

fn ratio(service: &mx_service::AutomationService, track_id: &str) -> f64 {
    service
        .get_track_state(track_id)
        .unwrap()
        .fx_chain
        .param(EffectKind::Compressor, "ratio")
        .unwrap()
}

#[test]
fn test_end_to_end_apply_then_revert() {
    let mut service = service_with_tone();
    let suggestions = service
        .suggest("kick", MixProfile::Punch, None, AnalysisMode::Quick, None)
        .unwrap();
    assert_eq!(suggestions.len(), 3);
    for pair in suggestions.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
    assert_eq!(ratio(&service, "kick"), 3.0);

    let command_id = service
        .apply("kick", &suggestions[0].suggestion_id)
        .unwrap();
    let applied_ratio = ratio(&service, "kick");
    assert_ne!(applied_ratio, 3.0);
    assert_eq!(
        applied_ratio,
        suggestions[0].param_updates[&EffectKind::Compressor]["ratio"]
    );

    let history = service.get_command_history(Some("kick"));
    assert_eq!(history.len(), 1);
    assert!(history[0].applied);
    assert_eq!(history[0].command_id, command_id);

    service.revert(&command_id).unwrap();
    assert_eq!(ratio(&service, "kick"), 3.0);
    let history = service.get_command_history(Some("kick"));
    assert_eq!(history.len(), 1);
    assert!(!history[0].applied);
}

#[test]
fn test_preview_zero_is_a_value_noop() {
    let mut service = service_with_tone();
    let suggestions = service
        .suggest("bass", MixProfile::Warm, None, AnalysisMode::Quick, None)
        .unwrap();
    let original = service.get_track_state("bass").unwrap().fx_chain;

    let blended = service
        .preview("bass", &suggestions[0].suggestion_id, 0.0)
        .unwrap();
    assert_eq!(blended, original);
    assert_eq!(service.get_track_state("bass").unwrap().fx_chain, original);
}

#[test]
fn test_preview_then_cancel_restores_committed_state() {
    let mut service = service_with_tone();
    let suggestions = service
        .suggest("vox", MixProfile::Clean, None, AnalysisMode::Quick, None)
        .unwrap();
    let original = service.get_track_state("vox").unwrap().fx_chain;

    service
        .preview("vox", &suggestions[0].suggestion_id, 0.5)
        .unwrap();
    assert_ne!(service.get_track_state("vox").unwrap().fx_chain, original);

    service.cancel_preview("vox");
    assert_eq!(service.get_track_state("vox").unwrap().fx_chain, original);

    // Cancelling again is a no-op.
    service.cancel_preview("vox");
    assert_eq!(service.get_track_state("vox").unwrap().fx_chain, original);
}

#[test]
fn test_repeated_previews_do_not_compound() {
    let mut service = service_with_tone();
    let suggestions = service
        .suggest("gtr", MixProfile::Punch, None, AnalysisMode::Quick, None)
        .unwrap();
    let id = &suggestions[0].suggestion_id;

    let once = service.preview("gtr", id, 1.0).unwrap();
    let twice = service.preview("gtr", id, 1.0).unwrap();
    assert_eq!(once, twice);

    // Blending back down also reads from the same baseline.
    let half = service.preview("gtr", id, 0.5).unwrap();
    service.cancel_preview("gtr");
    let committed = service.get_track_state("gtr").unwrap().fx_chain;
    let ratio_half = half.param(EffectKind::Compressor, "ratio").unwrap();
    let ratio_base = committed.param(EffectKind::Compressor, "ratio").unwrap();
    let ratio_full = once.param(EffectKind::Compressor, "ratio").unwrap();
    assert_abs_diff_eq!(
        ratio_half,
        ratio_base + (ratio_full - ratio_base) * 0.5,
        epsilon = 1e-12
    );
}

#[test]
fn test_apply_after_preview_matches_direct_apply() {
    let mut service = service_with_tone();
    let suggestions = service
        .suggest("keys", MixProfile::Warm, None, AnalysisMode::Quick, None)
        .unwrap();
    let id = suggestions[0].suggestion_id.clone();

    service.preview("keys", &id, 0.3).unwrap();
    let command_id = service.apply("keys", &id).unwrap();

    let after = service.get_track_state("keys").unwrap().fx_chain;
    for (kind, params) in &suggestions[0].param_updates {
        for (param_id, &target) in params {
            let clamped = mx_core::clamp_param(*kind, param_id, target).unwrap();
            assert_eq!(after.param(*kind, param_id), Some(clamped));
        }
    }
    let history = service.get_command_history(Some("keys"));
    assert_eq!(history[0].command_id, command_id);
    // The recorded before-chain is the committed state, not the 0.3 blend.
    assert_eq!(
        history[0].before_chain.param(EffectKind::Compressor, "ratio"),
        Some(3.0)
    );
}

#[test]
fn test_history_is_most_recent_first_and_filterable() {
    let mut service = service_with_tone();
    let kick = service
        .suggest("kick", MixProfile::Punch, None, AnalysisMode::Quick, None)
        .unwrap();
    let snare = service
        .suggest("snare", MixProfile::Clean, None, AnalysisMode::Quick, None)
        .unwrap();

    let first = service.apply("kick", &kick[0].suggestion_id).unwrap();
    let second = service.apply("snare", &snare[0].suggestion_id).unwrap();
    let third = service.apply("kick", &kick[1].suggestion_id).unwrap();

    let all = service.get_command_history(None);
    let ids: Vec<&str> = all.iter().map(|c| c.command_id.as_str()).collect();
    assert_eq!(ids, vec![third.as_str(), second.as_str(), first.as_str()]);

    let kick_only = service.get_command_history(Some("kick"));
    assert_eq!(kick_only.len(), 2);
    assert!(kick_only.iter().all(|c| c.track_id == "kick"));
}

#[test]
fn test_suggestion_track_mismatch() {
    let mut service = service_with_tone();
    let suggestions = service
        .suggest("kick", MixProfile::Punch, None, AnalysisMode::Quick, None)
        .unwrap();
    let id = &suggestions[0].suggestion_id;

    let err = service.preview("snare", id, 1.0).unwrap_err();
    assert!(matches!(
        err,
        ServiceError::SuggestionTrackMismatch { .. }
    ));
    let err = service.apply("snare", id).unwrap_err();
    assert!(matches!(
        err,
        ServiceError::SuggestionTrackMismatch { .. }
    ));
}

#[test]
fn test_unknown_ids_error() {
    let mut service = service_with_tone();
    assert!(matches!(
        service.preview("t", "nope", 1.0),
        Err(ServiceError::SuggestionNotFound(_))
    ));
    assert!(matches!(
        service.apply("t", "nope"),
        Err(ServiceError::SuggestionNotFound(_))
    ));
    assert!(matches!(
        service.revert("nope"),
        Err(ServiceError::CommandNotFound(_))
    ));
}
