//! Deterministic rule-based suggestion generator
//!
//! Golden-test territory: for a fixed (profile, features) pair the output is
//! byte-for-byte reproducible apart from generated ids. The formulas below
//! are tuned against the analyzer's approximate feature arithmetic; do not
//! "correct" them perceptually.

use std::collections::BTreeMap;

use mx_core::{EffectKind, MixProfile, ParamUpdates, Suggestion, TrackFeatures};

use crate::error::EngineResult;
use crate::{MAX_CANDIDATES, SuggestionEngine};

/// Coarse instrument role inferred from the feature vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackRole {
    Bass,
    Drums,
    Lead,
    Harmonic,
}

impl TrackRole {
    pub fn as_str(self) -> &'static str {
        match self {
            TrackRole::Bass => "bass",
            TrackRole::Drums => "drums",
            TrackRole::Lead => "lead",
            TrackRole::Harmonic => "harmonic",
        }
    }
}

/// Infer the track's role from band balance, brightness, and transients.
pub fn infer_role(features: &TrackFeatures) -> TrackRole {
    if features.band_energy_low >= 0.44 && features.spectral_centroid_hz < 900.0 {
        return TrackRole::Bass;
    }
    if features.transient_density > 0.18 && features.crest_factor_db > 8.0 {
        return TrackRole::Drums;
    }
    if features.band_energy_high > 0.42 && features.spectral_centroid_hz > 2500.0 {
        return TrackRole::Lead;
    }
    TrackRole::Harmonic
}

struct Candidate {
    variant: &'static str,
    score: f64,
    param_updates: ParamUpdates,
}

/// Rule-based strategy: three named variants, ranked by score.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedEngine;

impl RuleBasedEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn suggest(
        &self,
        track_id: &str,
        profile: MixProfile,
        features: &TrackFeatures,
    ) -> Vec<Suggestion> {
        let role = infer_role(features);
        let mut candidates = build_variants(profile, role, features);
        candidates.sort_by(|a, b| b.score.total_cmp(&a.score));

        candidates
            .into_iter()
            .take(MAX_CANDIDATES)
            .map(|candidate| {
                Suggestion::new(
                    track_id,
                    profile,
                    candidate.variant,
                    round4(candidate.score),
                    format!(
                        "profile={}, role={}, centroid={:.1}, transient={:.3}, lra={:.1}",
                        profile,
                        role.as_str(),
                        features.spectral_centroid_hz,
                        features.transient_density,
                        features.loudness_range_db
                    ),
                    candidate.param_updates,
                )
            })
            .collect()
    }
}

impl SuggestionEngine for RuleBasedEngine {
    fn generate(
        &self,
        track_id: &str,
        profile: MixProfile,
        features: &TrackFeatures,
    ) -> EngineResult<Vec<Suggestion>> {
        Ok(self.suggest(track_id, profile, features))
    }
}

fn build_variants(profile: MixProfile, role: TrackRole, features: &TrackFeatures) -> Vec<Candidate> {
    let profile_gain = match profile {
        MixProfile::Clean => 0.05,
        MixProfile::Punch => 0.08,
        MixProfile::Warm => 0.06,
    };
    let role_bias = match role {
        TrackRole::Bass => 0.09,
        TrackRole::Drums => 0.1,
        TrackRole::Lead => 0.07,
        TrackRole::Harmonic => 0.06,
    };

    let mut gate_threshold = if features.dynamic_range_db > 19.0 {
        -58.0
    } else {
        -45.0
    };
    if role == TrackRole::Drums {
        gate_threshold -= 4.0;
    }

    let base_ratio = match profile {
        MixProfile::Clean => 2.4,
        MixProfile::Punch => 4.2,
        MixProfile::Warm => 3.2,
    };

    let mut base_eq_high = match profile {
        MixProfile::Clean => 1.8,
        MixProfile::Punch => 1.1,
        MixProfile::Warm => -0.6,
    };
    if role == TrackRole::Bass {
        base_eq_high -= 1.2;
    }
    if role == TrackRole::Lead {
        base_eq_high += 0.8;
    }

    let mut base_sat = match profile {
        MixProfile::Clean => 0.08,
        MixProfile::Punch => 0.26,
        MixProfile::Warm => 0.34,
    };
    if role == TrackRole::Drums {
        base_sat += 0.08;
    }

    let transient_push = ((features.transient_density - 0.08) * 1.8).clamp(0.0, 0.18);
    let lra_push = ((features.loudness_range_db - 7.0) * 0.012).clamp(0.0, 0.1);

    vec![
        Candidate {
            variant: "balanced",
            score: 0.78 + profile_gain + role_bias + lra_push,
            param_updates: updates(&[
                (EffectKind::Eq, &[("high_gain_db", base_eq_high)]),
                (
                    EffectKind::Compressor,
                    &[
                        ("ratio", base_ratio),
                        ("threshold_db", -20.0 + transient_push * -10.0),
                    ],
                ),
                (EffectKind::Gate, &[("threshold_db", gate_threshold)]),
                (EffectKind::Saturator, &[("mix", base_sat)]),
            ]),
        },
        Candidate {
            variant: "tight",
            score: 0.75 + profile_gain + transient_push + role_bias * 0.9,
            param_updates: updates(&[
                (EffectKind::Eq, &[("high_gain_db", base_eq_high - 0.5)]),
                (
                    EffectKind::Compressor,
                    &[("ratio", base_ratio + 0.8), ("threshold_db", -23.0)],
                ),
                (EffectKind::Gate, &[("threshold_db", gate_threshold - 3.0)]),
                (EffectKind::Saturator, &[("mix", (base_sat + 0.08).min(0.9))]),
            ]),
        },
        Candidate {
            variant: "wide",
            score: 0.72 + profile_gain + features.band_energy_high * 0.09,
            param_updates: updates(&[
                (EffectKind::Eq, &[("high_gain_db", base_eq_high + 0.7)]),
                (
                    EffectKind::Compressor,
                    &[
                        ("ratio", (base_ratio - 0.7).max(1.2)),
                        ("threshold_db", -18.0),
                    ],
                ),
                (EffectKind::Gate, &[("threshold_db", gate_threshold + 4.0)]),
                (EffectKind::Saturator, &[("mix", (base_sat - 0.06).max(0.02))]),
            ]),
        },
    ]
}

fn updates(entries: &[(EffectKind, &[(&str, f64)])]) -> ParamUpdates {
    entries
        .iter()
        .map(|(kind, params)| {
            let map: BTreeMap<String, f64> = params
                .iter()
                .map(|(id, value)| (id.to_string(), *value))
                .collect();
            (*kind, map)
        })
        .collect()
}

#[inline]
fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn features(
        band_low: f64,
        band_high: f64,
        centroid: f64,
        transient: f64,
        crest: f64,
    ) -> TrackFeatures {
        TrackFeatures {
            lufs: -15.0,
            peak_dbfs: -6.0,
            rms_dbfs: -14.0,
            crest_factor_db: crest,
            spectral_centroid_hz: centroid,
            band_energy_low: band_low,
            band_energy_mid: 1.0 - band_low - band_high,
            band_energy_high: band_high,
            dynamic_range_db: 12.0,
            loudness_range_db: 9.0,
            transient_density: transient,
            zero_crossing_rate: 0.2,
        }
    }

    #[test]
    fn test_role_inference() {
        assert_eq!(
            infer_role(&features(0.5, 0.1, 400.0, 0.05, 4.0)),
            TrackRole::Bass
        );
        assert_eq!(
            infer_role(&features(0.3, 0.3, 1500.0, 0.3, 10.0)),
            TrackRole::Drums
        );
        assert_eq!(
            infer_role(&features(0.1, 0.5, 4000.0, 0.05, 4.0)),
            TrackRole::Lead
        );
        assert_eq!(
            infer_role(&features(0.3, 0.3, 1500.0, 0.05, 4.0)),
            TrackRole::Harmonic
        );
    }

    #[test]
    fn test_three_variants_sorted_by_score() {
        let engine = RuleBasedEngine::new();
        let f = features(0.3, 0.3, 1500.0, 0.1, 6.0);
        let suggestions = engine.suggest("t1", MixProfile::Punch, &f);
        assert_eq!(suggestions.len(), 3);
        for pair in suggestions.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
        let variants: Vec<&str> = suggestions.iter().map(|s| s.variant.as_str()).collect();
        assert!(variants.contains(&"balanced"));
        assert!(variants.contains(&"tight"));
        assert!(variants.contains(&"wide"));
    }

    #[test]
    fn test_deterministic_apart_from_ids() {
        let engine = RuleBasedEngine::new();
        let f = features(0.45, 0.2, 700.0, 0.12, 7.0);
        let a = engine.suggest("t1", MixProfile::Warm, &f);
        let b = engine.suggest("t1", MixProfile::Warm, &f);
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.variant, y.variant);
            assert_eq!(x.score, y.score);
            assert_eq!(x.reason, y.reason);
            assert_eq!(x.param_updates, y.param_updates);
            assert_ne!(x.suggestion_id, y.suggestion_id);
        }
    }

    #[test]
    fn test_punch_profile_compressor_targets() {
        let engine = RuleBasedEngine::new();
        // Harmonic role, low transients: no transient push on the threshold.
        let f = features(0.3, 0.3, 1500.0, 0.05, 4.0);
        let suggestions = engine.suggest("kick", MixProfile::Punch, &f);
        let balanced = suggestions.iter().find(|s| s.variant == "balanced").unwrap();
        let comp = &balanced.param_updates[&EffectKind::Compressor];
        assert_abs_diff_eq!(comp["ratio"], 4.2, epsilon = 1e-12);
        assert_abs_diff_eq!(comp["threshold_db"], -20.0, epsilon = 1e-12);
        let tight = suggestions.iter().find(|s| s.variant == "tight").unwrap();
        assert_abs_diff_eq!(
            tight.param_updates[&EffectKind::Compressor]["ratio"],
            5.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_bass_role_darkens_eq() {
        let engine = RuleBasedEngine::new();
        let f = features(0.5, 0.1, 400.0, 0.05, 4.0);
        let suggestions = engine.suggest("bass", MixProfile::Clean, &f);
        let balanced = suggestions.iter().find(|s| s.variant == "balanced").unwrap();
        // clean base 1.8 minus the bass dampening 1.2
        assert_abs_diff_eq!(
            balanced.param_updates[&EffectKind::Eq]["high_gain_db"],
            0.6,
            epsilon = 1e-12
        );
        assert!(balanced.reason.contains("role=bass"));
    }

    #[test]
    fn test_scores_round_to_four_decimals() {
        let engine = RuleBasedEngine::new();
        let f = features(0.3, 0.31, 1500.0, 0.123, 6.0);
        for s in engine.suggest("t", MixProfile::Clean, &f) {
            let scaled = s.score * 10_000.0;
            assert_abs_diff_eq!(scaled, scaled.round(), epsilon = 1e-9);
        }
    }
}
