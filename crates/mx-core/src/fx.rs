//! Built-in FX specs and parameter registry
//!
//! The effect set is fixed and closed: every chain always contains exactly
//! the four built-in effects, each with every parameter of its spec present.
//! Values outside a known parameter's range are clamped, never rejected;
//! unknown parameter ids are rejected at the boundary.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Closed set of built-in effect kinds.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum EffectKind {
    Eq,
    Compressor,
    Gate,
    Saturator,
}

impl EffectKind {
    /// All built-in effects, in processing order.
    pub const ALL: [EffectKind; 4] = [
        EffectKind::Eq,
        EffectKind::Compressor,
        EffectKind::Gate,
        EffectKind::Saturator,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EffectKind::Eq => "eq",
            EffectKind::Compressor => "compressor",
            EffectKind::Gate => "gate",
            EffectKind::Saturator => "saturator",
        }
    }

    /// Parse a lowercase wire name. Returns `None` for anything outside the
    /// closed set (callers drop unknown kinds rather than erroring).
    pub fn parse(name: &str) -> Option<EffectKind> {
        match name.trim().to_ascii_lowercase().as_str() {
            "eq" => Some(EffectKind::Eq),
            "compressor" => Some(EffectKind::Compressor),
            "gate" => Some(EffectKind::Gate),
            "saturator" => Some(EffectKind::Saturator),
            _ => None,
        }
    }
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Spec for a single effect parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParameterSpec {
    pub param_id: &'static str,
    pub default: f64,
    pub min: f64,
    pub max: f64,
}

impl ParameterSpec {
    const fn new(param_id: &'static str, default: f64, min: f64, max: f64) -> Self {
        Self {
            param_id,
            default,
            min,
            max,
        }
    }
}

/// Spec for one built-in effect.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EffectSpec {
    pub kind: EffectKind,
    pub parameters: &'static [ParameterSpec],
}

const EQ_PARAMS: [ParameterSpec; 5] = [
    ParameterSpec::new("low_gain_db", 0.0, -18.0, 18.0),
    ParameterSpec::new("mid_gain_db", 0.0, -18.0, 18.0),
    ParameterSpec::new("high_gain_db", 0.0, -18.0, 18.0),
    ParameterSpec::new("low_freq_hz", 120.0, 20.0, 400.0),
    ParameterSpec::new("high_freq_hz", 5000.0, 1500.0, 12000.0),
];

const COMPRESSOR_PARAMS: [ParameterSpec; 5] = [
    ParameterSpec::new("threshold_db", -18.0, -60.0, 0.0),
    ParameterSpec::new("ratio", 3.0, 1.0, 20.0),
    ParameterSpec::new("attack_ms", 12.0, 0.1, 100.0),
    ParameterSpec::new("release_ms", 120.0, 5.0, 1000.0),
    ParameterSpec::new("makeup_db", 0.0, 0.0, 24.0),
];

const GATE_PARAMS: [ParameterSpec; 3] = [
    ParameterSpec::new("threshold_db", -40.0, -80.0, 0.0),
    ParameterSpec::new("attack_ms", 2.0, 0.1, 50.0),
    ParameterSpec::new("release_ms", 120.0, 5.0, 500.0),
];

const SATURATOR_PARAMS: [ParameterSpec; 2] = [
    ParameterSpec::new("drive", 0.0, 0.0, 1.0),
    ParameterSpec::new("mix", 0.0, 0.0, 1.0),
];

/// Static spec lookup for a built-in effect.
pub fn effect_spec(kind: EffectKind) -> EffectSpec {
    let parameters: &'static [ParameterSpec] = match kind {
        EffectKind::Eq => &EQ_PARAMS,
        EffectKind::Compressor => &COMPRESSOR_PARAMS,
        EffectKind::Gate => &GATE_PARAMS,
        EffectKind::Saturator => &SATURATOR_PARAMS,
    };
    EffectSpec { kind, parameters }
}

/// Spec lookup for a single parameter.
pub fn parameter_spec(kind: EffectKind, param_id: &str) -> Option<ParameterSpec> {
    effect_spec(kind)
        .parameters
        .iter()
        .find(|p| p.param_id == param_id)
        .copied()
}

/// Clamp `value` into the parameter's range.
///
/// Fails with [`CoreError::UnknownParameter`] when `param_id` is not part of
/// the effect's spec; in-range values are returned unchanged.
pub fn clamp_param(kind: EffectKind, param_id: &str, value: f64) -> CoreResult<f64> {
    let spec = parameter_spec(kind, param_id).ok_or_else(|| CoreError::UnknownParameter {
        kind,
        param_id: param_id.to_string(),
    })?;
    Ok(value.clamp(spec.min, spec.max))
}

/// Parameter state of one effect instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectState {
    pub kind: EffectKind,
    pub parameters: BTreeMap<String, f64>,
}

impl EffectState {
    /// Effect state with every parameter at its spec default.
    pub fn with_defaults(kind: EffectKind) -> Self {
        let parameters = effect_spec(kind)
            .parameters
            .iter()
            .map(|p| (p.param_id.to_string(), p.default))
            .collect();
        Self { kind, parameters }
    }

    pub fn param(&self, param_id: &str) -> Option<f64> {
        self.parameters.get(param_id).copied()
    }

    /// Parameter value, falling back to the spec default when absent.
    pub fn param_or_default(&self, param_id: &str) -> f64 {
        self.param(param_id)
            .or_else(|| parameter_spec(self.kind, param_id).map(|p| p.default))
            .unwrap_or(0.0)
    }
}

/// Full FX chain of one track.
///
/// `Clone` is a deep value copy; a stored chain and a chain handed out for
/// mutation never alias.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FxChainState {
    pub effects: BTreeMap<EffectKind, EffectState>,
}

impl FxChainState {
    /// The canonical bypassed chain: every parameter at its spec default.
    pub fn with_defaults() -> Self {
        let effects = EffectKind::ALL
            .iter()
            .map(|&kind| (kind, EffectState::with_defaults(kind)))
            .collect();
        Self { effects }
    }

    pub fn effect(&self, kind: EffectKind) -> &EffectState {
        // Invariant: every chain always contains all four built-in effects.
        &self.effects[&kind]
    }

    pub fn effect_mut(&mut self, kind: EffectKind) -> &mut EffectState {
        self.effects.get_mut(&kind).expect("builtin effect present")
    }

    pub fn param(&self, kind: EffectKind, param_id: &str) -> Option<f64> {
        self.effects.get(&kind).and_then(|e| e.param(param_id))
    }
}

/// Builds the canonical bypassed chain.
pub fn default_chain() -> FxChainState {
    FxChainState::with_defaults()
}
