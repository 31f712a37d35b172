//! Suggestion and command models for the reversible-edit flow

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;
use crate::fx::{EffectKind, FxChainState};

/// Target sound profile for suggestion generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MixProfile {
    Clean,
    Punch,
    Warm,
}

impl MixProfile {
    pub fn as_str(self) -> &'static str {
        match self {
            MixProfile::Clean => "clean",
            MixProfile::Punch => "punch",
            MixProfile::Warm => "warm",
        }
    }

    pub fn parse(profile: &str) -> Result<Self, CoreError> {
        match profile.trim().to_ascii_lowercase().as_str() {
            "clean" => Ok(MixProfile::Clean),
            "punch" => Ok(MixProfile::Punch),
            "warm" => Ok(MixProfile::Warm),
            other => Err(CoreError::UnsupportedProfile(other.to_string())),
        }
    }
}

impl fmt::Display for MixProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Absolute parameter targets per effect kind (not deltas).
pub type ParamUpdates = BTreeMap<EffectKind, BTreeMap<String, f64>>;

/// One ranked parameter-update candidate produced by a suggestion strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub suggestion_id: String,
    pub track_id: String,
    pub profile: MixProfile,
    pub variant: String,
    /// Higher = better; used only for ranking.
    pub score: f64,
    pub reason: String,
    pub param_updates: ParamUpdates,
}

impl Suggestion {
    pub fn new(
        track_id: impl Into<String>,
        profile: MixProfile,
        variant: impl Into<String>,
        score: f64,
        reason: impl Into<String>,
        param_updates: ParamUpdates,
    ) -> Self {
        Self {
            suggestion_id: Uuid::new_v4().to_string(),
            track_id: track_id.into(),
            profile,
            variant: variant.into(),
            score,
            reason: reason.into(),
            param_updates,
        }
    }
}

/// One reversible edit: created on apply, flipped to `applied = false` on
/// revert, never deleted (append-only history).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionCommand {
    pub command_id: String,
    pub track_id: String,
    pub suggestion_id: String,
    pub created_at: DateTime<Utc>,
    pub before_chain: FxChainState,
    pub after_chain: FxChainState,
    pub applied: bool,
}

impl SuggestionCommand {
    pub fn new(
        track_id: impl Into<String>,
        suggestion_id: impl Into<String>,
        before_chain: FxChainState,
        after_chain: FxChainState,
    ) -> Self {
        Self {
            command_id: Uuid::new_v4().to_string(),
            track_id: track_id.into(),
            suggestion_id: suggestion_id.into(),
            created_at: Utc::now(),
            before_chain,
            after_chain,
            applied: false,
        }
    }
}
