//! mx-suggest: suggestion strategies for the mixing automation engine
//!
//! Two interchangeable strategies share one contract: given a track id, a
//! mix profile, and a feature vector, produce at most three candidates
//! ranked by score. The rule-based strategy is deterministic and local; the
//! remote strategy talks JSON over HTTP to a configured model endpoint and
//! fails with a typed error. Fallback between the two is a policy owned by
//! the automation service, not by the strategies.

mod error;
mod remote;
mod rules;

use std::fmt;

pub use error::*;
pub use remote::*;
pub use rules::*;

use mx_core::{MixProfile, Suggestion, TrackFeatures};

/// Maximum number of candidates any strategy returns.
pub const MAX_CANDIDATES: usize = 3;

/// Which strategy the service dispatches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineMode {
    RuleBased,
    LlmBased,
}

impl EngineMode {
    pub fn as_str(self) -> &'static str {
        match self {
            EngineMode::RuleBased => "rule-based",
            EngineMode::LlmBased => "llm-based",
        }
    }

    /// Normalize a user-supplied engine mode string.
    pub fn parse(mode: &str) -> Result<Self, EngineError> {
        match mode.trim().to_ascii_lowercase().as_str() {
            "rule" | "rule-based" | "rule_based" => Ok(EngineMode::RuleBased),
            "llm" | "llm-based" | "llm_based" => Ok(EngineMode::LlmBased),
            _ => Err(EngineError::UnsupportedMode(mode.to_string())),
        }
    }
}

impl fmt::Display for EngineMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Common strategy contract: candidates sorted by score descending,
/// capped at [`MAX_CANDIDATES`].
pub trait SuggestionEngine: Send + Sync {
    fn generate(
        &self,
        track_id: &str,
        profile: MixProfile,
        features: &TrackFeatures,
    ) -> Result<Vec<Suggestion>, EngineError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_mode_parse_aliases() {
        for raw in ["rule", "Rule-Based", "rule_based", " RULE "] {
            assert_eq!(EngineMode::parse(raw).unwrap(), EngineMode::RuleBased);
        }
        for raw in ["llm", "llm-based", "LLM_BASED"] {
            assert_eq!(EngineMode::parse(raw).unwrap(), EngineMode::LlmBased);
        }
        assert!(matches!(
            EngineMode::parse("neural"),
            Err(EngineError::UnsupportedMode(_))
        ));
    }
}
