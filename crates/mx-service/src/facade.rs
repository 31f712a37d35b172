//! String-typed facade over [`AutomationService`]
//!
//! Thin adapter for the API layer: profiles, analysis modes, and engine
//! modes arrive as strings and are validated at this boundary. Everything
//! else forwards unchanged.

use mx_core::{
    AnalysisMode, AnalysisSnapshot, FxChainState, MixProfile, Suggestion, SuggestionCommand,
    TrackState,
};
use mx_suggest::EngineMode;

use crate::error::ServiceResult;
use crate::service::AutomationService;

pub struct Mixing {
    service: AutomationService,
}

impl Default for Mixing {
    fn default() -> Self {
        Self::new(AutomationService::new())
    }
}

impl Mixing {
    pub fn new(service: AutomationService) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &AutomationService {
        &self.service
    }

    pub fn service_mut(&mut self) -> &mut AutomationService {
        &mut self.service
    }

    pub fn analyze(&mut self, track_ids: &[&str], mode: &str) -> ServiceResult<String> {
        let mode = AnalysisMode::parse(mode)?;
        self.service.analyze(track_ids, mode)
    }

    pub fn get_snapshot(&mut self, analysis_id: &str) -> ServiceResult<AnalysisSnapshot> {
        self.service.get_snapshot(analysis_id)
    }

    pub fn suggest(
        &mut self,
        track_id: &str,
        profile: &str,
        analysis_id: Option<&str>,
        mode: &str,
        engine_mode: Option<&str>,
    ) -> ServiceResult<Vec<Suggestion>> {
        let profile = MixProfile::parse(profile)?;
        let mode = AnalysisMode::parse(mode)?;
        let engine_mode = engine_mode.map(EngineMode::parse).transpose()?;
        self.service
            .suggest(track_id, profile, analysis_id, mode, engine_mode)
    }

    pub fn preview(
        &mut self,
        track_id: &str,
        suggestion_id: &str,
        dry_wet: f64,
    ) -> ServiceResult<FxChainState> {
        self.service.preview(track_id, suggestion_id, dry_wet)
    }

    pub fn cancel_preview(&mut self, track_id: &str) {
        self.service.cancel_preview(track_id);
    }

    pub fn apply(&mut self, track_id: &str, suggestion_id: &str) -> ServiceResult<String> {
        self.service.apply(track_id, suggestion_id)
    }

    pub fn revert(&mut self, command_id: &str) -> ServiceResult<()> {
        self.service.revert(command_id)
    }

    pub fn get_command_history(&self, track_id: Option<&str>) -> Vec<SuggestionCommand> {
        self.service.get_command_history(track_id)
    }

    pub fn get_track_state(&self, track_id: &str) -> Option<TrackState> {
        self.service.get_track_state(track_id)
    }

    pub fn set_suggestion_mode(&mut self, mode: &str) -> ServiceResult<()> {
        let mode = EngineMode::parse(mode)?;
        self.service.set_suggestion_mode(mode);
        Ok(())
    }

    pub fn suggestion_mode(&self) -> &'static str {
        self.service.suggestion_mode().as_str()
    }

    pub fn last_suggestion_source(&self) -> Option<&str> {
        self.service.last_suggestion_source()
    }

    pub fn last_fallback_reason(&self) -> Option<&str> {
        self.service.last_fallback_reason()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;

    #[test]
    fn test_facade_validates_strings() {
        let mut mixing = Mixing::default();
        assert!(matches!(
            mixing.analyze(&["t1"], "deep"),
            Err(ServiceError::Core(_))
        ));
        assert!(matches!(
            mixing.suggest("t1", "loud", None, "quick", None),
            Err(ServiceError::Core(_))
        ));
        assert!(matches!(
            mixing.set_suggestion_mode("neural"),
            Err(ServiceError::Engine(_))
        ));
    }

    #[test]
    fn test_facade_roundtrip() {
        let mut mixing = Mixing::default();
        mixing.set_suggestion_mode("llm").unwrap();
        assert_eq!(mixing.suggestion_mode(), "llm-based");

        let suggestions = mixing
            .suggest("kick", "punch", None, "quick", Some("rule"))
            .unwrap();
        assert_eq!(suggestions.len(), 3);
        assert_eq!(mixing.last_suggestion_source(), Some("rule-based"));
        assert_eq!(mixing.last_fallback_reason(), None);
        let state = mixing.get_track_state("kick").unwrap();
        assert_eq!(state.track_id, "kick");
    }
}
