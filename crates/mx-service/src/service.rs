//! Automation service: analyze, suggest, preview, apply, revert
//!
//! Single-writer orchestration over the mixer graph. Everything handed out
//! (snapshots, suggestions, commands, track state) is a detached copy; the
//! graph itself is only mutated through preview, cancel, apply, and revert.
//!
//! Fallback between suggestion strategies is a policy of this layer, not of
//! the strategies: a remote failure with fallback enabled is downgraded to a
//! warning and a rule-based regeneration with annotated reasons.

use std::collections::{BTreeMap, HashMap};

use mx_analysis::{AnalysisJob, AnalysisPool, DEFAULT_ANALYSIS_WORKERS};
use mx_core::{
    AnalysisMode, AnalysisSnapshot, FxChainState, MixProfile, MixerGraph, ParamUpdates,
    Suggestion, SuggestionCommand, TrackFeatures, TrackState, clamp_param, new_analysis_id,
};
use mx_suggest::{
    EngineError, EngineMode, LlmSuggestionEngine, RuleBasedEngine, SuggestionEngine,
};

use crate::error::{ServiceError, ServiceResult};
use crate::provider::{SilentProvider, TrackSignalProvider};

/// Source tag of the last suggest call.
pub const SOURCE_RULE_BASED: &str = "rule-based";
pub const SOURCE_LLM_BASED: &str = "llm-based";
pub const SOURCE_RULE_FALLBACK: &str = "rule-based-fallback";

const FALLBACK_REASON_MAX_CHARS: usize = 120;

/// Builder for [`AutomationService`].
pub struct AutomationServiceBuilder {
    provider: Box<dyn TrackSignalProvider>,
    engine_mode: EngineMode,
    llm_engine: Option<LlmSuggestionEngine>,
    fallback_enabled: bool,
    worker_count: usize,
}

impl Default for AutomationServiceBuilder {
    fn default() -> Self {
        Self {
            provider: Box::new(SilentProvider::default()),
            engine_mode: EngineMode::RuleBased,
            llm_engine: None,
            fallback_enabled: true,
            worker_count: DEFAULT_ANALYSIS_WORKERS,
        }
    }
}

impl AutomationServiceBuilder {
    pub fn provider(mut self, provider: Box<dyn TrackSignalProvider>) -> Self {
        self.provider = provider;
        self
    }

    pub fn engine_mode(mut self, mode: EngineMode) -> Self {
        self.engine_mode = mode;
        self
    }

    pub fn llm_engine(mut self, engine: LlmSuggestionEngine) -> Self {
        self.llm_engine = Some(engine);
        self
    }

    pub fn fallback_enabled(mut self, enabled: bool) -> Self {
        self.fallback_enabled = enabled;
        self
    }

    pub fn workers(mut self, count: usize) -> Self {
        self.worker_count = count;
        self
    }

    pub fn build(self) -> AutomationService {
        AutomationService {
            graph: MixerGraph::new(),
            provider: self.provider,
            pool: AnalysisPool::new(self.worker_count),
            jobs: HashMap::new(),
            snapshots: HashMap::new(),
            suggestions: HashMap::new(),
            commands: Vec::new(),
            preview_baselines: HashMap::new(),
            engine_mode: self.engine_mode,
            rule_engine: RuleBasedEngine::new(),
            llm_engine: self.llm_engine,
            fallback_enabled: self.fallback_enabled,
            last_source: None,
            last_fallback_reason: None,
        }
    }
}

/// The track-level mixing automation engine.
pub struct AutomationService {
    graph: MixerGraph,
    provider: Box<dyn TrackSignalProvider>,
    pool: AnalysisPool,
    /// In-flight jobs keyed by analysis id; moved to `snapshots` on first wait.
    jobs: HashMap<String, AnalysisJob>,
    snapshots: HashMap<String, AnalysisSnapshot>,
    suggestions: HashMap<String, Suggestion>,
    /// Append-only; revert flips `applied`, never removes entries.
    commands: Vec<SuggestionCommand>,
    /// Committed chain captured at the first preview on a track.
    preview_baselines: HashMap<String, FxChainState>,
    engine_mode: EngineMode,
    rule_engine: RuleBasedEngine,
    llm_engine: Option<LlmSuggestionEngine>,
    fallback_enabled: bool,
    last_source: Option<&'static str>,
    last_fallback_reason: Option<String>,
}

impl Default for AutomationService {
    fn default() -> Self {
        Self::new()
    }
}

impl AutomationService {
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> AutomationServiceBuilder {
        AutomationServiceBuilder::default()
    }

    /// Dispatch one analysis job over `track_ids` and return its id without
    /// blocking. Unknown tracks are created with default mixer state.
    pub fn analyze(&mut self, track_ids: &[&str], mode: AnalysisMode) -> ServiceResult<String> {
        let mut signals: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        for track_id in track_ids {
            self.graph.ensure_track(track_id);
            signals.insert(track_id.to_string(), self.provider.signal(track_id));
        }

        let analysis_id = new_analysis_id();
        let job = self.pool.submit(&analysis_id, mode, signals)?;
        self.jobs.insert(analysis_id.clone(), job);
        log::info!(
            "analysis '{}' ({}) submitted for {} tracks",
            analysis_id,
            mode,
            track_ids.len()
        );
        Ok(analysis_id)
    }

    /// Snapshot for an analysis id. Blocks until the job completes on first
    /// call; later calls return the cached result.
    pub fn get_snapshot(&mut self, analysis_id: &str) -> ServiceResult<AnalysisSnapshot> {
        if let Some(snapshot) = self.snapshots.get(analysis_id) {
            return Ok(snapshot.clone());
        }
        let job = self
            .jobs
            .remove(analysis_id)
            .ok_or_else(|| ServiceError::AnalysisNotFound(analysis_id.to_string()))?;
        let snapshot = job.wait()?;
        self.snapshots
            .insert(analysis_id.to_string(), snapshot.clone());
        Ok(snapshot)
    }

    /// Generate up to three ranked suggestions for one track.
    ///
    /// With no `analysis_id` a fresh analysis of just that track is run in
    /// `mode`. The engine mode defaults to the service-wide setting; remote
    /// failures fall back to the rule-based strategy unless fallback is
    /// disabled.
    pub fn suggest(
        &mut self,
        track_id: &str,
        profile: MixProfile,
        analysis_id: Option<&str>,
        mode: AnalysisMode,
        engine_mode: Option<EngineMode>,
    ) -> ServiceResult<Vec<Suggestion>> {
        self.graph.ensure_track(track_id);
        let features = self.features_for(track_id, analysis_id, mode)?;

        let engine_mode = engine_mode.unwrap_or(self.engine_mode);
        self.last_fallback_reason = None;

        let suggestions = match engine_mode {
            EngineMode::RuleBased => {
                self.last_source = Some(SOURCE_RULE_BASED);
                self.rule_engine.suggest(track_id, profile, &features)
            }
            EngineMode::LlmBased => {
                let remote = match &self.llm_engine {
                    Some(engine) => engine.generate(track_id, profile, &features),
                    None => Err(EngineError::NotConfigured),
                };
                match remote {
                    Ok(suggestions) => {
                        self.last_source = Some(SOURCE_LLM_BASED);
                        suggestions
                    }
                    Err(err) if self.fallback_enabled => {
                        let reason = fallback_reason(&err);
                        log::warn!(
                            "llm suggestion for track '{track_id}' failed ({err}); \
                             falling back to rule-based"
                        );
                        let mut suggestions =
                            self.rule_engine.suggest(track_id, profile, &features);
                        for suggestion in &mut suggestions {
                            suggestion.reason.push_str(" | fallback=");
                            suggestion.reason.push_str(&reason);
                        }
                        self.last_source = Some(SOURCE_RULE_FALLBACK);
                        self.last_fallback_reason = Some(reason);
                        suggestions
                    }
                    Err(err) => return Err(err.into()),
                }
            }
        };

        for suggestion in &suggestions {
            self.suggestions
                .insert(suggestion.suggestion_id.clone(), suggestion.clone());
        }
        log::info!(
            "{} suggestions for track '{}' (profile {}, source {})",
            suggestions.len(),
            track_id,
            profile,
            self.last_source.unwrap_or("unknown")
        );
        Ok(suggestions)
    }

    /// Non-destructive audition of a suggestion at `dry_wet` in [0, 1].
    ///
    /// The committed chain is captured as a baseline on the first preview of
    /// a track; repeated previews blend from that same baseline, so they
    /// re-aim rather than compound. Returns the blended chain now live on the
    /// track.
    pub fn preview(
        &mut self,
        track_id: &str,
        suggestion_id: &str,
        dry_wet: f64,
    ) -> ServiceResult<FxChainState> {
        let suggestion = self.owned_suggestion(track_id, suggestion_id)?;
        if !self.preview_baselines.contains_key(track_id) {
            let committed = self.graph.ensure_track(track_id).fx_chain.clone();
            self.preview_baselines
                .insert(track_id.to_string(), committed);
        }
        let baseline = &self.preview_baselines[track_id];
        let blended = blend_chain(baseline, &suggestion.param_updates, dry_wet)?;
        self.graph.ensure_track(track_id).fx_chain = blended.clone();
        Ok(blended)
    }

    /// Restore the pre-preview chain. No-op when nothing is previewing.
    pub fn cancel_preview(&mut self, track_id: &str) {
        if let Some(baseline) = self.preview_baselines.remove(track_id) {
            self.graph.ensure_track(track_id).fx_chain = baseline;
            log::debug!("preview on track '{track_id}' cancelled");
        }
    }

    /// Commit a suggestion at full strength and record a reversible command.
    /// Any pending preview on the track is cancelled first, so the recorded
    /// before-state is the committed chain, not an audition blend.
    pub fn apply(&mut self, track_id: &str, suggestion_id: &str) -> ServiceResult<String> {
        let suggestion = self.owned_suggestion(track_id, suggestion_id)?;
        self.cancel_preview(track_id);

        let before = self.graph.ensure_track(track_id).fx_chain.clone();
        let after = blend_chain(&before, &suggestion.param_updates, 1.0)?;
        self.graph.ensure_track(track_id).fx_chain = after.clone();

        let mut command = SuggestionCommand::new(track_id, suggestion_id, before, after);
        command.applied = true;
        let command_id = command.command_id.clone();
        self.commands.push(command);
        log::info!("suggestion '{suggestion_id}' applied to track '{track_id}' as '{command_id}'");
        Ok(command_id)
    }

    /// Undo one applied command: restore its before-chain and mark it
    /// unapplied. The command stays in history.
    pub fn revert(&mut self, command_id: &str) -> ServiceResult<()> {
        let index = self
            .commands
            .iter()
            .position(|c| c.command_id == command_id)
            .ok_or_else(|| ServiceError::CommandNotFound(command_id.to_string()))?;
        let track_id = self.commands[index].track_id.clone();
        let before = self.commands[index].before_chain.clone();

        self.cancel_preview(&track_id);
        self.graph.ensure_track(&track_id).fx_chain = before;
        self.commands[index].applied = false;
        log::info!("command '{command_id}' reverted on track '{track_id}'");
        Ok(())
    }

    /// Command history, most recent first, optionally filtered by track.
    pub fn get_command_history(&self, track_id: Option<&str>) -> Vec<SuggestionCommand> {
        self.commands
            .iter()
            .rev()
            .filter(|c| track_id.is_none_or(|t| c.track_id == t))
            .cloned()
            .collect()
    }

    /// Detached copy of a track's full mixer state.
    pub fn get_track_state(&self, track_id: &str) -> Option<TrackState> {
        self.graph.track(track_id).cloned()
    }

    pub fn get_suggestion(&self, suggestion_id: &str) -> Option<Suggestion> {
        self.suggestions.get(suggestion_id).cloned()
    }

    pub fn suggestion_mode(&self) -> EngineMode {
        self.engine_mode
    }

    pub fn set_suggestion_mode(&mut self, mode: EngineMode) {
        self.engine_mode = mode;
    }

    /// Source tag of the most recent suggest call.
    pub fn last_suggestion_source(&self) -> Option<&str> {
        self.last_source
    }

    /// Reason of the most recent fallback, cleared by a successful call.
    pub fn last_fallback_reason(&self) -> Option<&str> {
        self.last_fallback_reason.as_deref()
    }

    fn features_for(
        &mut self,
        track_id: &str,
        analysis_id: Option<&str>,
        mode: AnalysisMode,
    ) -> ServiceResult<TrackFeatures> {
        let analysis_id = match analysis_id {
            Some(id) => id.to_string(),
            None => self.analyze(&[track_id], mode)?,
        };
        let snapshot = self.get_snapshot(&analysis_id)?;
        snapshot.track_features.get(track_id).copied().ok_or_else(|| {
            ServiceError::TrackNotInAnalysis {
                analysis_id,
                track_id: track_id.to_string(),
            }
        })
    }

    fn owned_suggestion(
        &self,
        track_id: &str,
        suggestion_id: &str,
    ) -> ServiceResult<Suggestion> {
        let suggestion = self
            .suggestions
            .get(suggestion_id)
            .ok_or_else(|| ServiceError::SuggestionNotFound(suggestion_id.to_string()))?;
        if suggestion.track_id != track_id {
            return Err(ServiceError::SuggestionTrackMismatch {
                suggestion_id: suggestion_id.to_string(),
                owner: suggestion.track_id.clone(),
                requested: track_id.to_string(),
            });
        }
        Ok(suggestion.clone())
    }
}

/// Blend raw parameter targets into a copy of `base`, then clamp the
/// blended value to its spec range. Blending before clamping means an
/// out-of-range target keeps pulling toward the range edge at partial
/// `dry_wet` instead of being pre-shrunk. Parameters the suggestion does
/// not touch keep their base values.
fn blend_chain(
    base: &FxChainState,
    updates: &ParamUpdates,
    dry_wet: f64,
) -> ServiceResult<FxChainState> {
    let wet = dry_wet.clamp(0.0, 1.0);
    let mut chain = base.clone();
    for (&kind, params) in updates {
        for (param_id, &target) in params {
            let effect = chain.effect_mut(kind);
            let current = effect.param_or_default(param_id);
            // Full strength lands on the target exactly, no rounding detour.
            let blended = if wet >= 1.0 {
                target
            } else {
                current + (target - current) * wet
            };
            let value = clamp_param(kind, param_id, blended)?;
            effect.parameters.insert(param_id.clone(), value);
        }
    }
    Ok(chain)
}

fn fallback_reason(err: &EngineError) -> String {
    let flat: String = err
        .to_string()
        .chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect();
    let trimmed: String = flat.trim().chars().take(FALLBACK_REASON_MAX_CHARS).collect();
    if trimmed.is_empty() {
        "llm_error".to_string()
    } else {
        trimmed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mx_core::EffectKind;

    #[test]
    fn test_blend_half_way() {
        let base = FxChainState::with_defaults();
        let mut updates = ParamUpdates::new();
        updates.insert(
            EffectKind::Compressor,
            [("ratio".to_string(), 5.0)].into_iter().collect(),
        );
        let blended = blend_chain(&base, &updates, 0.5).unwrap();
        // default ratio 3.0, target 5.0
        assert_eq!(blended.param(EffectKind::Compressor, "ratio"), Some(4.0));
        assert_eq!(base.param(EffectKind::Compressor, "ratio"), Some(3.0));
    }

    #[test]
    fn test_blend_clamps_after_blending() {
        let base = FxChainState::with_defaults();
        let mut updates = ParamUpdates::new();
        updates.insert(
            EffectKind::Saturator,
            [("mix".to_string(), 7.5)].into_iter().collect(),
        );
        // Half blend toward the raw target is 3.75, clamped to the range
        // edge; a pre-clamped target would land at 0.5 instead.
        let blended = blend_chain(&base, &updates, 0.5).unwrap();
        assert_eq!(blended.param(EffectKind::Saturator, "mix"), Some(1.0));

        let blended = blend_chain(&base, &updates, 0.1).unwrap();
        assert_eq!(blended.param(EffectKind::Saturator, "mix"), Some(0.75));

        // The dry/wet mix itself is clamped to [0, 1].
        let blended = blend_chain(&base, &updates, 3.0).unwrap();
        assert_eq!(blended.param(EffectKind::Saturator, "mix"), Some(1.0));
    }

    #[test]
    fn test_blend_rejects_unknown_parameter() {
        let base = FxChainState::with_defaults();
        let mut updates = ParamUpdates::new();
        updates.insert(
            EffectKind::Gate,
            [("resonance".to_string(), 0.4)].into_iter().collect(),
        );
        assert!(matches!(
            blend_chain(&base, &updates, 1.0),
            Err(ServiceError::Core(_))
        ));
    }

    #[test]
    fn test_fallback_reason_sanitized() {
        let err = EngineError::Transport("line one\nline two".to_string());
        let reason = fallback_reason(&err);
        assert!(!reason.contains('\n'));
        assert!(reason.contains("line one line two"));

        let long = EngineError::Transport("x".repeat(500));
        assert_eq!(fallback_reason(&long).chars().count(), 120);
    }
}
