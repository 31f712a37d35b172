//! Remote model-backed suggestion strategy
//!
//! Sends the track's feature vector and profile as JSON over HTTP POST and
//! parses ranked candidates out of the response. Parsing is lenient: unknown
//! effect kinds, non-numeric parameter values, and non-object candidates are
//! dropped rather than failing the whole response. The strategy never
//! retries; resilience is the caller's fallback policy.

use std::env;
use std::time::Duration;

use serde_json::{Map, Value, json};

use mx_core::{EffectKind, MixProfile, ParamUpdates, Suggestion, TrackFeatures};

use crate::error::{EngineError, EngineResult};
use crate::{MAX_CANDIDATES, SuggestionEngine};

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SEC: f64 = 6.0;
/// Lower bound on the configured timeout.
pub const MIN_TIMEOUT_SEC: f64 = 0.1;

/// Remote engine configuration. Nothing here is hard-coded; everything is
/// supplied explicitly or through `MIXMIND_LLM_*` environment variables.
#[derive(Debug, Clone, Default)]
pub struct LlmConfig {
    pub endpoint: String,
    pub api_key: String,
    pub model: String,
    pub timeout_sec: f64,
}

impl LlmConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: String::new(),
            model: String::new(),
            timeout_sec: DEFAULT_TIMEOUT_SEC,
        }
    }

    pub fn from_env() -> Self {
        let endpoint = env_trimmed("MIXMIND_LLM_ENDPOINT");
        let api_key = env_trimmed("MIXMIND_LLM_API_KEY");
        let model = env_trimmed("MIXMIND_LLM_MODEL");
        let timeout_sec = env_trimmed("MIXMIND_LLM_TIMEOUT_SEC")
            .parse::<f64>()
            .unwrap_or(DEFAULT_TIMEOUT_SEC);
        Self {
            endpoint,
            api_key,
            model,
            timeout_sec: timeout_sec.max(MIN_TIMEOUT_SEC),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs_f64(self.timeout_sec.max(MIN_TIMEOUT_SEC))
    }
}

fn env_trimmed(key: &str) -> String {
    env::var(key).unwrap_or_default().trim().to_string()
}

/// Transport seam so tests can stub the HTTP layer.
pub trait SuggestTransport: Send + Sync {
    fn post(
        &self,
        endpoint: &str,
        payload: &Value,
        api_key: Option<&str>,
        timeout: Duration,
    ) -> EngineResult<Value>;
}

/// Blocking `reqwest` transport used outside tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpTransport;

impl SuggestTransport for HttpTransport {
    fn post(
        &self,
        endpoint: &str,
        payload: &Value,
        api_key: Option<&str>,
        timeout: Duration,
    ) -> EngineResult<Value> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EngineError::Transport(e.to_string()))?;

        let mut request = client.post(endpoint).json(payload);
        if let Some(key) = api_key {
            request = request.bearer_auth(key);
        }
        let response = request
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| EngineError::Transport(e.to_string()))?;

        let decoded: Value = response
            .json()
            .map_err(|e| EngineError::Decode(e.to_string()))?;
        if !decoded.is_object() {
            return Err(EngineError::Decode(
                "LLM response must be a JSON object".to_string(),
            ));
        }
        Ok(decoded)
    }
}

/// Remote suggestion strategy.
pub struct LlmSuggestionEngine {
    config: LlmConfig,
    transport: Box<dyn SuggestTransport>,
}

impl LlmSuggestionEngine {
    pub fn new(config: LlmConfig) -> Self {
        Self {
            config,
            transport: Box::new(HttpTransport),
        }
    }

    pub fn from_env() -> Self {
        Self::new(LlmConfig::from_env())
    }

    pub fn with_transport(config: LlmConfig, transport: Box<dyn SuggestTransport>) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }
}

impl SuggestionEngine for LlmSuggestionEngine {
    fn generate(
        &self,
        track_id: &str,
        profile: MixProfile,
        features: &TrackFeatures,
    ) -> EngineResult<Vec<Suggestion>> {
        if self.config.endpoint.is_empty() {
            return Err(EngineError::NotConfigured);
        }

        let payload = json!({
            "track_id": track_id,
            "profile": profile.as_str(),
            "features": feature_payload(features),
            "model": if self.config.model.is_empty() {
                Value::Null
            } else {
                Value::String(self.config.model.clone())
            },
        });
        let api_key = (!self.config.api_key.is_empty()).then_some(self.config.api_key.as_str());

        log::debug!(
            "llm suggest request for track '{}' ({}) -> {}",
            track_id,
            profile,
            self.config.endpoint
        );
        let response = self.transport.post(
            &self.config.endpoint,
            &payload,
            api_key,
            self.config.timeout(),
        )?;

        let suggestions = parse_response(track_id, profile, &response);
        if suggestions.is_empty() {
            return Err(EngineError::NoCandidates);
        }
        Ok(suggestions)
    }
}

fn feature_payload(features: &TrackFeatures) -> Value {
    json!({
        "lufs": features.lufs,
        "peak_dbfs": features.peak_dbfs,
        "rms_dbfs": features.rms_dbfs,
        "crest_factor_db": features.crest_factor_db,
        "spectral_centroid_hz": features.spectral_centroid_hz,
        "band_energy_low": features.band_energy_low,
        "band_energy_mid": features.band_energy_mid,
        "band_energy_high": features.band_energy_high,
        "dynamic_range_db": features.dynamic_range_db,
        "loudness_range_db": features.loudness_range_db,
        "transient_density": features.transient_density,
        "zero_crossing_rate": features.zero_crossing_rate,
    })
}

/// Parse ranked candidates out of the response payload. Invalid entries are
/// dropped silently; ordering is by score descending, capped at three.
fn parse_response(track_id: &str, profile: MixProfile, payload: &Value) -> Vec<Suggestion> {
    let Some(raw_candidates) = payload.get("candidates").and_then(Value::as_array) else {
        return Vec::new();
    };

    let mut suggestions: Vec<Suggestion> = raw_candidates
        .iter()
        .filter_map(|raw| {
            let object = raw.as_object()?;
            let param_updates = parse_param_updates(object.get("param_updates"));
            if param_updates.is_empty() {
                return None;
            }
            let variant = object
                .get("variant")
                .and_then(Value::as_str)
                .filter(|v| !v.is_empty())
                .unwrap_or("llm");
            let reason = object
                .get("reason")
                .and_then(Value::as_str)
                .filter(|r| !r.is_empty())
                .unwrap_or("llm-generated");
            let score = object.get("score").map(lenient_f64).unwrap_or(0.0);
            Some(Suggestion::new(
                track_id,
                profile,
                variant,
                score,
                reason,
                param_updates,
            ))
        })
        .collect();

    suggestions.sort_by(|a, b| b.score.total_cmp(&a.score));
    suggestions.truncate(MAX_CANDIDATES);
    suggestions
}

fn parse_param_updates(raw: Option<&Value>) -> ParamUpdates {
    let Some(map) = raw.and_then(Value::as_object) else {
        return ParamUpdates::new();
    };

    let mut updates = ParamUpdates::new();
    for (effect_name, params) in map {
        let Some(kind) = EffectKind::parse(effect_name) else {
            continue;
        };
        let Some(params) = params.as_object() else {
            continue;
        };
        let effect_params = numeric_params(params);
        if !effect_params.is_empty() {
            updates.insert(kind, effect_params);
        }
    }
    updates
}

fn numeric_params(params: &Map<String, Value>) -> std::collections::BTreeMap<String, f64> {
    params
        .iter()
        .filter_map(|(key, value)| value.as_f64().map(|v| (key.clone(), v)))
        .collect()
}

fn lenient_f64(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}
