#![allow(dead_code)]

use mx_service::{AutomationService, TrackSignalProvider};

/// Deterministic non-silent signal so suggestions see real features.
pub struct ToneProvider;

impl TrackSignalProvider for ToneProvider {
    fn signal(&self, _track_id: &str) -> Vec<f64> {
        [0.3, -0.5, 0.2, -0.1].repeat(999)
    }
}

pub fn service_with_tone() -> AutomationService {
    init_logs();
    AutomationService::builder()
        .provider(Box::new(ToneProvider))
        .workers(2)
        .build()
}

pub fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}
