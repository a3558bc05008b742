//! Application state shared across handlers

use crate::inference::PredictionService;
use crate::monitoring::MetricsCounter;

/// Loaded once at startup; only `metrics` changes afterwards
pub struct AppState {
    pub predictor: PredictionService,
    pub metrics: MetricsCounter,
}

impl AppState {
    pub fn new(predictor: PredictionService) -> Self {
        Self {
            predictor,
            metrics: MetricsCounter::new(),
        }
    }
}
