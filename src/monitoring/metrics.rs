//! Prediction request metrics
//!
//! Count and cumulative latency sit under one `RwLock` so a reader never
//! sees one updated without the other.

use serde::Serialize;
use std::sync::RwLock;

/// Content type of the Prometheus text exposition format
pub const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

#[derive(Debug, Default)]
struct CounterState {
    request_count: u64,
    cumulative_latency_secs: f64,
}

/// Point-in-time view of the counter
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub request_count: u64,
    /// Cumulative latency over count; 0 before the first request
    pub average_latency_secs: f64,
}

/// Successful-prediction counter owned by the server state
#[derive(Debug, Default)]
pub struct MetricsCounter {
    inner: RwLock<CounterState>,
}

impl MetricsCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one successful prediction and its latency
    pub fn record(&self, latency_secs: f64) {
        let latency = if latency_secs.is_finite() { latency_secs.max(0.0) } else { 0.0 };
        let mut state = self.inner.write().unwrap_or_else(|e| e.into_inner());
        state.request_count += 1;
        state.cumulative_latency_secs += latency;
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let state = self.inner.read().unwrap_or_else(|e| e.into_inner());
        let average_latency_secs = if state.request_count == 0 {
            0.0
        } else {
            state.cumulative_latency_secs / state.request_count as f64
        };
        MetricsSnapshot {
            request_count: state.request_count,
            average_latency_secs,
        }
    }

    /// Render in Prometheus text exposition format
    pub fn render_prometheus(&self) -> String {
        let snapshot = self.snapshot();
        format!(
            "# HELP total_prediction_requests Total number of successful prediction requests.\n\
             # TYPE total_prediction_requests counter\n\
             total_prediction_requests {count}\n\
             # HELP average_prediction_latency_seconds Mean prediction latency in seconds.\n\
             # TYPE average_prediction_latency_seconds gauge\n\
             average_prediction_latency_seconds {average}\n",
            count = snapshot.request_count,
            average = snapshot.average_latency_secs,
        )
    }
}
