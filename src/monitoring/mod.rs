//! Serving metrics

mod metrics;

pub use metrics::{MetricsCounter, MetricsSnapshot, PROMETHEUS_CONTENT_TYPE};
