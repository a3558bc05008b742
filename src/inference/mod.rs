//! Inference
//!
//! [`PredictionService`] turns a validated record into a class, a rounded
//! positive-class probability and the measured latency.

mod engine;

pub use engine::{Prediction, PredictionService};
