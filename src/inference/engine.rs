//! Single-record prediction against the loaded artifact pair

use crate::artifacts::ArtifactPair;
use crate::error::{HeartError, Result};
use crate::preprocessing::Scaler;
use crate::schema::PatientRecord;
use crate::training::{CandidateModel, Classifier};
use ndarray::Axis;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::error;

/// Result of scoring one record
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub predicted_class: u8,
    /// Positive-class probability, rounded to 4 decimals
    pub probability: f64,
    /// Wall-clock time of scaling plus model evaluation
    pub latency_seconds: f64,
}

/// Read-only scorer shared across request handlers
#[derive(Debug, Clone)]
pub struct PredictionService {
    model: CandidateModel,
    scaler: Scaler,
}

impl PredictionService {
    pub fn new(model: CandidateModel, scaler: Scaler) -> Self {
        Self { model, scaler }
    }

    pub fn from_artifacts(pair: ArtifactPair) -> Self {
        Self::new(pair.model, pair.scaler)
    }

    pub fn model_label(&self) -> &'static str {
        self.model.label()
    }

    /// Score a validated record.
    ///
    /// Internal failures are logged in full and surface only as
    /// `PredictionFailure`.
    pub fn predict(&self, record: &PatientRecord) -> Result<Prediction> {
        let start = Instant::now();
        let outcome = self.score(record);
        let latency_seconds = start.elapsed().as_secs_f64();

        match outcome {
            Ok((predicted_class, probability)) => Ok(Prediction {
                predicted_class,
                probability: round4(probability),
                latency_seconds,
            }),
            Err(e) => {
                error!(error = %e, record = ?record, "Prediction failed");
                Err(HeartError::PredictionFailure)
            }
        }
    }

    fn score(&self, record: &PatientRecord) -> Result<(u8, f64)> {
        let features = record.to_features();
        let scaled = self.scaler.transform_row(features.view())?.insert_axis(Axis(0));

        let class = self.model.predict(&scaled)?;
        let proba = self.model.predict_positive_proba(&scaled)?;

        let (class, probability) = match (class.first(), proba.first()) {
            (Some(&c), Some(&p)) => (c, p),
            _ => return Err(HeartError::Training("model returned no output".to_string())),
        };
        if !probability.is_finite() || !(0.0..=1.0).contains(&probability) {
            return Err(HeartError::Training(format!("invalid probability {}", probability)));
        }

        Ok((if class > 0.5 { 1 } else { 0 }, probability))
    }
}

fn round4(v: f64) -> f64 {
    (v * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FEATURE_COUNT;
    use crate::training::LogisticRegression;
    use ndarray::{Array1, Array2};

    fn sample_record() -> PatientRecord {
        PatientRecord {
            age: 55,
            sex: 1,
            chest_pain: 2,
            resting_bp: 140,
            chol: 220,
            fasting_bs: 0,
            rest_ecg: 1,
            max_hr: 150,
            exercise_angina: 0,
            oldpeak: 2.3,
            st_slope: 2,
            ca: 0,
            thal: 2,
        }
    }

    fn service() -> PredictionService {
        let x = Array2::from_shape_fn((10, FEATURE_COUNT), |(i, j)| (i as f64) * 10.0 + j as f64);
        let y = Array1::from_iter((0..10).map(|i| if i % 2 == 0 { 0.0 } else { 1.0 }));
        let mut scaler = Scaler::new();
        let xs = scaler.fit_transform(&x).unwrap();
        let mut model = CandidateModel::LogisticRegression(LogisticRegression::new().with_max_iter(100));
        model.fit(&xs, &y).unwrap();
        PredictionService::new(model, scaler)
    }

    #[test]
    fn test_prediction_shape() {
        let prediction = service().predict(&sample_record()).unwrap();
        assert!(prediction.predicted_class <= 1);
        assert!((0.0..=1.0).contains(&prediction.probability));
        assert!(prediction.latency_seconds >= 0.0);
        assert_eq!(round4(prediction.probability), prediction.probability);
    }

    #[test]
    fn test_deterministic() {
        let svc = service();
        let a = svc.predict(&sample_record()).unwrap();
        let b = svc.predict(&sample_record()).unwrap();
        assert_eq!(a.predicted_class, b.predicted_class);
        assert_eq!(a.probability, b.probability);
    }

    #[test]
    fn test_width_mismatch_is_opaque_failure() {
        let x = Array2::from_shape_fn((4, 3), |(i, j)| (i + j) as f64);
        let mut scaler = Scaler::new();
        scaler.fit(&x).unwrap();
        let svc = PredictionService::new(
            CandidateModel::LogisticRegression(LogisticRegression::new()),
            scaler,
        );
        assert!(matches!(
            svc.predict(&sample_record()),
            Err(HeartError::PredictionFailure)
        ));
    }

    #[test]
    fn test_round4() {
        assert_eq!(round4(0.123456), 0.1235);
        assert_eq!(round4(1.0), 1.0);
    }
}
