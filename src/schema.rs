//! Patient record schema
//!
//! The canonical 13-feature layout shared by training and serving. The order of
//! [`FEATURES`] is the order of every feature vector the scaler and models see;
//! changing it invalidates persisted artifacts.

use ndarray::Array1;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Number of model input features
pub const FEATURE_COUNT: usize = 13;

/// Target column in the training CSV (disease severity 0–4)
pub const TARGET_COLUMN: &str = "num";

/// Numeric type a field must carry in a request body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Integer,
    Float,
}

/// One feature: its request name, its training CSV column and its constraints
#[derive(Debug, Clone, Copy)]
pub struct FeatureSpec {
    pub api_name: &'static str,
    pub csv_name: &'static str,
    pub kind: FieldKind,
    /// Inclusive bounds checked at the request boundary
    pub bounds: Option<(f64, f64)>,
    /// Column may carry the `?` sentinel in raw data
    pub imputable: bool,
}

const fn int(api_name: &'static str, csv_name: &'static str) -> FeatureSpec {
    FeatureSpec { api_name, csv_name, kind: FieldKind::Integer, bounds: None, imputable: false }
}

pub const FEATURES: [FeatureSpec; FEATURE_COUNT] = [
    FeatureSpec { bounds: Some((0.0, 120.0)), ..int("age", "age") },
    FeatureSpec { bounds: Some((0.0, 1.0)), ..int("sex", "sex") },
    int("chest_pain", "cp"),
    int("resting_bp", "trestbps"),
    int("chol", "chol"),
    int("fasting_bs", "fbs"),
    int("rest_ecg", "restecg"),
    int("max_hr", "thalach"),
    int("exercise_angina", "exang"),
    FeatureSpec { kind: FieldKind::Float, ..int("oldpeak", "oldpeak") },
    int("st_slope", "slope"),
    FeatureSpec { imputable: true, ..int("Ca", "ca") },
    FeatureSpec { imputable: true, ..int("thal", "thal") },
];

/// Training CSV feature columns in canonical order
pub fn csv_feature_columns() -> Vec<&'static str> {
    FEATURES.iter().map(|f| f.csv_name).collect()
}

/// A single validated patient record as accepted by `/predict`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    pub age: i64,
    pub sex: i64,
    pub chest_pain: i64,
    pub resting_bp: i64,
    pub chol: i64,
    pub fasting_bs: i64,
    pub rest_ecg: i64,
    pub max_hr: i64,
    pub exercise_angina: i64,
    pub oldpeak: f64,
    pub st_slope: i64,
    #[serde(rename = "Ca")]
    pub ca: i64,
    pub thal: i64,
}

/// A single schema violation, reported per field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldViolation {
    /// Offending field, `None` when the body itself is malformed
    pub field: Option<String>,
    pub message: String,
    /// Machine-readable violation kind
    pub kind: &'static str,
}

impl FieldViolation {
    fn new(field: &str, message: impl Into<String>, kind: &'static str) -> Self {
        Self { field: Some(field.to_string()), message: message.into(), kind }
    }

    /// Violation that applies to the whole body
    pub fn body(message: impl Into<String>, kind: &'static str) -> Self {
        Self { field: None, message: message.into(), kind }
    }
}

impl PatientRecord {
    /// Validate a JSON body field by field.
    ///
    /// Every violation is collected so the caller sees all problems at once.
    /// Fields not in the schema are ignored.
    pub fn from_json(value: &Value) -> std::result::Result<Self, Vec<FieldViolation>> {
        let object = value.as_object().ok_or_else(|| {
            vec![FieldViolation::body(
                "Input should be a valid dictionary or object to extract fields from",
                "model_attributes_type",
            )]
        })?;

        let mut values = [FieldValue::Int(0); FEATURE_COUNT];
        let mut violations = Vec::new();

        for (slot, spec) in values.iter_mut().zip(FEATURES.iter()) {
            match validate_field(object, spec) {
                Ok(v) => *slot = v,
                Err(violation) => violations.push(violation),
            }
        }

        if !violations.is_empty() {
            return Err(violations);
        }

        Ok(Self::from_values(&values))
    }

    /// Canonical-order feature vector
    pub fn to_features(&self) -> Array1<f64> {
        Array1::from_vec(vec![
            self.age as f64,
            self.sex as f64,
            self.chest_pain as f64,
            self.resting_bp as f64,
            self.chol as f64,
            self.fasting_bs as f64,
            self.rest_ecg as f64,
            self.max_hr as f64,
            self.exercise_angina as f64,
            self.oldpeak,
            self.st_slope as f64,
            self.ca as f64,
            self.thal as f64,
        ])
    }

    fn from_values(v: &[FieldValue; FEATURE_COUNT]) -> Self {
        Self {
            age: v[0].as_i64(),
            sex: v[1].as_i64(),
            chest_pain: v[2].as_i64(),
            resting_bp: v[3].as_i64(),
            chol: v[4].as_i64(),
            fasting_bs: v[5].as_i64(),
            rest_ecg: v[6].as_i64(),
            max_hr: v[7].as_i64(),
            exercise_angina: v[8].as_i64(),
            oldpeak: v[9].as_f64(),
            st_slope: v[10].as_i64(),
            ca: v[11].as_i64(),
            thal: v[12].as_i64(),
        }
    }
}

/// A validated field value; integer fields always hold `Int`
#[derive(Debug, Clone, Copy, PartialEq)]
enum FieldValue {
    Int(i64),
    Float(f64),
}

impl FieldValue {
    fn as_f64(self) -> f64 {
        match self {
            FieldValue::Int(i) => i as f64,
            FieldValue::Float(f) => f,
        }
    }

    fn as_i64(self) -> i64 {
        match self {
            FieldValue::Int(i) => i,
            FieldValue::Float(f) => f as i64,
        }
    }
}

fn validate_field(object: &Map<String, Value>, spec: &FeatureSpec) -> std::result::Result<FieldValue, FieldViolation> {
    let name = spec.api_name;
    let raw = match object.get(name) {
        None => return Err(FieldViolation::new(name, "Field required", "missing")),
        Some(v) => v,
    };

    let value = match spec.kind {
        FieldKind::Integer => {
            if let Some(i) = raw.as_i64() {
                FieldValue::Int(i)
            } else if let Some(f) = raw.as_f64() {
                if f.fract() != 0.0 {
                    return Err(FieldViolation::new(
                        name,
                        "Input should be a valid integer, got a number with a fractional part",
                        "int_from_float",
                    ));
                }
                // i64::MAX as f64 rounds up to 2^63, which is already out of range
                if f < i64::MIN as f64 || f >= i64::MAX as f64 {
                    return Err(FieldViolation::new(
                        name,
                        "Input should be a valid integer, unable to parse number as an integer",
                        "int_parsing_size",
                    ));
                }
                FieldValue::Int(f as i64)
            } else {
                return Err(FieldViolation::new(name, "Input should be a valid integer", "int_type"));
            }
        }
        FieldKind::Float => raw
            .as_f64()
            .map(FieldValue::Float)
            .ok_or_else(|| FieldViolation::new(name, "Input should be a valid number", "float_type"))?,
    };

    if let Some((lo, hi)) = spec.bounds {
        let value = value.as_f64();
        if value < lo {
            return Err(FieldViolation::new(
                name,
                format!("Input should be greater than or equal to {}", lo),
                "greater_than_equal",
            ));
        }
        if value > hi {
            return Err(FieldViolation::new(
                name,
                format!("Input should be less than or equal to {}", hi),
                "less_than_equal",
            ));
        }
    }

    Ok(value)
}
