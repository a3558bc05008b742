//! Persisted model + scaler pair
//!
//! Training writes both files after selection; serving loads both at startup
//! and refuses to run unless they agree with each other and with the record
//! schema.

use crate::error::{HeartError, Result};
use crate::preprocessing::Scaler;
use crate::schema::FEATURE_COUNT;
use crate::training::{CandidateModel, Classifier};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const MODEL_FILE: &str = "model.bin";
pub const SCALER_FILE: &str = "scaler.bin";

/// A fitted model and the scaler it was trained behind
#[derive(Debug, Clone)]
pub struct ArtifactPair {
    pub model: CandidateModel,
    pub scaler: Scaler,
}

/// Directory holding one artifact pair
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn model_path(&self) -> PathBuf {
        self.dir.join(MODEL_FILE)
    }

    pub fn scaler_path(&self) -> PathBuf {
        self.dir.join(SCALER_FILE)
    }

    /// Write both artifacts, replacing any previous pair
    pub fn persist(&self, model: &CandidateModel, scaler: &Scaler) -> Result<()> {
        check_pair(model, scaler)?;
        fs::create_dir_all(&self.dir)?;

        fs::write(self.model_path(), bincode::serialize(model)?)?;
        fs::write(self.scaler_path(), bincode::serialize(scaler)?)?;

        info!(
            model = model.label(),
            dir = %self.dir.display(),
            "Persisted model and scaler"
        );
        Ok(())
    }

    /// Load and cross-check both artifacts
    pub fn load(&self) -> Result<ArtifactPair> {
        let model: CandidateModel = read_artifact(&self.model_path())?;
        let scaler: Scaler = read_artifact(&self.scaler_path())?;
        check_pair(&model, &scaler)?;

        info!(
            model = model.label(),
            dir = %self.dir.display(),
            "Loaded model and scaler"
        );
        Ok(ArtifactPair { model, scaler })
    }
}

fn read_artifact<T: DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Err(HeartError::ArtifactMissing(path.display().to_string()));
    }
    let bytes = fs::read(path)?;
    bincode::deserialize(&bytes)
        .map_err(|e| HeartError::Serialization(format!("{}: {}", path.display(), e)))
}

/// Both halves must be fitted on the canonical feature count
fn check_pair(model: &CandidateModel, scaler: &Scaler) -> Result<()> {
    let scaler_width = scaler.n_features().ok_or(HeartError::ModelNotFitted)?;
    let model_width = model.n_features().ok_or(HeartError::ModelNotFitted)?;

    for width in [scaler_width, model_width] {
        if width != FEATURE_COUNT {
            return Err(HeartError::SchemaMismatch {
                expected: FEATURE_COUNT,
                actual: width,
            });
        }
    }
    Ok(())
}
