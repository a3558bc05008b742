//! Storage backends for experiment tracking

use super::tracker::Experiment;
use crate::error::Result;
use std::fs;
use std::path::PathBuf;

/// Where experiments are persisted
pub trait StorageBackend {
    fn save_experiments(&self, experiments: &[Experiment]) -> Result<()>;

    /// Stored experiments; empty when nothing was saved yet
    fn load_experiments(&self) -> Result<Vec<Experiment>>;

    /// Rename the stored experiments so a later save starts a new store.
    /// Returns the new location, or `None` when nothing was stored.
    fn set_aside(&self, suffix: &str) -> Result<Option<PathBuf>>;
}

/// JSON file on the local file system: `<base_dir>/experiments.json`
pub struct LocalStorage {
    base_dir: PathBuf,
}

impl LocalStorage {
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    fn experiments_file(&self) -> PathBuf {
        self.base_dir.join("experiments.json")
    }
}

impl StorageBackend for LocalStorage {
    fn save_experiments(&self, experiments: &[Experiment]) -> Result<()> {
        fs::create_dir_all(&self.base_dir)?;
        let json = serde_json::to_string_pretty(experiments)?;
        fs::write(self.experiments_file(), json)?;
        Ok(())
    }

    fn load_experiments(&self) -> Result<Vec<Experiment>> {
        let path = self.experiments_file();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    fn set_aside(&self, suffix: &str) -> Result<Option<PathBuf>> {
        let path = self.experiments_file();
        if !path.exists() {
            return Ok(None);
        }
        let target = self.base_dir.join(format!("experiments.json.{}", suffix));
        fs::rename(&path, &target)?;
        Ok(Some(target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_from_empty_dir() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path().to_path_buf());
        assert!(storage.load_experiments().unwrap().is_empty());
    }

    #[test]
    fn test_save_load_set_aside() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path().join("runs"));

        let a = Experiment::new("a");
        let b = Experiment::new("b");
        storage.save_experiments(&[a.clone(), b.clone()]).unwrap();

        let loaded = storage.load_experiments().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].name, "a");

        let moved = storage.set_aside("old").unwrap().unwrap();
        assert_eq!(moved, dir.path().join("runs").join("experiments.json.old"));
        assert!(storage.load_experiments().unwrap().is_empty());

        storage.save_experiments(&[b.clone()]).unwrap();
        let loaded = storage.load_experiments().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].experiment_id, b.experiment_id);
    }

    #[test]
    fn test_corrupt_file_is_serialization_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("experiments.json"), "not json").unwrap();
        let storage = LocalStorage::new(dir.path().to_path_buf());
        assert!(matches!(
            storage.load_experiments(),
            Err(crate::error::HeartError::Serialization(_))
        ));
    }
}
