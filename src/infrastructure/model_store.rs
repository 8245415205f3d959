// Model store - one JSON artifact file per slot under a fixed directory
use crate::application::trainer::ModelArtifact;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelStoreError {
    #[error("model file for slot '{0}' not found")]
    NotFound(String),

    #[error("model file for slot '{slot}' is corrupt: {reason}")]
    Corrupt { slot: String, reason: String },

    #[error("model artifact serialization failed: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("model store I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Persists trained-model artifacts to local disk. No locking here; the
/// service serializes save/load sequences around it.
#[derive(Debug, Clone)]
pub struct ModelStore {
    dir: PathBuf,
}

impl ModelStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn slot_path(&self, slot: &str) -> PathBuf {
        self.dir.join(format!("{slot}.json"))
    }

    /// Write a slot, overwriting any prior content. The directory is created
    /// on demand.
    pub fn save(&self, slot: &str, artifact: &ModelArtifact) -> Result<(), ModelStoreError> {
        fs::create_dir_all(&self.dir)?;
        let encoded = serde_json::to_vec_pretty(artifact)?;
        let path = self.slot_path(slot);
        fs::write(&path, encoded)?;
        tracing::info!(slot, path = %path.display(), "model artifact saved");
        Ok(())
    }

    pub fn load(&self, slot: &str) -> Result<ModelArtifact, ModelStoreError> {
        let path = self.slot_path(slot);
        let raw = fs::read(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ModelStoreError::NotFound(slot.to_string())
            } else {
                ModelStoreError::Io(e)
            }
        })?;
        serde_json::from_slice(&raw).map_err(|e| ModelStoreError::Corrupt {
            slot: slot.to_string(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::trainer::Algorithm;
    use crate::domain::reading::AqiReading;
    use crate::domain::series::ObservedSeries;
    use chrono::{Duration, TimeZone, Utc};

    fn artifact() -> ModelArtifact {
        let base = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let readings = (0..5)
            .map(|i| AqiReading::new(base + Duration::minutes(10 * i), 50.0 + i as f64))
            .collect();
        ModelArtifact::from_series(Algorithm::Arima, &ObservedSeries::from_readings(readings))
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = ModelStore::new(dir.path().join("models"));
        let saved = artifact();

        store.save("arima_model", &saved).unwrap();
        let loaded = store.load("arima_model").unwrap();

        assert_eq!(loaded.algorithm, saved.algorithm);
        assert_eq!(loaded.timestamps, saved.timestamps);
        assert_eq!(loaded.values, saved.values);
    }

    #[test]
    fn save_overwrites_prior_content() {
        let dir = tempfile::tempdir().unwrap();
        let store = ModelStore::new(dir.path());

        let mut first = artifact();
        first.values[0] = 1.0;
        store.save("arima_model", &first).unwrap();

        let mut second = artifact();
        second.values[0] = 99.0;
        store.save("arima_model", &second).unwrap();

        assert_eq!(store.load("arima_model").unwrap().values[0], 99.0);
    }

    #[test]
    fn missing_slot_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = ModelStore::new(dir.path());
        assert!(matches!(
            store.load("hw_model"),
            Err(ModelStoreError::NotFound(_))
        ));
    }

    #[test]
    fn unreadable_slot_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let store = ModelStore::new(dir.path());
        fs::write(dir.path().join("hw_model.json"), b"not json").unwrap();

        assert!(matches!(
            store.load("hw_model"),
            Err(ModelStoreError::Corrupt { .. })
        ));
    }
}
