//! Filesystem model store
//!
//! Layout: `<root>/user_<id>/{scaler.json, detector.json}`. Saves write
//! both artifacts into a staging directory and swap it into place, so a
//! crash leaves either the old pair or no pair, never a mixed one. A
//! per-user lock map serializes writers, so a load cannot overlap a swap
//! for the same user.

use super::ModelStore;
use crate::detector::{IsolationForest, StandardScaler, UserModel};
use crate::error::{EngineError, Result};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

/// Scaler artifact file name
pub const SCALER_FILE: &str = "scaler.json";

/// Detector artifact file name
pub const DETECTOR_FILE: &str = "detector.json";

/// Model store rooted at a directory of per-user subdirectories
pub struct FsModelStore {
    root: PathBuf,
    user_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl FsModelStore {
    /// Open a store, creating the root directory if needed
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            user_locks: Mutex::new(HashMap::new()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn user_dir(&self, user_id: &str) -> PathBuf {
        self.root.join(format!("user_{user_id}"))
    }

    fn user_lock(&self, user_id: &str) -> Arc<Mutex<()>> {
        let mut locks = lock_or_recover(&self.user_locks);
        locks.entry(user_id.to_string()).or_default().clone()
    }

    fn read_artifact<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// A poisoned lock only means another thread panicked mid-hold; the map
/// and the guarded files are still usable
fn lock_or_recover<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ModelStore for FsModelStore {
    fn load(&self, user_id: &str) -> Result<Option<UserModel>> {
        let lock = self.user_lock(user_id);
        let _guard = lock_or_recover(&lock);

        let dir = self.user_dir(user_id);
        let scaler_path = dir.join(SCALER_FILE);
        let detector_path = dir.join(DETECTOR_FILE);

        match (scaler_path.exists(), detector_path.exists()) {
            (false, false) => Ok(None),
            (true, true) => {
                let scaler: StandardScaler = Self::read_artifact(&scaler_path)?;
                let forest: IsolationForest = Self::read_artifact(&detector_path)?;
                Ok(Some(UserModel { scaler, forest }))
            }
            _ => Err(EngineError::InconsistentPersistence(user_id.to_string())),
        }
    }

    fn save(&self, user_id: &str, model: &UserModel) -> Result<()> {
        let lock = self.user_lock(user_id);
        let _guard = lock_or_recover(&lock);

        let dir = self.user_dir(user_id);
        let staging = self.root.join(format!("user_{user_id}.staging"));
        if staging.exists() {
            fs::remove_dir_all(&staging)?;
        }
        fs::create_dir_all(&staging)?;
        fs::write(staging.join(SCALER_FILE), serde_json::to_string(&model.scaler)?)?;
        fs::write(staging.join(DETECTOR_FILE), serde_json::to_string(&model.forest)?)?;

        if dir.exists() {
            fs::remove_dir_all(&dir)?;
        }
        fs::rename(&staging, &dir)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FeatureVector;
    use tempfile::TempDir;

    fn fitted_model() -> UserModel {
        let vectors: Vec<FeatureVector> = (0..100)
            .map(|i| FeatureVector::from_power(0.4 + (i % 40) as f64 * 0.01))
            .collect();
        UserModel::fit(&vectors).unwrap()
    }

    #[test]
    fn test_load_missing_user_is_none() {
        let dir = TempDir::new().unwrap();
        let store = FsModelStore::new(dir.path()).unwrap();
        assert!(store.load("nobody").unwrap().is_none());
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = FsModelStore::new(dir.path()).unwrap();
        let model = fitted_model();
        store.save("u1", &model).unwrap();

        let loaded = store.load("u1").unwrap().unwrap();
        assert_eq!(loaded.forest.offset(), model.forest.offset());

        // Reloaded pair reproduces detection output exactly
        let batch = vec![
            FeatureVector::from_power(0.5),
            FeatureVector::from_power(5.0),
        ];
        let original = model.detect(&batch);
        let reloaded = loaded.detect(&batch);
        assert_eq!(original.anomalies, reloaded.anomalies);
        assert_eq!(original.scores, reloaded.scores);
        assert_eq!(original.severity, reloaded.severity);
    }

    #[test]
    fn test_save_writes_exactly_two_artifacts() {
        let dir = TempDir::new().unwrap();
        let store = FsModelStore::new(dir.path()).unwrap();
        store.save("u1", &fitted_model()).unwrap();

        let user_dir = dir.path().join("user_u1");
        assert!(user_dir.join(SCALER_FILE).exists());
        assert!(user_dir.join(DETECTOR_FILE).exists());
        assert_eq!(fs::read_dir(&user_dir).unwrap().count(), 2);
        // No staging residue left behind
        assert!(!dir.path().join("user_u1.staging").exists());
    }

    #[test]
    fn test_partial_pair_is_inconsistent() {
        let dir = TempDir::new().unwrap();
        let store = FsModelStore::new(dir.path()).unwrap();
        store.save("u1", &fitted_model()).unwrap();
        fs::remove_file(dir.path().join("user_u1").join(DETECTOR_FILE)).unwrap();

        let err = store.load("u1").unwrap_err();
        assert!(matches!(err, EngineError::InconsistentPersistence(_)));
    }

    #[test]
    fn test_resave_overwrites() {
        let dir = TempDir::new().unwrap();
        let store = FsModelStore::new(dir.path()).unwrap();
        store.save("u1", &fitted_model()).unwrap();
        store.save("u1", &fitted_model()).unwrap();
        assert!(store.load("u1").unwrap().is_some());
    }
}
