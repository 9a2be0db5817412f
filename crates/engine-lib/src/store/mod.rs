//! Per-user model persistence and lifecycle
//!
//! - `ModelStore`: injectable backing store for fitted pairs
//! - `FsModelStore`: filesystem layout with atomic pair swaps
//! - `MemoryStore`: in-memory substitute for tests
//! - `ModelManager`: the load-or-train strategy chain

mod fs;
mod memory;

pub use fs::{FsModelStore, DETECTOR_FILE, SCALER_FILE};
pub use memory::MemoryStore;

use crate::bootstrap;
use crate::detector::UserModel;
use crate::error::{EngineError, Result};
use crate::features;
use crate::models::ReadingRecord;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Backing store for per-user fitted model pairs
pub trait ModelStore: Send + Sync {
    /// Load the persisted pair; `None` when nothing is stored
    fn load(&self, user_id: &str) -> Result<Option<UserModel>>;

    /// Persist the pair, replacing any prior state
    fn save(&self, user_id: &str, model: &UserModel) -> Result<()>;
}

/// Which strategy satisfied model readiness
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelSource {
    Persisted,
    FreshTraining,
    DefaultDataset,
}

impl ModelSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Persisted => "persisted",
            Self::FreshTraining => "fresh_training",
            Self::DefaultDataset => "default_dataset",
        }
    }
}

/// Load-or-train lifecycle over a backing store
pub struct ModelManager {
    store: Arc<dyn ModelStore>,
    default_dataset: PathBuf,
}

impl ModelManager {
    pub fn new(store: Arc<dyn ModelStore>, default_dataset: impl Into<PathBuf>) -> Self {
        Self {
            store,
            default_dataset: default_dataset.into(),
        }
    }

    /// Resolve a ready model by trying each source in order: the persisted
    /// pair, the supplied rows, the default dataset
    ///
    /// Exhausting the chain surfaces `ModelUnavailable` rather than a
    /// silent absent-model state.
    pub fn ensure_ready(
        &self,
        user_id: &str,
        training: Option<&[ReadingRecord]>,
    ) -> Result<(UserModel, ModelSource)> {
        if let Some(model) = self.store.load(user_id)? {
            return Ok((model, ModelSource::Persisted));
        }

        if let Some(rows) = training.filter(|rows| !rows.is_empty()) {
            let model = self.train(user_id, rows)?;
            return Ok((model, ModelSource::FreshTraining));
        }

        match self.train_from_default(user_id) {
            Ok(model) => Ok((model, ModelSource::DefaultDataset)),
            Err(err) => {
                warn!(
                    user_id = %user_id,
                    dataset = %self.default_dataset.display(),
                    error = %err,
                    "Default bootstrap failed; no model source left"
                );
                Err(EngineError::ModelUnavailable)
            }
        }
    }

    /// Fit and persist a fresh pair, overwriting prior state
    pub fn train(&self, user_id: &str, rows: &[ReadingRecord]) -> Result<UserModel> {
        if rows.is_empty() {
            return Err(EngineError::NoTrainingData);
        }
        let vectors = features::from_records(rows);
        let model = UserModel::fit(&vectors)?;
        self.store.save(user_id, &model)?;
        info!(user_id = %user_id, rows = rows.len(), "Model trained and persisted");
        Ok(model)
    }

    fn train_from_default(&self, user_id: &str) -> Result<UserModel> {
        let vectors = bootstrap::load_dataset(&self.default_dataset)?;
        if vectors.is_empty() {
            return Err(EngineError::Data("default dataset has no rows".to_string()));
        }
        let model = UserModel::fit(&vectors)?;
        self.store.save(user_id, &model)?;
        info!(
            user_id = %user_id,
            dataset = %self.default_dataset.display(),
            rows = vectors.len(),
            "Model bootstrapped from default dataset"
        );
        Ok(model)
    }
}
