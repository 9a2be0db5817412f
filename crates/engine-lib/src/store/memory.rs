//! In-memory model store
//!
//! Drop-in substitute for the filesystem store in tests and embedded use.

use super::ModelStore;
use crate::detector::UserModel;
use crate::error::Result;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
pub struct MemoryStore {
    models: Mutex<HashMap<String, UserModel>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ModelStore for MemoryStore {
    fn load(&self, user_id: &str) -> Result<Option<UserModel>> {
        let models = self.models.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(models.get(user_id).cloned())
    }

    fn save(&self, user_id: &str, model: &UserModel) -> Result<()> {
        let mut models = self.models.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        models.insert(user_id.to_string(), model.clone());
        Ok(())
    }
}
