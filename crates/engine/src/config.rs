//! Engine configuration

use anyhow::Result;
use serde::Deserialize;

/// Engine configuration
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Root directory for per-user model artifacts
    #[serde(default = "default_model_dir")]
    pub model_dir: String,

    /// Dataset used to bootstrap a model when none is persisted
    #[serde(default = "default_dataset")]
    pub default_dataset: String,
}

fn default_model_dir() -> String {
    "models".to_string()
}

fn default_dataset() -> String {
    "data/default_training.csv".to_string()
}

impl EngineConfig {
    /// Load configuration from the environment (`ENGINE_` prefix)
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("ENGINE"))
            .build()?;

        Ok(config.try_deserialize().unwrap_or_else(|_| EngineConfig {
            model_dir: default_model_dir(),
            default_dataset: default_dataset(),
        }))
    }
}
