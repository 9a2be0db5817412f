//! Error taxonomy for the engine
//!
//! Every variant renders into the `error` field of the JSON response at
//! the dispatch boundary; the process never aborts on a handled failure.

use thiserror::Error;

/// Failures surfaced by engine components
#[derive(Debug, Error)]
pub enum EngineError {
    /// Malformed or missing required fields in the request payload
    #[error("Invalid input data: {0}")]
    Data(String),

    /// Train action invoked without rows
    #[error("No training data provided")]
    NoTrainingData,

    /// No persisted model, no training rows, and the default bootstrap failed
    #[error("No model available for user; supply training data or a default dataset")]
    ModelUnavailable,

    /// Only one of the two per-user model artifacts is present
    #[error("Inconsistent model state for user {0}: partial artifact pair")]
    InconsistentPersistence(String),

    /// Action tag outside the recognized set
    #[error("Unknown action")]
    UnknownAction(String),

    /// Model artifact or dataset I/O failed
    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    /// Model artifact (de)serialization failed
    #[error("Serialization failure: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
