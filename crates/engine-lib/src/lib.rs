//! Core library for the adaptive energy anomaly engine
//!
//! This crate provides:
//! - Feature vector construction from raw telemetry
//! - Seeded isolation-forest scoring with severity normalization
//! - Per-user model persistence with a load-or-train lifecycle
//! - Historical usage summaries and prioritized saving suggestions
//! - The request dispatcher tying the pipeline together

pub mod bootstrap;
pub mod detector;
pub mod dispatch;
pub mod error;
pub mod features;
pub mod models;
pub mod observability;
pub mod pattern;
pub mod store;
pub mod suggestions;

pub use dispatch::Engine;
pub use error::EngineError;
pub use models::*;
pub use observability::StructuredLogger;
