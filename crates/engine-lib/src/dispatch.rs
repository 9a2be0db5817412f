//! Request dispatch
//!
//! Single entry point routing an action verb through the pipeline: model
//! readiness, feature building, scoring, severity, pattern summary,
//! suggestions, response assembly. Every internal failure converts to an
//! `{"error": ...}` payload at this boundary; nothing propagates out as a
//! panic or process abort.

use crate::detector::UserModel;
use crate::error::{EngineError, Result};
use crate::features;
use crate::models::{AnalysisReport, AnomalyReport, EngineRequest, PowerInput};
use crate::observability::StructuredLogger;
use crate::pattern;
use crate::store::{ModelManager, ModelStore};
use crate::suggestions::{self, RuleContext};
use chrono::{Local, Timelike};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;

/// Recognized action verbs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Detect,
    Analyze,
    Train,
}

impl Action {
    fn parse(tag: &str) -> Result<Self> {
        match tag {
            "detect" => Ok(Self::Detect),
            "analyze" => Ok(Self::Analyze),
            "train" => Ok(Self::Train),
            other => Err(EngineError::UnknownAction(other.to_string())),
        }
    }
}

/// Stateless request processor over a shared model store
pub struct Engine {
    manager: ModelManager,
}

impl Engine {
    pub fn new(store: Arc<dyn ModelStore>, default_dataset: impl Into<PathBuf>) -> Self {
        Self {
            manager: ModelManager::new(store, default_dataset),
        }
    }

    /// Process one request, always yielding a well-formed JSON object
    pub fn process(&self, request: &EngineRequest) -> Value {
        let logger = StructuredLogger::new(&request.user_id);
        match self.dispatch(request, &logger) {
            Ok(value) => value,
            Err(err) => {
                logger.log_failure(&request.action, &err.to_string());
                json!({ "error": err.to_string() })
            }
        }
    }

    fn dispatch(&self, request: &EngineRequest, logger: &StructuredLogger) -> Result<Value> {
        match Action::parse(&request.action)? {
            Action::Detect => {
                let report = self.detect(request, logger)?;
                Ok(serde_json::to_value(report)?)
            }
            Action::Analyze => {
                let report = self.analyze(request, logger)?;
                Ok(serde_json::to_value(report)?)
            }
            Action::Train => {
                let rows = request
                    .training_data
                    .as_deref()
                    .filter(|rows| !rows.is_empty())
                    .ok_or(EngineError::NoTrainingData)?;
                self.manager.train(&request.user_id, rows)?;
                logger.log_model_trained(rows.len());
                Ok(json!({ "success": true, "message": "Model retrained" }))
            }
        }
    }

    fn detect(&self, request: &EngineRequest, logger: &StructuredLogger) -> Result<AnomalyReport> {
        let input = request
            .power_data
            .as_ref()
            .ok_or_else(|| EngineError::Data("power_data is required".to_string()))?;
        logger.log_request(&request.action, input.len());

        let (model, source) = self.manager.ensure_ready(&request.user_id, None)?;
        logger.log_model_ready(source.as_str());

        let report = score_input(&model, input);
        let flagged = report.anomalies.iter().filter(|flag| **flag == 1).count();
        logger.log_detection(flagged, report.anomalies.len(), report.severity);
        Ok(report)
    }

    fn analyze(&self, request: &EngineRequest, logger: &StructuredLogger) -> Result<AnalysisReport> {
        let report = self.detect(request, logger)?;

        let historical = request.historical_data.as_deref().unwrap_or(&[]);
        let pattern = pattern::summarize(historical);

        let ctx = RuleContext {
            current_usage: current_usage(request.power_data.as_ref()),
            pattern: pattern.as_ref(),
            report: &report,
            hour: Local::now().hour(),
        };
        let suggestions = suggestions::generate(&ctx);

        Ok(AnalysisReport {
            anomalies: report,
            pattern,
            suggestions,
        })
    }
}

fn score_input(model: &UserModel, input: &PowerInput) -> AnomalyReport {
    if input.is_empty() {
        return AnomalyReport::empty();
    }
    let vectors = features::build(input);
    model.detect(&vectors)
}

/// First power reading of the request batch, zero when absent
fn current_usage(input: Option<&PowerInput>) -> f64 {
    match input {
        Some(PowerInput::Series(values)) => values.first().copied().unwrap_or(0.0),
        Some(PowerInput::Table(rows)) => rows
            .first()
            .and_then(|row| row.global_active_power)
            .unwrap_or(0.0),
        None => 0.0,
    }
}
