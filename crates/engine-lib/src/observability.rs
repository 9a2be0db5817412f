//! Observability for the engine
//!
//! Structured event logging over `tracing`. Diagnostics always go to
//! stderr so the stdout response stays a single JSON object.

use crate::suggestions::CRITICAL_SEVERITY;
use tracing::{info, warn};

/// Structured logger for engine events
///
/// One instance per request, carrying the user id so every event is
/// attributable without threading it through call sites.
#[derive(Clone)]
pub struct StructuredLogger {
    user_id: String,
}

impl StructuredLogger {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }

    /// Log a dispatched request
    pub fn log_request(&self, action: &str, batch_len: usize) {
        info!(
            event = "request_received",
            user_id = %self.user_id,
            action = %action,
            batch_len = batch_len,
            "Processing request"
        );
    }

    /// Log which source satisfied model readiness
    pub fn log_model_ready(&self, source: &str) {
        info!(
            event = "model_ready",
            user_id = %self.user_id,
            source = %source,
            "Model ready"
        );
    }

    /// Log a completed training run
    pub fn log_model_trained(&self, rows: usize) {
        info!(
            event = "model_trained",
            user_id = %self.user_id,
            rows = rows,
            "Model trained and persisted"
        );
    }

    /// Log a scored batch; critical severities escalate to warn
    pub fn log_detection(&self, flagged: usize, total: usize, severity: i64) {
        if severity > CRITICAL_SEVERITY {
            warn!(
                event = "anomaly_detected",
                user_id = %self.user_id,
                flagged = flagged,
                total = total,
                severity = severity,
                "Critical anomaly detected"
            );
        } else if flagged > 0 {
            info!(
                event = "anomaly_detected",
                user_id = %self.user_id,
                flagged = flagged,
                total = total,
                severity = severity,
                "Anomaly detected"
            );
        }
    }

    /// Log a failure converted to an error response
    pub fn log_failure(&self, action: &str, error: &str) {
        warn!(
            event = "request_failed",
            user_id = %self.user_id,
            action = %action,
            error = %error,
            "Request failed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structured_logger_creation() {
        let logger = StructuredLogger::new("user-1");
        assert_eq!(logger.user_id, "user-1");
    }
}
