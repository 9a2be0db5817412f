//! Anomaly scoring pipeline
//!
//! A fitted scaler feeds a seeded isolation forest; raw scores and flags
//! reduce to a bounded per-batch severity.

mod forest;
mod scaler;
mod severity;

pub use forest::{IsolationForest, CONTAMINATION, NUM_TREES, RANDOM_SEED};
pub use scaler::StandardScaler;
pub use severity::severity;

use crate::error::Result;
use crate::models::{AnomalyReport, FeatureVector};

/// A fitted scaler/forest pair for one user
///
/// Pairing is the invariant: the forest only ever sees vectors transformed
/// by the scaler it was fit alongside, on the same 7-field schema.
#[derive(Debug, Clone)]
pub struct UserModel {
    pub scaler: StandardScaler,
    pub forest: IsolationForest,
}

impl UserModel {
    /// Fit both halves of the pair on one training batch
    pub fn fit(vectors: &[FeatureVector]) -> Result<Self> {
        let scaler = StandardScaler::fit(vectors)?;
        let scaled = scaler.transform_batch(vectors);
        let forest = IsolationForest::fit(&scaled)?;
        Ok(Self { scaler, forest })
    }

    /// Scale and score a batch, reducing to a severity-bearing report
    pub fn detect(&self, vectors: &[FeatureVector]) -> AnomalyReport {
        let scaled = self.scaler.transform_batch(vectors);
        let (scores, anomalies) = self.forest.score_batch(&scaled);
        let severity = severity(&scores, &anomalies);
        let is_anomaly = anomalies.iter().any(|flag| *flag == 1);
        AnomalyReport {
            anomalies,
            scores,
            severity,
            is_anomaly,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn baseline_vectors() -> Vec<FeatureVector> {
        (0..200)
            .map(|i| FeatureVector::from_power(0.4 + (i % 40) as f64 * 0.01))
            .collect()
    }

    #[test]
    fn test_detect_spike_in_batch() {
        let model = UserModel::fit(&baseline_vectors()).unwrap();
        let batch = vec![
            FeatureVector::from_power(0.5),
            FeatureVector::from_power(0.6),
            FeatureVector::from_power(5.0),
        ];
        let report = model.detect(&batch);
        assert_eq!(report.anomalies, vec![0, 0, 1]);
        assert!(report.is_anomaly);
        assert!(report.severity > 0);
        assert_eq!(report.scores.len(), 3);
    }

    #[test]
    fn test_detect_empty_batch() {
        let model = UserModel::fit(&baseline_vectors()).unwrap();
        let report = model.detect(&[]);
        assert!(report.anomalies.is_empty());
        assert!(report.scores.is_empty());
        assert_eq!(report.severity, 0);
        assert!(!report.is_anomaly);
    }

    #[test]
    fn test_detect_training_subset_is_deterministic() {
        let vectors = baseline_vectors();
        let model = UserModel::fit(&vectors).unwrap();
        let subset = &vectors[..20];
        let first = model.detect(subset);
        let second = model.detect(subset);
        assert_eq!(first.anomalies, second.anomalies);
        assert_eq!(first.scores, second.scores);
        assert_eq!(first.severity, second.severity);
    }
}
