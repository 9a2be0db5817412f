//! Zero-mean unit-variance feature standardization

use crate::error::{EngineError, Result};
use crate::models::{FeatureVector, NUM_FEATURES};
use serde::{Deserialize, Serialize};

/// Per-feature standardization fitted on a training batch
///
/// Only a fitted scaler is constructible, so a transform can never observe
/// unfitted state. Population variance; constant features scale by 1.0 and
/// pass through unshifted in spread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    means: [f64; NUM_FEATURES],
    scales: [f64; NUM_FEATURES],
}

impl StandardScaler {
    /// Fit per-feature mean and scale on a training batch
    pub fn fit(data: &[FeatureVector]) -> Result<Self> {
        if data.is_empty() {
            return Err(EngineError::Data("cannot fit scaler on an empty batch".to_string()));
        }
        let n = data.len() as f64;

        let mut means = [0.0; NUM_FEATURES];
        for vector in data {
            for (mean, value) in means.iter_mut().zip(vector.as_array()) {
                *mean += value;
            }
        }
        for mean in &mut means {
            *mean /= n;
        }

        let mut scales = [0.0; NUM_FEATURES];
        for vector in data {
            for (i, value) in vector.as_array().into_iter().enumerate() {
                scales[i] += (value - means[i]).powi(2);
            }
        }
        for scale in &mut scales {
            let std_dev = (*scale / n).sqrt();
            *scale = if std_dev < f64::EPSILON { 1.0 } else { std_dev };
        }

        Ok(Self { means, scales })
    }

    /// Standardize one vector into schema-ordered scaled values
    pub fn transform(&self, vector: &FeatureVector) -> [f64; NUM_FEATURES] {
        let raw = vector.as_array();
        let mut scaled = [0.0; NUM_FEATURES];
        for i in 0..NUM_FEATURES {
            scaled[i] = (raw[i] - self.means[i]) / self.scales[i];
        }
        scaled
    }

    /// Standardize a batch
    pub fn transform_batch(&self, vectors: &[FeatureVector]) -> Vec<[f64; NUM_FEATURES]> {
        vectors.iter().map(|v| self.transform(v)).collect()
    }
}
