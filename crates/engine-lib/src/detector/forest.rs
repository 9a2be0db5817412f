//! Seeded isolation forest for density-based outlier scoring
//!
//! An ensemble of randomized binary trees isolates each row; rows that
//! isolate quickly are outliers. Raw scores follow the convention
//! `-2^(-E[h(x)]/c(n))`, so higher (closer to zero) means more consistent
//! with the training distribution. The outlier boundary is the
//! contamination quantile of the training scores, fixed at fit time and
//! never recomputed at inference.

use crate::error::{EngineError, Result};
use crate::models::NUM_FEATURES;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Number of trees in the ensemble
pub const NUM_TREES: usize = 150;

/// Fraction of training data assumed anomalous; fixes the decision boundary
pub const CONTAMINATION: f64 = 0.05;

/// Root seed for reproducible fits
pub const RANDOM_SEED: u64 = 42;

/// Per-tree subsample ceiling
const MAX_TREE_SAMPLES: usize = 256;

const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

type Sample = [f64; NUM_FEATURES];

/// One node of an isolation tree
#[derive(Debug, Clone, Serialize, Deserialize)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
    Leaf {
        size: usize,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct IsolationTree {
    root: Node,
}

impl IsolationTree {
    fn fit(data: &[Sample], sample_size: usize, height_limit: usize, rng: &mut StdRng) -> Self {
        let indices = rand::seq::index::sample(rng, data.len(), sample_size);
        let subset: Vec<Sample> = indices.iter().map(|i| data[i]).collect();
        Self {
            root: build_node(&subset, 0, height_limit, rng),
        }
    }

    /// Traversal depth for one row, with the unfinished-subtree adjustment
    fn path_length(&self, sample: &Sample) -> f64 {
        let mut node = &self.root;
        let mut depth = 0usize;
        loop {
            match node {
                Node::Split { feature, threshold, left, right } => {
                    depth += 1;
                    node = if sample[*feature] < *threshold { left } else { right };
                }
                Node::Leaf { size } => {
                    return depth as f64 + average_path_length(*size);
                }
            }
        }
    }
}

fn build_node(data: &[Sample], depth: usize, height_limit: usize, rng: &mut StdRng) -> Node {
    if depth >= height_limit || data.len() <= 1 {
        return Node::Leaf { size: data.len() };
    }

    let feature = rng.gen_range(0..NUM_FEATURES);
    let (min, max) = data.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), s| {
        (lo.min(s[feature]), hi.max(s[feature]))
    });
    // A subset constant on the chosen feature cannot be split further
    if max - min < f64::EPSILON {
        return Node::Leaf { size: data.len() };
    }

    let threshold = rng.gen_range(min..max);
    let (left, right): (Vec<Sample>, Vec<Sample>) =
        data.iter().copied().partition(|s| s[feature] < threshold);

    Node::Split {
        feature,
        threshold,
        left: Box::new(build_node(&left, depth + 1, height_limit, rng)),
        right: Box::new(build_node(&right, depth + 1, height_limit, rng)),
    }
}

/// Expected path length of an unsuccessful binary search over `n` points
fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

/// Linear-interpolation quantile over an ascending slice
fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    if lower == upper {
        sorted[lower]
    } else {
        let fraction = position - lower as f64;
        sorted[lower] * (1.0 - fraction) + sorted[upper] * fraction
    }
}

/// Isolation forest with the decision boundary fixed at fit time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IsolationForest {
    trees: Vec<IsolationTree>,
    sample_size: usize,
    offset: f64,
}

impl IsolationForest {
    /// Fit the ensemble on scaled feature rows
    ///
    /// Trees fit in parallel; determinism is preserved by deriving each
    /// tree's RNG from the root seed rather than from thread order.
    pub fn fit(data: &[Sample]) -> Result<Self> {
        if data.is_empty() {
            return Err(EngineError::Data("cannot fit detector on an empty batch".to_string()));
        }

        let sample_size = data.len().min(MAX_TREE_SAMPLES);
        let height_limit = (sample_size as f64).log2().ceil().max(1.0) as usize;

        let trees: Vec<IsolationTree> = (0..NUM_TREES)
            .into_par_iter()
            .map(|i| {
                let mut rng = StdRng::seed_from_u64(RANDOM_SEED.wrapping_add(i as u64));
                IsolationTree::fit(data, sample_size, height_limit, &mut rng)
            })
            .collect();

        let mut forest = Self {
            trees,
            sample_size,
            offset: 0.0,
        };

        let mut training_scores: Vec<f64> = data.iter().map(|s| forest.score(s)).collect();
        training_scores.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        forest.offset = quantile(&training_scores, CONTAMINATION);

        Ok(forest)
    }

    /// Raw score for one row; higher = more consistent with training
    pub fn score(&self, sample: &Sample) -> f64 {
        let mean_depth: f64 = self
            .trees
            .iter()
            .map(|tree| tree.path_length(sample))
            .sum::<f64>()
            / self.trees.len() as f64;
        // max(2) keeps the normalizer nonzero for degenerate one-row fits
        -(2f64.powf(-mean_depth / average_path_length(self.sample_size.max(2))))
    }

    /// Outlier label for one row against the fit-time boundary
    pub fn is_outlier(&self, sample: &Sample) -> bool {
        self.score(sample) < self.offset
    }

    /// Score a batch into parallel (scores, flags) sequences
    pub fn score_batch(&self, samples: &[Sample]) -> (Vec<f64>, Vec<u8>) {
        let scores: Vec<f64> = samples.iter().map(|s| self.score(s)).collect();
        let flags: Vec<u8> = scores.iter().map(|s| u8::from(*s < self.offset)).collect();
        (scores, flags)
    }

    /// The fit-time decision boundary
    pub fn offset(&self) -> f64 {
        self.offset
    }
}
