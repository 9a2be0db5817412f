//! Severity normalization for scored batches
//!
//! Severity summarizes how extreme the flagged rows are relative to the
//! batch's own score range. The range is per batch, not historical, so
//! identical anomalies can land at different severities depending on what
//! else was scored alongside them.

/// Map raw batch scores and flags to a bounded [0, 100] severity
///
/// No flagged row yields 0. A zero-variance batch yields 50 whichever
/// rows are flagged. Otherwise every score min-max normalizes against the
/// batch range with the most anomalous (lowest) score at 100, and the
/// severity is the truncated mean over flagged rows.
pub fn severity(scores: &[f64], flags: &[u8]) -> i64 {
    let flagged: Vec<usize> = flags
        .iter()
        .enumerate()
        .filter(|(_, flag)| **flag == 1)
        .map(|(i, _)| i)
        .collect();
    if flagged.is_empty() {
        return 0;
    }

    let min = scores.iter().copied().fold(f64::INFINITY, f64::min);
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max - min < f64::EPSILON {
        return 50;
    }

    let mean: f64 = flagged
        .iter()
        .map(|&i| (max - scores[i]) / (max - min) * 100.0)
        .sum::<f64>()
        / flagged.len() as f64;
    mean as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_flags_is_zero() {
        assert_eq!(severity(&[-0.4, -0.9, -0.1], &[0, 0, 0]), 0);
        assert_eq!(severity(&[], &[]), 0);
    }

    #[test]
    fn test_equal_scores_is_fifty() {
        assert_eq!(severity(&[-0.5, -0.5, -0.5], &[1, 0, 0]), 50);
        assert_eq!(severity(&[-0.5, -0.5, -0.5], &[1, 1, 1]), 50);
    }

    #[test]
    fn test_lone_extreme_anomaly_is_one_hundred() {
        // The flagged row holds the batch minimum, the most anomalous end
        assert_eq!(severity(&[-0.4, -0.45, -0.9], &[0, 0, 1]), 100);
    }

    #[test]
    fn test_mid_range_anomaly() {
        // Flagged score sits exactly halfway through the batch range
        assert_eq!(severity(&[-0.2, -0.4, -0.6], &[0, 1, 0]), 50);
    }

    #[test]
    fn test_mean_over_multiple_flags_truncates() {
        // Normalized values 100 and 50 average to 75
        assert_eq!(severity(&[-0.2, -0.4, -0.6], &[0, 1, 1]), 75);
    }

    #[test]
    fn test_severity_is_bounded() {
        let scores = [-0.1, -0.35, -0.62, -0.98, -0.44];
        for flags in [[1, 0, 0, 0, 0], [0, 0, 0, 1, 0], [1, 1, 1, 1, 1]] {
            let s = severity(&scores, &flags);
            assert!((0..=100).contains(&s), "severity was {}", s);
        }
    }
}
