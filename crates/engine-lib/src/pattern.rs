//! Descriptive statistics over historical usage

use crate::models::{ReadingRecord, UsagePattern};

/// Summarize the historical active-power column
///
/// Statistics run over rows that carry the column; rows without it are
/// skipped rather than zero-filled. Returns `None` when nothing is
/// usable, which callers must treat as "no baseline available", never as
/// a zero baseline.
pub fn summarize(rows: &[ReadingRecord]) -> Option<UsagePattern> {
    let values: Vec<f64> = rows.iter().filter_map(|row| row.global_active_power).collect();
    if values.is_empty() {
        return None;
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let peak = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    // Sample variance; a singleton history has no spread to report
    let variance = if values.len() > 1 {
        values.iter().map(|value| (value - mean).powi(2)).sum::<f64>() / (n - 1.0)
    } else {
        0.0
    };

    Some(UsagePattern {
        average_usage: mean,
        peak_usage: peak,
        min_usage: min,
        std_dev: variance.sqrt(),
        variance,
    })
}
