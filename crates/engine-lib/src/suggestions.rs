//! Rule-based energy-saving recommendations
//!
//! Each rule is a pure function over the generation context. Rules run in
//! a fixed order, each independently; several can fire on one request.
//! The final list stable-sorts by priority rank, so equal priorities keep
//! generation order.

use crate::models::{AnomalyReport, Priority, Suggestion, UsagePattern};

/// Local-hour window treated as peak electricity pricing, inclusive
pub const PEAK_HOURS: (u32, u32) = (18, 22);

/// Average baseline (kW) above which consumption counts as high
const HIGH_AVERAGE_KW: f64 = 2.0;

/// Severity above which an anomaly escalates to critical
pub const CRITICAL_SEVERITY: i64 = 75;

/// Inputs shared by every rule
#[derive(Debug, Clone)]
pub struct RuleContext<'a> {
    /// First power reading of the request batch
    pub current_usage: f64,
    /// Baseline statistics; absent when no usable history was supplied
    pub pattern: Option<&'a UsagePattern>,
    /// Detector output for the request batch
    pub report: &'a AnomalyReport,
    /// Local wall-clock hour at generation time
    pub hour: u32,
}

type Rule = fn(&RuleContext) -> Option<Suggestion>;

/// Rules in evaluation order
const RULES: [Rule; 4] = [high_usage, anomaly_present, peak_hours, high_average];

/// Evaluate every rule and return the prioritized list
pub fn generate(ctx: &RuleContext) -> Vec<Suggestion> {
    let mut suggestions: Vec<Suggestion> = RULES.iter().filter_map(|rule| rule(ctx)).collect();
    suggestions.sort_by_key(|suggestion| suggestion.priority.rank());
    suggestions
}

/// Current usage beyond two standard deviations over the baseline
fn high_usage(ctx: &RuleContext) -> Option<Suggestion> {
    let pattern = ctx.pattern?;
    if ctx.current_usage <= pattern.average_usage + 2.0 * pattern.std_dev {
        return None;
    }
    Some(Suggestion {
        title: "High Usage Detected".to_string(),
        message: format!(
            "Your current usage ({:.1} kW) is significantly higher than usual ({:.1} kW)",
            ctx.current_usage, pattern.average_usage
        ),
        action: "Check for devices running unexpectedly".to_string(),
        priority: Priority::High,
        savings_potential: ((ctx.current_usage - pattern.average_usage) * 10.0).floor() as i64,
    })
}

/// Any flagged row in the scored batch
fn anomaly_present(ctx: &RuleContext) -> Option<Suggestion> {
    if !ctx.report.is_anomaly {
        return None;
    }
    let severity = ctx.report.severity;
    Some(Suggestion {
        title: "Anomaly in Usage Pattern".to_string(),
        message: format!("Unusual energy consumption detected (severity: {severity}%)"),
        action: "Review appliances and check for malfunctions".to_string(),
        priority: if severity > CRITICAL_SEVERITY {
            Priority::Critical
        } else {
            Priority::High
        },
        savings_potential: (severity as f64 * 0.5).round() as i64,
    })
}

/// Generation time falls inside the peak pricing window
fn peak_hours(ctx: &RuleContext) -> Option<Suggestion> {
    if ctx.hour < PEAK_HOURS.0 || ctx.hour > PEAK_HOURS.1 {
        return None;
    }
    Some(Suggestion {
        title: "Peak Hours Alert".to_string(),
        message: "You're currently in peak electricity pricing hours".to_string(),
        action: "Shift non-essential loads to off-peak hours".to_string(),
        priority: Priority::Medium,
        savings_potential: 15,
    })
}

/// Baseline average itself is high
fn high_average(ctx: &RuleContext) -> Option<Suggestion> {
    let pattern = ctx.pattern?;
    if pattern.average_usage <= HIGH_AVERAGE_KW {
        return None;
    }
    Some(Suggestion {
        title: "Optimize High Consumption".to_string(),
        message: format!("Your average usage ({:.1} kW) is high", pattern.average_usage),
        action: "Consider LED lights, efficient appliances, or adjusting thermostat".to_string(),
        priority: Priority::Medium,
        savings_potential: 25,
    })
}
