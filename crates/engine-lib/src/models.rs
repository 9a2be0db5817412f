//! Core data models for the energy engine

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Number of fields in the fixed consumption schema
pub const NUM_FEATURES: usize = 7;

/// Line voltage assumed when synthesizing features from a bare power series
pub const DEFAULT_VOLTAGE: f64 = 230.0;

/// One consumption reading in the fixed 7-field schema
///
/// Field order is load-bearing: the scaler and the forest both consume
/// the values in `as_array` order, and persisted models assume it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub active_power: f64,
    pub intensity: f64,
    pub voltage: f64,
    pub sub_metering_1: f64,
    pub sub_metering_2: f64,
    pub sub_metering_3: f64,
    pub sub_metering_4: f64,
}

impl FeatureVector {
    /// Field values in schema order
    pub fn as_array(&self) -> [f64; NUM_FEATURES] {
        [
            self.active_power,
            self.intensity,
            self.voltage,
            self.sub_metering_1,
            self.sub_metering_2,
            self.sub_metering_3,
            self.sub_metering_4,
        ]
    }

    /// Synthesize a full vector from a single power scalar
    ///
    /// Intensity and the sub-metered channels are fixed proportions of the
    /// power value; voltage is the nominal line constant.
    pub fn from_power(power: f64) -> Self {
        Self {
            active_power: power,
            intensity: power * 0.5,
            voltage: DEFAULT_VOLTAGE,
            sub_metering_1: power * 0.3,
            sub_metering_2: power * 0.3,
            sub_metering_3: power * 0.2,
            sub_metering_4: power * 0.2,
        }
    }
}

/// A raw telemetry row under its dataset column names
///
/// Extra columns (`Date`, `Time`, `Season`, ...) are ignored on
/// deserialization; absent fields fill to zero at feature-building time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReadingRecord {
    #[serde(rename = "Global_active_power", default)]
    pub global_active_power: Option<f64>,
    #[serde(rename = "Global_intensity", default)]
    pub global_intensity: Option<f64>,
    #[serde(rename = "Voltage", default)]
    pub voltage: Option<f64>,
    #[serde(rename = "Sub_metering_1", default)]
    pub sub_metering_1: Option<f64>,
    #[serde(rename = "Sub_metering_2", default)]
    pub sub_metering_2: Option<f64>,
    #[serde(rename = "Sub_metering_3", default)]
    pub sub_metering_3: Option<f64>,
    #[serde(rename = "Sub_metering_4", default)]
    pub sub_metering_4: Option<f64>,
}

/// Power payload accepted by detect/analyze requests
///
/// Replaces the duck typing of earlier revisions with an explicit tagged
/// variant: a flat series of power readings, or rows already carrying the
/// full consumption schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PowerInput {
    /// Flat series of active-power readings
    Series(Vec<f64>),
    /// Rows in the tabular consumption schema
    Table(Vec<ReadingRecord>),
}

impl PowerInput {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Series(values) => values.is_empty(),
            Self::Table(rows) => rows.is_empty(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Series(values) => values.len(),
            Self::Table(rows) => rows.len(),
        }
    }
}

/// Detector output for one scored batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnomalyReport {
    /// Binary flag per input row (1 = outlier)
    pub anomalies: Vec<u8>,
    /// Raw model score per row; higher = more consistent with training
    pub scores: Vec<f64>,
    /// Aggregate severity in [0, 100], recomputed per batch
    pub severity: i64,
    /// True when any row is flagged
    pub is_anomaly: bool,
}

impl AnomalyReport {
    /// Report for an empty input batch
    pub fn empty() -> Self {
        Self {
            anomalies: Vec::new(),
            scores: Vec::new(),
            severity: 0,
            is_anomaly: false,
        }
    }
}

/// Descriptive statistics over historical active-power values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsagePattern {
    pub average_usage: f64,
    pub peak_usage: f64,
    pub min_usage: f64,
    pub std_dev: f64,
    pub variance: f64,
}

/// Ordinal urgency of a suggestion; controls response ordering only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Critical,
    High,
    Medium,
    Low,
}

impl Priority {
    /// Sort rank; critical sorts first
    pub fn rank(&self) -> u8 {
        match self {
            Self::Critical => 0,
            Self::High => 1,
            Self::Medium => 2,
            Self::Low => 3,
        }
    }
}

/// One energy-saving recommendation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suggestion {
    pub title: String,
    pub message: String,
    pub action: String,
    pub priority: Priority,
    pub savings_potential: i64,
}

/// Incoming request envelope
#[derive(Debug, Clone, Deserialize)]
pub struct EngineRequest {
    #[serde(default = "default_user_id")]
    pub user_id: String,
    #[serde(default = "default_action")]
    pub action: String,
    #[serde(default)]
    pub power_data: Option<PowerInput>,
    #[serde(default)]
    pub historical_data: Option<Vec<ReadingRecord>>,
    #[serde(default)]
    pub training_data: Option<Vec<ReadingRecord>>,
}

fn default_user_id() -> String {
    "default".to_string()
}

fn default_action() -> String {
    "detect".to_string()
}

/// Composite response for the analyze action
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub anomalies: AnomalyReport,
    /// Baseline statistics; serialized as `{}` when no history was usable
    #[serde(serialize_with = "pattern_or_empty")]
    pub pattern: Option<UsagePattern>,
    pub suggestions: Vec<Suggestion>,
}

/// Serialize an absent pattern as an empty mapping, never as null
fn pattern_or_empty<S>(pattern: &Option<UsagePattern>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match pattern {
        Some(pattern) => pattern.serialize(serializer),
        None => serializer.serialize_map(Some(0))?.end(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_power_proportions() {
        let v = FeatureVector::from_power(2.0);
        assert_eq!(v.active_power, 2.0);
        assert_eq!(v.intensity, 1.0);
        assert_eq!(v.voltage, DEFAULT_VOLTAGE);
        assert_eq!(v.sub_metering_1, 0.6);
        assert_eq!(v.sub_metering_2, 0.6);
        assert_eq!(v.sub_metering_3, 0.4);
        assert_eq!(v.sub_metering_4, 0.4);
    }

    #[test]
    fn test_power_input_series_from_numbers() {
        let input: PowerInput = serde_json::from_str("[0.5, 0.6, 5.0]").unwrap();
        match input {
            PowerInput::Series(values) => assert_eq!(values, vec![0.5, 0.6, 5.0]),
            PowerInput::Table(_) => panic!("expected series"),
        }
    }

    #[test]
    fn test_power_input_table_from_rows() {
        let input: PowerInput =
            serde_json::from_str(r#"[{"Global_active_power": 1.2, "Voltage": 231.0}]"#).unwrap();
        match input {
            PowerInput::Table(rows) => {
                assert_eq!(rows.len(), 1);
                assert_eq!(rows[0].global_active_power, Some(1.2));
                assert_eq!(rows[0].voltage, Some(231.0));
                assert_eq!(rows[0].sub_metering_1, None);
            }
            PowerInput::Series(_) => panic!("expected table"),
        }
    }

    #[test]
    fn test_reading_record_ignores_extra_columns() {
        let row: ReadingRecord = serde_json::from_str(
            r#"{"Global_active_power": 0.8, "Date": "01/01/2024", "Season": "winter"}"#,
        )
        .unwrap();
        assert_eq!(row.global_active_power, Some(0.8));
    }

    #[test]
    fn test_priority_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Priority::Critical).unwrap(), "\"critical\"");
        assert_eq!(serde_json::to_string(&Priority::Low).unwrap(), "\"low\"");
    }

    #[test]
    fn test_request_defaults() {
        let request: EngineRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(request.user_id, "default");
        assert_eq!(request.action, "detect");
        assert!(request.power_data.is_none());
    }

    #[test]
    fn test_absent_pattern_serializes_as_empty_object() {
        let report = AnalysisReport {
            anomalies: AnomalyReport::empty(),
            pattern: None,
            suggestions: Vec::new(),
        };
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["pattern"], serde_json::json!({}));
    }
}
