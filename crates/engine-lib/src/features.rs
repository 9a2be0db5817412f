//! Feature vector construction
//!
//! Normalizes either accepted payload shape into the fixed 7-field schema
//! consumed by the scaler and the forest. Missing entries fill to zero;
//! out-of-range or negative readings pass through unchanged.

use crate::models::{FeatureVector, PowerInput, ReadingRecord};

/// Build schema-ordered feature vectors from a request payload
pub fn build(input: &PowerInput) -> Vec<FeatureVector> {
    match input {
        PowerInput::Series(values) => values.iter().map(|p| FeatureVector::from_power(*p)).collect(),
        PowerInput::Table(rows) => rows.iter().map(from_record).collect(),
    }
}

/// Build one vector from a tabular row, zero-filling absent fields
pub fn from_record(record: &ReadingRecord) -> FeatureVector {
    FeatureVector {
        active_power: record.global_active_power.unwrap_or(0.0),
        intensity: record.global_intensity.unwrap_or(0.0),
        voltage: record.voltage.unwrap_or(0.0),
        sub_metering_1: record.sub_metering_1.unwrap_or(0.0),
        sub_metering_2: record.sub_metering_2.unwrap_or(0.0),
        sub_metering_3: record.sub_metering_3.unwrap_or(0.0),
        sub_metering_4: record.sub_metering_4.unwrap_or(0.0),
    }
}

/// Build vectors from training rows
pub fn from_records(rows: &[ReadingRecord]) -> Vec<FeatureVector> {
    rows.iter().map(from_record).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DEFAULT_VOLTAGE;

    #[test]
    fn test_series_synthesizes_schema() {
        let vectors = build(&PowerInput::Series(vec![1.0, 2.0]));
        assert_eq!(vectors.len(), 2);
        assert_eq!(vectors[0].intensity, 0.5);
        assert_eq!(vectors[0].voltage, DEFAULT_VOLTAGE);
        assert_eq!(vectors[1].sub_metering_3, 0.4);
    }

    #[test]
    fn test_table_zero_fills_missing_fields() {
        let row = ReadingRecord {
            global_active_power: Some(1.5),
            voltage: Some(229.0),
            ..Default::default()
        };
        let vectors = build(&PowerInput::Table(vec![row]));
        assert_eq!(vectors[0].active_power, 1.5);
        assert_eq!(vectors[0].voltage, 229.0);
        // Absent channels fill to zero, not to the synthesized proportions
        assert_eq!(vectors[0].intensity, 0.0);
        assert_eq!(vectors[0].sub_metering_1, 0.0);
    }

    #[test]
    fn test_negative_readings_pass_through() {
        let vectors = build(&PowerInput::Series(vec![-3.0]));
        assert_eq!(vectors[0].active_power, -3.0);
        assert_eq!(vectors[0].intensity, -1.5);
    }

    #[test]
    fn test_empty_inputs() {
        assert!(build(&PowerInput::Series(Vec::new())).is_empty());
        assert!(build(&PowerInput::Table(Vec::new())).is_empty());
    }
}
