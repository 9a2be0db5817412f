//! Default-dataset bootstrap
//!
//! Reads the offline collaborators' CSV contract: a header row naming the
//! consumption columns, one reading per line. Extra columns such as
//! `Date`, `Time`, `Season` or `Anomaly_flag` are ignored; cells that are
//! absent or fail to parse fill to zero.

use crate::error::{EngineError, Result};
use crate::models::{FeatureVector, NUM_FEATURES};
use std::fs;
use std::path::Path;

/// Columns recognized from the dataset header, in schema order
const SCHEMA_COLUMNS: [&str; NUM_FEATURES] = [
    "Global_active_power",
    "Global_intensity",
    "Voltage",
    "Sub_metering_1",
    "Sub_metering_2",
    "Sub_metering_3",
    "Sub_metering_4",
];

/// Load and featurize the default training dataset
pub fn load_dataset(path: &Path) -> Result<Vec<FeatureVector>> {
    let content = fs::read_to_string(path)?;
    parse_dataset(&content)
}

/// Parse CSV content in the dataset contract
pub fn parse_dataset(content: &str) -> Result<Vec<FeatureVector>> {
    let mut lines = content.lines();
    let header = lines
        .next()
        .ok_or_else(|| EngineError::Data("dataset is empty".to_string()))?;

    let columns: Vec<&str> = header.split(',').map(str::trim).collect();
    let index: Vec<Option<usize>> = SCHEMA_COLUMNS
        .iter()
        .map(|name| columns.iter().position(|column| column == name))
        .collect();
    if index.iter().all(Option::is_none) {
        return Err(EngineError::Data(
            "dataset header has no recognized consumption columns".to_string(),
        ));
    }

    let mut vectors = Vec::new();
    for line in lines {
        if line.trim().is_empty() {
            continue;
        }
        let cells: Vec<&str> = line.split(',').collect();
        let field = |i: usize| -> f64 {
            index[i]
                .and_then(|column| cells.get(column))
                .and_then(|cell| cell.trim().parse().ok())
                .unwrap_or(0.0)
        };
        vectors.push(FeatureVector {
            active_power: field(0),
            intensity: field(1),
            voltage: field(2),
            sub_metering_1: field(3),
            sub_metering_2: field(4),
            sub_metering_3: field(5),
            sub_metering_4: field(6),
        });
    }

    Ok(vectors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = "\
Date,Time,Global_active_power,Voltage,Global_intensity,Sub_metering_1,Sub_metering_2,Sub_metering_3,Sub_metering_4,Season,Anomaly_flag
01/01/2024,00:00,0.62,230.1,0.31,0.18,0.19,0.12,0.13,winter,0
01/01/2024,00:15,0.58,229.8,0.29,0.17,0.18,0.11,0.12,winter,0";

    #[test]
    fn test_parse_maps_header_columns() {
        let vectors = parse_dataset(SAMPLE).unwrap();
        assert_eq!(vectors.len(), 2);
        assert_eq!(vectors[0].active_power, 0.62);
        assert_eq!(vectors[0].voltage, 230.1);
        assert_eq!(vectors[0].intensity, 0.31);
        assert_eq!(vectors[1].sub_metering_4, 0.12);
    }

    #[test]
    fn test_parse_zero_fills_bad_cells() {
        let content = "Global_active_power,Voltage\n0.5,not-a-number\n,231.0";
        let vectors = parse_dataset(content).unwrap();
        assert_eq!(vectors[0].active_power, 0.5);
        assert_eq!(vectors[0].voltage, 0.0);
        assert_eq!(vectors[1].active_power, 0.0);
        assert_eq!(vectors[1].voltage, 231.0);
    }

    #[test]
    fn test_parse_skips_blank_lines() {
        let content = "Global_active_power\n0.5\n\n0.6\n";
        let vectors = parse_dataset(content).unwrap();
        assert_eq!(vectors.len(), 2);
    }

    #[test]
    fn test_unrecognized_header_is_an_error() {
        assert!(parse_dataset("foo,bar\n1,2").is_err());
        assert!(parse_dataset("").is_err());
    }

    #[test]
    fn test_load_dataset_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", SAMPLE).unwrap();
        let vectors = load_dataset(file.path()).unwrap();
        assert_eq!(vectors.len(), 2);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(load_dataset(Path::new("/nonexistent/dataset.csv")).is_err());
    }
}
