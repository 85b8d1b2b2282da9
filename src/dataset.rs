//! Dataset snapshot shared by every query.
//!
//! The cleaned diamond CSV stores `cut` as a standardized numeric code. At load
//! time the code is rounded to three decimals and mapped onto one of five
//! ordinal names, and the categorical `clarity` / `color` columns are trimmed
//! and lowercased. The resulting [`DatasetContext`] is never mutated; every
//! query derives new frames from it.

use crate::error::{AnalyticaError, Result};
use itertools::Itertools;
use polars::prelude::*;
use std::path::Path;
use tracing::info;

pub const CUT_COLUMN: &str = "cut";
pub const ROUNDED_COLUMN: &str = "rounded";
pub const LABEL_COLUMN: &str = "label";
pub const CLARITY_COLUMN: &str = "clarity";
pub const COLOR_COLUMN: &str = "color";
pub const PRICE_COLUMN: &str = "price";

const REQUIRED_COLUMNS: [&str; 4] = [CUT_COLUMN, CLARITY_COLUMN, COLOR_COLUMN, PRICE_COLUMN];

/// Rounded cut code (in thousandths) to label, in ordinal order.
const CUT_BUCKETS: [(i64, &str); 5] = [
    (-2484, "worst"),
    (-1511, "good"),
    (-538, "best"),
    (435, "premium"),
    (1408, "ideal"),
];

/// Round a cut code to three decimal places.
pub fn round_cut(code: f64) -> f64 {
    (code * 1000.0).round() / 1000.0
}

/// Map a raw cut code to its label. Codes outside the five buckets have none.
pub fn cut_label(code: f64) -> Option<&'static str> {
    let thousandths = (code * 1000.0).round() as i64;
    CUT_BUCKETS
        .iter()
        .find(|(bucket, _)| *bucket == thousandths)
        .map(|(_, label)| *label)
}

/// Immutable, preprocessed view of the diamond table.
#[derive(Debug, Clone)]
pub struct DatasetContext {
    frame: DataFrame,
    columns: Vec<String>,
    labels: Vec<String>,
    clarity_values: Vec<String>,
    color_values: Vec<String>,
}

impl DatasetContext {
    /// Read a cleaned CSV and preprocess it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(AnalyticaError::Dataset(format!(
                "Dataset file not found: {}",
                path.display()
            )));
        }

        let df = LazyCsvReader::new(path)
            .with_has_header(true)
            .finish()
            .map_err(|e| AnalyticaError::Dataset(format!("Failed to scan {}: {}", path.display(), e)))?
            .collect()
            .map_err(|e| AnalyticaError::Dataset(format!("Failed to read {}: {}", path.display(), e)))?;

        info!("Loaded {} rows from {}", df.height(), path.display());
        Self::from_frame(df)
    }

    /// Preprocess an already materialized table.
    pub fn from_frame(mut df: DataFrame) -> Result<Self> {
        let present = df.get_column_names();
        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|c| !present.contains(c))
            .collect();
        if !missing.is_empty() {
            return Err(AnalyticaError::Dataset(format!(
                "Missing required columns: {}",
                missing.join(", ")
            )));
        }

        let codes = df.column(CUT_COLUMN)?.cast(&DataType::Float64)?;
        let codes = codes.f64()?;
        let rounded: Vec<Option<f64>> = codes.into_iter().map(|c| c.map(round_cut)).collect();
        let labels: Vec<Option<&str>> = codes
            .into_iter()
            .map(|c| c.and_then(cut_label))
            .collect();
        df.with_column(Series::new(ROUNDED_COLUMN, rounded))?;
        df.with_column(Series::new(LABEL_COLUMN, labels))?;

        for name in [CLARITY_COLUMN, COLOR_COLUMN] {
            let normalized = normalize_text_column(&df, name)?;
            df.with_column(normalized)?;
        }

        let clarity_values = distinct_strings(&df, CLARITY_COLUMN)?;
        let color_values = distinct_strings(&df, COLOR_COLUMN)?;
        let columns = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();

        info!(
            "Dataset ready: {} clarity values, {} color values",
            clarity_values.len(),
            color_values.len()
        );

        Ok(Self {
            frame: df,
            columns,
            labels: CUT_BUCKETS.iter().map(|(_, l)| l.to_string()).collect(),
            clarity_values,
            color_values,
        })
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    /// Column names in declared order, derived columns last.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// The five cut labels in ordinal order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn clarity_values(&self) -> &[String] {
        &self.clarity_values
    }

    pub fn color_values(&self) -> &[String] {
        &self.color_values
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn width(&self) -> usize {
        self.frame.width()
    }

    pub fn column(&self, name: &str) -> Result<&Series> {
        self.frame
            .column(name)
            .map_err(|_| AnalyticaError::Column(format!("Unknown column: {}", name)))
    }
}

fn normalize_text_column(df: &DataFrame, name: &str) -> Result<Series> {
    let as_text = df.column(name)?.cast(&DataType::String)?;
    let values: Vec<Option<String>> = as_text
        .str()?
        .into_iter()
        .map(|v| v.map(|s| s.trim().to_lowercase()))
        .collect();
    Ok(Series::new(name, values))
}

fn distinct_strings(df: &DataFrame, name: &str) -> Result<Vec<String>> {
    Ok(df
        .column(name)?
        .str()?
        .into_iter()
        .flatten()
        .unique()
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_frame() -> DataFrame {
        df![
            "carat" => [0.23, 0.31, 0.70],
            "cut" => [1.40812, -2.4839, 0.9],
            "color" => [" E", "J ", "e"],
            "clarity" => ["SI1", "si2", " VS1"],
            "price" => [326i64, 335, 2757]
        ]
        .unwrap()
    }

    #[test]
    fn test_cut_label_buckets() {
        assert_eq!(cut_label(1.408), Some("ideal"));
        assert_eq!(cut_label(-2.48351), Some("worst"));
        assert_eq!(cut_label(0.4349), Some("premium"));
        assert_eq!(cut_label(0.5), None);
        assert_eq!(round_cut(-0.53812), -0.538);
    }

    #[test]
    fn test_from_frame_derives_columns() {
        let ctx = DatasetContext::from_frame(raw_frame()).unwrap();

        let labels: Vec<Option<&str>> = ctx.column(LABEL_COLUMN).unwrap().str().unwrap().into_iter().collect();
        assert_eq!(labels, vec![Some("ideal"), Some("worst"), None]);

        assert_eq!(ctx.color_values(), &["e".to_string(), "j".to_string()]);
        assert_eq!(
            ctx.clarity_values(),
            &["si1".to_string(), "si2".to_string(), "vs1".to_string()]
        );
        assert_eq!(ctx.columns().last().map(String::as_str), Some(LABEL_COLUMN));
        assert_eq!(ctx.labels().len(), 5);
    }

    #[test]
    fn test_missing_columns_rejected() {
        let df = df!["price" => [1i64, 2]].unwrap();
        let err = DatasetContext::from_frame(df).unwrap_err();
        assert!(err.to_string().contains("cut"));
    }
}
