//! Runtime configuration.
//!
//! Values are layered: built-in defaults, then environment variables
//! (optionally loaded from a `.env` file), then whatever the CLI overrides.

use crate::error::{AnalyticaError, Result};
use std::path::PathBuf;
use std::str::FromStr;

pub const DATASET_ENV: &str = "ANALYTICA_DATASET";
pub const FUZZY_THRESHOLD_ENV: &str = "ANALYTICA_FUZZY_THRESHOLD";
pub const SAMPLE_SEED_ENV: &str = "ANALYTICA_SAMPLE_SEED";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Cleaned diamond CSV to load at startup
    pub dataset_path: PathBuf,
    /// Minimum similarity ratio for fuzzy cut-label matching
    pub fuzzy_threshold: f64,
    /// Rows shown for an entity-filter answer
    pub filter_row_limit: usize,
    /// Rows shown for head, tail and sample
    pub preview_rows: usize,
    /// N used by "top" queries that carry no number
    pub default_top_n: usize,
    /// Fixed seed for "sample"; random when absent
    pub sample_seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from("cleaned_data/diamond_cleaned_data.csv"),
            fuzzy_threshold: 0.7,
            filter_row_limit: 10,
            preview_rows: 5,
            default_top_n: 5,
            sample_seed: None,
        }
    }
}

impl Config {
    /// Defaults overridden by `ANALYTICA_*` environment variables.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Config::from_env`] but reads variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = lookup(DATASET_ENV) {
            config.dataset_path = PathBuf::from(path);
        }
        if let Some(raw) = lookup(FUZZY_THRESHOLD_ENV) {
            config.fuzzy_threshold = parse_var(FUZZY_THRESHOLD_ENV, &raw)?;
        }
        if let Some(raw) = lookup(SAMPLE_SEED_ENV) {
            config.sample_seed = Some(parse_var(SAMPLE_SEED_ENV, &raw)?);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.fuzzy_threshold) {
            return Err(AnalyticaError::Config(format!(
                "fuzzy threshold must be between 0 and 1, got {}",
                self.fuzzy_threshold
            )));
        }
        if self.filter_row_limit == 0 || self.preview_rows == 0 || self.default_top_n == 0 {
            return Err(AnalyticaError::Config(
                "row limits must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_var<T: FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| AnalyticaError::Config(format!("invalid value for {}: '{}'", key, raw)))
}
