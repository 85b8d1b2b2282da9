use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyticaError {
    #[error("Dataset error: {0}")]
    Dataset(String),

    #[error("Column error: {0}")]
    Column(String),

    #[error("Chart error: {0}")]
    Chart(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Polars error: {0}")]
    Polars(String),
}

impl From<polars::error::PolarsError> for AnalyticaError {
    fn from(err: polars::error::PolarsError) -> Self {
        AnalyticaError::Polars(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AnalyticaError>;
