use itertools::Itertools;
use polars::prelude::*;
use std::fmt;

/// What the interpreter hands back for one query.
#[derive(Debug, Clone)]
pub enum Response {
    /// Plain or one-line formatted message
    Text(String),
    /// Values of a single column
    Values(Vec<String>),
    /// Distinct values for several columns, in column order
    ValuesByColumn(Vec<(String, Vec<String>)>),
    /// Tabular view for the caller to render
    Table(DataFrame),
    /// Tabular view with a heading line
    Record { title: String, frame: DataFrame },
    /// A chart was drawn; carries the confirmation line
    Chart(String),
}

impl Response {
    pub fn text(message: impl Into<String>) -> Self {
        Response::Text(message.into())
    }

    /// Single-line message, if this response is one.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Response::Text(message) | Response::Chart(message) => Some(message),
            _ => None,
        }
    }

    pub fn as_frame(&self) -> Option<&DataFrame> {
        match self {
            Response::Table(frame) | Response::Record { frame, .. } => Some(frame),
            _ => None,
        }
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Response::Text(message) | Response::Chart(message) => write!(f, "{}", message),
            Response::Values(values) => write!(f, "[{}]", values.iter().join(", ")),
            Response::ValuesByColumn(groups) => {
                for (column, values) in groups {
                    writeln!(f, "{}: [{}]", column, values.iter().join(", "))?;
                }
                Ok(())
            }
            Response::Table(frame) => write!(f, "\n{}", frame),
            Response::Record { title, frame } => write!(f, "{}\n\n{}", title, frame),
        }
    }
}

/// Distinct values of a column in first-seen order, rendered as text.
pub fn distinct_values(series: &Series) -> PolarsResult<Vec<String>> {
    let unique = series.unique_stable()?.cast(&DataType::String)?;
    Ok(unique
        .str()?
        .into_iter()
        .map(|v| v.unwrap_or("null").to_string())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_values() {
        let response = Response::Values(vec!["si1".into(), "vs2".into()]);
        assert_eq!(response.to_string(), "[si1, vs2]");
        assert_eq!(Response::text("Total rows: 3").to_string(), "Total rows: 3");
    }

    #[test]
    fn test_distinct_values_keep_order() {
        let series = Series::new("label", [Some("ideal"), None, Some("good"), Some("ideal")]);
        assert_eq!(
            distinct_values(&series).unwrap(),
            vec!["ideal".to_string(), "null".to_string(), "good".to_string()]
        );
    }

    #[test]
    fn test_accessors() {
        let frame = df!["price" => [1i64]].unwrap();
        let response = Response::Record { title: "Cheapest diamond:".into(), frame };
        assert_eq!(response.as_frame().map(|f| f.height()), Some(1));
        assert!(response.as_text().is_none());
        assert!(response.to_string().starts_with("Cheapest diamond:\n\n"));
    }
}
