//! Single-column reductions and table summaries.

use crate::dataset::DatasetContext;
use crate::error::Result;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatKind {
    Min,
    Max,
    Average,
    Mean,
    Median,
}

impl StatKind {
    /// Keyword scan order.
    pub const ALL: [StatKind; 5] = [
        StatKind::Min,
        StatKind::Max,
        StatKind::Average,
        StatKind::Mean,
        StatKind::Median,
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            StatKind::Min => "min",
            StatKind::Max => "max",
            StatKind::Average => "average",
            StatKind::Mean => "mean",
            StatKind::Median => "median",
        }
    }

    fn title(self) -> &'static str {
        match self {
            StatKind::Min => "Min",
            StatKind::Max => "Max",
            StatKind::Average | StatKind::Mean => "Average",
            StatKind::Median => "Median",
        }
    }
}

/// Pair the first statistic keyword (in [`StatKind::ALL`] order) that has a
/// column named in the query with that column.
pub fn find_stat_request<'a>(query: &str, columns: &'a [String]) -> Option<(StatKind, &'a str)> {
    StatKind::ALL
        .iter()
        .filter(|stat| query.contains(stat.keyword()))
        .find_map(|stat| {
            crate::columns::first_named_column(columns, query).map(|column| (*stat, column))
        })
}

/// Answer a statistic request as a one-line message.
///
/// Numeric columns are reduced numerically. Text columns support a lexical
/// min/max; mean and median are reported as not applicable.
pub fn describe_stat(ctx: &DatasetContext, stat: StatKind, column: &str) -> Result<String> {
    let series = ctx.column(column)?;

    if !series.dtype().is_numeric() {
        return Ok(match stat {
            StatKind::Min | StatKind::Max => {
                let text = series.cast(&DataType::String)?;
                let values = text.str()?.into_iter().flatten();
                let value = if stat == StatKind::Min { values.min() } else { values.max() };
                format!("{} {} (lexical): {}", stat.title(), column, value.unwrap_or("null"))
            }
            _ => format!("{} not applicable to categorical column '{}'", stat.keyword(), column),
        });
    }

    let message = match stat {
        StatKind::Min => format!("Min {}: {}", column, numeric_extreme(series, true)?),
        StatKind::Max => format!("Max {}: {}", column, numeric_extreme(series, false)?),
        StatKind::Average | StatKind::Mean => match series.mean() {
            Some(mean) => format!("Average {}: {:.2}", column, mean),
            None => format!("Average {}: null", column),
        },
        StatKind::Median => match series.median() {
            Some(median) => format!("Median {}: {}", column, median),
            None => format!("Median {}: null", column),
        },
    };
    Ok(message)
}

/// Min or max rendered in the column's own type.
fn numeric_extreme(series: &Series, min: bool) -> Result<String> {
    let rendered = if series.dtype().is_integer() {
        let value = if min { series.min::<i64>()? } else { series.max::<i64>()? };
        value.map(|v| v.to_string())
    } else {
        let value = if min { series.min::<f64>()? } else { series.max::<f64>()? };
        value.map(|v| v.to_string())
    };
    Ok(rendered.unwrap_or_else(|| "null".to_string()))
}

/// count / mean / std / min / max for every numeric column.
pub fn summary(frame: &DataFrame) -> Result<DataFrame> {
    let mut columns = vec![Series::new(
        "statistic",
        ["count", "mean", "std", "min", "max"],
    )];

    for series in frame.get_columns() {
        if !series.dtype().is_numeric() {
            continue;
        }
        let values = [
            Some((series.len() - series.null_count()) as f64),
            series.mean(),
            series.std(1),
            series.min::<f64>()?,
            series.max::<f64>()?,
        ];
        columns.push(Series::new(series.name(), values));
    }

    Ok(DataFrame::new(columns)?)
}

/// Column name, dtype and non-null count per column.
pub fn info(frame: &DataFrame) -> Result<String> {
    let mut out = format!(
        "DataFrame: {} entries, {} columns\n",
        frame.height(),
        frame.width()
    );
    out.push_str(&format!("{:<4} {:<12} {:>14}  {}\n", "#", "Column", "Non-Null Count", "Dtype"));
    for (idx, series) in frame.get_columns().iter().enumerate() {
        out.push_str(&format!(
            "{:<4} {:<12} {:>14}  {}\n",
            idx,
            series.name(),
            series.len() - series.null_count(),
            series.dtype()
        ));
    }
    Ok(out)
}
