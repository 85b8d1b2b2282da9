//! Graph requests: chart type and axis resolution, plus the rendering seam.
//!
//! The interpreter only decides *what* to draw. Drawing goes through a
//! [`ChartBackend`]; the bundled [`TerminalChartBackend`] renders plain-text
//! charts to stdout.

use crate::columns::resolve_columns;
use crate::dataset::PRICE_COLUMN;
use crate::error::{AnalyticaError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// Second axis for a one-column bar chart.
pub const BAR_DEFAULT_Y: &str = "depth";
/// Second axis for a one-column scatter plot.
pub const SCATTER_DEFAULT_Y: &str = PRICE_COLUMN;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Scatter,
    Box,
    Histogram,
}

impl ChartKind {
    /// First chart keyword in priority order: bar, scatter, box, histogram.
    pub fn detect(query: &str) -> Option<Self> {
        if query.contains("bar") {
            Some(ChartKind::Bar)
        } else if query.contains("scatter") {
            Some(ChartKind::Scatter)
        } else if query.contains("box") {
            Some(ChartKind::Box)
        } else if query.contains("hist") {
            // also covers "histogram"
            Some(ChartKind::Histogram)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub x: Option<String>,
    pub y: Option<String>,
}

impl ChartSpec {
    /// One-line message shown after a successful render.
    pub fn confirmation(&self) -> String {
        let x = self.x.as_deref().unwrap_or("none");
        let y = self.y.as_deref().unwrap_or("none");
        match self.kind {
            ChartKind::Scatter => format!("Scatter plot plotted ({} vs {})", x, y),
            ChartKind::Bar => format!("Bar graph plotted ({} vs {})", x, y),
            ChartKind::Box => format!("Box plot plotted ({})", x),
            ChartKind::Histogram => format!("Histogram plotted ({})", x),
        }
    }

    fn x_column(&self) -> Result<&str> {
        self.x
            .as_deref()
            .ok_or_else(|| AnalyticaError::Chart("no column named in query".to_string()))
    }

    fn y_column(&self) -> Result<&str> {
        self.y
            .as_deref()
            .ok_or_else(|| AnalyticaError::Chart("no second column for chart".to_string()))
    }
}

/// Work out the chart a query asks for.
///
/// Returns `None` when no chart keyword is present so the caller can try
/// other interpretations. Missing axes are not an error here; they surface
/// when the chart is rendered.
pub fn resolve_chart(query: &str, columns: &[String]) -> Option<ChartSpec> {
    let kind = ChartKind::detect(query)?;
    let found = resolve_columns(columns, query);

    let y = match kind {
        ChartKind::Scatter if found.first.is_some() => {
            found.second.or_else(|| Some(SCATTER_DEFAULT_Y.to_string()))
        }
        ChartKind::Bar if found.first.is_some() => {
            found.second.or_else(|| Some(BAR_DEFAULT_Y.to_string()))
        }
        ChartKind::Box | ChartKind::Histogram => None,
        _ => found.second,
    };

    Some(ChartSpec { kind, x: found.first, y })
}

/// Chart renderer. Blocks until the chart is done; failures are reported
/// back to the user as text, never raised past the interpreter.
pub trait ChartBackend {
    fn render(&self, frame: &DataFrame, spec: &ChartSpec) -> Result<()>;
}

/// Draws charts as text on stdout.
pub struct TerminalChartBackend {
    pub width: usize,
    pub height: usize,
    pub bins: usize,
}

impl Default for TerminalChartBackend {
    fn default() -> Self {
        Self {
            width: 60,
            height: 15,
            bins: 10,
        }
    }
}

impl ChartBackend for TerminalChartBackend {
    fn render(&self, frame: &DataFrame, spec: &ChartSpec) -> Result<()> {
        let drawing = self.draw(frame, spec)?;
        println!("{}", drawing);
        Ok(())
    }
}

impl TerminalChartBackend {
    /// Render `spec` to a string.
    pub fn draw(&self, frame: &DataFrame, spec: &ChartSpec) -> Result<String> {
        let x = spec.x_column()?;
        match spec.kind {
            ChartKind::Bar => self.draw_bar(frame, x, spec.y_column()?),
            ChartKind::Scatter => self.draw_scatter(frame, x, spec.y_column()?),
            ChartKind::Box => self.draw_box(frame, x),
            ChartKind::Histogram => self.draw_histogram(frame, x),
        }
    }

    /// Mean of `y` for each value of `x`.
    fn draw_bar(&self, frame: &DataFrame, x: &str, y: &str) -> Result<String> {
        require_numeric(frame, y)?;

        let grouped = frame
            .clone()
            .lazy()
            .filter(col(x).is_not_null())
            .group_by([col(x)])
            .agg([col(y).cast(DataType::Float64).mean().alias("__mean__")])
            .sort_by_exprs(vec![col(x)], SortMultipleOptions::default())
            .collect()?;

        let keys = grouped.column(x)?.cast(&DataType::String)?;
        let means = grouped.column("__mean__")?;
        let bars: Vec<(String, f64)> = keys
            .str()?
            .into_iter()
            .zip(means.f64()?.into_iter())
            .filter_map(|(k, m)| Some((k?.to_string(), m?)))
            .collect();

        let peak = bars.iter().map(|(_, m)| m.abs()).fold(0.0, f64::max);
        let label_width = bars.iter().map(|(k, _)| k.len()).max().unwrap_or(0);

        let mut out = format!("Average {} by {}\n", y, x);
        for (key, mean) in &bars {
            let len = scale(mean.abs(), peak, self.width);
            let _ = writeln!(out, "{:>w$} | {} {:.2}", key, "#".repeat(len), mean, w = label_width);
        }
        Ok(out)
    }

    /// Point grid of `y` against `x`. A text `x` is spread by category.
    fn draw_scatter(&self, frame: &DataFrame, x: &str, y: &str) -> Result<String> {
        let ys = numeric_values(frame, y)?;
        let (xs, categories) = axis_positions(frame, x)?;

        let points: Vec<(f64, f64)> = xs
            .into_iter()
            .zip(ys)
            .filter_map(|(a, b)| Some((a?, b?)))
            .collect();
        if points.is_empty() {
            return Err(AnalyticaError::Chart(format!("no values to plot for {} vs {}", x, y)));
        }

        let (x_min, x_max) = extent(points.iter().map(|p| p.0));
        let (y_min, y_max) = extent(points.iter().map(|p| p.1));

        let mut grid = vec![vec![' '; self.width]; self.height];
        for (px, py) in &points {
            let cell = position(*px, x_min, x_max, self.width);
            let row = self.height - 1 - position(*py, y_min, y_max, self.height);
            grid[row][cell] = '*';
        }

        let mut out = format!("{} vs {} ({} points)\n", y, x, points.len());
        let _ = writeln!(out, "{:>10.2} +", y_max);
        for row in grid {
            let _ = writeln!(out, "{:>10} |{}", "", row.into_iter().collect::<String>());
        }
        let _ = writeln!(out, "{:>10.2} +{}", y_min, "-".repeat(self.width));
        match categories {
            Some(categories) => {
                let _ = writeln!(out, "{:>12}{}", "", categories.join("  "));
            }
            None => {
                let _ = writeln!(out, "{:>12}{:<.2} .. {:.2}", "", x_min, x_max);
            }
        }
        Ok(out)
    }

    /// Five-number summary of `x`.
    fn draw_box(&self, frame: &DataFrame, x: &str) -> Result<String> {
        let mut values: Vec<f64> = numeric_values(frame, x)?.into_iter().flatten().collect();
        if values.is_empty() {
            return Err(AnalyticaError::Chart(format!("no values to plot for {}", x)));
        }
        values.sort_by(|a, b| a.total_cmp(b));

        let min = values[0];
        let max = values[values.len() - 1];
        let q1 = quantile(&values, 0.25);
        let median = quantile(&values, 0.5);
        let q3 = quantile(&values, 0.75);

        let at = |v: f64| position(v, min, max, self.width);
        let mut line = vec![' '; self.width];
        for cell in line.iter_mut().take(at(q1)).skip(at(min)) {
            *cell = '-';
        }
        for cell in line.iter_mut().take(at(q3) + 1).skip(at(q1)) {
            *cell = '=';
        }
        for cell in line.iter_mut().take(at(max) + 1).skip(at(q3) + 1) {
            *cell = '-';
        }
        line[at(min)] = '|';
        line[at(max)] = '|';
        line[at(median)] = 'M';

        let mut out = format!("Box plot of {}\n", x);
        let _ = writeln!(out, "{}", line.into_iter().collect::<String>());
        let _ = writeln!(
            out,
            "min {:.2}  q1 {:.2}  median {:.2}  q3 {:.2}  max {:.2}",
            min, q1, median, q3, max
        );
        Ok(out)
    }

    /// Equal-width bin counts of `x`.
    fn draw_histogram(&self, frame: &DataFrame, x: &str) -> Result<String> {
        let values: Vec<f64> = numeric_values(frame, x)?.into_iter().flatten().collect();
        if values.is_empty() {
            return Err(AnalyticaError::Chart(format!("no values to plot for {}", x)));
        }

        let (min, max) = extent(values.iter().copied());
        let bins = histogram_counts(&values, min, max, self.bins);
        let peak = bins.iter().copied().max().unwrap_or(0) as f64;
        let step = (max - min) / self.bins as f64;

        let mut out = format!("Histogram of {}\n", x);
        for (idx, count) in bins.iter().enumerate() {
            let lower = min + step * idx as f64;
            let len = scale(*count as f64, peak, self.width);
            let _ = writeln!(out, "{:>12.2} | {} {}", lower, "#".repeat(len), count);
        }
        Ok(out)
    }
}

fn require_numeric(frame: &DataFrame, name: &str) -> Result<()> {
    if frame.column(name)?.dtype().is_numeric() {
        Ok(())
    } else {
        Err(AnalyticaError::Chart(format!("column '{}' is not numeric", name)))
    }
}

fn numeric_values(frame: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    require_numeric(frame, name)?;
    let values = frame.column(name)?.cast(&DataType::Float64)?;
    let values = values.f64()?.into_iter().collect();
    Ok(values)
}

/// Numeric positions for an axis; text columns map to category indices.
fn axis_positions(frame: &DataFrame, name: &str) -> Result<(Vec<Option<f64>>, Option<Vec<String>>)> {
    let series = frame.column(name)?;
    if series.dtype().is_numeric() {
        return Ok((numeric_values(frame, name)?, None));
    }

    let text = series.cast(&DataType::String)?;
    let mut categories: Vec<String> = Vec::new();
    let positions = text
        .str()?
        .into_iter()
        .map(|v| {
            v.map(|v| match categories.iter().position(|c| c == v) {
                Some(idx) => idx as f64,
                None => {
                    categories.push(v.to_string());
                    (categories.len() - 1) as f64
                }
            })
        })
        .collect();
    Ok((positions, Some(categories)))
}

fn extent(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)))
}

/// Cell index of `value` on an axis of `cells` cells.
fn position(value: f64, min: f64, max: f64, cells: usize) -> usize {
    if max <= min || cells == 0 {
        return 0;
    }
    let ratio = (value - min) / (max - min);
    ((ratio * (cells - 1) as f64).round() as usize).min(cells - 1)
}

fn scale(value: f64, peak: f64, width: usize) -> usize {
    if peak <= 0.0 {
        return 0;
    }
    ((value / peak) * width as f64).round() as usize
}

/// Linear-interpolated quantile of sorted values.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let rank = q * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    sorted[lower] + (sorted[upper] - sorted[lower]) * (rank - lower as f64)
}

/// Equal-width bins over [min, max]; the last bin is closed.
fn histogram_counts(values: &[f64], min: f64, max: f64, bins: usize) -> Vec<usize> {
    let mut counts = vec![0; bins.max(1)];
    let width = (max - min) / counts.len() as f64;
    for v in values {
        let idx = if width > 0.0 {
            (((v - min) / width) as usize).min(counts.len() - 1)
        } else {
            0
        };
        counts[idx] += 1;
    }
    counts
}
