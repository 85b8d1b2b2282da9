//! Intent classification and dispatch.
//!
//! A query is offered to each [`Guard`] in [`GUARDS`] order. The first guard
//! whose trigger matches gets to answer; a handler may return `Ok(None)` to
//! let later guards try. Several triggers overlap (a price filter contains a
//! number, "average price by cut" names a column), so the order is the
//! conflict-resolution policy and must not be rearranged.

use crate::chart::{resolve_chart, ChartBackend, ChartSpec, TerminalChartBackend};
use crate::columns::first_named_column;
use crate::config::Config;
use crate::dataset::{DatasetContext, CLARITY_COLUMN, COLOR_COLUMN, LABEL_COLUMN, PRICE_COLUMN};
use crate::error::Result;
use crate::extract::first_number;
use crate::fuzzy_matcher::FuzzyMatcher;
use crate::help::HELP_TEXT;
use crate::intent::{IntentReport, Query};
use crate::response::{distinct_values, Response};
use crate::stats::{self, find_stat_request, StatKind};
use polars::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};

pub const UNKNOWN_COMMAND: &str = "Unknown command. Type 'help'";

type Trigger = fn(&Query) -> bool;
type Handler = fn(&Interpreter<'_>, &Query, &dyn ChartBackend) -> Result<Option<Response>>;

/// One entry of the dispatch chain.
pub struct Guard {
    pub name: &'static str,
    matches: Trigger,
    handle: Handler,
}

/// The dispatch chain, highest priority first.
pub static GUARDS: [Guard; 18] = [
    Guard { name: "help", matches: |q| q.contains("help"), handle: answer_help },
    Guard { name: "plot", matches: |q| q.contains("plot"), handle: answer_plot },
    Guard { name: "distinct_values", matches: |q| q.contains("distinct values"), handle: answer_distinct },
    Guard { name: "unique", matches: |q| q.contains("unique"), handle: answer_unique },
    Guard { name: "rows", matches: |q| q.contains("rows"), handle: answer_rows },
    Guard { name: "columns", matches: |q| q.contains("columns"), handle: answer_columns },
    Guard { name: "summary", matches: |q| q.contains("summary"), handle: answer_summary },
    Guard { name: "head", matches: |q| q.is_exactly("head"), handle: answer_head },
    Guard { name: "tail", matches: |q| q.is_exactly("tail"), handle: answer_tail },
    Guard { name: "info", matches: |q| q.is_exactly("info"), handle: answer_info },
    Guard { name: "shape", matches: |q| q.contains("shape"), handle: answer_shape },
    Guard { name: "sample", matches: |q| q.contains("sample"), handle: answer_sample },
    Guard { name: "count_by_category", matches: |q| q.contains("count by "), handle: answer_count_by },
    Guard { name: "statistic", matches: has_stat_keyword, handle: answer_statistic },
    Guard { name: "entity_filter", matches: |q| !q.filters.is_empty(), handle: answer_filter },
    Guard { name: "ranking", matches: is_ranking, handle: answer_ranking },
    Guard { name: "group_by", matches: |q| q.contains("by"), handle: answer_group_by },
    Guard { name: "unknown", matches: |_| true, handle: |_, _, _| Ok(Some(Response::text(UNKNOWN_COMMAND))) },
];

/// Group-by targets, each named in a query by its column name.
const GROUP_COLUMNS: [&str; 3] = [LABEL_COLUMN, CLARITY_COLUMN, COLOR_COLUMN];

/// Interprets free-text queries against one dataset snapshot.
pub struct Interpreter<'a> {
    ctx: &'a DatasetContext,
    config: Config,
    matcher: FuzzyMatcher,
    backend: Box<dyn ChartBackend + 'a>,
}

impl<'a> Interpreter<'a> {
    pub fn new(ctx: &'a DatasetContext, config: Config) -> Self {
        Self::with_backend(ctx, config, Box::new(TerminalChartBackend::default()))
    }

    pub fn with_backend(ctx: &'a DatasetContext, config: Config, backend: Box<dyn ChartBackend + 'a>) -> Self {
        let matcher = FuzzyMatcher::new(config.fuzzy_threshold);
        Self {
            ctx,
            config,
            matcher,
            backend,
        }
    }

    /// Answer one query.
    pub fn respond(&self, raw: &str) -> Result<Response> {
        let query = self.parse(raw);
        let (_, response) = self.dispatch(&query, self.backend.as_ref())?;
        Ok(response)
    }

    /// Describe how a query would be read and which guard answers it,
    /// without drawing anything.
    pub fn explain(&self, raw: &str) -> Result<IntentReport> {
        let query = self.parse(raw);
        let (guard, _) = self.dispatch(&query, &DryRunBackend)?;
        Ok(IntentReport::new(&query, self.ctx, guard))
    }

    fn parse(&self, raw: &str) -> Query {
        let query = Query::parse(raw, self.ctx, &self.matcher);
        debug!("Tokens {:?}, filters {:?}", query.tokens, query.filters);
        query
    }

    fn dispatch(&self, query: &Query, backend: &dyn ChartBackend) -> Result<(&'static str, Response)> {
        for guard in GUARDS.iter() {
            if !(guard.matches)(query) {
                continue;
            }
            match (guard.handle)(self, query, backend)? {
                Some(response) => {
                    debug!("Query '{}' answered by guard '{}'", query.text, guard.name);
                    return Ok((guard.name, response));
                }
                None => debug!("Guard '{}' matched but passed", guard.name),
            }
        }
        Ok(("unknown", Response::text(UNKNOWN_COMMAND)))
    }

    fn frame(&self) -> &DataFrame {
        self.ctx.frame()
    }
}

/// Accepts every chart without drawing it.
struct DryRunBackend;

impl ChartBackend for DryRunBackend {
    fn render(&self, _frame: &DataFrame, _spec: &ChartSpec) -> Result<()> {
        Ok(())
    }
}

fn has_stat_keyword(q: &Query) -> bool {
    StatKind::ALL.iter().any(|stat| q.contains(stat.keyword()))
}

fn is_ranking(q: &Query) -> bool {
    q.contains("top") || q.contains("cheapest diamond") || q.is_exactly("cheapest")
}

fn answer_help(_: &Interpreter<'_>, _: &Query, _: &dyn ChartBackend) -> Result<Option<Response>> {
    Ok(Some(Response::text(HELP_TEXT)))
}

fn answer_plot(it: &Interpreter<'_>, q: &Query, backend: &dyn ChartBackend) -> Result<Option<Response>> {
    let Some(spec) = resolve_chart(&q.text, it.ctx.columns()) else {
        return Ok(None);
    };

    match backend.render(it.frame(), &spec) {
        Ok(()) => Ok(Some(Response::Chart(spec.confirmation()))),
        Err(e) => {
            warn!("Chart {:?} failed: {}", spec, e);
            Ok(Some(Response::text(format!("Could not plot graph: {}", e))))
        }
    }
}

/// Values of the first column named in the query, or of every column.
fn answer_distinct(it: &Interpreter<'_>, q: &Query, _: &dyn ChartBackend) -> Result<Option<Response>> {
    if let Some(column) = first_named_column(it.ctx.columns(), &q.text) {
        return Ok(Some(Response::Values(distinct_values(it.ctx.column(column)?)?)));
    }

    let mut groups = Vec::with_capacity(it.ctx.width());
    for column in it.ctx.columns() {
        groups.push((column.clone(), distinct_values(it.ctx.column(column)?)?));
    }
    Ok(Some(Response::ValuesByColumn(groups)))
}

/// Only the three categorical attributes are considered here.
fn answer_unique(it: &Interpreter<'_>, q: &Query, _: &dyn ChartBackend) -> Result<Option<Response>> {
    let column = if q.contains("cut") {
        LABEL_COLUMN
    } else if q.contains("clarity") {
        CLARITY_COLUMN
    } else if q.contains("color") {
        COLOR_COLUMN
    } else {
        return Ok(None);
    };
    Ok(Some(Response::Values(distinct_values(it.ctx.column(column)?)?)))
}

fn answer_rows(it: &Interpreter<'_>, _: &Query, _: &dyn ChartBackend) -> Result<Option<Response>> {
    Ok(Some(Response::text(format!("Total rows: {}", it.ctx.height()))))
}

fn answer_columns(it: &Interpreter<'_>, _: &Query, _: &dyn ChartBackend) -> Result<Option<Response>> {
    Ok(Some(Response::Values(it.ctx.columns().to_vec())))
}

fn answer_summary(it: &Interpreter<'_>, _: &Query, _: &dyn ChartBackend) -> Result<Option<Response>> {
    Ok(Some(Response::Table(stats::summary(it.frame())?)))
}

fn answer_head(it: &Interpreter<'_>, _: &Query, _: &dyn ChartBackend) -> Result<Option<Response>> {
    Ok(Some(Response::Table(it.frame().head(Some(it.config.preview_rows)))))
}

fn answer_tail(it: &Interpreter<'_>, _: &Query, _: &dyn ChartBackend) -> Result<Option<Response>> {
    Ok(Some(Response::Table(it.frame().tail(Some(it.config.preview_rows)))))
}

fn answer_info(it: &Interpreter<'_>, _: &Query, _: &dyn ChartBackend) -> Result<Option<Response>> {
    Ok(Some(Response::text(stats::info(it.frame())?)))
}

fn answer_shape(it: &Interpreter<'_>, _: &Query, _: &dyn ChartBackend) -> Result<Option<Response>> {
    Ok(Some(Response::text(format!(
        "Rows: {}, Columns: {}",
        it.ctx.height(),
        it.ctx.width()
    ))))
}

/// `preview_rows` random rows, seeded when configured.
fn answer_sample(it: &Interpreter<'_>, _: &Query, _: &dyn ChartBackend) -> Result<Option<Response>> {
    let df = it.frame();
    let sample_size = it.config.preview_rows;
    if sample_size >= df.height() {
        return Ok(Some(Response::Table(df.clone())));
    }

    let mut rng = match it.config.sample_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let random_values: Vec<f64> = (0..df.height()).map(|_| rng.gen()).collect();

    let mut df_with_random = df.clone();
    df_with_random.with_column(Series::new("__random__", random_values))?;

    let sampled = df_with_random
        .lazy()
        .sort_by_exprs([col("__random__")], SortMultipleOptions::default())
        .limit(sample_size as u32)
        .drop(["__random__"])
        .collect()?;
    Ok(Some(Response::Table(sampled)))
}

fn answer_count_by(it: &Interpreter<'_>, q: &Query, _: &dyn ChartBackend) -> Result<Option<Response>> {
    let column = if q.contains("count by cut") {
        LABEL_COLUMN
    } else if q.contains("count by clarity") {
        CLARITY_COLUMN
    } else if q.contains("count by color") {
        COLOR_COLUMN
    } else {
        return Ok(None);
    };
    Ok(Some(Response::Table(value_counts(it.frame(), column)?)))
}

fn answer_statistic(it: &Interpreter<'_>, q: &Query, _: &dyn ChartBackend) -> Result<Option<Response>> {
    match find_stat_request(&q.text, it.ctx.columns()) {
        Some((stat, column)) => Ok(Some(Response::text(stats::describe_stat(it.ctx, stat, column)?))),
        None => Ok(None),
    }
}

fn answer_filter(it: &Interpreter<'_>, q: &Query, _: &dyn ChartBackend) -> Result<Option<Response>> {
    let rows = q.filters.preview(it.frame(), it.config.filter_row_limit)?;
    Ok(Some(Response::Table(rows)))
}

fn answer_ranking(it: &Interpreter<'_>, q: &Query, _: &dyn ChartBackend) -> Result<Option<Response>> {
    let n = first_number(&q.text)
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(it.config.default_top_n);

    if q.contains("top") && q.contains("expensive") {
        return Ok(Some(Response::Table(by_price(it.frame(), true, n)?)));
    }
    if q.contains("cheapest diamond") || q.is_exactly("cheapest") {
        return Ok(Some(Response::Record {
            title: "Cheapest diamond:".to_string(),
            frame: by_price(it.frame(), false, 1)?,
        }));
    }
    if q.contains("top") && q.contains("cheap") {
        return Ok(Some(Response::Table(by_price(it.frame(), false, n)?)));
    }
    Ok(None)
}

fn answer_group_by(it: &Interpreter<'_>, q: &Query, _: &dyn ChartBackend) -> Result<Option<Response>> {
    let Some(column) = GROUP_COLUMNS.iter().copied().find(|c| q.contains(c)) else {
        return Ok(None);
    };

    if q.contains("average") && q.contains(PRICE_COLUMN) {
        return Ok(Some(Response::Table(mean_price_by(it.frame(), column)?)));
    }
    if q.contains("count") {
        return Ok(Some(Response::Table(value_counts(it.frame(), column)?)));
    }
    Ok(None)
}

/// `n` rows ordered by price; ties keep dataset order. An `n` past the
/// table height returns every row.
fn by_price(df: &DataFrame, descending: bool, n: usize) -> Result<DataFrame> {
    let n = u32::try_from(n.min(df.height())).unwrap_or(u32::MAX);
    Ok(df
        .clone()
        .lazy()
        .sort_by_exprs(
            vec![col(PRICE_COLUMN)],
            SortMultipleOptions::default()
                .with_order_descending(descending)
                .with_maintain_order(true),
        )
        .limit(n)
        .collect()?)
}

/// Mean price per group, groups sorted by key.
fn mean_price_by(df: &DataFrame, column: &str) -> Result<DataFrame> {
    Ok(df
        .clone()
        .lazy()
        .filter(col(column).is_not_null())
        .group_by([col(column)])
        .agg([col(PRICE_COLUMN).cast(DataType::Float64).mean()])
        .sort_by_exprs(vec![col(column)], SortMultipleOptions::default())
        .collect()?)
}

/// Occurrences of each non-null value, most frequent first.
fn value_counts(df: &DataFrame, column: &str) -> Result<DataFrame> {
    let counts = df
        .clone()
        .lazy()
        .filter(col(column).is_not_null())
        .group_by([col(column)])
        .agg([len().alias("count")])
        .collect()?;

    // Collect first, then sort in Rust so ties come out in key order
    let keys = counts.column(column)?.cast(&DataType::String)?;
    let totals = counts.column("count")?.cast(&DataType::UInt32)?;
    let mut rows: Vec<(String, u32)> = keys
        .str()?
        .into_iter()
        .zip(totals.u32()?.into_iter())
        .filter_map(|(k, c)| Some((k?.to_string(), c?)))
        .collect();
    rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let (values, totals): (Vec<String>, Vec<u32>) = rows.into_iter().unzip();
    Ok(DataFrame::new(vec![
        Series::new(column, values),
        Series::new("count", totals),
    ])?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> DatasetContext {
        let df = df![
            "carat" => [0.23, 0.21, 0.29, 0.31, 0.24, 1.5],
            "cut" => [1.408, 0.435, -0.538, -2.484, 1.408, 1.408],
            "color" => ["e", "e", "i", "j", "j", "d"],
            "clarity" => ["si2", "si1", "vs2", "si2", "vvs2", "si1"],
            "depth" => [61.5, 59.8, 62.4, 63.3, 62.8, 60.0],
            "table" => [55.0, 61.0, 58.0, 58.0, 57.0, 56.0],
            "price" => [326i64, 326, 334, 335, 336, 9800]
        ]
        .unwrap();
        DatasetContext::from_frame(df).unwrap()
    }

    fn interpreter(ctx: &DatasetContext) -> Interpreter<'_> {
        Interpreter::with_backend(ctx, Config::default(), Box::new(DryRunBackend))
    }

    #[test]
    fn test_guard_names_are_unique() {
        let mut names: Vec<&str> = GUARDS.iter().map(|g| g.name).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), GUARDS.len());
        assert_eq!(GUARDS[0].name, "help");
        assert_eq!(GUARDS[GUARDS.len() - 1].name, "unknown");
    }

    #[test]
    fn test_value_counts_sorted() {
        let ctx = ctx();
        let counts = value_counts(ctx.frame(), LABEL_COLUMN).unwrap();
        let labels: Vec<&str> = counts.column(LABEL_COLUMN).unwrap().str().unwrap().into_no_null_iter().collect();
        // ideal x3, then single counts in key order
        assert_eq!(labels, vec!["ideal", "best", "premium", "worst"]);
    }

    #[test]
    fn test_mean_price_by() {
        let ctx = ctx();
        let means = mean_price_by(ctx.frame(), COLOR_COLUMN).unwrap();
        assert_eq!(means.height(), 4);
        let colors: Vec<&str> = means.column(COLOR_COLUMN).unwrap().str().unwrap().into_no_null_iter().collect();
        assert_eq!(colors, vec!["d", "e", "i", "j"]);
    }

    #[test]
    fn test_by_price_clamps_row_count() {
        let ctx = ctx();
        let all = by_price(ctx.frame(), true, usize::MAX).unwrap();
        assert_eq!(all.height(), ctx.height());
        let prices: Vec<i64> = all.column(PRICE_COLUMN).unwrap().i64().unwrap().into_no_null_iter().collect();
        assert_eq!(prices, vec![9800, 336, 335, 334, 326, 326]);
    }

    #[test]
    fn test_sample_is_seeded() {
        let ctx = ctx();
        let config = Config {
            sample_seed: Some(7),
            preview_rows: 3,
            ..Config::default()
        };
        let first = Interpreter::with_backend(&ctx, config.clone(), Box::new(DryRunBackend));
        let second = Interpreter::with_backend(&ctx, config, Box::new(DryRunBackend));

        let a = first.respond("sample").unwrap();
        let b = second.respond("sample").unwrap();
        assert_eq!(a.as_frame().unwrap().height(), 3);
        assert!(a.as_frame().unwrap().equals(b.as_frame().unwrap()));
    }

    #[test]
    fn test_explain_names_guard() {
        let ctx = ctx();
        let it = interpreter(&ctx);

        let report = it.explain("ideal cut under 500").unwrap();
        assert_eq!(report.handled_by, "entity_filter");
        assert_eq!(report.filters.cut.as_deref(), Some("ideal"));

        let report = it.explain("plot scatter color").unwrap();
        assert_eq!(report.handled_by, "plot");
        assert_eq!(report.chart.unwrap().y.as_deref(), Some("price"));

        assert_eq!(it.explain("foobar").unwrap().handled_by, "unknown");
    }
}
