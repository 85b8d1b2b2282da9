//! Per-query intent: the lexed text plus everything the extractors found.

use crate::chart::{resolve_chart, ChartSpec};
use crate::columns::{resolve_columns, ColumnMatch};
use crate::dataset::DatasetContext;
use crate::extract::{extract_clarity, extract_color, extract_cut, extract_price};
use crate::filter::FilterSet;
use crate::fuzzy_matcher::FuzzyMatcher;
use crate::lexer::tokenize;
use crate::stats::{find_stat_request, StatKind};
use serde::Serialize;

/// One query after lexing and entity extraction. Built per call, never kept.
#[derive(Debug, Clone)]
pub struct Query {
    /// Lowercased raw text
    pub text: String,
    pub tokens: Vec<String>,
    pub filters: FilterSet,
}

impl Query {
    pub fn parse(raw: &str, ctx: &DatasetContext, matcher: &FuzzyMatcher) -> Self {
        let text = raw.to_lowercase();
        let tokens = tokenize(&text);
        let filters = FilterSet {
            cut: extract_cut(&tokens, ctx.labels(), matcher),
            clarity: extract_clarity(&tokens, ctx.clarity_values()),
            color: extract_color(&tokens, ctx.color_values()),
            price: extract_price(&text),
        };
        Self { text, tokens, filters }
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.text.contains(needle)
    }

    /// The whole query, trimmed, is exactly `word`.
    pub fn is_exactly(&self, word: &str) -> bool {
        self.text.trim() == word
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StatRequest {
    pub stat: StatKind,
    pub column: String,
}

/// Everything the interpreter reads out of a query, for `--explain`.
#[derive(Debug, Clone, Serialize)]
pub struct IntentReport {
    pub query: String,
    pub tokens: Vec<String>,
    pub filters: FilterSet,
    pub columns: ColumnMatch,
    pub statistic: Option<StatRequest>,
    pub chart: Option<ChartSpec>,
    /// Name of the guard that answers the query
    pub handled_by: String,
}

impl IntentReport {
    pub fn new(query: &Query, ctx: &DatasetContext, handled_by: &str) -> Self {
        let statistic = find_stat_request(&query.text, ctx.columns()).map(|(stat, column)| StatRequest {
            stat,
            column: column.to_string(),
        });
        let chart = if query.contains("plot") {
            resolve_chart(&query.text, ctx.columns())
        } else {
            None
        };

        Self {
            query: query.text.clone(),
            tokens: query.tokens.clone(),
            filters: query.filters.clone(),
            columns: resolve_columns(ctx.columns(), &query.text),
            statistic,
            chart,
            handled_by: handled_by.to_string(),
        }
    }
}
