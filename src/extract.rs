//! Entity extractors.
//!
//! Each extractor is independent and returns `None` when nothing in the query
//! matches; a miss is never an error.

use crate::fuzzy_matcher::FuzzyMatcher;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparison {
    #[serde(rename = "<")]
    LessThan,
    #[serde(rename = ">")]
    GreaterThan,
}

/// A strict price comparison such as `price < 5000`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceCondition {
    pub op: Comparison,
    pub threshold: i64,
}

fn number_regex() -> &'static Regex {
    static NUMBER: OnceLock<Regex> = OnceLock::new();
    NUMBER.get_or_init(|| Regex::new(r"\d+").expect("static pattern"))
}

/// First run of ASCII digits anywhere in `text`. A run too long for `i64`
/// saturates at `i64::MAX`.
pub fn first_number(text: &str) -> Option<i64> {
    number_regex()
        .find(text)
        .map(|m| m.as_str().parse().unwrap_or(i64::MAX))
}

/// Cut label named in the tokens.
///
/// An exact label anywhere in the query wins over any fuzzy candidate. Only
/// when no token is an exact label does the matcher look for a near miss,
/// again scanning tokens left to right.
pub fn extract_cut(tokens: &[String], labels: &[String], matcher: &FuzzyMatcher) -> Option<String> {
    if let Some(exact) = tokens.iter().find(|t| labels.contains(*t)) {
        return Some(exact.clone());
    }

    tokens.iter().find_map(|token| {
        matcher.find_best_match(token, labels).map(|(label, score)| {
            debug!("Fuzzy cut match '{}' -> '{}' ({:.2})", token, label, score);
            label.to_string()
        })
    })
}

/// Value following the literal keyword `keyword`, if it is one of `values`.
fn extract_keyword_value(tokens: &[String], keyword: &str, values: &[String]) -> Option<String> {
    tokens
        .windows(2)
        .find(|pair| pair[0] == keyword && values.contains(&pair[1]))
        .map(|pair| pair[1].clone())
}

pub fn extract_clarity(tokens: &[String], clarity_values: &[String]) -> Option<String> {
    extract_keyword_value(tokens, "clarity", clarity_values)
}

pub fn extract_color(tokens: &[String], color_values: &[String]) -> Option<String> {
    extract_keyword_value(tokens, "color", color_values)
}

/// Price condition from the raw (lowercased) query.
///
/// The threshold is the first number in the text. "under"/"below" are
/// checked before "above"/"over"; a number with neither phrase is no
/// condition at all.
pub fn extract_price(query: &str) -> Option<PriceCondition> {
    let threshold = first_number(query)?;

    let op = if query.contains("under") || query.contains("below") {
        Comparison::LessThan
    } else if query.contains("above") || query.contains("over") {
        Comparison::GreaterThan
    } else {
        return None;
    };

    Some(PriceCondition { op, threshold })
}
