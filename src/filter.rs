//! Conjunctive entity filters over the dataset snapshot.

use crate::dataset::{CLARITY_COLUMN, COLOR_COLUMN, LABEL_COLUMN, PRICE_COLUMN};
use crate::error::Result;
use crate::extract::{Comparison, PriceCondition};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Entity filters extracted from one query. Every present filter must hold.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSet {
    pub cut: Option<String>,
    pub clarity: Option<String>,
    pub color: Option<String>,
    pub price: Option<PriceCondition>,
}

impl FilterSet {
    pub fn is_empty(&self) -> bool {
        self.cut.is_none() && self.clarity.is_none() && self.color.is_none() && self.price.is_none()
    }

    /// Combined predicate, or `None` when no filter was supplied.
    pub fn predicate(&self) -> Option<Expr> {
        let mut predicates: Vec<Expr> = Vec::new();

        // a missing label is null and never equals a literal
        if let Some(cut) = &self.cut {
            predicates.push(col(LABEL_COLUMN).eq(lit(cut.as_str())));
        }
        if let Some(clarity) = &self.clarity {
            predicates.push(col(CLARITY_COLUMN).eq(lit(clarity.as_str())));
        }
        if let Some(color) = &self.color {
            predicates.push(col(COLOR_COLUMN).eq(lit(color.as_str())));
        }
        if let Some(price) = &self.price {
            let threshold = lit(price.threshold);
            predicates.push(match price.op {
                Comparison::LessThan => col(PRICE_COLUMN).lt(threshold),
                Comparison::GreaterThan => col(PRICE_COLUMN).gt(threshold),
            });
        }

        predicates.into_iter().reduce(|acc, p| acc.and(p))
    }

    /// Every row of `frame` satisfying all filters.
    pub fn apply(&self, frame: &DataFrame) -> Result<DataFrame> {
        match self.predicate() {
            Some(predicate) => Ok(frame.clone().lazy().filter(predicate).collect()?),
            None => Ok(frame.clone()),
        }
    }

    /// The first `limit` matching rows.
    pub fn preview(&self, frame: &DataFrame, limit: usize) -> Result<DataFrame> {
        Ok(self.apply(frame)?.head(Some(limit)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> DataFrame {
        df![
            "label" => [Some("ideal"), Some("ideal"), Some("good"), None, Some("ideal")],
            "clarity" => ["si1", "vs2", "si1", "si1", "si1"],
            "color" => ["e", "e", "d", "e", "d"],
            "price" => [326i64, 5000, 4800, 900, 12000]
        ]
        .unwrap()
    }

    fn prices(df: &DataFrame) -> Vec<i64> {
        df.column("price").unwrap().i64().unwrap().into_no_null_iter().collect()
    }

    #[test]
    fn test_empty_filter_keeps_everything() {
        let filters = FilterSet::default();
        assert!(filters.is_empty());
        assert_eq!(filters.apply(&frame()).unwrap().height(), 5);
    }

    #[test]
    fn test_conjunction() {
        let filters = FilterSet {
            cut: Some("ideal".to_string()),
            clarity: Some("si1".to_string()),
            ..Default::default()
        };
        assert_eq!(prices(&filters.apply(&frame()).unwrap()), vec![326, 12000]);

        let filters = FilterSet {
            cut: Some("ideal".to_string()),
            price: Some(PriceCondition { op: Comparison::LessThan, threshold: 5000 }),
            ..Default::default()
        };
        // strictly less than
        assert_eq!(prices(&filters.apply(&frame()).unwrap()), vec![326]);
    }

    #[test]
    fn test_filter_order_does_not_matter() {
        let by_cut = FilterSet { cut: Some("ideal".to_string()), ..Default::default() };
        let by_clarity = FilterSet { clarity: Some("si1".to_string()), ..Default::default() };

        let cut_then_clarity = by_clarity.apply(&by_cut.apply(&frame()).unwrap()).unwrap();
        let clarity_then_cut = by_cut.apply(&by_clarity.apply(&frame()).unwrap()).unwrap();
        assert_eq!(prices(&cut_then_clarity), prices(&clarity_then_cut));
    }

    #[test]
    fn test_missing_label_never_matches() {
        let filters = FilterSet {
            color: Some("e".to_string()),
            price: Some(PriceCondition { op: Comparison::GreaterThan, threshold: 800 }),
            ..Default::default()
        };
        // the unlabeled 900 row passes colour and price
        assert_eq!(prices(&filters.apply(&frame()).unwrap()), vec![5000, 900]);

        let filters = FilterSet { cut: Some("worst".to_string()), ..filters };
        assert_eq!(filters.apply(&frame()).unwrap().height(), 0);
    }

    #[test]
    fn test_preview_truncates() {
        let filters = FilterSet { clarity: Some("si1".to_string()), ..Default::default() };
        assert_eq!(filters.preview(&frame(), 2).unwrap().height(), 2);
    }
}
