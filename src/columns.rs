use serde::{Deserialize, Serialize};

/// Up to two dataset columns named verbatim in a query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMatch {
    pub first: Option<String>,
    pub second: Option<String>,
}

impl ColumnMatch {
    pub fn is_empty(&self) -> bool {
        self.first.is_none()
    }
}

/// Scan `columns` in declared order and keep the first two whose name
/// appears as a substring of the lowercased query.
///
/// Short names such as `x` or `y` also match inside longer words. Axis
/// assignment follows column order, not word order in the query.
pub fn resolve_columns(columns: &[String], query: &str) -> ColumnMatch {
    let query = query.to_lowercase();
    let mut found = ColumnMatch::default();

    for column in columns {
        if !query.contains(&column.to_lowercase()) {
            continue;
        }
        if found.first.is_none() {
            found.first = Some(column.clone());
        } else if found.second.is_none() {
            found.second = Some(column.clone());
            break;
        }
    }

    found
}

/// First column (declared order) named anywhere in the query.
pub fn first_named_column<'a>(columns: &'a [String], query: &str) -> Option<&'a str> {
    let query = query.to_lowercase();
    columns
        .iter()
        .find(|c| query.contains(&c.to_lowercase()))
        .map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns() -> Vec<String> {
        ["carat", "cut", "color", "clarity", "depth", "table", "price"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn test_column_order_decides_axes() {
        let found = resolve_columns(&columns(), "plot scatter price vs carat");
        assert_eq!(found.first.as_deref(), Some("carat"));
        assert_eq!(found.second.as_deref(), Some("price"));
    }

    #[test]
    fn test_single_and_no_match() {
        let found = resolve_columns(&columns(), "plot box depth");
        assert_eq!(found.first.as_deref(), Some("depth"));
        assert_eq!(found.second, None);

        assert!(resolve_columns(&columns(), "plot something").is_empty());
    }

    #[test]
    fn test_substring_containment() {
        let mut cols = columns();
        cols.push("y".to_string());
        // "clarity" ends in "y", so the short column is picked up too
        let found = resolve_columns(&cols, "plot bar clarity");
        assert_eq!(found.first.as_deref(), Some("clarity"));
        assert_eq!(found.second.as_deref(), Some("y"));
    }

    #[test]
    fn test_first_named_column() {
        assert_eq!(first_named_column(&columns(), "MAX Depth"), Some("depth"));
        assert_eq!(first_named_column(&columns(), "nothing here"), None);
    }
}
