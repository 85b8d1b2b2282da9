/// Lowercase the query and split it on runs of whitespace.
///
/// Punctuation is kept attached to its word; nothing is stemmed.
pub fn tokenize(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}
