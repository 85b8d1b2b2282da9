use strsim::normalized_damerau_levenshtein;

/// Fuzzy matcher for short labels with typos
pub struct FuzzyMatcher {
    /// Similarity threshold (0.0-1.0) for considering two strings as matches
    pub similarity_threshold: f64,
}

impl Default for FuzzyMatcher {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.7,
        }
    }
}

impl FuzzyMatcher {
    pub fn new(threshold: f64) -> Self {
        Self {
            similarity_threshold: threshold,
        }
    }

    /// Normalize a string for fuzzy matching
    /// - Converts to lowercase
    /// - Removes punctuation and whitespace
    pub fn normalize_string(&self, s: &str) -> String {
        s.to_lowercase()
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect()
    }

    /// Calculate similarity between two strings
    /// Returns a score between 0.0 and 1.0 (higher = more similar)
    pub fn similarity(&self, s1: &str, s2: &str) -> f64 {
        let norm1 = self.normalize_string(s1);
        let norm2 = self.normalize_string(s2);

        if norm1.is_empty() || norm2.is_empty() {
            return 0.0;
        }

        // a swapped pair ("idael") is one edit
        normalized_damerau_levenshtein(&norm1, &norm2)
    }

    /// Find the best matching candidate for `target`.
    /// Returns (candidate, similarity_score) if one clears the threshold.
    /// On equal scores the earlier candidate wins.
    pub fn find_best_match<'a, S: AsRef<str>>(
        &self,
        target: &str,
        candidates: &'a [S],
    ) -> Option<(&'a str, f64)> {
        let mut best_match: Option<(&'a str, f64)> = None;

        for candidate in candidates {
            let candidate = candidate.as_ref();
            let score = self.similarity(target, candidate);
            if score < self.similarity_threshold {
                continue;
            }
            match best_match {
                Some((_, best_score)) if score <= best_score => {}
                _ => best_match = Some((candidate, score)),
            }
        }

        best_match
    }
}
