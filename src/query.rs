//! Queries and the query file.
//!
//! A query file is plain text with one query per line; line `n` (0-indexed) becomes
//! query id `start + n`. Empty lines are kept as empty queries so that ids stay aligned
//! with the judgment file.

use crate::Error;
use std::collections::BTreeMap;
use std::path::Path;

/// Lowercase and split on anything that is not alphanumeric.
pub fn analyze(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// A bag-of-terms query plus the id used to look up its judgments.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    /// Judgment lookup key.
    pub id: u64,
    /// Analyzed terms in query order (duplicates preserved).
    pub terms: Vec<String>,
}

impl Query {
    /// Build a query from already-analyzed terms.
    pub fn new(id: u64, terms: Vec<String>) -> Self {
        Self { id, terms }
    }

    /// Build a query by analyzing raw text.
    pub fn from_text(id: u64, text: &str) -> Self {
        Self::new(id, analyze(text))
    }

    /// Total number of query tokens.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Whether the query has no terms.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Distinct terms with their in-query counts, which serve as query-term weights.
    pub fn term_weights(&self) -> BTreeMap<&str, f64> {
        let mut weights = BTreeMap::new();
        for t in &self.terms {
            *weights.entry(t.as_str()).or_insert(0.0) += 1.0;
        }
        weights
    }
}

/// Load a query file, numbering lines from `id_start`.
pub fn load_queries(path: &Path, id_start: u64) -> Result<Vec<Query>, Error> {
    let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let queries: Vec<Query> = text
        .lines()
        .enumerate()
        .map(|(n, line)| Query::from_text(id_start + n as u64, line.trim()))
        .collect();
    for q in queries.iter().filter(|q| q.is_empty()) {
        tracing::warn!(query_id = q.id, "empty query; it will match no documents");
    }
    Ok(queries)
}
