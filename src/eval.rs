//! Relevance judgments, average precision and MAP.
//!
//! Conventions (fixed, since they change the numbers):
//! - a document is relevant when its grade is `> 0`;
//! - AP@k divides by `min(k, total_relevant)`, so a list that puts every reachable
//!   relevant document first scores 1.0 even when more exist than fit in k;
//! - a query with no relevant documents has AP 0;
//! - MAP over zero queries is 0.
//!
//! References:
//! - Voorhees & Harman (2005). "TREC: Experiment and Evaluation in Information Retrieval"

use crate::Error;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Graded relevance judgments keyed by `(query_id, doc_id)`.
#[derive(Debug, Clone, Default)]
pub struct Qrels {
    judgments: HashMap<u64, BTreeMap<u32, u8>>,
}

impl Qrels {
    /// Empty judgment set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a judgment, replacing any earlier grade for the same pair.
    pub fn insert(&mut self, query_id: u64, doc_id: u32, relevance: u8) {
        self.judgments
            .entry(query_id)
            .or_default()
            .insert(doc_id, relevance);
    }

    /// Parse `query_id doc_id relevance` lines. Blank lines are skipped.
    pub fn parse(text: &str, path: &Path) -> Result<Self, Error> {
        let mut qrels = Self::new();
        for (n, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let malformed = |reason: String| Error::MalformedQrels {
                path: path.to_path_buf(),
                line: n + 1,
                reason,
            };
            let fields: Vec<&str> = line.split_whitespace().collect();
            let &[qid, did, rel] = fields.as_slice() else {
                return Err(malformed(format!(
                    "expected 3 fields, found {}",
                    fields.len()
                )));
            };
            let qid = qid
                .parse::<u64>()
                .map_err(|e| malformed(format!("query id {qid:?}: {e}")))?;
            let did = did
                .parse::<u32>()
                .map_err(|e| malformed(format!("doc id {did:?}: {e}")))?;
            let rel = rel
                .parse::<u8>()
                .map_err(|e| malformed(format!("relevance {rel:?}: {e}")))?;
            qrels.insert(qid, did, rel);
        }
        Ok(qrels)
    }

    /// Load a judgment file.
    pub fn from_path(path: &Path) -> Result<Self, Error> {
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let qrels = Self::parse(&text, path)?;
        tracing::info!(
            path = %path.display(),
            queries = qrels.judgments.len(),
            "loaded relevance judgments"
        );
        Ok(qrels)
    }

    /// Grade of `doc_id` for `query_id` (0 when unjudged).
    pub fn relevance(&self, query_id: u64, doc_id: u32) -> u8 {
        self.judgments
            .get(&query_id)
            .and_then(|docs| docs.get(&doc_id))
            .copied()
            .unwrap_or(0)
    }

    /// Whether `doc_id` is relevant to `query_id`.
    pub fn is_relevant(&self, query_id: u64, doc_id: u32) -> bool {
        self.relevance(query_id, doc_id) > 0
    }

    /// Number of relevant documents for `query_id`.
    pub fn total_relevant(&self, query_id: u64) -> usize {
        self.judgments
            .get(&query_id)
            .map_or(0, |docs| docs.values().filter(|&&r| r > 0).count())
    }

    /// Average precision of `results` for `query_id`, truncated at `k`.
    pub fn average_precision(&self, results: &[(u32, f64)], query_id: u64, k: usize) -> f64 {
        average_precision(
            results.iter().map(|&(doc_id, _)| self.is_relevant(query_id, doc_id)),
            self.total_relevant(query_id),
            k,
        )
    }
}

/// Average precision over a ranked list given as relevance flags (rank 1 first).
///
/// Only the first `k` flags are considered; the sum of precisions at relevant ranks is
/// divided by `min(k, total_relevant)`.
pub fn average_precision<I>(relevant_flags: I, total_relevant: usize, k: usize) -> f64
where
    I: IntoIterator<Item = bool>,
{
    let denominator = k.min(total_relevant);
    if denominator == 0 {
        return 0.0;
    }
    let mut hits = 0usize;
    let mut sum = 0.0;
    for (i, relevant) in relevant_flags.into_iter().take(k).enumerate() {
        if relevant {
            hits += 1;
            sum += hits as f64 / (i + 1) as f64;
        }
    }
    // Duplicate doc ids could otherwise push this past 1.
    (sum / denominator as f64).min(1.0)
}

/// Arithmetic mean of per-query AP values; 0 for an empty set.
pub fn mean_average_precision(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().sum::<f64>() / samples.len() as f64
}

/// Per-query AP values for one ranker over one run, in query order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApSamples {
    values: Vec<f64>,
}

impl ApSamples {
    /// Empty sample sequence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the AP of the next query.
    pub fn push(&mut self, ap: f64) {
        self.values.push(ap);
    }

    /// Number of queries scored so far.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no query has been scored.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The samples, in query order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// MAP over the samples collected so far.
    pub fn mean_average_precision(&self) -> f64 {
        mean_average_precision(&self.values)
    }
}

impl From<Vec<f64>> for ApSamples {
    fn from(values: Vec<f64>) -> Self {
        Self { values }
    }
}

impl FromIterator<f64> for ApSamples {
    fn from_iter<T: IntoIterator<Item = f64>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
