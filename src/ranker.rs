//! The ranking-function contract and the registry of named strategies.
//!
//! A ranking function scores **one query term against one document**. Aggregation over
//! the query (summing, plus an optional once-per-document constant) belongs to
//! `retrieve`, so strategies stay pure functions of their parameters and `TermStats`.

use crate::Error;
use std::collections::BTreeMap;
use std::fmt;

/// Corpus- and document-level statistics shared by every term of a query.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DocStats {
    /// Documents in the corpus.
    pub num_docs: u64,
    /// Tokens in the corpus.
    pub total_terms: u64,
    /// Mean document length (in tokens).
    pub avg_doc_len: f64,
    /// Tokens in the query.
    pub query_length: f64,
    /// Tokens in this document.
    pub doc_len: u64,
    /// Distinct terms in this document.
    pub doc_unique_terms: u64,
}

impl DocStats {
    /// Extend with the statistics of one query term.
    pub fn with_term(
        &self,
        doc_term_count: u64,
        doc_freq: u64,
        corpus_term_count: u64,
        query_term_weight: f64,
    ) -> TermStats {
        TermStats {
            num_docs: self.num_docs,
            total_terms: self.total_terms,
            avg_doc_len: self.avg_doc_len,
            query_length: self.query_length,
            doc_len: self.doc_len,
            doc_unique_terms: self.doc_unique_terms,
            doc_term_count,
            doc_freq,
            corpus_term_count,
            query_term_weight,
        }
    }
}

/// Score data for one `(query term, document)` pair.
///
/// Produced fresh for every scoring call; rankers must not hold on to it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TermStats {
    /// Documents in the corpus.
    pub num_docs: u64,
    /// Tokens in the corpus.
    pub total_terms: u64,
    /// Mean document length (in tokens).
    pub avg_doc_len: f64,
    /// Tokens in the query.
    pub query_length: f64,
    /// Tokens in this document.
    pub doc_len: u64,
    /// Distinct terms in this document.
    pub doc_unique_terms: u64,
    /// Occurrences of the term in this document.
    pub doc_term_count: u64,
    /// Documents containing the term.
    pub doc_freq: u64,
    /// Occurrences of the term in the whole corpus.
    pub corpus_term_count: u64,
    /// Weight of the term in the query (its in-query count).
    pub query_term_weight: f64,
}

impl TermStats {
    /// Maximum-likelihood corpus probability `P(t|C)`; 0 for an empty corpus.
    pub fn corpus_prob(&self) -> f64 {
        if self.total_terms == 0 {
            return 0.0;
        }
        self.corpus_term_count as f64 / self.total_terms as f64
    }
}

/// A per-term scoring policy.
///
/// Implementations must be free of side effects and must return a finite value for
/// degenerate inputs (empty documents, zero counts); the convention is 0.0.
pub trait RankingFunction: Send + Sync + fmt::Debug {
    /// Registry name of the strategy.
    fn name(&self) -> &str;

    /// Contribution of a single query term to a document's score.
    fn score_term(&self, stats: &TermStats) -> f64;

    /// Constant added once per candidate document, before term contributions.
    fn initial_score(&self, _doc: &DocStats) -> f64 {
        0.0
    }
}

/// Map NaN/Inf to the neutral score.
pub(crate) fn finite_or_zero(x: f64) -> f64 {
    if x.is_finite() {
        x
    } else {
        0.0
    }
}

/// Parameters of one configured ranker: its method name plus a TOML table of settings.
#[derive(Debug, Clone, Default)]
pub struct RankerParams {
    method: String,
    table: toml::Table,
}

impl RankerParams {
    /// Parameters for `method` read from a configuration table.
    pub fn new(method: impl Into<String>, table: toml::Table) -> Self {
        Self {
            method: method.into(),
            table,
        }
    }

    /// Parameters for `method` with every setting at its default.
    pub fn defaults(method: impl Into<String>) -> Self {
        Self::new(method, toml::Table::new())
    }

    /// Set a numeric parameter.
    pub fn with(mut self, key: &str, value: f64) -> Self {
        self.table.insert(key.to_string(), toml::Value::Float(value));
        self
    }

    /// Method (registry) name.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Numeric parameter `key`, or `default` when absent. Integers are accepted.
    pub fn f64_or(&self, key: &str, default: f64) -> Result<f64, Error> {
        match self.table.get(key) {
            None => Ok(default),
            Some(toml::Value::Float(v)) => Ok(*v),
            Some(toml::Value::Integer(v)) => Ok(*v as f64),
            Some(other) => Err(self.invalid(
                key,
                format!("expected a number, found {}", other.type_str()),
            )),
        }
    }

    /// String parameter `key`, or `default` when absent.
    pub fn str_or<'a>(&'a self, key: &str, default: &'a str) -> Result<&'a str, Error> {
        match self.table.get(key) {
            None => Ok(default),
            Some(toml::Value::String(v)) => Ok(v.as_str()),
            Some(other) => Err(self.invalid(
                key,
                format!("expected a string, found {}", other.type_str()),
            )),
        }
    }

    /// Reject `value` unless `ok` holds.
    pub fn check(&self, key: &str, value: f64, ok: bool, expected: &str) -> Result<f64, Error> {
        if ok && value.is_finite() {
            Ok(value)
        } else {
            Err(self.invalid(key, format!("{value} is not {expected}")))
        }
    }

    fn invalid(&self, key: &str, reason: String) -> Error {
        Error::InvalidParameter {
            ranker: self.method.clone(),
            name: key.to_string(),
            reason,
        }
    }
}

/// Named constructor for a ranking strategy.
pub type Constructor = fn(&RankerParams) -> Result<Box<dyn RankingFunction>, Error>;

fn boxed<R: RankingFunction + 'static>(
    ranker: Result<R, Error>,
) -> Result<Box<dyn RankingFunction>, Error> {
    Ok(Box::new(ranker?))
}

/// Ranking strategies selectable by name.
#[derive(Clone)]
pub struct Registry {
    ctors: BTreeMap<String, Constructor>,
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.ctors.keys()).finish()
    }
}

impl Default for Registry {
    fn default() -> Self {
        use crate::bm25::OkapiBm25;
        use crate::dfr::InL2;
        use crate::pivoted::PivotedLength;
        use crate::query_likelihood::{AbsoluteDiscount, DirichletPrior, JelinekMercer};

        let mut r = Self::empty();
        r.register(OkapiBm25::NAME, |p| boxed(OkapiBm25::from_params(p)));
        r.register(InL2::NAME, |p| boxed(InL2::from_params(p)));
        r.register(PivotedLength::NAME, |p| boxed(PivotedLength::from_params(p)));
        r.register(DirichletPrior::NAME, |p| boxed(DirichletPrior::from_params(p)));
        r.register(JelinekMercer::NAME, |p| boxed(JelinekMercer::from_params(p)));
        r.register(AbsoluteDiscount::NAME, |p| {
            boxed(AbsoluteDiscount::from_params(p))
        });
        r
    }
}

impl Registry {
    /// A registry with no strategies.
    pub fn empty() -> Self {
        Self {
            ctors: BTreeMap::new(),
        }
    }

    /// Register (or replace) a strategy under `name`.
    pub fn register(&mut self, name: &str, ctor: Constructor) {
        self.ctors.insert(name.to_string(), ctor);
    }

    /// Registered names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.ctors.keys().map(String::as_str)
    }

    /// Construct the strategy named by `params.method()`.
    pub fn build(&self, params: &RankerParams) -> Result<Box<dyn RankingFunction>, Error> {
        let ctor = self
            .ctors
            .get(params.method())
            .ok_or_else(|| Error::UnknownRanker(params.method().to_string()))?;
        ctor(params)
    }
}
