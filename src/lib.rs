//! `rankeval`: pluggable ranking functions over an inverted index, evaluated offline.
//!
//! The crate answers one question: given two ranking strategies, a query set and relevance
//! judgments, which strategy ranks better, and is the difference significant?
//!
//! - `ranker` defines the per-term scoring contract and a registry of named strategies
//!   (`bm25`, `inl2`, `pivoted-length`, `dirichlet-prior`, `jelinek-mercer`, `absolute-discount`).
//! - `retrieve` aggregates per-term scores into a deterministic top-k list.
//! - `eval` computes average precision and MAP against graded judgments.
//! - `compare` runs two rankers over the same queries and applies a paired t-test.
//!
//! Scope:
//! - In-memory indexes built from a line corpus
//! - Deterministic ranking (tie-break by doc id)
//! - Bag-of-terms queries
//!
//! Non-goals:
//! - Index compression and on-disk formats
//! - Stemming, stopword lists, phrase queries
//! - Distributed query execution
//!
//! References:
//! - Robertson & Zaragoza (2009): BM25 and beyond
//! - Amati & van Rijsbergen (2002): divergence from randomness (InL2)
//! - Zhai & Lafferty (2004): smoothing methods for language models in IR
//! - Smucker et al. (2007): significance tests for IR evaluation

pub mod bm25;
pub mod compare;
pub mod config;
pub mod dfr;
pub mod eval;
pub mod index;
pub mod pivoted;
pub mod query;
pub mod query_likelihood;
pub mod ranker;
pub mod report;
pub mod retrieve;
pub mod stats;

pub use compare::{Comparator, Comparison};
pub use error::Error;
pub use eval::{ApSamples, Qrels};
pub use index::InvertedIndex;
pub use query::Query;
pub use ranker::{DocStats, RankingFunction, Registry, TermStats};

mod error {
    use std::path::PathBuf;

    /// Errors for ranking evaluation.
    #[derive(thiserror::Error, Debug)]
    pub enum Error {
        /// A file could not be read or written.
        #[error("{}: {source}", path.display())]
        Io {
            /// Path being accessed.
            path: PathBuf,
            /// Underlying I/O error.
            #[source]
            source: std::io::Error,
        },
        /// The configuration file is not valid TOML (or has wrongly-typed keys).
        #[error("failed to parse {}: {source}", path.display())]
        ParseConfig {
            /// Configuration path.
            path: PathBuf,
            /// Underlying parse error.
            #[source]
            source: toml::de::Error,
        },
        /// A required configuration table is absent.
        #[error("{0} table needed in configuration")]
        MissingSection(&'static str),
        /// The configuration is well-formed but unusable.
        #[error("invalid configuration: {0}")]
        InvalidConfig(String),
        /// No ranking function is registered under this name.
        #[error("unknown ranking function: {0}")]
        UnknownRanker(String),
        /// A ranking-function parameter is out of range or wrongly typed.
        #[error("invalid parameter `{name}` for {ranker}: {reason}")]
        InvalidParameter {
            /// Ranker method name.
            ranker: String,
            /// Parameter key.
            name: String,
            /// What was wrong.
            reason: String,
        },
        /// A relevance-judgment line could not be parsed.
        #[error("{}:{line}: {reason}", path.display())]
        MalformedQrels {
            /// Judgments path.
            path: PathBuf,
            /// 1-indexed line number.
            line: usize,
            /// What was wrong.
            reason: String,
        },
        /// Paired samples are misaligned; a query was scored for one ranker only.
        #[error("paired samples differ in length: {left} vs {right}")]
        SampleLengthMismatch {
            /// Length of the first sequence.
            left: usize,
            /// Length of the second sequence.
            right: usize,
        },
    }

    impl Error {
        pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
            Self::Io {
                path: path.into(),
                source,
            }
        }
    }
}
