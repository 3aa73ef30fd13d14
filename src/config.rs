//! TOML run configuration.
//!
//! ```toml
//! prefix = "."
//! dataset = "cranfield"
//! query-judgements = "cranfield/cranfield-qrels.txt"
//!
//! [query-runner]
//! query-path = "cranfield/cranfield-queries.txt"
//! query-id-start = 1
//! top-k = 10
//!
//! [comparison]
//! output-dir = "."
//! baseline = { method = "bm25", k1 = 2.0, b = 0.70, k3 = 500.0 }
//! candidate = { method = "inl2", c = 2.0 }
//! ```
//!
//! Keys this crate does not know about are ignored, so toolkit configs with analyzer or
//! index sections load unchanged.

use crate::ranker::RankerParams;
use crate::Error;
use serde::Deserialize;
use std::path::{Path, PathBuf};

fn default_prefix() -> PathBuf {
    PathBuf::from(".")
}

fn default_query_path() -> PathBuf {
    PathBuf::from("queries.txt")
}

fn default_top_k() -> usize {
    10
}

/// `[query-runner]` table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct QueryRunnerConfig {
    /// Query file, one query per line.
    #[serde(default = "default_query_path")]
    pub query_path: PathBuf,
    /// Query id of the first line.
    #[serde(default)]
    pub query_id_start: u64,
    /// Retrieval and evaluation depth.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

impl Default for QueryRunnerConfig {
    fn default() -> Self {
        Self {
            query_path: default_query_path(),
            query_id_start: 0,
            top_k: default_top_k(),
        }
    }
}

/// `[comparison]` table.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ComparisonConfig {
    /// Directory receiving the output artifacts.
    #[serde(default = "default_prefix")]
    pub output_dir: PathBuf,
    /// Ranker A. Defaults to BM25 (k1 = 2.0, b = 0.70, k3 = 500).
    #[serde(default)]
    pub baseline: Option<toml::Table>,
    /// Ranker B. Defaults to InL2 (c = 2.0).
    #[serde(default)]
    pub candidate: Option<toml::Table>,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            output_dir: default_prefix(),
            baseline: None,
            candidate: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct RawConfig {
    #[serde(default = "default_prefix")]
    prefix: PathBuf,
    dataset: Option<String>,
    query_judgements: Option<PathBuf>,
    query_runner: Option<QueryRunnerConfig>,
    #[serde(default)]
    comparison: ComparisonConfig,
}

/// A ranker chosen by configuration: artifact name plus registry parameters.
#[derive(Debug, Clone)]
pub struct RankerSpec {
    /// Stem of the AP output file (`<name>.avg_p.txt`).
    pub name: String,
    /// Method and parameters for the registry.
    pub params: RankerParams,
}

impl RankerSpec {
    fn from_table(section: &str, mut table: toml::Table) -> Result<Self, Error> {
        let method = match table.remove("method") {
            Some(toml::Value::String(m)) => m,
            Some(other) => {
                return Err(Error::InvalidConfig(format!(
                    "[comparison.{section}] method must be a string, found {}",
                    other.type_str()
                )))
            }
            None => {
                return Err(Error::InvalidConfig(format!(
                    "[comparison.{section}] needs a `method`"
                )))
            }
        };
        let name = match table.remove("name") {
            Some(toml::Value::String(n)) => n,
            Some(other) => {
                return Err(Error::InvalidConfig(format!(
                    "[comparison.{section}] name must be a string, found {}",
                    other.type_str()
                )))
            }
            None => method.clone(),
        };
        Ok(Self {
            name,
            params: RankerParams::new(method, table),
        })
    }
}

/// Validated run configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root for dataset paths.
    pub prefix: PathBuf,
    /// Dataset name; the corpus lives at `{prefix}/{dataset}/{dataset}.dat`.
    pub dataset: String,
    /// Relevance judgment file.
    pub query_judgements: PathBuf,
    /// Query runner settings.
    pub query_runner: QueryRunnerConfig,
    /// Comparison settings.
    pub comparison: ComparisonConfig,
}

impl Config {
    /// Parse configuration text. `path` is only used in error messages.
    pub fn parse(text: &str, path: &Path) -> Result<Self, Error> {
        let raw: RawConfig = toml::from_str(text).map_err(|source| Error::ParseConfig {
            path: path.to_path_buf(),
            source,
        })?;

        let query_runner = raw
            .query_runner
            .ok_or(Error::MissingSection("query-runner"))?;
        if query_runner.top_k == 0 {
            return Err(Error::InvalidConfig("top-k must be at least 1".into()));
        }
        let dataset = raw
            .dataset
            .ok_or_else(|| Error::InvalidConfig("`dataset` is required".into()))?;
        let query_judgements = raw
            .query_judgements
            .ok_or_else(|| Error::InvalidConfig("`query-judgements` is required".into()))?;

        Ok(Self {
            prefix: raw.prefix,
            dataset,
            query_judgements,
            query_runner,
            comparison: raw.comparison,
        })
    }

    /// Read and parse a configuration file.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::parse(&text, path)
    }

    /// Line corpus location.
    pub fn corpus_path(&self) -> PathBuf {
        self.prefix
            .join(&self.dataset)
            .join(format!("{}.dat", self.dataset))
    }

    /// The two rankers to compare, `(baseline, candidate)`.
    pub fn rankers(&self) -> Result<(RankerSpec, RankerSpec), Error> {
        let baseline = match &self.comparison.baseline {
            Some(t) => RankerSpec::from_table("baseline", t.clone())?,
            None => RankerSpec {
                name: "bm25".into(),
                params: RankerParams::defaults("bm25")
                    .with("k1", 2.0)
                    .with("b", 0.70)
                    .with("k3", 500.0),
            },
        };
        let candidate = match &self.comparison.candidate {
            Some(t) => RankerSpec::from_table("candidate", t.clone())?,
            None => RankerSpec {
                name: "inl2".into(),
                params: RankerParams::defaults("inl2").with("c", 2.0),
            },
        };
        if baseline.name == candidate.name {
            return Err(Error::InvalidConfig(format!(
                "both rankers are named {:?}; set `name` on one of them",
                baseline.name
            )));
        }
        Ok((baseline, candidate))
    }
}
