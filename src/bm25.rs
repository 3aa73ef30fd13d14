//! Okapi BM25 as a per-term ranking function.
//!
//! - IDF uses the “+1” form so it stays non-negative for very common terms
//! - query-term frequency is saturated by `k3`
//! - BM25L shifts the length-normalized count by `delta` before saturation
//! - BM25+ adds `delta` to the saturated TF component
//!
//! References:
//! - Robertson & Walker (1994). "Some simple effective approximations to the 2-Poisson model..."
//! - Robertson & Zaragoza (2009). "The Probabilistic Relevance Framework: BM25 and Beyond."
//! - Lv & Zhai (2011). "Lower-bounding term frequency normalization."

use crate::ranker::{finite_or_zero, RankerParams, RankingFunction, TermStats};
use crate::Error;

/// BM25 variant selection.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Bm25Variant {
    /// Standard BM25 (Okapi).
    #[default]
    Standard,
    /// BM25L: shifts the length-normalized term count before saturation.
    BM25L {
        /// Additive term-frequency offset.
        delta: f64,
    },
    /// BM25+: lower-bounds the saturated TF contribution.
    BM25Plus {
        /// Additive term-frequency offset.
        delta: f64,
    },
}

impl Bm25Variant {
    /// Create BM25L with the conventional default delta (0.5).
    pub fn bm25l() -> Self {
        Self::BM25L { delta: 0.5 }
    }

    /// Create BM25+ with the conventional default delta (1.0).
    pub fn bm25plus() -> Self {
        Self::BM25Plus { delta: 1.0 }
    }

    fn delta(self) -> f64 {
        match self {
            Self::Standard => 0.0,
            Self::BM25L { delta } | Self::BM25Plus { delta } => delta,
        }
    }
}

/// Okapi BM25 ranker.
#[derive(Debug, Clone, Copy)]
pub struct OkapiBm25 {
    /// Term-frequency saturation parameter.
    pub k1: f64,
    /// Length normalization parameter.
    pub b: f64,
    /// Query-term-frequency saturation parameter.
    pub k3: f64,
    /// Variant choice (Standard/BM25L/BM25+).
    pub variant: Bm25Variant,
}

impl Default for OkapiBm25 {
    fn default() -> Self {
        Self {
            k1: 1.2,
            b: 0.75,
            k3: 500.0,
            variant: Bm25Variant::Standard,
        }
    }
}

impl OkapiBm25 {
    /// Registry name.
    pub const NAME: &'static str = "bm25";

    /// Standard BM25 with explicit parameters.
    pub fn new(k1: f64, b: f64, k3: f64) -> Self {
        Self {
            k1,
            b,
            k3,
            variant: Bm25Variant::Standard,
        }
    }

    /// Build from configuration: `k1`, `b`, `k3`, and optionally `variant`
    /// (`"standard"`, `"bm25l"`, `"bm25+"`) with `delta`.
    pub fn from_params(p: &RankerParams) -> Result<Self, Error> {
        let d = Self::default();
        let k1 = p.f64_or("k1", d.k1)?;
        let k1 = p.check("k1", k1, k1 >= 0.0, "non-negative")?;
        let b = p.f64_or("b", d.b)?;
        let b = p.check("b", b, (0.0..=1.0).contains(&b), "in [0, 1]")?;
        let k3 = p.f64_or("k3", d.k3)?;
        let k3 = p.check("k3", k3, k3 >= 0.0, "non-negative")?;

        let variant = match p.str_or("variant", "standard")? {
            "standard" => Bm25Variant::Standard,
            "bm25l" => Bm25Variant::BM25L {
                delta: p.f64_or("delta", 0.5)?,
            },
            "bm25+" | "bm25plus" => Bm25Variant::BM25Plus {
                delta: p.f64_or("delta", 1.0)?,
            },
            other => {
                return Err(Error::InvalidParameter {
                    ranker: Self::NAME.to_string(),
                    name: "variant".to_string(),
                    reason: format!("unknown variant {other:?}"),
                })
            }
        };
        let delta = variant.delta();
        p.check("delta", delta, delta >= 0.0, "non-negative")?;

        Ok(Self { k1, b, k3, variant })
    }
}

/// IDF with the “+1” variant (positive idf, stable for frequent terms).
pub fn idf_plus1(num_docs: f64, doc_freq: f64) -> f64 {
    if num_docs <= 0.0 || doc_freq <= 0.0 {
        return 0.0;
    }
    let df = doc_freq.min(num_docs);
    (1.0 + (num_docs - df + 0.5) / (df + 0.5)).ln()
}

/// BM25 term-frequency normalization (the TF part).
pub fn bm25_tf(tf: f64, doc_len: f64, avg_doc_len: f64, k1: f64, b: f64) -> f64 {
    if tf <= 0.0 || avg_doc_len <= 0.0 {
        return 0.0;
    }
    let denom = tf + k1 * ((1.0 - b) + b * (doc_len / avg_doc_len));
    if denom <= 0.0 {
        return 0.0;
    }
    (tf * (k1 + 1.0)) / denom
}

/// BM25L term-frequency component: `c' = tf / ((1 - b) + b * dl / avgdl)`, then
/// `(k1 + 1)(c' + delta) / (k1 + c' + delta)`.
pub fn bm25l_tf(tf: f64, doc_len: f64, avg_doc_len: f64, k1: f64, b: f64, delta: f64) -> f64 {
    if tf <= 0.0 || avg_doc_len <= 0.0 {
        return 0.0;
    }
    let norm = (1.0 - b) + b * (doc_len / avg_doc_len);
    if norm <= 0.0 {
        return 0.0;
    }
    let shifted = tf / norm + delta;
    ((k1 + 1.0) * shifted) / (k1 + shifted)
}

impl RankingFunction for OkapiBm25 {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn score_term(&self, s: &TermStats) -> f64 {
        if s.doc_term_count == 0 || s.doc_len == 0 {
            return 0.0;
        }
        let idf = idf_plus1(s.num_docs as f64, s.doc_freq as f64);
        if idf == 0.0 {
            return 0.0;
        }
        let (tf, dl) = (s.doc_term_count as f64, s.doc_len as f64);
        let tf = match self.variant {
            Bm25Variant::Standard => bm25_tf(tf, dl, s.avg_doc_len, self.k1, self.b),
            Bm25Variant::BM25L { delta } => {
                bm25l_tf(tf, dl, s.avg_doc_len, self.k1, self.b, delta)
            }
            Bm25Variant::BM25Plus { delta } => {
                bm25_tf(tf, dl, s.avg_doc_len, self.k1, self.b) + delta
            }
        };
        let w = s.query_term_weight;
        let qtf = ((self.k3 + 1.0) * w) / (self.k3 + w);
        finite_or_zero(idf * tf * qtf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(tf: u64, doc_len: u64, df: u64) -> TermStats {
        TermStats {
            num_docs: 100,
            total_terms: 1000,
            avg_doc_len: 10.0,
            query_length: 1.0,
            doc_len,
            doc_unique_terms: doc_len,
            doc_term_count: tf,
            doc_freq: df,
            corpus_term_count: df,
            query_term_weight: 1.0,
        }
    }

    #[test]
    fn rarer_terms_score_higher() {
        let r = OkapiBm25::default();
        assert!(r.score_term(&stats(1, 10, 2)) > r.score_term(&stats(1, 10, 50)));
    }

    #[test]
    fn longer_documents_are_penalized() {
        let r = OkapiBm25::default();
        assert!(r.score_term(&stats(2, 5, 5)) > r.score_term(&stats(2, 50, 5)));
    }

    #[test]
    fn unit_query_weight_leaves_score_unscaled() {
        // qtf = (k3 + 1) * 1 / (k3 + 1) = 1
        let r = OkapiBm25::new(1.2, 0.75, 500.0);
        let s = stats(1, 10, 9);
        let expected = idf_plus1(100.0, 9.0) * bm25_tf(1.0, 10.0, 10.0, 1.2, 0.75);
        assert!((r.score_term(&s) - expected).abs() < 1e-12);
    }

    #[test]
    fn degenerate_inputs_score_zero() {
        let r = OkapiBm25::default();
        assert_eq!(r.score_term(&stats(0, 10, 5)), 0.0);
        assert_eq!(r.score_term(&stats(1, 0, 5)), 0.0);
        assert_eq!(r.score_term(&TermStats::default()), 0.0);
    }

    #[test]
    fn plus_variant_lower_bounds_tf() {
        let plus = OkapiBm25 {
            variant: Bm25Variant::bm25plus(),
            ..OkapiBm25::default()
        };
        let std = OkapiBm25::default();
        let s = stats(1, 1000, 5);
        assert!(plus.score_term(&s) > std.score_term(&s));
    }

    #[test]
    fn bm25l_shifts_before_saturation() {
        let s = stats(3, 40, 5);
        let l = OkapiBm25 {
            variant: Bm25Variant::BM25L { delta: 0.5 },
            ..OkapiBm25::default()
        };
        let plus = OkapiBm25 {
            variant: Bm25Variant::BM25Plus { delta: 0.5 },
            ..OkapiBm25::default()
        };

        // c' = 3 / (0.25 + 0.75 * 4); tf = 2.2 * (c' + 0.5) / (1.2 + c' + 0.5)
        let c = 3.0 / 3.25;
        let expected = idf_plus1(100.0, 5.0) * (2.2 * (c + 0.5)) / (1.2 + c + 0.5);
        assert!((l.score_term(&s) - expected).abs() < 1e-12);
        assert!((l.score_term(&s) - 3.4736703132356417).abs() < 1e-9);

        let expected_plus = idf_plus1(100.0, 5.0) * (bm25_tf(3.0, 40.0, 10.0, 1.2, 0.75) + 0.5);
        assert!((plus.score_term(&s) - expected_plus).abs() < 1e-12);
        assert!((l.score_term(&s) - plus.score_term(&s)).abs() > 0.1);
    }

    #[test]
    fn variant_is_read_from_params() {
        let mut table = toml::Table::new();
        table.insert("variant".into(), toml::Value::String("bm25l".into()));
        table.insert("delta".into(), toml::Value::Float(0.3));
        let r = OkapiBm25::from_params(&RankerParams::new("bm25", table)).unwrap();
        assert_eq!(r.variant, Bm25Variant::BM25L { delta: 0.3 });

        let mut table = toml::Table::new();
        table.insert("variant".into(), toml::Value::String("bm25x".into()));
        assert!(matches!(
            OkapiBm25::from_params(&RankerParams::new("bm25", table)),
            Err(Error::InvalidParameter { name, .. }) if name == "variant"
        ));
    }

    #[test]
    fn params_are_validated() {
        let p = RankerParams::defaults("bm25").with("b", 1.5);
        assert!(matches!(
            OkapiBm25::from_params(&p),
            Err(Error::InvalidParameter { name, .. }) if name == "b"
        ));

        let p = RankerParams::defaults("bm25")
            .with("k1", 2.0)
            .with("b", 0.7)
            .with("k3", 500.0);
        let r = OkapiBm25::from_params(&p).unwrap();
        assert_eq!((r.k1, r.b, r.k3), (2.0, 0.7, 500.0));
    }
}
