//! InL2: a divergence-from-randomness ranker.
//!
//! Inverse document frequency (`In`) as the randomness model, Laplace after-effect (`L`),
//! and length normalization 2 (`2`):
//!
//! ```text
//! tfn   = tf * log2(1 + avgdl / dl)
//! score = w * tfn / (tfn + c) * log2((N + 1) / (df + 0.5))
//! ```
//!
//! `df` is clamped to `N`, so the IDF factor is always positive.
//!
//! `df` is the document frequency. MeTA-style InL2 setups that plug the corpus term count in
//! here produce different `inl2.avg_p.txt` values, and go negative once a term occurs more
//! than `N` times in the corpus.
//!
//! Reference: Amati & van Rijsbergen (2002). "Probabilistic models of information retrieval
//! based on measuring the divergence from randomness."

use crate::ranker::{finite_or_zero, RankerParams, RankingFunction, TermStats};
use crate::Error;

/// InL2 ranker with normalization constant `c`.
#[derive(Debug, Clone, Copy)]
pub struct InL2 {
    /// Saturation constant; larger values flatten the TF curve.
    pub c: f64,
}

impl Default for InL2 {
    fn default() -> Self {
        Self { c: 1.0 }
    }
}

impl InL2 {
    /// Registry name.
    pub const NAME: &'static str = "inl2";

    /// InL2 with constant `c` (must be positive).
    pub fn new(c: f64) -> Self {
        Self { c }
    }

    /// Build from configuration: `c`.
    pub fn from_params(p: &RankerParams) -> Result<Self, Error> {
        let c = p.f64_or("c", Self::default().c)?;
        let c = p.check("c", c, c > 0.0, "positive")?;
        Ok(Self { c })
    }

    /// Length-normalized term frequency (normalization 2).
    pub fn tfn(&self, s: &TermStats) -> f64 {
        if s.doc_len == 0 || s.avg_doc_len <= 0.0 {
            return 0.0;
        }
        s.doc_term_count as f64 * (1.0 + s.avg_doc_len / s.doc_len as f64).log2()
    }
}

impl RankingFunction for InL2 {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn score_term(&self, s: &TermStats) -> f64 {
        let tfn = self.tfn(s);
        if tfn <= 0.0 {
            return 0.0;
        }
        let n = s.num_docs as f64;
        let df = s.doc_freq.min(s.num_docs) as f64;
        let idf = ((n + 1.0) / (df + 0.5)).log2();
        finite_or_zero(s.query_term_weight * (tfn / (tfn + self.c)) * idf)
    }
}
