//! Query likelihood language-model rankers.
//!
//! Ranks documents by `log P(Q|D)` under a smoothed document language model (Ponte & Croft,
//! 1998). Written in the rank-equivalent form that only touches matching terms:
//!
//! ```text
//! log P(Q|D) ≐ |Q| * ln(α_d) + Σ_{t ∈ Q ∩ D} w_t * ln(p_s(t|D) / (α_d * p(t|C)))
//! ```
//!
//! The first part is the per-document `initial_score`; the sum is `score_term`. Each smoothing
//! method only defines `p_s` and the document constant `α_d`.
//!
//! Reference: Zhai & Lafferty (2004). "A study of smoothing methods for language models
//! applied to information retrieval."

use crate::ranker::{finite_or_zero, DocStats, RankerParams, RankingFunction, TermStats};
use crate::Error;

/// Shared scoring for all smoothing methods.
fn lm_score_term(p_smoothed: f64, doc_constant: f64, s: &TermStats) -> f64 {
    let p_corpus = s.corpus_prob();
    if s.doc_len == 0 || p_corpus <= 0.0 || doc_constant <= 0.0 || p_smoothed <= 0.0 {
        return 0.0;
    }
    finite_or_zero(s.query_term_weight * (p_smoothed / (doc_constant * p_corpus)).ln())
}

fn lm_initial_score(doc_constant: f64, doc: &DocStats) -> f64 {
    if doc_constant <= 0.0 {
        return 0.0;
    }
    finite_or_zero(doc.query_length * doc_constant.ln())
}

/// Bayesian smoothing with a Dirichlet prior of strength `mu`.
#[derive(Debug, Clone, Copy)]
pub struct DirichletPrior {
    /// Prior strength (pseudo-count of corpus tokens).
    pub mu: f64,
}

impl Default for DirichletPrior {
    fn default() -> Self {
        Self { mu: 2000.0 }
    }
}

impl DirichletPrior {
    /// Registry name.
    pub const NAME: &'static str = "dirichlet-prior";

    /// Build from configuration: `mu`.
    pub fn from_params(p: &RankerParams) -> Result<Self, Error> {
        let mu = p.f64_or("mu", Self::default().mu)?;
        let mu = p.check("mu", mu, mu > 0.0, "positive")?;
        Ok(Self { mu })
    }

    fn doc_constant(&self, doc_len: u64) -> f64 {
        self.mu / (doc_len as f64 + self.mu)
    }
}

impl RankingFunction for DirichletPrior {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn score_term(&self, s: &TermStats) -> f64 {
        let ps = (s.doc_term_count as f64 + self.mu * s.corpus_prob())
            / (s.doc_len as f64 + self.mu);
        lm_score_term(ps, self.doc_constant(s.doc_len), s)
    }

    fn initial_score(&self, doc: &DocStats) -> f64 {
        lm_initial_score(self.doc_constant(doc.doc_len), doc)
    }
}

/// Linear interpolation with the corpus model (Jelinek-Mercer).
#[derive(Debug, Clone, Copy)]
pub struct JelinekMercer {
    /// Weight of the corpus model, in `(0, 1)`.
    pub lambda: f64,
}

impl Default for JelinekMercer {
    fn default() -> Self {
        Self { lambda: 0.7 }
    }
}

impl JelinekMercer {
    /// Registry name.
    pub const NAME: &'static str = "jelinek-mercer";

    /// Build from configuration: `lambda`.
    pub fn from_params(p: &RankerParams) -> Result<Self, Error> {
        let lambda = p.f64_or("lambda", Self::default().lambda)?;
        let lambda = p.check("lambda", lambda, lambda > 0.0 && lambda < 1.0, "in (0, 1)")?;
        Ok(Self { lambda })
    }
}

impl RankingFunction for JelinekMercer {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn score_term(&self, s: &TermStats) -> f64 {
        if s.doc_len == 0 {
            return 0.0;
        }
        let p_doc = s.doc_term_count as f64 / s.doc_len as f64;
        let ps = (1.0 - self.lambda) * p_doc + self.lambda * s.corpus_prob();
        lm_score_term(ps, self.lambda, s)
    }

    fn initial_score(&self, doc: &DocStats) -> f64 {
        lm_initial_score(self.lambda, doc)
    }
}

/// Absolute discounting: subtract `delta` from every seen count and redistribute the mass.
#[derive(Debug, Clone, Copy)]
pub struct AbsoluteDiscount {
    /// Discount in `(0, 1)`.
    pub delta: f64,
}

impl Default for AbsoluteDiscount {
    fn default() -> Self {
        Self { delta: 0.7 }
    }
}

impl AbsoluteDiscount {
    /// Registry name.
    pub const NAME: &'static str = "absolute-discount";

    /// Build from configuration: `delta`.
    pub fn from_params(p: &RankerParams) -> Result<Self, Error> {
        let delta = p.f64_or("delta", Self::default().delta)?;
        let delta = p.check("delta", delta, delta > 0.0 && delta < 1.0, "in (0, 1)")?;
        Ok(Self { delta })
    }

    fn doc_constant(&self, doc_len: u64, unique_terms: u64) -> f64 {
        if doc_len == 0 {
            return 0.0;
        }
        self.delta * unique_terms as f64 / doc_len as f64
    }
}

impl RankingFunction for AbsoluteDiscount {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn score_term(&self, s: &TermStats) -> f64 {
        if s.doc_len == 0 {
            return 0.0;
        }
        let alpha = self.doc_constant(s.doc_len, s.doc_unique_terms);
        let discounted = (s.doc_term_count as f64 - self.delta).max(0.0);
        let ps = discounted / s.doc_len as f64 + alpha * s.corpus_prob();
        lm_score_term(ps, alpha, s)
    }

    fn initial_score(&self, doc: &DocStats) -> f64 {
        lm_initial_score(self.doc_constant(doc.doc_len, doc.doc_unique_terms), doc)
    }
}
