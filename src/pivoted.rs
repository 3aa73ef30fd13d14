//! Pivoted length normalization (the classic TF-IDF vector-space ranker).
//!
//! ```text
//! score = w * (1 + ln(1 + ln(tf))) / ((1 - s) + s * dl / avgdl) * ln((N + 1) / (df + 0.5))
//! ```
//!
//! Reference: Singhal, Buckley & Mitra (1996). "Pivoted document length normalization."

use crate::ranker::{finite_or_zero, RankerParams, RankingFunction, TermStats};
use crate::Error;

/// Pivoted-length ranker with slope `s`.
#[derive(Debug, Clone, Copy)]
pub struct PivotedLength {
    /// Pivot slope in `[0, 1]`; 0 disables length normalization.
    pub s: f64,
}

impl Default for PivotedLength {
    fn default() -> Self {
        Self { s: 0.2 }
    }
}

impl PivotedLength {
    /// Registry name.
    pub const NAME: &'static str = "pivoted-length";

    /// Build from configuration: `s`.
    pub fn from_params(p: &RankerParams) -> Result<Self, Error> {
        let s = p.f64_or("s", Self::default().s)?;
        let s = p.check("s", s, (0.0..=1.0).contains(&s), "in [0, 1]")?;
        Ok(Self { s })
    }
}

/// Doubly-logarithmic TF: `1 + ln(1 + ln(tf))` for `tf > 0`.
fn sublinear_tf(tf: u64) -> f64 {
    if tf == 0 {
        return 0.0;
    }
    1.0 + (1.0 + (tf as f64).ln()).ln()
}

impl RankingFunction for PivotedLength {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn score_term(&self, st: &TermStats) -> f64 {
        if st.doc_term_count == 0 || st.avg_doc_len <= 0.0 {
            return 0.0;
        }
        let norm = (1.0 - self.s) + self.s * st.doc_len as f64 / st.avg_doc_len;
        if norm <= 0.0 {
            return 0.0;
        }
        let n = st.num_docs as f64;
        let df = st.doc_freq.min(st.num_docs) as f64;
        let idf = ((n + 1.0) / (df + 0.5)).ln();
        finite_or_zero(st.query_term_weight * sublinear_tf(st.doc_term_count) / norm * idf)
    }
}
