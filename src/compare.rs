//! Head-to-head comparison of two rankers over one query set.
//!
//! Both rankers see every query; per-query AP values are collected into two aligned
//! `ApSamples` and compared with a paired t-test. With the `parallel` feature, queries are
//! scored on rayon's pool and the samples are reassembled in query order.

use crate::eval::{ApSamples, Qrels};
use crate::index::InvertedIndex;
use crate::query::Query;
use crate::ranker::RankingFunction;
use crate::retrieve::retrieve;
use crate::stats::{paired_t_test, TTestResult};
use crate::Error;

/// Outcome of comparing ranker A against ranker B.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    /// MAP of ranker A.
    pub map_a: f64,
    /// MAP of ranker B.
    pub map_b: f64,
    /// Two-tailed p-value for "A and B have equal MAP".
    pub p_value: f64,
    /// Full test result.
    pub test: TTestResult,
    /// Per-query AP of ranker A, in query order.
    pub samples_a: ApSamples,
    /// Per-query AP of ranker B, in query order.
    pub samples_b: ApSamples,
}

impl Comparison {
    /// Build a comparison from two sample sequences.
    ///
    /// The sequences must be aligned by query; a length mismatch means a query was
    /// skipped for one ranker and is reported as `Error::SampleLengthMismatch`.
    pub fn from_samples(samples_a: ApSamples, samples_b: ApSamples) -> Result<Self, Error> {
        let test = paired_t_test(samples_a.values(), samples_b.values())?;
        Ok(Self {
            map_a: samples_a.mean_average_precision(),
            map_b: samples_b.mean_average_precision(),
            p_value: test.p_value,
            test,
            samples_a,
            samples_b,
        })
    }
}

/// Runs retrieval + evaluation for rankers over a shared, read-only index and judgments.
#[derive(Debug, Clone, Copy)]
pub struct Comparator<'a> {
    index: &'a InvertedIndex,
    qrels: &'a Qrels,
    k: usize,
}

impl<'a> Comparator<'a> {
    /// Comparator retrieving and evaluating at depth `k`.
    pub fn new(index: &'a InvertedIndex, qrels: &'a Qrels, k: usize) -> Self {
        Self { index, qrels, k }
    }

    /// AP@k of one ranker on one query.
    pub fn average_precision(&self, ranker: &dyn RankingFunction, query: &Query) -> f64 {
        let results = retrieve(self.index, query, ranker, self.k);
        self.qrels.average_precision(&results, query.id, self.k)
    }

    /// Per-query AP of one ranker over `queries`.
    pub fn evaluate(&self, ranker: &dyn RankingFunction, queries: &[Query]) -> ApSamples {
        queries
            .iter()
            .map(|q| self.average_precision(ranker, q))
            .collect()
    }

    fn score_pair(&self, a: &dyn RankingFunction, b: &dyn RankingFunction, q: &Query) -> (f64, f64) {
        let ap_a = self.average_precision(a, q);
        let ap_b = self.average_precision(b, q);
        tracing::debug!(
            query_id = q.id,
            terms = q.len(),
            ap_a,
            ap_b,
            ranker_a = a.name(),
            ranker_b = b.name(),
            "scored query"
        );
        (ap_a, ap_b)
    }

    /// Run both rankers over every query and test the difference in MAP.
    pub fn compare(
        &self,
        a: &dyn RankingFunction,
        b: &dyn RankingFunction,
        queries: &[Query],
    ) -> Result<Comparison, Error> {
        #[cfg(feature = "parallel")]
        let pairs: Vec<(f64, f64)> = {
            use rayon::prelude::*;
            queries
                .par_iter()
                .map(|q| self.score_pair(a, b, q))
                .collect()
        };
        #[cfg(not(feature = "parallel"))]
        let pairs: Vec<(f64, f64)> = queries.iter().map(|q| self.score_pair(a, b, q)).collect();

        let (samples_a, samples_b): (Vec<f64>, Vec<f64>) = pairs.into_iter().unzip();
        let cmp = Comparison::from_samples(samples_a.into(), samples_b.into())?;
        tracing::info!(
            queries = queries.len(),
            map_a = cmp.map_a,
            map_b = cmp.map_b,
            p_value = cmp.p_value,
            "comparison finished"
        );
        Ok(cmp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bm25::OkapiBm25;
    use crate::dfr::InL2;

    fn setup() -> (InvertedIndex, Qrels, Vec<Query>) {
        let docs = [
            "boundary layer flow over a flat plate",
            "supersonic wing flutter",
            "heat transfer in laminar boundary layer",
            "wing design for subsonic aircraft",
            "unrelated text about cooking",
        ];
        let mut ix = InvertedIndex::new();
        for (i, d) in docs.iter().enumerate() {
            ix.add_document(i as u32, &crate::query::analyze(d));
        }
        let mut qrels = Qrels::new();
        qrels.insert(0, 0, 1);
        qrels.insert(0, 2, 1);
        qrels.insert(1, 1, 2);
        qrels.insert(1, 3, 1);
        let queries = vec![
            Query::from_text(0, "boundary layer"),
            Query::from_text(1, "wing"),
            Query::from_text(2, ""),
        ];
        (ix, qrels, queries)
    }

    #[test]
    fn samples_are_aligned_with_queries() {
        let (ix, qrels, queries) = setup();
        let cmp = Comparator::new(&ix, &qrels, 10)
            .compare(&OkapiBm25::default(), &InL2::new(2.0), &queries)
            .unwrap();
        assert_eq!(cmp.samples_a.len(), 3);
        assert_eq!(cmp.samples_b.len(), 3);
        // Both rankers find both relevant docs for the first two queries.
        assert_eq!(cmp.samples_a.values()[0], 1.0);
        assert_eq!(cmp.samples_b.values()[1], 1.0);
        // The empty query matches nothing.
        assert_eq!(cmp.samples_a.values()[2], 0.0);
    }

    #[test]
    fn identical_rankers_are_not_significant() {
        let (ix, qrels, queries) = setup();
        let r = OkapiBm25::default();
        let cmp = Comparator::new(&ix, &qrels, 10)
            .compare(&r, &r, &queries)
            .unwrap();
        assert_eq!(cmp.map_a, cmp.map_b);
        assert!((cmp.p_value - 1.0).abs() < 1e-12);
    }

    #[test]
    fn skipped_query_is_fatal() {
        let (ix, qrels, queries) = setup();
        let c = Comparator::new(&ix, &qrels, 10);
        let a = c.evaluate(&OkapiBm25::default(), &queries);
        let b = c.evaluate(&InL2::default(), &queries[..2]);
        let err = Comparison::from_samples(a, b).unwrap_err();
        assert!(matches!(
            err,
            Error::SampleLengthMismatch { left: 3, right: 2 }
        ));
    }
}
