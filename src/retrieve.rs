//! Top-k retrieval: aggregate per-term scores into document scores and keep the best k.
//!
//! - **Candidates**: every document containing at least one query term.
//! - **Aggregation**: `initial_score(doc) + Σ score_term(term, doc)` over distinct query terms,
//!   with repeated terms folded into the query-term weight.
//! - **Output**: sorted deterministically by `(score desc, doc_id asc)`.

use crate::index::InvertedIndex;
use crate::query::Query;
use crate::ranker::RankingFunction;
use std::cmp::{Ordering, Reverse};
use std::collections::{BTreeMap, BinaryHeap};

/// A ranked list of `(doc_id, score)`, best first.
pub type RankedResult = Vec<(u32, f64)>;

#[derive(PartialEq)]
struct FloatOrd(f64);
impl Eq for FloatOrd {}
impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Bounded collector that keeps the `k` best `(score, doc_id)` pairs.
///
/// The heap root is the current worst entry: lowest score, and among equal scores the
/// highest doc id, so ties at the cutoff keep the smaller ids.
struct TopK {
    k: usize,
    heap: BinaryHeap<Reverse<(FloatOrd, Reverse<u32>)>>,
}

impl TopK {
    fn new(k: usize) -> Self {
        Self {
            k,
            heap: BinaryHeap::with_capacity(k + 1),
        }
    }

    fn push(&mut self, doc_id: u32, score: f64) {
        let entry = Reverse((FloatOrd(score), Reverse(doc_id)));
        if self.heap.len() < self.k {
            self.heap.push(entry);
        } else if let Some(worst) = self.heap.peek() {
            // Reverse flips the comparison: `entry < worst` means `entry` ranks better.
            if entry < *worst {
                self.heap.pop();
                self.heap.push(entry);
            }
        }
    }

    fn into_sorted(self) -> RankedResult {
        let mut results: RankedResult = self
            .heap
            .into_iter()
            .map(|Reverse((FloatOrd(score), Reverse(doc_id)))| (doc_id, score))
            .collect();
        results.sort_unstable_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        results
    }
}

/// Score every candidate document for `query` under `ranker`.
///
/// Returned in ascending doc-id order; non-finite aggregates are dropped.
pub fn score_candidates(
    index: &InvertedIndex,
    query: &Query,
    ranker: &dyn RankingFunction,
) -> BTreeMap<u32, f64> {
    let query_length = query.len() as f64;
    let mut acc: BTreeMap<u32, f64> = BTreeMap::new();
    for (term, weight) in query.term_weights() {
        for (doc_id, tf) in index.postings_iter(term) {
            let doc = index.doc_stats(doc_id, query_length);
            let score = acc
                .entry(doc_id)
                .or_insert_with(|| ranker.initial_score(&doc));
            *score += ranker.score_term(&index.term_stats(&doc, term, tf, weight));
        }
    }
    acc.retain(|doc_id, score| {
        if score.is_finite() {
            return true;
        }
        tracing::debug!(doc_id, ranker = ranker.name(), "dropping non-finite score");
        false
    });
    acc
}

/// Retrieve the top-k documents for `query`.
///
/// An empty query, an empty index, or `k == 0` yield an empty list. If fewer than `k`
/// documents match, all matches are returned.
pub fn retrieve(
    index: &InvertedIndex,
    query: &Query,
    ranker: &dyn RankingFunction,
    k: usize,
) -> RankedResult {
    if k == 0 || query.is_empty() || index.num_docs() == 0 {
        return Vec::new();
    }
    let mut top = TopK::new(k);
    for (doc_id, score) in score_candidates(index, query, ranker) {
        top.push(doc_id, score);
    }
    top.into_sorted()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bm25::OkapiBm25;
    use crate::dfr::InL2;
    use crate::query_likelihood::DirichletPrior;
    use crate::ranker::{DocStats, TermStats};

    fn toks(s: &str) -> Vec<String> {
        s.split_whitespace().map(str::to_string).collect()
    }

    fn index(docs: &[&str]) -> InvertedIndex {
        let mut ix = InvertedIndex::new();
        for (i, d) in docs.iter().enumerate() {
            ix.add_document(i as u32, &toks(d));
        }
        ix
    }

    /// Scores every matching doc 1.0 regardless of statistics.
    #[derive(Debug)]
    struct Flat;
    impl RankingFunction for Flat {
        fn name(&self) -> &str {
            "flat"
        }
        fn score_term(&self, _: &TermStats) -> f64 {
            1.0
        }
    }

    #[test]
    fn retrieve_tie_breaks_by_doc_id() {
        let ix = index(&["a x", "a x", "a x", "a x"]);
        let hits = retrieve(&ix, &Query::new(0, toks("a")), &Flat, 2);
        assert_eq!(hits, vec![(0, 1.0), (1, 1.0)]);
    }

    #[test]
    fn only_matching_documents_are_returned() {
        let ix = index(&["apple pie", "banana bread", "apple tart"]);
        let hits = retrieve(&ix, &Query::new(0, toks("apple")), &OkapiBm25::default(), 10);
        let ids: Vec<u32> = hits.iter().map(|h| h.0).collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&0) && ids.contains(&2));
    }

    #[test]
    fn scores_are_summed_over_terms_and_sorted_desc() {
        let ix = index(&["a", "a b", "b"]);
        let hits = retrieve(&ix, &Query::new(0, toks("a b")), &Flat, 10);
        assert_eq!(hits[0], (1, 2.0));
        assert_eq!(hits.len(), 3);
        assert!(hits.windows(2).all(|w| w[0].1 >= w[1].1));
    }

    #[test]
    fn repeated_query_terms_raise_weight_not_candidates() {
        let ix = index(&["wing wing flow", "flow", "other"]);
        let once = retrieve(&ix, &Query::new(0, toks("wing flow")), &InL2::new(1.0), 10);
        let twice = retrieve(&ix, &Query::new(0, toks("wing wing flow")), &InL2::new(1.0), 10);
        assert_eq!(once.len(), twice.len());
        assert!(twice[0].1 > once[0].1);
    }

    #[test]
    fn initial_score_is_added_once_per_document() {
        #[derive(Debug)]
        struct Offset;
        impl RankingFunction for Offset {
            fn name(&self) -> &str {
                "offset"
            }
            fn score_term(&self, _: &TermStats) -> f64 {
                1.0
            }
            fn initial_score(&self, _: &DocStats) -> f64 {
                10.0
            }
        }
        let ix = index(&["a b c"]);
        let hits = retrieve(&ix, &Query::new(0, toks("a b c")), &Offset, 1);
        assert_eq!(hits, vec![(0, 13.0)]);
    }

    #[test]
    fn fewer_matches_than_k_returns_all() {
        let ix = index(&["a", "b", "c"]);
        let hits = retrieve(&ix, &Query::new(0, toks("a c")), &DirichletPrior::default(), 10);
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn empty_inputs_yield_empty_results() {
        let ix = index(&["a"]);
        assert!(retrieve(&ix, &Query::new(0, vec![]), &Flat, 5).is_empty());
        assert!(retrieve(&ix, &Query::new(0, toks("a")), &Flat, 0).is_empty());
        assert!(retrieve(&InvertedIndex::new(), &Query::new(0, toks("a")), &Flat, 5).is_empty());
    }

    #[test]
    fn top_k_keeps_best_under_pressure() {
        let mut top = TopK::new(2);
        for (d, s) in [(5, 0.1), (4, 0.9), (3, 0.5), (2, 0.9), (1, 0.2)] {
            top.push(d, s);
        }
        assert_eq!(top.into_sorted(), vec![(2, 0.9), (4, 0.9)]);
    }
}
