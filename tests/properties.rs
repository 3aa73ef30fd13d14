//! Property-based tests for ranking and evaluation invariants.

use proptest::prelude::*;
use rankeval::dfr::InL2;
use rankeval::eval::{average_precision, mean_average_precision};
use rankeval::ranker::{RankerParams, Registry};
use rankeval::stats::paired_t_test;
use rankeval::{Qrels, RankingFunction, TermStats};

// ── Strategies ────────────────────────────────────────────────────────

fn arb_term_stats() -> impl Strategy<Value = TermStats> {
    (
        1_u64..10_000,      // num_docs
        1_u64..500,         // doc_len
        0.0_f64..500.0,     // avg_doc_len
        0_u64..50,          // doc_term_count
        0_u64..20_000,      // doc_freq (may exceed num_docs)
        1_u64..100_000,     // corpus_term_count
        0.0_f64..5.0,       // query_term_weight
    )
        .prop_map(|(num_docs, doc_len, avg_doc_len, tf, df, ctf, w)| TermStats {
            num_docs,
            total_terms: ctf.max(num_docs * 3),
            avg_doc_len,
            query_length: 3.0,
            doc_len,
            doc_unique_terms: (doc_len / 2).max(1),
            doc_term_count: tf.min(doc_len),
            doc_freq: df,
            corpus_term_count: ctf,
            query_term_weight: w,
        })
}

fn arb_ranked_ids() -> impl Strategy<Value = Vec<u32>> {
    prop::collection::vec(0_u32..50, 0..=30)
}

// ── Properties ────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn inl2_is_finite_and_non_negative(s in arb_term_stats(), c in 0.01_f64..100.0) {
        let score = InL2::new(c).score_term(&s);
        prop_assert!(score.is_finite());
        prop_assert!(score >= 0.0);
    }

    #[test]
    fn every_builtin_is_finite(s in arb_term_stats()) {
        let registry = Registry::default();
        for name in registry.names() {
            let r = registry.build(&RankerParams::defaults(name)).unwrap();
            prop_assert!(r.score_term(&s).is_finite(), "{}", name);
        }
    }

    #[test]
    fn average_precision_is_a_fraction(
        ids in arb_ranked_ids(),
        relevant in prop::collection::btree_set(0_u32..50, 0..=20),
        k in 1_usize..=40,
    ) {
        let mut qrels = Qrels::new();
        for &d in &relevant {
            qrels.insert(0, d, 1);
        }
        let results: Vec<(u32, f64)> = ids.iter().map(|&d| (d, 1.0)).collect();
        let ap = qrels.average_precision(&results, 0, k);
        prop_assert!((0.0..=1.0).contains(&ap));
        if relevant.is_empty() {
            prop_assert_eq!(ap, 0.0);
        }
    }

    #[test]
    fn relevant_first_ordering_is_perfect(total in 1_usize..30, extra in 0_usize..30) {
        let flags = std::iter::repeat(true).take(total).chain(std::iter::repeat(false).take(extra));
        let ap = average_precision(flags, total, total + extra);
        prop_assert!((ap - 1.0).abs() < 1e-12);
    }

    #[test]
    fn map_lies_within_sample_range(samples in prop::collection::vec(0.0_f64..=1.0, 1..50)) {
        let map = mean_average_precision(&samples);
        let lo = samples.iter().cloned().fold(f64::INFINITY, f64::min);
        let hi = samples.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        prop_assert!(map >= lo - 1e-12 && map <= hi + 1e-12);
    }

    #[test]
    fn identical_samples_have_p_one(samples in prop::collection::vec(0.0_f64..=1.0, 0..50)) {
        let r = paired_t_test(&samples, &samples).unwrap();
        prop_assert_eq!(r.p_value, 1.0);
    }

    #[test]
    fn p_value_is_a_probability(
        pairs in prop::collection::vec((0.0_f64..=1.0, 0.0_f64..=1.0), 2..50),
    ) {
        let (a, b): (Vec<f64>, Vec<f64>) = pairs.into_iter().unzip();
        let r = paired_t_test(&a, &b).unwrap();
        prop_assert!((0.0..=1.0).contains(&r.p_value));
    }
}
