//! End-to-end evaluation over a hand-built corpus with known AP values.

use rankeval::bm25::OkapiBm25;
use rankeval::dfr::InL2;
use rankeval::{Comparator, Comparison, InvertedIndex, Qrels, Query};

fn toks(s: &str) -> Vec<String> {
    s.split_whitespace().map(str::to_string).collect()
}

/// q1 finds both relevant docs at ranks 1-2 (AP 1), q2 finds its only relevant doc at
/// rank 3 of 3 (AP 1/3), q3 has no relevant docs (AP 0).
fn fixture() -> (InvertedIndex, Qrels, Vec<Query>) {
    let mut ix = InvertedIndex::new();
    for (id, text) in [
        (0, "alpha"),
        (1, "alpha"),
        (2, "beta beta beta"),
        (3, "beta beta"),
        (4, "beta"),
        (5, "gamma"),
    ] {
        ix.add_document(id, &toks(text));
    }

    let mut qrels = Qrels::new();
    qrels.insert(1, 0, 1);
    qrels.insert(1, 1, 1);
    qrels.insert(2, 4, 1);
    qrels.insert(3, 5, 0);

    let queries = vec![
        Query::from_text(1, "alpha"),
        Query::from_text(2, "beta"),
        Query::from_text(3, "gamma"),
    ];
    (ix, qrels, queries)
}

#[test]
fn map_over_three_queries() {
    let (ix, qrels, queries) = fixture();
    let samples = Comparator::new(&ix, &qrels, 10).evaluate(&OkapiBm25::default(), &queries);

    let ap = samples.values();
    assert_eq!(ap[0], 1.0);
    assert!((ap[1] - 1.0 / 3.0).abs() < 1e-12);
    assert_eq!(ap[2], 0.0);
    assert!((samples.mean_average_precision() - 4.0 / 9.0).abs() < 1e-12);
}

#[test]
fn rankers_with_same_ordering_have_p_one() {
    let (ix, qrels, queries) = fixture();
    let cmp = Comparator::new(&ix, &qrels, 10)
        .compare(&OkapiBm25::default(), &InL2::new(1.0), &queries)
        .expect("aligned samples");

    assert_eq!(cmp.samples_a, cmp.samples_b);
    assert!((cmp.map_a - 0.444).abs() < 1e-3);
    assert!((cmp.p_value - 1.0).abs() < 1e-12);
}

#[test]
fn truncation_at_k_changes_ap() {
    let (ix, qrels, queries) = fixture();
    // At k = 2 the relevant doc for q2 (rank 3) falls off the list.
    let samples = Comparator::new(&ix, &qrels, 2).evaluate(&OkapiBm25::default(), &queries);
    assert_eq!(samples.values(), &[1.0, 0.0, 0.0]);
}

#[test]
fn mismatched_samples_are_rejected() {
    let err = Comparison::from_samples(vec![0.1, 0.2, 0.3].into(), vec![0.1, 0.2].into())
        .expect_err("length mismatch");
    assert!(matches!(
        err,
        rankeval::Error::SampleLengthMismatch { left: 3, right: 2 }
    ));
}
