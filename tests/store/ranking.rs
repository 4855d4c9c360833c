//! Ranking Tests
//!
//! Store-level search: ordering, limit and threshold rules, and how
//! mismatched dimensions are handled.

use crate::common::*;

fn seeded() -> TestStore {
    let t = TestStore::new();
    t.save("v1", &[1.0, 0.0, 0.0]);
    t.save("v2", &[0.0, 1.0, 0.0]);
    t.save("v3", &[0.0, 0.0, 1.0]);
    t.save("v4", &[1.0, 1.0, 0.0]);
    t.save("v5", &[2.0, 0.0, 0.0]);
    t
}

#[test]
fn cosine_scenario_top_three() {
    let t = seeded();
    let results = t.store().search(&[1.0, 0.0, 0.0], 3, 0.0).unwrap();

    assert_eq!(ids(&results), vec!["v1", "v5", "v4"]);
    assert!((results[0].score - 1.0).abs() < 1e-10);
    assert!((results[1].score - 1.0).abs() < 1e-10);
    assert!((results[2].score - 0.7071).abs() < 1e-4);
}

#[test]
fn ranking_is_stable_across_restart() {
    let mut t = seeded();
    let before = ids(&t.store().search(&[1.0, 0.5, 0.0], 0, 0.0).unwrap());
    t.reopen();
    let after = ids(&t.store().search(&[1.0, 0.5, 0.0], 0, 0.0).unwrap());
    assert_eq!(before, after);
}

#[test]
fn limit_zero_means_everything() {
    let t = seeded();
    assert_eq!(t.store().search(&[1.0, 0.0, 0.0], 0, 0.0).unwrap().len(), 5);
    assert_eq!(t.store().search(&[1.0, 0.0, 0.0], 2, 0.0).unwrap().len(), 2);
}

#[test]
fn threshold_excludes_low_scores() {
    let t = seeded();
    let results = t.store().search(&[1.0, 0.0, 0.0], 0, 0.9).unwrap();
    assert_eq!(ids(&results), vec!["v1", "v5"]);
}

#[test]
fn threshold_out_of_range_is_rejected() {
    let t = seeded();
    let err = t.store().search(&[1.0, 0.0, 0.0], 0, 2.0).unwrap_err();
    assert!(err.is_invalid_input());
}

#[test]
fn empty_query_is_rejected() {
    let t = seeded();
    assert!(t.store().search(&[], 0, 0.0).unwrap_err().is_invalid_input());
}

#[test]
fn mismatched_dimension_is_skipped() {
    let t = seeded();
    t.save("flat", &[1.0, 0.0]);

    let results = t.store().search(&[1.0, 0.0, 0.0], 0, 0.0).unwrap();
    assert_eq!(results.len(), 5);
    assert!(!ids(&results).contains(&"flat".to_string()));

    let flat_only = t.store().search(&[1.0, 0.0], 0, 0.0).unwrap();
    assert_eq!(ids(&flat_only), vec!["flat"]);
}

#[test]
fn opposite_vectors_score_minus_one() {
    let t = TestStore::new();
    t.save("up", &[0.0, 1.0]);
    t.save("down", &[0.0, -1.0]);

    let results = t.store().search(&[0.0, 1.0], 0, 0.0).unwrap();
    assert_eq!(ids(&results), vec!["up", "down"]);
    assert!((results[1].score + 1.0).abs() < 1e-10);
}

#[test]
fn configured_metric_is_used() {
    let t = TestStore::with_config(
        StoreConfig::for_testing().with_metric(DistanceMetric::Euclidean),
    );
    t.save("near", &[1.0, 1.0]);
    t.save("far", &[10.0, 10.0]);

    let results = t.store().search(&[0.0, 0.0], 0, 0.0).unwrap();
    assert_eq!(ids(&results), vec!["near", "far"]);
    assert!((results[0].score - 1.0 / (1.0 + 2f64.sqrt())).abs() < 1e-10);
}

#[test]
fn query_builder_matches_search() {
    let t = seeded();
    let direct = t.store().search(&[0.3, 0.7, 0.1], 4, 0.0).unwrap();
    let built = t
        .store()
        .query()
        .similar_to(&[0.3, 0.7, 0.1])
        .limit(4)
        .execute()
        .unwrap();
    assert_eq!(direct, built);
}

#[test]
fn every_metric_orders_scores() {
    let t = seeded();
    for metric in DistanceMetric::ALL {
        let results = t
            .store()
            .search_with(metric, &[0.2, 0.4, 0.9], 0, 0.0)
            .unwrap();
        assert_eq!(results.len(), 5);
        for pair in results.windows(2) {
            assert!(pair[0].score >= pair[1].score, "{} out of order", metric);
        }
    }
}
