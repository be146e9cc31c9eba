use msasa::alignment::Alignment;
use msasa::config::{CacheParams, ScoringParams};
use msasa::error::MsaError;
use msasa::scorer::{CacheStats, ObjectiveBuildParams, ScoreCache};

fn aln(rows: &[&str]) -> Alignment {
    Alignment::from_rows(rows.iter().map(|r| r.as_bytes().to_vec()).collect()).unwrap()
}

fn identity_evaluator(column_cap: usize, alignment_cap: usize) -> msasa::scorer::Evaluator {
    ObjectiveBuildParams::builder()
        .scoring(ScoringParams {
            quality_function: "identity".into(),
            ..Default::default()
        })
        .cache(CacheParams {
            column_cache_capacity: column_cap,
            alignment_cache_capacity: alignment_cap,
        })
        .build()
        .build_evaluator()
        .unwrap()
}

#[test]
fn test_repeated_alignment_is_a_hit() {
    let mut ev = identity_evaluator(16, 16);
    let a = aln(&["ACGT", "ACGA"]);

    let first = ev.energy(&a).unwrap();
    let second = ev.energy(&a.clone()).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        ev.stats(),
        CacheStats {
            column_calls: 4,
            column_hits: 0,
            alignment_calls: 2,
            alignment_hits: 1,
        }
    );
}

#[test]
fn test_identical_columns_share_one_entry() {
    let mut ev = identity_evaluator(16, 16);
    ev.energy(&aln(&["AAA", "AAA"])).unwrap();
    let stats = ev.stats();
    assert_eq!(stats.column_calls, 3);
    assert_eq!(stats.column_hits, 2);
    assert_eq!(ev.cache().column_len(), 1);
}

#[test]
fn test_column_keys_are_order_sensitive() {
    let mut ev = identity_evaluator(16, 16);
    ev.energy(&aln(&["A", "C"])).unwrap();
    ev.energy(&aln(&["C", "A"])).unwrap();
    assert_eq!(ev.stats().column_hits, 0);
    assert_eq!(ev.cache().column_len(), 2);
}

#[test]
fn test_shape_is_part_of_the_alignment_key() {
    // Same bytes, different shape.
    let mut ev = identity_evaluator(16, 16);
    ev.energy(&aln(&["AC", "GT"])).unwrap();
    ev.energy(&aln(&["ACGT"])).unwrap();
    assert_eq!(ev.stats().alignment_hits, 0);
}

#[test]
fn test_capacity_bounds_entries() {
    let mut ev = identity_evaluator(2, 1);
    ev.energy(&aln(&["ACG", "ACG"])).unwrap();
    ev.energy(&aln(&["GCA", "GCA"])).unwrap();
    assert!(ev.cache().column_len() <= 2);
    assert_eq!(ev.cache().alignment_len(), 1);

    // The first alignment was evicted, so this is a miss with the same value.
    let again = ev.energy(&aln(&["ACG", "ACG"])).unwrap();
    assert_eq!(again, 1.0);
    assert_eq!(ev.stats().alignment_hits, 0);
}

#[test]
fn test_zero_capacity_rejected() {
    assert!(matches!(ScoreCache::new(0, 1), Err(MsaError::Config(_))));
    assert!(matches!(ScoreCache::new(1, 0), Err(MsaError::Config(_))));
}

#[test]
fn test_cached_value_matches_fresh_computation() {
    let a = aln(&["AC-T", "ACGT", "-CGT"]);
    let mut warm = identity_evaluator(1024, 1024);
    warm.energy(&a).unwrap();
    let cached = warm.energy(&a).unwrap();
    let fresh = identity_evaluator(1024, 1024).energy(&a).unwrap();
    assert_eq!(cached, fresh);
}
