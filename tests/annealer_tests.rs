use msasa::alignment::{Alignment, PadSide};
use msasa::config::{AnnealParams, Config, ScoringParams};
use msasa::error::MsaError;
use msasa::optimizer::progress::{CsvSink, LogReport, ProgressLog};
use msasa::optimizer::runner::ExperimentPlan;
use msasa::optimizer::{should_accept, AnnealOutcome, Annealer, StopReason};
use msasa::scorer::{Evaluator, ObjectiveBuildParams};
use rstest::rstest;
use std::fs;
use std::path::Path;

const SEQS: [&str; 4] = ["MKVLAAGIV", "MKVLGIV", "MRVLAAGV", "KVLAGIV"];

fn quick_params(seed: u64) -> AnnealParams {
    AnnealParams {
        temperature: 1.0,
        cooling_rate: 0.97,
        min_temperature: 0.001,
        max_no_changes: 10_000,
        changes: 2,
        iteration_neighbors: 3,
        seed: Some(seed),
    }
}

fn evaluator(quality: &str) -> Evaluator {
    ObjectiveBuildParams::builder()
        .scoring(ScoringParams {
            quality_function: quality.into(),
            ..Default::default()
        })
        .build()
        .build_evaluator()
        .unwrap()
}

fn initial() -> Alignment {
    Alignment::from_sequences(&SEQS, PadSide::Right).unwrap()
}

fn anneal(params: AnnealParams, quality: &str) -> AnnealOutcome {
    Annealer::new(params, evaluator(quality), ProgressLog::disabled())
        .unwrap()
        .run(initial())
        .unwrap()
}

#[test]
fn test_seeded_runs_are_reproducible() {
    let a = anneal(quick_params(42), "global");
    let b = anneal(quick_params(42), "global");
    assert_eq!(a.alignment, b.alignment);
    assert_eq!(a.final_score, b.final_score);
    assert_eq!(a.best_score, b.best_score);
    assert_eq!(a.iterations, b.iterations);
    assert_eq!(a.total_accepted, b.total_accepted);
}

#[rstest]
#[case("identity")]
#[case("coincidences")]
#[case("similarity_blosum62")]
#[case("similarity_pam250")]
#[case("global")]
#[case("local")]
fn test_outcome_invariants(#[case] quality: &str) {
    let params = quick_params(7);
    let bound = params.max_cooling_iterations();
    let out = anneal(params, quality);

    out.alignment.validate().unwrap();
    for (i, s) in SEQS.iter().enumerate() {
        assert_eq!(out.alignment.residues(i), s.as_bytes());
    }
    assert!(out.best_score >= out.initial_score);
    assert!(out.best_score >= out.final_score);
    assert!(out.iterations <= bound);
    assert_eq!(out.total_accepted + out.total_rejected, out.iterations);
    assert!(out.final_temperature <= 0.001 || out.stop_reason == StopReason::Stalled);
}

#[test]
fn test_cooling_stop_count() {
    // 0.9^k <= 0.01 first holds at k = 44; the check precedes the body,
    // so 43 iterations run.
    let params = AnnealParams {
        temperature: 1.0,
        cooling_rate: 0.9,
        min_temperature: 0.01,
        max_no_changes: 1_000_000,
        changes: 1,
        iteration_neighbors: 1,
        seed: Some(1),
    };
    let out = anneal(params, "global");
    assert_eq!(out.stop_reason, StopReason::Cooled);
    assert_eq!(out.iterations, 43);
}

#[test]
fn test_stall_stops_early() {
    let params = AnnealParams {
        temperature: 1.0,
        cooling_rate: 0.999,
        min_temperature: 1e-9,
        max_no_changes: 1,
        changes: 1,
        iteration_neighbors: 1,
        seed: Some(3),
    };
    let bound = params.max_cooling_iterations();
    let out = anneal(params, "identity");
    assert_eq!(out.stop_reason, StopReason::Stalled);
    assert!(out.iterations < bound);
}

#[test]
fn test_metropolis_rate_matches_boltzmann() {
    let mut rng = fastrand::Rng::with_seed(2024);
    let n = 200_000;
    let hits = (0..n).filter(|_| should_accept(-2.0, 1.0, &mut rng)).count();
    let rate = hits as f64 / n as f64;
    assert!((rate - (-2.0f64).exp()).abs() < 0.005, "rate {}", rate);
}

#[test]
fn test_improvements_always_accepted() {
    let mut rng = fastrand::Rng::with_seed(9);
    assert!((0..10_000).all(|_| should_accept(1e-12, 1e-9, &mut rng)));
}

#[rstest]
#[case(AnnealParams { cooling_rate: 1.0, ..quick_params(0) })]
#[case(AnnealParams { cooling_rate: 0.0, ..quick_params(0) })]
#[case(AnnealParams { min_temperature: 0.0, ..quick_params(0) })]
#[case(AnnealParams { temperature: 0.0001, ..quick_params(0) })]
#[case(AnnealParams { changes: 0, ..quick_params(0) })]
#[case(AnnealParams { iteration_neighbors: 0, ..quick_params(0) })]
fn test_invalid_params_rejected(#[case] params: AnnealParams) {
    let res = Annealer::new(params, evaluator("global"), ProgressLog::disabled());
    assert!(matches!(res, Err(MsaError::Config(_))));
}

#[test]
fn test_progress_log_has_one_row_per_iteration() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trace.tsv");
    let log = ProgressLog::spawn(CsvSink::create(&path).unwrap()).unwrap();

    let out = Annealer::new(quick_params(11), evaluator("global"), log)
        .unwrap()
        .run(initial())
        .unwrap();
    assert_eq!(out.log.written, out.iterations);
    assert_eq!(out.log.failed, 0);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .from_path(&path)
        .unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(&headers[0], "iteration");
    assert_eq!(headers.len(), 20);

    let iterations: Vec<usize> = reader
        .records()
        .map(|r| r.unwrap()[0].parse().unwrap())
        .collect();
    assert_eq!(iterations, (0..out.iterations).collect::<Vec<_>>());
}

#[test]
fn test_experiment_plan_runs_are_independent_and_seeded() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        anneal: quick_params(100),
        ..Default::default()
    };
    let plan = ExperimentPlan::builder()
        .config(config)
        .runs(3)
        .log_file(Some(dir.path().join("trace.tsv")))
        .build();

    let outcomes = plan.run(&initial()).unwrap();
    assert_eq!(outcomes.len(), 3);
    for i in 1..=3 {
        assert!(dir.path().join(format!("trace.{}.tsv", i)).exists());
    }

    // Run i of the plan matches a lone run seeded with 100 + i - 1.
    let lone = anneal(quick_params(101), "global");
    assert_eq!(outcomes[1].alignment, lone.alignment);
    assert_eq!(outcomes[1].final_score, lone.final_score);
}

fn traced_run(path: &Path, seed: u64) -> AnnealOutcome {
    let log = ProgressLog::spawn(CsvSink::create(path).unwrap()).unwrap();
    Annealer::new(quick_params(seed), evaluator("coincidences"), log)
        .unwrap()
        .run(initial())
        .unwrap()
}

#[test]
fn test_seeded_traces_identical_and_best_never_drops() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("a.tsv");
    let second = dir.path().join("b.tsv");
    traced_run(&first, 5);
    traced_run(&second, 5);

    let a = fs::read(&first).unwrap();
    assert!(!a.is_empty());
    assert_eq!(a, fs::read(&second).unwrap());

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .from_path(&first)
        .unwrap();
    let column = reader
        .headers()
        .unwrap()
        .iter()
        .position(|h| h == "best_score")
        .unwrap();
    let best: Vec<f64> = reader
        .records()
        .map(|r| r.unwrap()[column].parse().unwrap())
        .collect();
    assert!(!best.is_empty());
    assert!(best.windows(2).all(|w| w[1] >= w[0]));
}

#[test]
fn test_unwritable_trace_does_not_stop_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        anneal: quick_params(8),
        ..Default::default()
    };
    let plan = ExperimentPlan::builder()
        .config(config)
        .log_file(Some(dir.path().join("missing").join("trace.tsv")))
        .build();

    let outcomes = plan.run(&initial()).unwrap();
    assert_eq!(outcomes.len(), 1);
    assert!(outcomes[0].iterations > 0);
    assert_eq!(outcomes[0].log, LogReport::default());
}
