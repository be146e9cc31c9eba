use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

struct TestContext {
    dir: TempDir,
    input: PathBuf,
}

impl TestContext {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let input = dir.path().join("input.fasta");
        fs::write(
            &input,
            ">seq1 first\nMKVLAAGIVGLLLA\n>seq2\nMKVLGIVGLLA\n>seq3\nMRVLAAGVGLA\n",
        )
        .unwrap();
        Self { dir, input }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

fn msasa(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_msasa"))
        .args(args)
        .output()
        .expect("Failed to execute msasa")
}

fn s(p: &Path) -> &str {
    p.to_str().unwrap()
}

const QUICK: [&str; 8] = [
    "--seed",
    "5",
    "--temperature",
    "1",
    "--cooling-rate",
    "0.95",
    "--min-temperature",
    "0.001",
];

#[test]
fn test_align_then_verify() {
    let ctx = TestContext::new();
    let output = ctx.path("aligned.fasta");
    let summary = ctx.path("summary.json");

    let mut args = vec![
        "align",
        s(&ctx.input),
        s(&output),
        "--summary",
        s(&summary),
    ];
    args.extend_from_slice(&QUICK);
    let out = msasa(&args);
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(out.status.success(), "align failed: {}", String::from_utf8_lossy(&out.stderr));

    assert!(stdout.contains("ALIGNMENT SUMMARY"));
    let row = Regex::new(r"\|\s*1\s*\|\s*-?\d+\.\d{6}\s*\|").unwrap();
    assert!(row.is_match(&stdout), "no summary row in:\n{}", stdout);

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&summary).unwrap()).unwrap();
    let run = &json[0];
    assert_eq!(run["run"], 1);
    assert_eq!(run["rows"], 3);
    assert_eq!(run["log"]["failed"], 0);
    assert!(run["best_score"].as_f64().unwrap() >= run["initial_score"].as_f64().unwrap());

    let clustal = fs::read_to_string(ctx.path("aligned.fasta.clustal")).unwrap();
    assert!(clustal.starts_with("CLUSTAL"));
    for id in ["seq1", "seq2", "seq3"] {
        assert!(clustal.lines().any(|l| l.starts_with(id)), "{} missing", id);
    }

    let verify = msasa(&["verify", s(&ctx.input), s(&output)]);
    assert!(verify.status.success());
    assert!(String::from_utf8_lossy(&verify.stdout).contains("OK: 3 sequences verified"));
}

#[test]
fn test_multiple_runs_write_indexed_outputs_and_logs() {
    let ctx = TestContext::new();
    let output = ctx.path("aligned.fasta");
    let log = ctx.path("trace.tsv");

    let mut args = vec![
        "align",
        s(&ctx.input),
        s(&output),
        "--runs",
        "2",
        "--log-file",
        s(&log),
        "--quality-function",
        "similarity_blosum62",
    ];
    args.extend_from_slice(&QUICK);
    let out = msasa(&args);
    assert!(out.status.success(), "align failed: {}", String::from_utf8_lossy(&out.stderr));

    for i in 1..=2 {
        assert!(ctx.path(&format!("aligned.{}.fasta", i)).exists());
        assert!(ctx.path(&format!("aligned.{}.fasta.clustal", i)).exists());
        let trace = fs::read_to_string(ctx.path(&format!("trace.{}.tsv", i))).unwrap();
        assert!(trace.starts_with("iteration\tmax_length\t"));
    }
}

#[test]
fn test_config_file_with_cli_override() {
    let ctx = TestContext::new();
    let cfg = ctx.path("cfg.json");
    // The file asks for an unknown objective; the flag replaces it.
    fs::write(&cfg, r#"{ "scoring": { "quality_function": "bogus" } }"#).unwrap();
    let output = ctx.path("aligned.fasta");

    let mut args = vec![
        "align",
        s(&ctx.input),
        s(&output),
        "--config",
        s(&cfg),
        "--quality-function",
        "identity",
    ];
    args.extend_from_slice(&QUICK);
    assert!(msasa(&args).status.success());

    let mut args = vec!["align", s(&ctx.input), s(&output), "--config", s(&cfg)];
    args.extend_from_slice(&QUICK);
    assert!(!msasa(&args).status.success());
}

#[test]
fn test_verify_detects_tampering() {
    let ctx = TestContext::new();
    let tampered = ctx.path("tampered.fasta");
    fs::write(&tampered, ">seq1\nMKVLAAGIVGLLLA\n>seq2\nMKVLGIVGLLA\n").unwrap();
    let out = msasa(&["verify", s(&ctx.input), s(&tampered)]);
    assert!(!out.status.success());
}

#[test]
fn test_bad_cooling_rate_fails() {
    let ctx = TestContext::new();
    let output = ctx.path("aligned.fasta");
    let out = msasa(&[
        "align",
        s(&ctx.input),
        s(&output),
        "--cooling-rate",
        "1.0",
    ]);
    assert!(!out.status.success());
    assert!(!output.exists());
}
