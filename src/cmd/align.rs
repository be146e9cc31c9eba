use crate::reports;
use clap::{ArgMatches, Args};
use msasa::alignment::{Alignment, PadSide};
use msasa::clustal::{clustal_path, write_clustal};
use msasa::config::Config;
use msasa::error::MsaResult;
use msasa::fasta::{alignment_records, read_fasta, verify_alignment, write_fasta};
use msasa::optimizer::runner::{indexed_path, ExperimentPlan};
use msasa::optimizer::AnnealOutcome;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Args, Debug, Clone)]
pub struct AlignArgs {
    /// Unaligned FASTA input
    pub input: PathBuf,
    /// Aligned FASTA output (indexed per run when --runs > 1); a Clustal
    /// copy is written next to it with a `.clustal` suffix
    pub output: PathBuf,

    #[command(flatten)]
    pub config: Config,

    /// JSON configuration; flags typed on the command line take precedence
    #[arg(long = "config")]
    pub config_file: Option<PathBuf>,

    /// Tab-separated per-iteration trace
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    #[arg(long, default_value_t = 1)]
    pub runs: usize,

    /// JSON summary of every run
    #[arg(long)]
    pub summary: Option<PathBuf>,
}

#[derive(Serialize)]
struct RunSummary<'a> {
    run: usize,
    output: &'a Path,
    rows: usize,
    cols: usize,
    #[serde(flatten)]
    outcome: &'a AnnealOutcome,
}

pub fn run(args: AlignArgs, matches: &ArgMatches) -> MsaResult<()> {
    let config = resolve_config(&args, matches)?;
    config.validate()?;

    info!("📂 Loading sequences: {}", args.input.display());
    let records = read_fasta(&args.input)?;
    let ids: Vec<String> = records.iter().map(|r| r.id.clone()).collect();
    let sequences: Vec<&[u8]> = records.iter().map(|r| r.sequence.as_slice()).collect();

    let mut rng = match config.anneal.seed {
        Some(s) => fastrand::Rng::with_seed(s),
        None => fastrand::Rng::new(),
    };
    let side = PadSide::random(&mut rng);
    let initial = Alignment::from_sequences(&sequences, side)?;
    info!(
        "🧬 Initial alignment {}x{} (padded {:?})",
        initial.rows(),
        initial.cols(),
        side
    );

    let plan = ExperimentPlan::builder()
        .config(config)
        .runs(args.runs)
        .log_file(args.log_file.clone())
        .build();
    let outcomes = plan.run(&initial)?;

    let mut outputs = Vec::with_capacity(outcomes.len());
    for (i, outcome) in outcomes.iter().enumerate() {
        let path = if outcomes.len() > 1 {
            indexed_path(&args.output, i + 1)
        } else {
            args.output.clone()
        };
        let aligned = alignment_records(&ids, &outcome.alignment)?;
        write_fasta(&path, &aligned)?;
        verify_alignment(&records, &read_fasta(&path)?)?;
        write_clustal(clustal_path(&path), &aligned)?;
        if outcome.log.failed > 0 {
            warn!(
                "⚠️  Run {}: {} of {} progress records were not written",
                i + 1,
                outcome.log.failed,
                outcome.log.submitted
            );
        }
        info!("💾 Run {} written to {}", i + 1, path.display());
        outputs.push(path);
    }

    reports::print_run_summary(&outcomes, &outputs);

    if let Some(path) = &args.summary {
        let summary: Vec<RunSummary> = outcomes
            .iter()
            .zip(&outputs)
            .enumerate()
            .map(|(i, (outcome, output))| RunSummary {
                run: i + 1,
                output,
                rows: outcome.alignment.rows(),
                cols: outcome.alignment.cols(),
                outcome,
            })
            .collect();
        serde_json::to_writer_pretty(BufWriter::new(File::create(path)?), &summary)?;
        info!("📝 Summary written to {}", path.display());
    }

    Ok(())
}

/// The JSON file (when given) is the base; explicit flags override it.
fn resolve_config(args: &AlignArgs, matches: &ArgMatches) -> MsaResult<Config> {
    let Some(path) = &args.config_file else {
        return Ok(args.config.clone());
    };
    info!("⚖️  Loading configuration from: {}", path.display());
    let mut config = Config::load_from_file(path)?;
    config.merge_from_cli(&args.config, matches);
    Ok(config)
}
