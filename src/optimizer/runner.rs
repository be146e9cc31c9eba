use crate::alignment::Alignment;
use crate::config::Config;
use crate::error::MsaResult;
use crate::optimizer::progress::{CsvSink, ProgressLog};
use crate::optimizer::{AnnealOutcome, Annealer};
use crate::scorer::ObjectiveBuildParams;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use typed_builder::TypedBuilder;

/// A batch of independent annealing runs over the same starting alignment.
///
/// Every run owns its own evaluator, cache, random source and progress log.
/// With a seed `s`, run `i` (1-based) is seeded with `s + i - 1`, so the
/// batch is reproducible regardless of scheduling.
#[derive(TypedBuilder, Debug, Clone)]
pub struct ExperimentPlan {
    pub config: Config,
    #[builder(default = 1)]
    pub runs: usize,
    /// Progress trace destination; indexed per run when `runs > 1`.
    #[builder(default)]
    pub log_file: Option<PathBuf>,
}

impl ExperimentPlan {
    pub fn run(&self, initial: &Alignment) -> MsaResult<Vec<AnnealOutcome>> {
        self.config.validate()?;
        let runs = self.runs.max(1);

        info!("🔥 Launching {} independent annealing run(s)", runs);

        (0..runs)
            .into_par_iter()
            .map(|i| self.run_one(i, initial.clone()))
            .collect()
    }

    fn run_one(&self, index: usize, initial: Alignment) -> MsaResult<AnnealOutcome> {
        let mut params = self.config.anneal.clone();
        params.seed = params.seed.map(|s| s.wrapping_add(index as u64));

        let evaluator = ObjectiveBuildParams::builder()
            .scoring(self.config.scoring.clone())
            .cache(self.config.cache.clone())
            .build()
            .build_evaluator()?;

        let log = match &self.log_file {
            Some(path) => open_log(&self.log_path(path, index)),
            None => ProgressLog::disabled(),
        };

        Annealer::new(params, evaluator, log)?.run(initial)
    }

    fn log_path(&self, path: &Path, index: usize) -> PathBuf {
        if self.runs > 1 {
            indexed_path(path, index + 1)
        } else {
            path.to_path_buf()
        }
    }
}

/// A trace that cannot be opened leaves the run without one.
fn open_log(path: &Path) -> ProgressLog {
    match CsvSink::create(path).and_then(ProgressLog::spawn) {
        Ok(log) => log,
        Err(e) => {
            warn!(
                "⚠️  Progress log {} unavailable, running without it: {}",
                path.display(),
                e
            );
            ProgressLog::disabled()
        }
    }
}

/// `dir/name.ext` becomes `dir/name.<index>.ext`.
pub fn indexed_path(path: &Path, index: usize) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{}.{}.{}", stem, index, ext.to_string_lossy()),
        None => format!("{}.{}", stem, index),
    };
    path.with_file_name(name)
}
