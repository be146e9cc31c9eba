use crate::consts::{DEFAULT_ALIGNMENT_CACHE_CAPACITY, DEFAULT_COLUMN_CACHE_CAPACITY};
use crate::error::{MsaError, MsaResult};
use crate::scorer::ObjectiveKind;
use clap::{parser::ValueSource, ArgMatches, Args};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;

#[derive(Args, Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    #[command(flatten)]
    pub anneal: AnnealParams,
    #[command(flatten)]
    pub scoring: ScoringParams,
    #[command(flatten)]
    pub cache: CacheParams,
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnealParams {
    /// Initial temperature of the system
    #[arg(long, default_value_t = 5.0)]
    pub temperature: f64,
    /// Geometric cooling factor applied once per iteration
    #[arg(long, default_value_t = 0.999)]
    pub cooling_rate: f64,
    #[arg(long, default_value_t = 0.000001)]
    pub min_temperature: f64,
    /// Consecutive iterations without a score change before stopping
    #[arg(long, default_value_t = 15_000)]
    pub max_no_changes: usize,
    /// Upper bound of chained mutations per sampled neighbor
    #[arg(long, default_value_t = 1)]
    pub changes: usize,
    /// Neighbors sampled per iteration (best one competes)
    #[arg(long, default_value_t = 1)]
    pub iteration_neighbors: usize,
    #[arg(long)]
    pub seed: Option<u64>,
}

impl Default for AnnealParams {
    fn default() -> Self {
        Self {
            temperature: 5.0,
            cooling_rate: 0.999,
            min_temperature: 0.000001,
            max_no_changes: 15_000,
            changes: 1,
            iteration_neighbors: 1,
            seed: None,
        }
    }
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringParams {
    /// identity | coincidences | similarity_blosum62 | similarity_pam250 | global | local
    #[arg(long, default_value = "global")]
    pub quality_function: String,
    #[arg(long, default_value_t = 1.0, allow_hyphen_values = true)]
    pub match_score: f64,
    #[arg(long, default_value_t = -1.0, allow_hyphen_values = true)]
    pub mismatch_score: f64,
    #[arg(long, default_value_t = -10.0, allow_hyphen_values = true)]
    pub gap_score: f64,
    /// Keep raw substitution scores instead of rescaling them into [0, 1]
    #[arg(long, default_value_t = false)]
    pub raw_scores: bool,
}

impl Default for ScoringParams {
    fn default() -> Self {
        Self {
            quality_function: "global".to_string(),
            match_score: 1.0,
            mismatch_score: -1.0,
            gap_score: -10.0,
            raw_scores: false,
        }
    }
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheParams {
    #[arg(long, default_value_t = DEFAULT_COLUMN_CACHE_CAPACITY)]
    pub column_cache_capacity: usize,
    #[arg(long, default_value_t = DEFAULT_ALIGNMENT_CACHE_CAPACITY)]
    pub alignment_cache_capacity: usize,
}

impl Default for CacheParams {
    fn default() -> Self {
        Self {
            column_cache_capacity: DEFAULT_COLUMN_CACHE_CAPACITY,
            alignment_cache_capacity: DEFAULT_ALIGNMENT_CACHE_CAPACITY,
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> MsaResult<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Rejects any configuration the annealer cannot run with.
    pub fn validate(&self) -> MsaResult<()> {
        self.anneal.validate()?;
        self.scoring.validate()?;
        self.cache.validate()
    }

    /// Overlays flags typed on the command line onto a file-loaded config.
    pub fn merge_from_cli(&mut self, cli: &Config, matches: &ArgMatches) {
        macro_rules! update_if_present {
            ($group:ident . $field:ident) => {
                if matches.value_source(stringify!($field)) == Some(ValueSource::CommandLine) {
                    self.$group.$field = cli.$group.$field.clone();
                }
            };
        }

        update_if_present!(anneal.temperature);
        update_if_present!(anneal.cooling_rate);
        update_if_present!(anneal.min_temperature);
        update_if_present!(anneal.max_no_changes);
        update_if_present!(anneal.changes);
        update_if_present!(anneal.iteration_neighbors);
        update_if_present!(anneal.seed);

        update_if_present!(scoring.quality_function);
        update_if_present!(scoring.match_score);
        update_if_present!(scoring.mismatch_score);
        update_if_present!(scoring.gap_score);
        update_if_present!(scoring.raw_scores);

        update_if_present!(cache.column_cache_capacity);
        update_if_present!(cache.alignment_cache_capacity);
    }
}

impl AnnealParams {
    pub fn validate(&self) -> MsaResult<()> {
        if !(self.cooling_rate > 0.0 && self.cooling_rate < 1.0) {
            return Err(MsaError::Config(format!(
                "cooling_rate must lie in (0, 1), got {}",
                self.cooling_rate
            )));
        }
        if !self.temperature.is_finite() || !self.min_temperature.is_finite() {
            return Err(MsaError::Config("temperatures must be finite".into()));
        }
        if self.min_temperature <= 0.0 {
            return Err(MsaError::Config(format!(
                "min_temperature must be positive, got {}",
                self.min_temperature
            )));
        }
        if self.temperature <= self.min_temperature {
            return Err(MsaError::Config(format!(
                "temperature {} must exceed min_temperature {}",
                self.temperature, self.min_temperature
            )));
        }
        if self.changes == 0 {
            return Err(MsaError::Config("changes must be at least 1".into()));
        }
        if self.iteration_neighbors == 0 {
            return Err(MsaError::Config(
                "iteration_neighbors must be at least 1".into(),
            ));
        }
        if self.max_no_changes == 0 {
            return Err(MsaError::Config("max_no_changes must be at least 1".into()));
        }
        Ok(())
    }

    /// Upper bound on iterations before the temperature reaches its floor.
    pub fn max_cooling_iterations(&self) -> usize {
        let steps = (self.min_temperature / self.temperature).ln() / self.cooling_rate.ln();
        steps.ceil().max(0.0) as usize
    }
}

impl ScoringParams {
    pub fn objective_kind(&self) -> MsaResult<ObjectiveKind> {
        ObjectiveKind::from_str(self.quality_function.trim()).map_err(|_| {
            MsaError::Config(format!(
                "Unknown quality function '{}'",
                self.quality_function
            ))
        })
    }

    pub fn validate(&self) -> MsaResult<()> {
        self.objective_kind()?;
        for (name, v) in [
            ("match_score", self.match_score),
            ("mismatch_score", self.mismatch_score),
            ("gap_score", self.gap_score),
        ] {
            if !v.is_finite() {
                return Err(MsaError::Config(format!("{} must be finite", name)));
            }
        }
        Ok(())
    }
}

impl CacheParams {
    pub fn validate(&self) -> MsaResult<()> {
        if self.column_cache_capacity == 0 || self.alignment_cache_capacity == 0 {
            return Err(MsaError::Config("cache capacities must be positive".into()));
        }
        Ok(())
    }
}
