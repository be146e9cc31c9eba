use crate::config::{CacheParams, ScoringParams};
use crate::consts::GAP_SYMBOL;
use crate::error::{MsaError, MsaResult};
use crate::scorer::cache::ScoreCache;
use crate::scorer::engine::Evaluator;
use crate::scorer::matrices::SubstitutionMatrix;
use crate::scorer::{ColumnScores, Objective, ObjectiveKind, PairTable};
use tracing::debug;
use typed_builder::TypedBuilder;

/// Linear map of a score range onto [0, 1], or the identity.
#[derive(Debug, Clone, Copy)]
enum Scale {
    Identity,
    Unit { min: f64, max: f64 },
}

impl Scale {
    fn over(rescale: bool, min: f64, max: f64) -> MsaResult<Self> {
        if !rescale {
            return Ok(Scale::Identity);
        }
        if max <= min {
            return Err(MsaError::Config(format!(
                "cannot rescale a degenerate score range [{}, {}]",
                min, max
            )));
        }
        Ok(Scale::Unit { min, max })
    }

    #[inline]
    fn apply(self, v: f64) -> f64 {
        match self {
            Scale::Identity => v,
            Scale::Unit { min, max } => (v - min) / (max - min),
        }
    }
}

/// Produces the total pair tables used by the pairwise objectives.
#[derive(Debug, Clone, Copy)]
pub struct MatrixBuilder {
    pub match_score: f64,
    pub mismatch_score: f64,
    pub gap_penalty: f64,
    pub rescale: bool,
}

impl MatrixBuilder {
    pub fn new(match_score: f64, mismatch_score: f64, gap_penalty: f64, rescale: bool) -> Self {
        Self {
            match_score,
            mismatch_score,
            gap_penalty,
            rescale,
        }
    }

    pub fn from_params(params: &ScoringParams) -> Self {
        Self::new(
            params.match_score,
            params.mismatch_score,
            params.gap_score,
            !params.raw_scores,
        )
    }

    fn configured_min(&self) -> f64 {
        self.match_score.min(self.mismatch_score).min(self.gap_penalty)
    }

    fn configured_max(&self) -> f64 {
        self.match_score.max(self.mismatch_score).max(self.gap_penalty)
    }

    /// Match/mismatch table over the whole alphabet. Gap-vs-gap costs twice
    /// the gap penalty, gap-vs-residue costs it once. The doubled entry is
    /// outside the scaling range, so once rescaled it lies below 0.
    pub fn synthetic(&self) -> MsaResult<PairTable> {
        let scale = Scale::over(self.rescale, self.configured_min(), self.configured_max())?;
        Ok(PairTable::from_fn(|a, b| {
            let raw = match (a == GAP_SYMBOL, b == GAP_SYMBOL) {
                (true, true) => 2.0 * self.gap_penalty,
                (true, false) | (false, true) => self.gap_penalty,
                (false, false) if a == b => self.match_score,
                (false, false) => self.mismatch_score,
            };
            scale.apply(raw)
        }))
    }

    /// Table backed by a biological substitution matrix. Every gap pair costs
    /// the gap penalty; residue pairs the matrix lacks cost the mismatch score.
    pub fn substitution(&self, matrix: &SubstitutionMatrix) -> MsaResult<PairTable> {
        let min = self.configured_min().min(matrix.min());
        let max = self.configured_max().max(matrix.max());
        let scale = Scale::over(self.rescale, min, max)?;
        Ok(PairTable::from_fn(|a, b| {
            let raw = if a == GAP_SYMBOL || b == GAP_SYMBOL {
                self.gap_penalty
            } else {
                matrix.get(a, b).unwrap_or(self.mismatch_score)
            };
            scale.apply(raw)
        }))
    }

    fn column_scores(&self) -> ColumnScores {
        ColumnScores {
            match_score: self.match_score,
            mismatch_score: self.mismatch_score,
            gap_penalty: self.gap_penalty,
        }
    }
}

#[derive(TypedBuilder)]
pub struct ObjectiveBuildParams {
    #[builder(default)]
    pub scoring: ScoringParams,
    #[builder(default)]
    pub cache: CacheParams,
    /// Replaces the built-in table selected by a `similarity_*` objective.
    #[builder(default, setter(strip_option))]
    pub substitution: Option<SubstitutionMatrix>,
}

impl ObjectiveBuildParams {
    pub fn build_objective(&self) -> MsaResult<Objective> {
        self.scoring.validate()?;
        let kind = self.scoring.objective_kind()?;
        let builder = MatrixBuilder::from_params(&self.scoring);

        let objective = match kind {
            ObjectiveKind::Identity => Objective::Identity(builder.column_scores()),
            ObjectiveKind::Coincidences => Objective::Coincidences(builder.column_scores()),
            ObjectiveKind::SimilarityBlosum62 | ObjectiveKind::SimilarityPam250 => {
                let table = match (&self.substitution, kind) {
                    (Some(m), _) => builder.substitution(m)?,
                    (None, ObjectiveKind::SimilarityPam250) => {
                        builder.substitution(&SubstitutionMatrix::pam250())?
                    }
                    (None, _) => builder.substitution(&SubstitutionMatrix::blosum62())?,
                };
                Objective::Similarity(table)
            }
            ObjectiveKind::Global | ObjectiveKind::Local => {
                Objective::GlobalLocal(builder.synthetic()?)
            }
        };

        debug!(
            "Built objective '{}' (selector '{}', rescale={})",
            objective, kind, builder.rescale
        );
        Ok(objective)
    }

    pub fn build_evaluator(self) -> MsaResult<Evaluator> {
        self.cache.validate()?;
        let objective = self.build_objective()?;
        let cache = ScoreCache::new(
            self.cache.column_cache_capacity,
            self.cache.alignment_cache_capacity,
        )?;
        Ok(Evaluator::new(objective, cache))
    }
}
