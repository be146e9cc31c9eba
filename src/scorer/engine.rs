use crate::alignment::Alignment;
use crate::error::{MsaError, MsaResult};
use crate::scorer::cache::{CacheStats, ScoreCache};
use crate::scorer::Objective;

/// An objective function bound to its score cache.
///
/// Owned by exactly one annealing run; the cache is never shared.
pub struct Evaluator {
    objective: Objective,
    cache: ScoreCache,
    column_buf: Vec<u8>,
}

impl Evaluator {
    pub fn new(objective: Objective, cache: ScoreCache) -> Self {
        Self {
            objective,
            cache,
            column_buf: Vec::new(),
        }
    }

    /// `divider⁻¹ · Σ score_column(c)` over every column of `alignment`.
    pub fn energy(&mut self, alignment: &Alignment) -> MsaResult<f64> {
        let objective = &self.objective;
        let buf = &mut self.column_buf;

        self.cache.get_alignment_energy(alignment, |cache, aln| {
            let mut total = 0.0;
            for j in 0..aln.cols() {
                aln.copy_column(j, buf);
                total += cache.get_column_energy(buf.as_slice(), |c| objective.score_column(c));
            }
            let energy = total / objective.divider(aln.rows(), aln.cols());

            if !energy.is_finite() {
                return Err(MsaError::Invariant(format!(
                    "objective '{}' produced a non-finite energy for a {}x{} alignment",
                    objective,
                    aln.rows(),
                    aln.cols()
                )));
            }
            Ok(energy)
        })
    }

    pub fn objective(&self) -> &Objective {
        &self.objective
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn cache(&self) -> &ScoreCache {
        &self.cache
    }
}
