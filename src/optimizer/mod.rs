pub mod mutation;
pub mod progress;
pub mod runner;

use self::progress::{LogReport, ProgressLog, ProgressRecord};
use crate::alignment::Alignment;
use crate::config::AnnealParams;
use crate::error::{MsaError, MsaResult};
use crate::scorer::{CacheStats, Evaluator};
use serde::Serialize;
use tracing::{debug, info};

/// Probability of taking a move that changes the energy by `score_change`.
///
/// Improvements are always taken. Anything else follows `exp(Δ/T)`, which
/// underflows to 0 for very negative ratios. A non-positive temperature or
/// a NaN ratio yields 0.
pub fn acceptance_probability(score_change: f64, temperature: f64) -> f64 {
    if score_change > 0.0 {
        return 1.0;
    }
    if temperature <= 0.0 {
        return 0.0;
    }
    let p = (score_change / temperature).exp();
    if p.is_nan() {
        0.0
    } else {
        p.min(1.0)
    }
}

/// Metropolis criterion with a fresh uniform draw in [0, 1).
pub fn should_accept(score_change: f64, temperature: f64, rng: &mut fastrand::Rng) -> bool {
    score_change > 0.0 || rng.f64() < acceptance_probability(score_change, temperature)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum_macros::Display)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    #[strum(to_string = "cooled")]
    Cooled,
    #[strum(to_string = "stalled")]
    Stalled,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnnealOutcome {
    #[serde(skip)]
    pub alignment: Alignment,
    pub final_temperature: f64,
    pub initial_score: f64,
    pub final_score: f64,
    pub best_score: f64,
    pub iterations: usize,
    pub stop_reason: StopReason,
    pub total_accepted: usize,
    pub total_rejected: usize,
    pub cache: CacheStats,
    pub log: LogReport,
}

/// Single-threaded simulated annealing over alignments.
///
/// Owns its evaluator (objective + cache), its random source and its
/// progress log for the duration of one run.
pub struct Annealer {
    params: AnnealParams,
    evaluator: Evaluator,
    rng: fastrand::Rng,
    log: ProgressLog,
}

impl Annealer {
    pub fn new(params: AnnealParams, evaluator: Evaluator, log: ProgressLog) -> MsaResult<Self> {
        params.validate()?;
        let rng = match params.seed {
            Some(s) => fastrand::Rng::with_seed(s),
            None => fastrand::Rng::new(),
        };
        Ok(Self {
            params,
            evaluator,
            rng,
            log,
        })
    }

    pub fn run(mut self, initial: Alignment) -> MsaResult<AnnealOutcome> {
        initial.validate()?;

        let mut current = initial;
        let mut current_score = self.evaluator.energy(&current)?;
        let initial_score = current_score;
        let mut best_score = current_score;
        let mut temperature = self.params.temperature;

        let mut iteration = 0;
        let mut no_changes = 0;
        let mut total_accepted = 0;
        let mut total_rejected = 0;

        info!(
            "Annealing {}x{} alignment with '{}' (T0={}, rate={}, Tmin={})",
            current.rows(),
            current.cols(),
            self.evaluator.objective(),
            temperature,
            self.params.cooling_rate,
            self.params.min_temperature
        );

        let stop_reason = loop {
            temperature *= self.params.cooling_rate;
            if temperature <= self.params.min_temperature {
                break StopReason::Cooled;
            }
            if no_changes >= self.params.max_no_changes {
                break StopReason::Stalled;
            }

            let iteration_score = current_score;
            let (candidate, new_score) = self.best_neighbor(&current)?;
            let score_change = new_score - current_score;

            let accepted = should_accept(score_change, temperature, &mut self.rng);
            if accepted {
                current = candidate;
                current_score = new_score;
                total_accepted += 1;
                if new_score > best_score {
                    best_score = new_score;
                }
            } else {
                total_rejected += 1;
            }

            if iteration_score == current_score {
                no_changes += 1;
            } else {
                no_changes = 0;
            }

            let stats = self.evaluator.stats();
            self.log.submit(ProgressRecord {
                iteration,
                max_length: current.cols(),
                temperature,
                current_score,
                iteration_score,
                new_score,
                score_change,
                score_change_pct: percent_of(score_change, initial_score),
                best_score,
                historical_improvement: best_score - initial_score,
                historical_improvement_pct: percent_of(best_score - initial_score, initial_score),
                total_accepted,
                total_rejected,
                accepted,
                no_changes,
                acceptance: acceptance_probability(score_change, temperature),
                alignment_calls: stats.alignment_calls,
                alignment_hits: stats.alignment_hits,
                column_calls: stats.column_calls,
                column_hits: stats.column_hits,
            });

            iteration += 1;
        };

        let cache = self.evaluator.stats();
        let log = self.log.finish();

        info!(
            "Annealing {} after {} iterations: initial={:.6} final={:.6} best={:.6} T={:.3e}",
            stop_reason, iteration, initial_score, current_score, best_score, temperature
        );
        debug!(
            "Cache: alignments {}/{} hits, columns {}/{} hits; log {:?}",
            cache.alignment_hits, cache.alignment_calls, cache.column_hits, cache.column_calls, log
        );

        Ok(AnnealOutcome {
            alignment: current,
            final_temperature: temperature,
            initial_score,
            final_score: current_score,
            best_score,
            iterations: iteration,
            stop_reason,
            total_accepted,
            total_rejected,
            cache,
            log,
        })
    }

    /// Samples `iteration_neighbors` candidates, each `1..=changes` chained
    /// mutations away from `current`, and keeps the first highest-scoring one.
    fn best_neighbor(&mut self, current: &Alignment) -> MsaResult<(Alignment, f64)> {
        let mut best: Option<(Alignment, f64)> = None;

        for _ in 0..self.params.iteration_neighbors {
            let depth = self.rng.usize(1..=self.params.changes);
            let mut candidate = mutation::generate_neighbor(current, &mut self.rng)?;
            for _ in 1..depth {
                candidate = mutation::generate_neighbor(&candidate, &mut self.rng)?;
            }
            let score = self.evaluator.energy(&candidate)?;

            match &best {
                Some((_, best_score)) if score <= *best_score => {}
                _ => best = Some((candidate, score)),
            }
        }

        // iteration_neighbors >= 1 is enforced by AnnealParams::validate
        best.ok_or_else(|| MsaError::Invariant("no neighbor was sampled".into()))
    }
}

fn percent_of(delta: f64, base: f64) -> f64 {
    if base == 0.0 {
        0.0
    } else {
        delta / base.abs() * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acceptance_probability_edges() {
        assert_eq!(acceptance_probability(0.5, 1.0), 1.0);
        assert_eq!(acceptance_probability(0.0, 1.0), 1.0);
        assert!((acceptance_probability(-2.0, 1.0) - (-2.0f64).exp()).abs() < 1e-15);
        assert_eq!(acceptance_probability(-1e308, 1e-300), 0.0);
        assert_eq!(acceptance_probability(-1.0, 0.0), 0.0);
    }

    #[test]
    fn test_zero_change_always_accepted() {
        let mut rng = fastrand::Rng::with_seed(3);
        assert!((0..1000).all(|_| should_accept(0.0, 0.01, &mut rng)));
    }

    #[test]
    fn test_percent_of_zero_base() {
        assert_eq!(percent_of(1.0, 0.0), 0.0);
        assert_eq!(percent_of(1.0, -4.0), 25.0);
    }
}
