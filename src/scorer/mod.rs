pub mod builder;
pub mod cache;
pub mod engine;
pub mod matrices;

pub use self::builder::{MatrixBuilder, ObjectiveBuildParams};
pub use self::cache::{CacheStats, ScoreCache};
pub use self::engine::Evaluator;
pub use self::matrices::SubstitutionMatrix;

use crate::consts::{GAP_SYMBOL, SYMBOL_ALPHABET, UNKNOWN_RESIDUE};
use itertools::Itertools;
use std::fmt;
use strum_macros::{EnumIter, EnumString};

/// Quality function selectors accepted in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, EnumIter, strum_macros::Display)]
pub enum ObjectiveKind {
    #[strum(to_string = "identity")]
    Identity,
    #[strum(to_string = "coincidences")]
    Coincidences,
    #[strum(to_string = "similarity_blosum62")]
    SimilarityBlosum62,
    #[strum(to_string = "similarity_pam250")]
    SimilarityPam250,
    #[strum(to_string = "global")]
    Global,
    #[strum(to_string = "local")]
    Local,
}

/// Flat match/mismatch/gap values for the counting objectives.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnScores {
    pub match_score: f64,
    pub mismatch_score: f64,
    pub gap_penalty: f64,
}

/// Total symmetric score lookup over every byte pair.
///
/// Bytes are folded onto `SYMBOL_ALPHABET`: lowercase maps to uppercase and
/// anything unknown maps to `X`.
#[derive(Clone)]
pub struct PairTable {
    index: [u8; 256],
    size: usize,
    scores: Vec<f64>,
}

impl PairTable {
    /// `score_of(a, b)` is queried once per unordered alphabet pair.
    pub(crate) fn from_fn<F: FnMut(u8, u8) -> f64>(mut score_of: F) -> Self {
        let size = SYMBOL_ALPHABET.len();
        let mut index = [0u8; 256];
        let unknown = symbol_slot(UNKNOWN_RESIDUE);
        for (byte, slot) in index.iter_mut().enumerate() {
            let upper = (byte as u8).to_ascii_uppercase();
            *slot = SYMBOL_ALPHABET
                .iter()
                .position(|&s| s == upper)
                .unwrap_or(unknown) as u8;
        }

        let mut scores = vec![0.0; size * size];
        for i in 0..size {
            for j in i..size {
                let v = score_of(SYMBOL_ALPHABET[i], SYMBOL_ALPHABET[j]);
                scores[i * size + j] = v;
                scores[j * size + i] = v;
            }
        }

        Self {
            index,
            size,
            scores,
        }
    }

    #[inline]
    pub fn score(&self, a: u8, b: u8) -> f64 {
        let i = self.index[a as usize] as usize;
        let j = self.index[b as usize] as usize;
        self.scores[i * self.size + j]
    }

    /// Sum of the pair score over all unordered pairs of `column`.
    pub fn sum_of_pairs(&self, column: &[u8]) -> f64 {
        column
            .iter()
            .tuple_combinations()
            .map(|(&a, &b)| self.score(a, b))
            .sum()
    }
}

fn symbol_slot(symbol: u8) -> usize {
    SYMBOL_ALPHABET
        .iter()
        .position(|&s| s == symbol)
        .unwrap_or(0)
}

impl fmt::Debug for PairTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PairTable")
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

/// The closed family of column scoring rules.
#[derive(Debug, Clone)]
pub enum Objective {
    Identity(ColumnScores),
    Coincidences(ColumnScores),
    Similarity(PairTable),
    GlobalLocal(PairTable),
}

impl Objective {
    pub fn score_column(&self, column: &[u8]) -> f64 {
        match self {
            Objective::Identity(s) => identity(column, s),
            Objective::Coincidences(s) => coincidences(column, s),
            Objective::Similarity(t) | Objective::GlobalLocal(t) => t.sum_of_pairs(column),
        }
    }

    /// Whether the energy is a plain sum or a per-column mean.
    pub fn divider(&self, _rows: usize, cols: usize) -> f64 {
        match self {
            Objective::Similarity(_) => 1.0,
            Objective::Identity(_) | Objective::Coincidences(_) | Objective::GlobalLocal(_) => {
                cols as f64
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Objective::Identity(_) => "identity",
            Objective::Coincidences(_) => "coincidences",
            Objective::Similarity(_) => "similarity",
            Objective::GlobalLocal(_) => "global_local",
        }
    }
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn identity(column: &[u8], s: &ColumnScores) -> f64 {
    let Some(&first) = column.first() else {
        return s.mismatch_score;
    };
    if column.iter().all(|&c| c == first) {
        if first == GAP_SYMBOL {
            s.gap_penalty
        } else {
            s.match_score
        }
    } else {
        s.mismatch_score
    }
}

fn coincidences(column: &[u8], s: &ColumnScores) -> f64 {
    let mut counts = [0u32; 256];
    for &c in column {
        counts[c as usize] += 1;
    }
    let highest = counts.iter().copied().max().unwrap_or(0);
    if highest <= 1 {
        return s.mismatch_score;
    }

    let score: f64 = counts
        .iter()
        .enumerate()
        .filter(|&(_, &n)| n == highest)
        .map(|(symbol, _)| {
            let weight = if symbol as u8 == GAP_SYMBOL {
                s.gap_penalty
            } else {
                s.match_score
            };
            weight * highest as f64
        })
        .sum();

    score / column.len() as f64
}
