use crate::alignment::Alignment;
use crate::error::{MsaError, MsaResult};
use fnv::FnvBuildHasher;
use lru::LruCache;
use serde::Serialize;
use std::num::NonZeroUsize;

/// Call and hit counters of both cache tiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub column_calls: u64,
    pub column_hits: u64,
    pub alignment_calls: u64,
    pub alignment_hits: u64,
}

impl CacheStats {
    pub fn column_hit_rate(&self) -> f64 {
        ratio(self.column_hits, self.column_calls)
    }

    pub fn alignment_hit_rate(&self) -> f64 {
        ratio(self.alignment_hits, self.alignment_calls)
    }
}

fn ratio(hits: u64, calls: u64) -> f64 {
    if calls == 0 {
        0.0
    } else {
        hits as f64 / calls as f64
    }
}

/// Two-tier memoization of energies.
///
/// Column entries are keyed by the exact column bytes (row order included).
/// Alignment entries are keyed by the whole `Alignment`, i.e. its shape plus
/// its row-major bytes. Values are pure functions of their keys, so entries
/// never go stale and only capacity eviction (least recently used) applies.
pub struct ScoreCache {
    columns: LruCache<Box<[u8]>, f64, FnvBuildHasher>,
    alignments: LruCache<Alignment, f64, FnvBuildHasher>,
    stats: CacheStats,
}

impl ScoreCache {
    pub fn new(column_capacity: usize, alignment_capacity: usize) -> MsaResult<Self> {
        let column_cap = NonZeroUsize::new(column_capacity)
            .ok_or_else(|| MsaError::Config("column cache capacity must be positive".into()))?;
        let alignment_cap = NonZeroUsize::new(alignment_capacity).ok_or_else(|| {
            MsaError::Config("alignment cache capacity must be positive".into())
        })?;

        Ok(Self {
            columns: LruCache::with_hasher(column_cap, FnvBuildHasher::default()),
            alignments: LruCache::with_hasher(alignment_cap, FnvBuildHasher::default()),
            stats: CacheStats::default(),
        })
    }

    /// Returns the cached score of `column`, computing and storing it on a miss.
    pub fn get_column_energy<F>(&mut self, column: &[u8], compute: F) -> f64
    where
        F: FnOnce(&[u8]) -> f64,
    {
        self.stats.column_calls += 1;
        if let Some(&energy) = self.columns.get(column) {
            self.stats.column_hits += 1;
            return energy;
        }
        let energy = compute(column);
        self.columns.put(column.into(), energy);
        energy
    }

    /// Returns the cached energy of `alignment`, computing and storing it on a
    /// miss. `compute` receives the cache back so it can reuse column entries.
    /// Failed computations are not stored.
    pub fn get_alignment_energy<F>(&mut self, alignment: &Alignment, compute: F) -> MsaResult<f64>
    where
        F: FnOnce(&mut Self, &Alignment) -> MsaResult<f64>,
    {
        self.stats.alignment_calls += 1;
        if let Some(&energy) = self.alignments.get(alignment) {
            self.stats.alignment_hits += 1;
            return Ok(energy);
        }
        let energy = compute(self, alignment)?;
        self.alignments.put(alignment.clone(), energy);
        Ok(energy)
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn column_len(&self) -> usize {
        self.columns.len()
    }

    pub fn alignment_len(&self) -> usize {
        self.alignments.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_lru_eviction() {
        let mut cache = ScoreCache::new(2, 1).unwrap();
        let mut computed = 0;
        for col in [&b"AA"[..], b"AC", b"AA", b"GG", b"AC"] {
            cache.get_column_energy(col, |_| {
                computed += 1;
                1.0
            });
        }
        // AA miss, AC miss, AA hit, GG miss (evicts AC), AC miss
        assert_eq!(computed, 4);
        assert_eq!(cache.stats().column_hits, 1);
        assert_eq!(cache.stats().column_calls, 5);
        assert_eq!(cache.column_len(), 2);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        assert!(ScoreCache::new(0, 10).is_err());
        assert!(ScoreCache::new(10, 0).is_err());
    }
}
