//! Kernel row cache
//!
//! The SMO solver needs whole kernel rows K(i, ·) when it updates its error
//! cache after a step. Rows are kept in an LRU cache bounded by a byte
//! budget; a row is shared out as an `Rc` so two rows can be held at once.

use lru::LruCache;
use std::num::NonZeroUsize;
use std::rc::Rc;

/// A shared kernel row K(i, 0..n)
pub type KernelRow = Rc<Vec<f64>>;

/// LRU cache of kernel matrix rows
pub struct KernelCache {
    rows: LruCache<usize, KernelRow>,
    hits: u64,
    misses: u64,
}

impl KernelCache {
    /// Create a cache holding at most `capacity` rows
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            rows: LruCache::new(capacity),
            hits: 0,
            misses: 0,
        }
    }

    /// Create a cache sized from a byte budget for rows of `row_len` values.
    /// At least two rows are always kept, and never more than `row_len`.
    pub fn with_memory_limit(memory_bytes: usize, row_len: usize) -> Self {
        let row_bytes = row_len
            .saturating_mul(std::mem::size_of::<f64>())
            .max(1);
        Self::new((memory_bytes / row_bytes).clamp(2, row_len.max(2)))
    }

    pub fn get(&mut self, i: usize) -> Option<KernelRow> {
        match self.rows.get(&i) {
            Some(row) => {
                self.hits += 1;
                Some(Rc::clone(row))
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    pub fn put(&mut self, i: usize, row: Vec<f64>) -> KernelRow {
        let row = Rc::new(row);
        self.rows.put(i, Rc::clone(&row));
        row
    }

    /// Return row `i`, computing and caching it on a miss
    pub fn row_or_insert_with<F>(&mut self, i: usize, compute: F) -> KernelRow
    where
        F: FnOnce() -> Vec<f64>,
    {
        match self.get(i) {
            Some(row) => row,
            None => self.put(i, compute()),
        }
    }

    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            capacity: self.rows.cap().get(),
            size: self.rows.len(),
        }
    }

    pub fn clear(&mut self) {
        self.rows.clear();
        self.hits = 0;
        self.misses = 0;
    }
}

/// Cache statistics
#[derive(Debug, Clone)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Capacity in rows
    pub capacity: usize,
    /// Rows currently held
    pub size: usize,
}
