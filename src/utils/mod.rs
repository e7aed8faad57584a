//! Utility functions for ranking predictions and describing datasets

use crate::core::LabeledSample;

/// Ranking helpers over score vectors
pub mod ranking {
    use std::cmp::Ordering;

    /// Indices of the `k` largest scores, best first.
    ///
    /// Equal scores keep ascending index order; NaN ranks below every
    /// number.
    pub fn top_k(scores: &[f64], k: usize) -> Vec<usize> {
        let mut order: Vec<usize> = (0..scores.len()).collect();
        order.sort_by(|&a, &b| descending(scores[a], scores[b]).then(a.cmp(&b)));
        order.truncate(k);
        order
    }

    fn descending(a: f64, b: f64) -> Ordering {
        match (a.is_nan(), b.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
        }
    }
}

/// Statistical utilities for datasets
pub mod stats {
    use super::*;
    use std::collections::BTreeMap;

    /// Calculate basic statistics for the sparse vectors of a dataset
    pub fn sparse_vector_stats(samples: &[LabeledSample]) -> SparseVectorStats {
        if samples.is_empty() {
            return SparseVectorStats::default();
        }

        let nnz_values: Vec<usize> = samples.iter().map(|s| s.features.nnz()).collect();

        let total_nnz: usize = nnz_values.iter().sum();
        let mean_nnz = total_nnz as f64 / samples.len() as f64;

        let max_nnz = *nnz_values.iter().max().unwrap_or(&0);
        let min_nnz = *nnz_values.iter().min().unwrap_or(&0);

        let variance = if samples.len() > 1 {
            nnz_values
                .iter()
                .map(|&x| (x as f64 - mean_nnz).powi(2))
                .sum::<f64>()
                / (samples.len() - 1) as f64
        } else {
            0.0
        };

        SparseVectorStats {
            mean_nnz,
            min_nnz,
            max_nnz,
            variance_nnz: variance,
            total_samples: samples.len(),
        }
    }

    /// Samples per class
    pub fn class_counts(samples: &[LabeledSample]) -> BTreeMap<usize, usize> {
        let mut counts = BTreeMap::new();
        for sample in samples {
            *counts.entry(sample.class).or_insert(0) += 1;
        }
        counts
    }
}

/// Statistics for sparse vector analysis
#[derive(Debug, Clone, Default)]
pub struct SparseVectorStats {
    pub mean_nnz: f64,
    pub min_nnz: usize,
    pub max_nnz: usize,
    pub variance_nnz: f64,
    pub total_samples: usize,
}
