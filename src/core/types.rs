//! Core type definitions for the SVM machinery

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Sparse vector representation with sorted, unique indices
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
    /// Sorted indices of non-zero elements
    pub indices: Vec<usize>,
    /// Values corresponding to indices
    pub values: Vec<f64>,
}

impl SparseVector {
    /// Create a new sparse vector, sorting by index
    pub fn new(indices: Vec<usize>, values: Vec<f64>) -> Self {
        assert_eq!(
            indices.len(),
            values.len(),
            "Indices and values must have same length"
        );

        let mut pairs: Vec<_> = indices.into_iter().zip(values).collect();
        pairs.sort_by_key(|&(idx, _)| idx);

        let (indices, values): (Vec<_>, Vec<_>) = pairs.into_iter().unzip();
        Self { indices, values }
    }

    /// Build a count vector from a stream of (possibly repeated) indices.
    ///
    /// Each occurrence of an index adds 1.0 to its entry; this is the
    /// bag-of-words encoding used for goals.
    pub fn from_counts<I: IntoIterator<Item = usize>>(indices: I) -> Self {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for idx in indices {
            *counts.entry(idx).or_insert(0.0) += 1.0;
        }
        let (indices, values) = counts.into_iter().unzip();
        Self { indices, values }
    }

    pub fn empty() -> Self {
        Self {
            indices: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Value at a specific index (0 if not present)
    pub fn get(&self, index: usize) -> f64 {
        match self.indices.binary_search(&index) {
            Ok(pos) => self.values[pos],
            Err(_) => 0.0,
        }
    }

    pub fn norm_squared(&self) -> f64 {
        self.values.iter().map(|&v| v * v).sum()
    }

    /// Number of non-zero elements
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// One past the largest stored index, i.e. the smallest dimension
    /// this vector fits in
    pub fn min_dim(&self) -> usize {
        self.indices.last().map_or(0, |&i| i + 1)
    }
}

/// Binary training sample with features and a ±1 label
#[derive(Clone, Debug)]
pub struct Sample {
    pub features: SparseVector,
    /// Class label (+1 or -1)
    pub label: f64,
}

impl Sample {
    pub fn new(features: SparseVector, label: f64) -> Self {
        Self { features, label }
    }
}

/// Multiclass training sample: a feature vector tagged with a class index
#[derive(Clone, Debug, PartialEq)]
pub struct LabeledSample {
    pub features: SparseVector,
    pub class: usize,
}

impl LabeledSample {
    pub fn new(features: SparseVector, class: usize) -> Self {
        Self { features, class }
    }
}

/// Result of a binary optimization run
#[derive(Debug, Clone)]
pub struct OptimizationResult {
    /// Lagrange multipliers (alpha values)
    pub alpha: Vec<f64>,
    /// Bias term (b), with f(x) = Σ αᵢ yᵢ K(xᵢ, x) + b
    pub b: f64,
    /// Indices of support vectors (where alpha > 0)
    pub support_vectors: Vec<usize>,
    /// Number of passes over the data
    pub iterations: usize,
    /// Final dual objective value
    pub objective_value: f64,
}

/// Configuration for the binary optimizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizerConfig {
    /// Regularization parameter (upper bound for alpha)
    pub c: f64,
    /// Tolerance for KKT conditions
    pub epsilon: f64,
    /// Maximum number of passes over the data
    pub max_iterations: usize,
    /// Kernel cache size in bytes
    pub cache_size: usize,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            c: 1.0,
            epsilon: 0.001,
            max_iterations: 10000,
            cache_size: 100_000_000, // 100MB
        }
    }
}
