//! RBF (Radial Basis Function) kernel implementation
//!
//! K(x, y) = exp(-γ · ‖x − y‖²). The classifier fits γ from the training
//! matrix with the "scale" heuristic, γ = 1 / (n_features · Var(X)).

use crate::core::{LabeledSample, SparseVector};
use crate::kernel::linear::dot_product_sparse;
use crate::kernel::Kernel;
use serde::{Deserialize, Serialize};

/// How the RBF width is chosen at fit time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Gamma {
    /// γ = 1 / (n_features · Var(X)), or 1.0 when the variance is zero
    Scale,
    /// Fixed γ
    Value(f64),
}

impl Default for Gamma {
    fn default() -> Self {
        Gamma::Scale
    }
}

impl Gamma {
    /// Resolve to a concrete γ for a training matrix of dimension `dim`
    pub fn resolve(&self, samples: &[LabeledSample], dim: usize) -> f64 {
        match *self {
            Gamma::Value(gamma) => gamma,
            Gamma::Scale => {
                let variance = matrix_variance(samples, dim);
                if variance > 0.0 && dim > 0 {
                    1.0 / (dim as f64 * variance)
                } else {
                    1.0
                }
            }
        }
    }
}

/// Variance over every entry of the dense `samples.len() × dim` matrix,
/// implicit zeros included.
pub fn matrix_variance(samples: &[LabeledSample], dim: usize) -> f64 {
    let total = (samples.len() * dim) as f64;
    if total == 0.0 {
        return 0.0;
    }
    let (sum, sum_sq) = samples
        .iter()
        .flat_map(|s| s.features.values.iter())
        .fold((0.0, 0.0), |(s, sq), &v| (s + v, sq + v * v));
    let mean = sum / total;
    (sum_sq / total - mean * mean).max(0.0)
}

/// RBF kernel: K(x, y) = exp(-γ · ‖x − y‖²)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RBFKernel {
    gamma: f64,
}

impl RBFKernel {
    /// # Panics
    /// Panics if gamma is not positive
    pub fn new(gamma: f64) -> Self {
        assert!(gamma > 0.0, "Gamma must be positive, got: {}", gamma);
        Self { gamma }
    }

    pub fn gamma(&self) -> f64 {
        self.gamma
    }
}

impl Default for RBFKernel {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Kernel for RBFKernel {
    fn compute(&self, x: &SparseVector, y: &SparseVector) -> f64 {
        (-self.gamma * squared_euclidean_distance(x, y)).exp()
    }

    fn compute_with_norms(
        &self,
        x: &SparseVector,
        y: &SparseVector,
        x_norm_sq: f64,
        y_norm_sq: f64,
    ) -> f64 {
        // ‖x − y‖² = ‖x‖² + ‖y‖² − 2xᵀy, clamped against rounding
        let squared_distance = (x_norm_sq + y_norm_sq - 2.0 * dot_product_sparse(x, y)).max(0.0);
        (-self.gamma * squared_distance).exp()
    }
}

/// ‖x − y‖² over two sorted sparse vectors
fn squared_euclidean_distance(x: &SparseVector, y: &SparseVector) -> f64 {
    let mut distance_sq = 0.0;
    let mut i = 0;
    let mut j = 0;

    while i < x.indices.len() && j < y.indices.len() {
        let x_idx = x.indices[i];
        let y_idx = y.indices[j];

        if x_idx == y_idx {
            let diff = x.values[i] - y.values[j];
            distance_sq += diff * diff;
            i += 1;
            j += 1;
        } else if x_idx < y_idx {
            distance_sq += x.values[i] * x.values[i];
            i += 1;
        } else {
            distance_sq += y.values[j] * y.values[j];
            j += 1;
        }
    }

    distance_sq += x.values[i..].iter().map(|v| v * v).sum::<f64>();
    distance_sq += y.values[j..].iter().map(|v| v * v).sum::<f64>();
    distance_sq
}
