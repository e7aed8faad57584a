//! Kernel trait definition

use crate::core::SparseVector;

/// Kernel function K(x, y) over sparse feature vectors.
///
/// Implementations must be symmetric and satisfy Mercer's condition for the
/// SMO solver to converge.
pub trait Kernel {
    /// Compute kernel value K(x, y)
    fn compute(&self, x: &SparseVector, y: &SparseVector) -> f64;

    /// Compute K(x, y) using precomputed squared norms, which the RBF
    /// kernel can exploit. The default ignores the norms.
    fn compute_with_norms(
        &self,
        x: &SparseVector,
        y: &SparseVector,
        x_norm_sq: f64,
        y_norm_sq: f64,
    ) -> f64 {
        let _ = (x_norm_sq, y_norm_sq);
        self.compute(x, y)
    }
}

