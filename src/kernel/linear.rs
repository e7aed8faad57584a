//! Linear kernel implementation

use crate::core::SparseVector;
use crate::kernel::Kernel;

/// Linear kernel: K(x, y) = xᵀy
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearKernel;

impl LinearKernel {
    pub fn new() -> Self {
        Self
    }
}

impl Kernel for LinearKernel {
    fn compute(&self, x: &SparseVector, y: &SparseVector) -> f64 {
        dot_product_sparse(x, y)
    }
}

/// Dot product of two sparse vectors.
///
/// Both index lists are sorted, so this is a merge in
/// O(nnz(x) + nnz(y)) time.
pub(crate) fn dot_product_sparse(x: &SparseVector, y: &SparseVector) -> f64 {
    let mut result = 0.0;
    let mut i = 0;
    let mut j = 0;

    while i < x.indices.len() && j < y.indices.len() {
        let x_idx = x.indices[i];
        let y_idx = y.indices[j];

        if x_idx == y_idx {
            result += x.values[i] * y.values[j];
            i += 1;
            j += 1;
        } else if x_idx < y_idx {
            i += 1;
        } else {
            j += 1;
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_kernel_bag_overlap() {
        let kernel = LinearKernel::new();

        // Two goal bags sharing token 2 (counted twice in x)
        let x = SparseVector::from_counts(vec![0, 2, 2, 4]);
        let y = SparseVector::from_counts(vec![1, 2, 3]);

        assert_eq!(kernel.compute(&x, &y), 2.0);
    }

    #[test]
    fn test_linear_kernel_identical() {
        let kernel = LinearKernel::new();
        let x = SparseVector::new(vec![0, 1, 2], vec![1.0, 2.0, 3.0]);

        assert_eq!(kernel.compute(&x, &x), 14.0);
    }

    #[test]
    fn test_dot_product_empty() {
        let x = SparseVector::empty();
        let y = SparseVector::new(vec![0, 1], vec![1.0, 2.0]);

        assert_eq!(dot_product_sparse(&x, &y), 0.0);
        assert_eq!(dot_product_sparse(&y, &x), 0.0);
    }
}
