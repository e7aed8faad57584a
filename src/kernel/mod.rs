//! Kernel functions for SVM

pub mod linear;
pub mod rbf;
pub mod traits;

pub use self::linear::*;
pub use self::rbf::*;
pub use self::traits::*;

use crate::core::SparseVector;
use serde::{Deserialize, Serialize};

/// Serializable kernel choice stored inside a trained classifier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum KernelSpec {
    Linear,
    Rbf { gamma: f64 },
}

impl Kernel for KernelSpec {
    fn compute(&self, x: &SparseVector, y: &SparseVector) -> f64 {
        match *self {
            KernelSpec::Linear => LinearKernel.compute(x, y),
            KernelSpec::Rbf { gamma } => RBFKernel::new(gamma).compute(x, y),
        }
    }

    fn compute_with_norms(
        &self,
        x: &SparseVector,
        y: &SparseVector,
        x_norm_sq: f64,
        y_norm_sq: f64,
    ) -> f64 {
        match *self {
            KernelSpec::Linear => LinearKernel.compute(x, y),
            KernelSpec::Rbf { gamma } => {
                RBFKernel::new(gamma).compute_with_norms(x, y, x_norm_sq, y_norm_sq)
            }
        }
    }
}
