//! Binary SVM training
//!
//! Ties a kernel to the SMO solver and turns its result into a model that
//! keeps only the support vectors.

use crate::core::{OptimizationResult, OptimizerConfig, Result, SVMModel, Sample};
use crate::kernel::Kernel;
use crate::solver::SMOSolver;
use std::sync::Arc;

/// Binary SVM trainer over a fixed kernel and configuration
pub struct SVMOptimizer<K: Kernel> {
    kernel: Arc<K>,
    config: OptimizerConfig,
}

impl<K: Kernel> SVMOptimizer<K> {
    pub fn new(kernel: K, config: OptimizerConfig) -> Self {
        Self {
            kernel: Arc::new(kernel),
            config,
        }
    }

    pub fn with_kernel(kernel: K) -> Self {
        Self::new(kernel, OptimizerConfig::default())
    }

    /// Train on samples labelled ±1
    pub fn train_samples(&self, samples: &[Sample]) -> Result<TrainedSVM<K>> {
        let solver = SMOSolver::new(Arc::clone(&self.kernel), self.config.clone());
        let result = solver.solve(samples)?;

        Ok(TrainedSVM::new(Arc::clone(&self.kernel), samples, result))
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }
}

/// A trained binary SVM
pub struct TrainedSVM<K: Kernel> {
    kernel: Arc<K>,
    support_vectors: Vec<Sample>,
    alpha: Vec<f64>,
    bias: f64,
    support_indices: Vec<usize>,
    iterations: usize,
}

impl<K: Kernel> TrainedSVM<K> {
    pub(crate) fn new(
        kernel: Arc<K>,
        training_samples: &[Sample],
        optimization_result: OptimizationResult,
    ) -> Self {
        let support_vectors = optimization_result
            .support_vectors
            .iter()
            .map(|&i| training_samples[i].clone())
            .collect();
        let alpha = optimization_result
            .support_vectors
            .iter()
            .map(|&i| optimization_result.alpha[i])
            .collect();

        Self {
            kernel,
            support_vectors,
            alpha,
            bias: optimization_result.b,
            support_indices: optimization_result.support_vectors,
            iterations: optimization_result.iterations,
        }
    }

    pub fn support_vectors(&self) -> &[Sample] {
        &self.support_vectors
    }

    /// αᵢ·yᵢ for each support vector, the form the multiclass model stores
    pub fn dual_coefficients(&self) -> Vec<f64> {
        self.support_vectors
            .iter()
            .zip(self.alpha.iter())
            .map(|(sv, &alpha)| alpha * sv.label)
            .collect()
    }

    /// Indices of the support vectors in the training set
    pub fn support_vector_indices(&self) -> &[usize] {
        &self.support_indices
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }
}

impl<K: Kernel> SVMModel for TrainedSVM<K> {
    /// f(x) = Σ αᵢ yᵢ K(xᵢ, x) + b
    fn decision_function(&self, sample: &Sample) -> f64 {
        self.support_vectors
            .iter()
            .zip(self.alpha.iter())
            .map(|(sv, &alpha)| alpha * sv.label * self.kernel.compute(&sample.features, &sv.features))
            .sum::<f64>()
            + self.bias
    }

    fn n_support_vectors(&self) -> usize {
        self.support_vectors.len()
    }

    fn bias(&self) -> f64 {
        self.bias
    }
}
