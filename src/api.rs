//! High-level API for training the multiclass classifier
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use tactic_svm::api::SVC;
//! use tactic_svm::core::{LabeledSample, SparseVector};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let samples = vec![
//!     LabeledSample::new(SparseVector::from_counts(vec![0, 1]), 0),
//!     LabeledSample::new(SparseVector::from_counts(vec![2, 3]), 1),
//! ];
//!
//! let classifier = SVC::new().with_c(1.0).fit(samples.as_slice())?;
//! let proba = classifier.predict_proba(&SparseVector::from_counts(vec![0]))?;
//! println!("P(class 0) = {:.3}", proba[0]);
//! # Ok(())
//! # }
//! ```

use crate::core::{Dataset, OptimizerConfig, PredictorError, Result};
use crate::kernel::{Gamma, KernelSpec};
use crate::svc::SupportVectorClassifier;
use log::info;
use std::time::Instant;

/// Number of cross-validation folds used for probability calibration
pub const DEFAULT_PROBABILITY_FOLDS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq)]
enum KernelChoice {
    Linear,
    Rbf(Gamma),
}

/// Builder for a probability-calibrated one-vs-one SVM.
///
/// Defaults are an RBF kernel with `gamma = scale`, `C = 1.0` and five
/// calibration folds.
#[derive(Debug, Clone)]
pub struct SVC {
    kernel: KernelChoice,
    config: OptimizerConfig,
    probability_folds: usize,
}

impl SVC {
    pub fn new() -> Self {
        Self {
            kernel: KernelChoice::Rbf(Gamma::Scale),
            config: OptimizerConfig::default(),
            probability_folds: DEFAULT_PROBABILITY_FOLDS,
        }
    }

    /// Set regularization parameter C
    pub fn with_c(mut self, c: f64) -> Self {
        self.config.c = c;
        self
    }

    /// Set convergence tolerance
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.config.epsilon = epsilon;
        self
    }

    /// Set maximum number of SMO iterations per binary machine
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.config.max_iterations = max_iterations;
        self
    }

    /// Set kernel cache size in bytes
    pub fn with_cache_size(mut self, cache_size: usize) -> Self {
        self.config.cache_size = cache_size;
        self
    }

    /// Use an RBF kernel with the given width rule
    pub fn with_gamma(mut self, gamma: Gamma) -> Self {
        self.kernel = KernelChoice::Rbf(gamma);
        self
    }

    pub fn with_linear_kernel(mut self) -> Self {
        self.kernel = KernelChoice::Linear;
        self
    }

    /// Folds used to produce held-out decision values for Platt scaling.
    /// Fewer than two folds calibrates on in-sample decision values.
    pub fn with_probability_folds(mut self, folds: usize) -> Self {
        self.probability_folds = folds;
        self
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Fit on a dataset
    pub fn fit<D: Dataset + ?Sized>(self, dataset: &D) -> Result<SupportVectorClassifier> {
        if self.config.c <= 0.0 {
            return Err(PredictorError::InvalidParameter(format!(
                "C must be positive, got: {}",
                self.config.c
            )));
        }
        if dataset.is_empty() {
            return Err(PredictorError::EmptyDataset);
        }

        let samples = dataset.samples();
        let dim = dataset.dim();
        let kernel = match self.kernel {
            KernelChoice::Linear => KernelSpec::Linear,
            KernelChoice::Rbf(gamma) => {
                let gamma = gamma.resolve(&samples, dim);
                if !(gamma > 0.0 && gamma.is_finite()) {
                    return Err(PredictorError::InvalidParameter(format!(
                        "Gamma must be positive, got: {gamma}"
                    )));
                }
                KernelSpec::Rbf { gamma }
            }
        };

        info!(
            "Training SVC on {} samples, {} features, kernel {:?}",
            samples.len(),
            dim,
            kernel
        );
        let start = Instant::now();
        let classifier = SupportVectorClassifier::fit(
            &samples,
            dim,
            kernel,
            self.config,
            self.probability_folds,
        )?;
        info!(
            "Trained {} classes with {} support vectors in {:.2}s",
            classifier.n_classes(),
            classifier.n_support_vectors(),
            start.elapsed().as_secs_f64()
        );

        Ok(classifier)
    }
}

impl Default for SVC {
    fn default() -> Self {
        Self::new()
    }
}

/// Summary of a trained classifier
#[derive(Debug, Clone, PartialEq)]
pub struct ModelInfo {
    pub n_classes: usize,
    pub n_features: usize,
    pub n_machines: usize,
    pub n_support_vectors: usize,
    pub kernel: KernelSpec,
}

impl ModelInfo {
    pub fn of(classifier: &SupportVectorClassifier) -> Self {
        Self {
            n_classes: classifier.n_classes(),
            n_features: classifier.n_features(),
            n_machines: classifier.machines().len(),
            n_support_vectors: classifier.n_support_vectors(),
            kernel: classifier.kernel(),
        }
    }
}
