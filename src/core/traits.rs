//! Core traits for the SVM machinery

use crate::core::{LabeledSample, Sample};

/// Multiclass dataset abstraction used by the classifier trainer
pub trait Dataset {
    /// Number of samples in the dataset
    fn len(&self) -> usize;

    /// Number of features (dimensionality)
    fn dim(&self) -> usize;

    /// Get a single sample by index
    ///
    /// # Panics
    /// Panics if index >= len()
    fn get_sample(&self, i: usize) -> LabeledSample;

    /// All samples, in order
    fn samples(&self) -> Vec<LabeledSample> {
        (0..self.len()).map(|i| self.get_sample(i)).collect()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Dataset for [LabeledSample] {
    fn len(&self) -> usize {
        <[LabeledSample]>::len(self)
    }

    fn dim(&self) -> usize {
        self.iter().map(|s| s.features.min_dim()).max().unwrap_or(0)
    }

    fn get_sample(&self, i: usize) -> LabeledSample {
        self[i].clone()
    }
}

/// Trained binary SVM model
pub trait SVMModel {
    /// Signed distance-like score; positive means the +1 class
    fn decision_function(&self, sample: &Sample) -> f64;

    fn n_support_vectors(&self) -> usize;

    fn bias(&self) -> f64;
}
