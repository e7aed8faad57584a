//! Multiclass support vector classifier
//!
//! One binary machine per pair of classes (one-vs-one). Every machine
//! carries a Platt sigmoid fitted to cross-validated decision values, and
//! class probabilities come from coupling the pairwise estimates.

use crate::core::{
    LabeledSample, OptimizerConfig, PredictorError, Result, SVMModel, Sample, SparseVector,
};
use crate::kernel::{Kernel, KernelSpec};
use crate::optimizer::SVMOptimizer;
use crate::probability::{pairwise_coupling, PlattSigmoid, MIN_PROB};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One-vs-one binary machine between `classes[positive]` and
/// `classes[negative]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairwiseMachine {
    /// Position of the +1 class in the classifier's class list
    pub positive: usize,
    /// Position of the −1 class in the classifier's class list
    pub negative: usize,
    pub support_vectors: Vec<SparseVector>,
    /// αᵢ·yᵢ per support vector
    pub dual_coef: Vec<f64>,
    pub bias: f64,
    pub sigmoid: PlattSigmoid,
}

impl PairwiseMachine {
    pub fn decision_value<K: Kernel>(&self, kernel: &K, x: &SparseVector) -> f64 {
        self.support_vectors
            .iter()
            .zip(self.dual_coef.iter())
            .map(|(sv, &coef)| coef * kernel.compute(sv, x))
            .sum::<f64>()
            + self.bias
    }
}

/// A trained, probability-calibrated multiclass SVM
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportVectorClassifier {
    kernel: KernelSpec,
    n_features: usize,
    /// Sorted class labels; column `i` of every distribution is `classes[i]`
    classes: Vec<usize>,
    machines: Vec<PairwiseMachine>,
    config: OptimizerConfig,
}

impl SupportVectorClassifier {
    /// Fit on multiclass samples. `probability_folds` is the number of
    /// cross-validation folds used to produce calibration decision values.
    pub fn fit(
        samples: &[LabeledSample],
        n_features: usize,
        kernel: KernelSpec,
        config: OptimizerConfig,
        probability_folds: usize,
    ) -> Result<Self> {
        if samples.is_empty() {
            return Err(PredictorError::EmptyDataset);
        }
        if let Some(wide) = samples.iter().find(|s| s.features.min_dim() > n_features) {
            return Err(PredictorError::DimensionMismatch {
                expected: n_features,
                actual: wide.features.min_dim(),
            });
        }

        let mut by_class: BTreeMap<usize, Vec<&SparseVector>> = BTreeMap::new();
        for sample in samples {
            by_class.entry(sample.class).or_default().push(&sample.features);
        }
        let classes: Vec<usize> = by_class.keys().copied().collect();
        let groups: Vec<Vec<&SparseVector>> = by_class.into_values().collect();

        info!(
            "Fitting {} pairwise machines over {} classes ({} samples)",
            classes.len() * classes.len().saturating_sub(1) / 2,
            classes.len(),
            samples.len()
        );

        let mut machines = Vec::new();
        for positive in 0..classes.len() {
            for negative in positive + 1..classes.len() {
                let pair: Vec<Sample> = groups[positive]
                    .iter()
                    .map(|&x| Sample::new(x.clone(), 1.0))
                    .chain(groups[negative].iter().map(|&x| Sample::new(x.clone(), -1.0)))
                    .collect();

                let machine =
                    fit_pair(&pair, positive, negative, kernel, &config, probability_folds)?;
                debug!(
                    "Machine {} vs {}: {} support vectors, sigmoid A={:.4} B={:.4}",
                    classes[positive],
                    classes[negative],
                    machine.support_vectors.len(),
                    machine.sigmoid.a,
                    machine.sigmoid.b
                );
                machines.push(machine);
            }
        }

        Ok(Self {
            kernel,
            n_features,
            classes,
            machines,
            config,
        })
    }

    /// Class labels in column order
    pub fn classes(&self) -> &[usize] {
        &self.classes
    }

    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn kernel(&self) -> KernelSpec {
        self.kernel
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    pub fn machines(&self) -> &[PairwiseMachine] {
        &self.machines
    }

    /// Total support vectors across all pairwise machines
    pub fn n_support_vectors(&self) -> usize {
        self.machines.iter().map(|m| m.support_vectors.len()).sum()
    }

    /// Raw decision value of every pairwise machine, in fit order
    pub fn decision_values(&self, x: &SparseVector) -> Result<Vec<f64>> {
        self.check_dim(x)?;
        Ok(self
            .machines
            .iter()
            .map(|m| m.decision_value(&self.kernel, x))
            .collect())
    }

    /// Probability of each class, in `classes()` order
    pub fn predict_proba(&self, x: &SparseVector) -> Result<Vec<f64>> {
        self.check_dim(x)?;

        let k = self.classes.len();
        let mut pairwise = vec![vec![0.0; k]; k];
        for machine in &self.machines {
            let dec = machine.decision_value(&self.kernel, x);
            let p = machine.sigmoid.predict(dec).clamp(MIN_PROB, 1.0 - MIN_PROB);
            pairwise[machine.positive][machine.negative] = p;
            pairwise[machine.negative][machine.positive] = 1.0 - p;
        }

        Ok(pairwise_coupling(&pairwise))
    }

    /// Natural log of `predict_proba`
    pub fn predict_log_proba(&self, x: &SparseVector) -> Result<Vec<f64>> {
        Ok(self
            .predict_proba(x)?
            .into_iter()
            .map(|p| p.max(f64::MIN_POSITIVE).ln())
            .collect())
    }

    /// Most probable class; ties go to the smaller label
    pub fn predict(&self, x: &SparseVector) -> Result<usize> {
        let proba = self.predict_proba(x)?;
        let best = proba
            .iter()
            .enumerate()
            .fold(0, |best, (i, &p)| if p > proba[best] { i } else { best });
        Ok(self.classes[best])
    }

    /// Fraction of samples whose predicted class matches their label
    pub fn score(&self, samples: &[LabeledSample]) -> Result<f64> {
        if samples.is_empty() {
            return Err(PredictorError::EmptyDataset);
        }
        let mut correct = 0;
        for sample in samples {
            if self.predict(&sample.features)? == sample.class {
                correct += 1;
            }
        }
        Ok(correct as f64 / samples.len() as f64)
    }

    /// Check that a classifier read from disk can be evaluated: a usable
    /// kernel, one machine per class pair, and machines that only refer to
    /// known classes and fit in `n_features`
    pub fn validate(&self) -> Result<()> {
        if let KernelSpec::Rbf { gamma } = self.kernel {
            if !(gamma > 0.0 && gamma.is_finite()) {
                return Err(PredictorError::InvalidParameter(format!(
                    "RBF gamma must be positive and finite, got {gamma}"
                )));
            }
        }

        let k = self.classes.len();
        let expected_machines = k * k.saturating_sub(1) / 2;
        if self.machines.len() != expected_machines {
            return Err(PredictorError::InvalidParameter(format!(
                "{} classes need {} pairwise machines, found {}",
                k,
                expected_machines,
                self.machines.len()
            )));
        }

        for (i, machine) in self.machines.iter().enumerate() {
            if machine.positive >= k || machine.negative >= k || machine.positive == machine.negative
            {
                return Err(PredictorError::InvalidParameter(format!(
                    "machine {} pairs columns {} and {} of {} classes",
                    i, machine.positive, machine.negative, k
                )));
            }
            if machine.dual_coef.len() != machine.support_vectors.len() {
                return Err(PredictorError::InvalidParameter(format!(
                    "machine {} has {} coefficients for {} support vectors",
                    i,
                    machine.dual_coef.len(),
                    machine.support_vectors.len()
                )));
            }
            if let Some(wide) = machine
                .support_vectors
                .iter()
                .find(|sv| sv.min_dim() > self.n_features)
            {
                return Err(PredictorError::DimensionMismatch {
                    expected: self.n_features,
                    actual: wide.min_dim(),
                });
            }
        }
        Ok(())
    }

    fn check_dim(&self, x: &SparseVector) -> Result<()> {
        if x.min_dim() > self.n_features {
            return Err(PredictorError::DimensionMismatch {
                expected: self.n_features,
                actual: x.min_dim(),
            });
        }
        Ok(())
    }
}

fn fit_pair(
    pair: &[Sample],
    positive: usize,
    negative: usize,
    kernel: KernelSpec,
    config: &OptimizerConfig,
    probability_folds: usize,
) -> Result<PairwiseMachine> {
    let optimizer = SVMOptimizer::new(kernel, config.clone());
    let model = optimizer.train_samples(pair)?;

    let decisions = if probability_folds >= 2 {
        cross_validated_decisions(pair, kernel, config, probability_folds)?
    } else {
        pair.iter().map(|s| model.decision_function(s)).collect()
    };
    let labels: Vec<f64> = pair.iter().map(|s| s.label).collect();

    Ok(PairwiseMachine {
        positive,
        negative,
        support_vectors: model
            .support_vectors()
            .iter()
            .map(|s| s.features.clone())
            .collect(),
        dual_coef: model.dual_coefficients(),
        bias: model.bias(),
        sigmoid: PlattSigmoid::fit(&decisions, &labels),
    })
}

/// Decision value of every sample from a machine that never saw it.
///
/// Sample `i` lands in fold `i % folds`; since pairs are laid out class by
/// class this spreads both classes across folds. A fold whose training part
/// holds only one class predicts that class's label outright.
fn cross_validated_decisions(
    pair: &[Sample],
    kernel: KernelSpec,
    config: &OptimizerConfig,
    folds: usize,
) -> Result<Vec<f64>> {
    let folds = folds.min(pair.len());
    let mut decisions = vec![0.0; pair.len()];

    for fold in 0..folds {
        let train: Vec<Sample> = pair
            .iter()
            .enumerate()
            .filter(|(i, _)| i % folds != fold)
            .map(|(_, s)| s.clone())
            .collect();
        let positives = train.iter().filter(|s| s.label > 0.0).count();
        let negatives = train.len() - positives;

        let held_out = pair.iter().enumerate().filter(|(i, _)| i % folds == fold);

        if positives > 0 && negatives > 0 {
            let model = SVMOptimizer::new(kernel, config.clone()).train_samples(&train)?;
            for (i, sample) in held_out {
                decisions[i] = model.decision_function(sample);
            }
        } else {
            let constant = match (positives > 0, negatives > 0) {
                (true, false) => 1.0,
                (false, true) => -1.0,
                _ => 0.0,
            };
            for (i, _) in held_out {
                decisions[i] = constant;
            }
        }
    }

    Ok(decisions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Three well separated "topics" over a 9-token vocabulary
    fn topic_samples() -> Vec<LabeledSample> {
        let mut samples = Vec::new();
        for class in 0..3 {
            let base = class * 3;
            for variant in 0..6 {
                let mut tokens = vec![base, base + 1, base + 2];
                tokens.push(base + variant % 3);
                samples.push(LabeledSample::new(SparseVector::from_counts(tokens), class));
            }
        }
        samples
    }

    fn fitted() -> SupportVectorClassifier {
        SupportVectorClassifier::fit(
            &topic_samples(),
            9,
            KernelSpec::Rbf { gamma: 0.2 },
            OptimizerConfig::default(),
            5,
        )
        .expect("Fit should succeed")
    }

    #[test]
    fn test_fit_builds_one_machine_per_pair() {
        let svc = fitted();

        assert_eq!(svc.classes(), &[0, 1, 2]);
        assert_eq!(svc.machines().len(), 3);
        assert!(svc.n_support_vectors() > 0);
        assert_eq!(svc.n_features(), 9);
    }

    #[test]
    fn test_predicts_training_topics() {
        let svc = fitted();
        let samples = topic_samples();

        assert_relative_eq!(svc.score(&samples).unwrap(), 1.0);
        assert_eq!(svc.predict(&SparseVector::from_counts(vec![3, 4])).unwrap(), 1);
    }

    #[test]
    fn test_probabilities_form_a_distribution() {
        let svc = fitted();
        let x = SparseVector::from_counts(vec![6, 7, 8]);

        let proba = svc.predict_proba(&x).unwrap();
        assert_eq!(proba.len(), 3);
        assert_relative_eq!(proba.iter().sum::<f64>(), 1.0, epsilon = 1e-6);
        assert!(proba.iter().all(|&p| p > 0.0 && p <= 1.0));
        assert!(proba[2] > proba[0] && proba[2] > proba[1]);

        let log_proba = svc.predict_log_proba(&x).unwrap();
        for (lp, p) in log_proba.iter().zip(proba.iter()) {
            assert_relative_eq!(lp.exp(), *p, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_single_class_is_certain() {
        let samples = vec![
            LabeledSample::new(SparseVector::from_counts(vec![0]), 4),
            LabeledSample::new(SparseVector::from_counts(vec![1]), 4),
        ];
        let svc = SupportVectorClassifier::fit(
            &samples,
            2,
            KernelSpec::Linear,
            OptimizerConfig::default(),
            5,
        )
        .unwrap();

        assert!(svc.machines().is_empty());
        assert_eq!(svc.predict_log_proba(&SparseVector::empty()).unwrap(), vec![0.0]);
        assert_eq!(svc.predict(&SparseVector::empty()).unwrap(), 4);
    }

    #[test]
    fn test_sparse_class_labels_keep_column_order() {
        let samples = vec![
            LabeledSample::new(SparseVector::from_counts(vec![0, 0]), 7),
            LabeledSample::new(SparseVector::from_counts(vec![0]), 7),
            LabeledSample::new(SparseVector::from_counts(vec![1, 1]), 2),
            LabeledSample::new(SparseVector::from_counts(vec![1]), 2),
        ];
        let svc = SupportVectorClassifier::fit(
            &samples,
            2,
            KernelSpec::Linear,
            OptimizerConfig::default(),
            1,
        )
        .unwrap();

        assert_eq!(svc.classes(), &[2, 7]);
        assert_eq!(svc.predict(&SparseVector::from_counts(vec![0, 0])).unwrap(), 7);
    }

    #[test]
    fn test_empty_and_mismatched_inputs() {
        let empty = SupportVectorClassifier::fit(
            &[],
            3,
            KernelSpec::Linear,
            OptimizerConfig::default(),
            5,
        );
        assert!(matches!(empty, Err(PredictorError::EmptyDataset)));

        let svc = fitted();
        let too_wide = SparseVector::from_counts(vec![12]);
        assert!(matches!(
            svc.predict_proba(&too_wide),
            Err(PredictorError::DimensionMismatch { expected: 9, actual: 13 })
        ));
    }

    #[test]
    fn test_cross_validated_decisions_cover_every_sample() {
        let pair = vec![
            Sample::new(SparseVector::from_counts(vec![0]), 1.0),
            Sample::new(SparseVector::from_counts(vec![0, 0]), 1.0),
            Sample::new(SparseVector::from_counts(vec![1]), -1.0),
        ];

        let decisions =
            cross_validated_decisions(&pair, KernelSpec::Linear, &OptimizerConfig::default(), 5)
                .unwrap();

        // Three folds of one sample; each held-out sample leaves a two-sample
        // training set
        assert_eq!(decisions.len(), 3);
        assert!(decisions.iter().all(|d| d.is_finite()));
        // Holding out the only negative leaves a positive-only fold
        assert_eq!(decisions[2], 1.0);
    }

    #[test]
    fn test_fitted_classifier_validates() {
        fitted().validate().expect("A fitted classifier is consistent");
    }

    #[test]
    fn test_validate_rejects_unusable_gamma() {
        for gamma in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let mut svc = fitted();
            svc.kernel = KernelSpec::Rbf { gamma };
            assert!(
                matches!(svc.validate(), Err(PredictorError::InvalidParameter(_))),
                "gamma {gamma} accepted"
            );
        }
    }

    #[test]
    fn test_validate_rejects_corrupted_machines() {
        let mut svc = fitted();
        svc.machines[0].positive = 9;
        assert!(matches!(svc.validate(), Err(PredictorError::InvalidParameter(_))));

        let mut svc = fitted();
        svc.machines[1].negative = svc.machines[1].positive;
        assert!(matches!(svc.validate(), Err(PredictorError::InvalidParameter(_))));

        let mut svc = fitted();
        svc.machines[0].dual_coef.push(0.5);
        assert!(matches!(svc.validate(), Err(PredictorError::InvalidParameter(_))));

        let mut svc = fitted();
        svc.machines.pop();
        assert!(matches!(svc.validate(), Err(PredictorError::InvalidParameter(_))));

        let mut svc = fitted();
        svc.machines[2].support_vectors.push(SparseVector::from_counts(vec![20]));
        svc.machines[2].dual_coef.push(0.0);
        assert!(matches!(
            svc.validate(),
            Err(PredictorError::DimensionMismatch { expected: 9, actual: 21 })
        ));
    }

    #[test]
    fn test_serde_round_trip() {
        let svc = fitted();
        let json = serde_json::to_string(&svc).unwrap();
        let back: SupportVectorClassifier = serde_json::from_str(&json).unwrap();
        assert_eq!(back, svc);
    }
}
