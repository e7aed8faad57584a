//! Sequential Minimal Optimization (SMO) solver
//!
//! Platt's SMO for the binary soft-margin dual. The decision function is
//! f(x) = Σ αᵢ yᵢ K(xᵢ, x) + b and the error cache holds Eᵢ = f(xᵢ) − yᵢ
//! for every training sample, bias included.

use crate::cache::{KernelCache, KernelRow};
use crate::core::{OptimizationResult, OptimizerConfig, PredictorError, Result, Sample};
use crate::kernel::Kernel;
use log::{debug, warn};
use std::cmp::Ordering;
use std::sync::Arc;

/// Alphas closer than this to a bound are snapped onto it
const BOUND_SNAP: f64 = 1e-8;

/// SMO solver for the binary SVM dual problem
pub struct SMOSolver<K: Kernel> {
    kernel: Arc<K>,
    config: OptimizerConfig,
}

impl<K: Kernel> SMOSolver<K> {
    pub fn new(kernel: Arc<K>, config: OptimizerConfig) -> Self {
        Self { kernel, config }
    }

    /// Solve the dual problem for samples labelled ±1
    pub fn solve(&self, samples: &[Sample]) -> Result<OptimizationResult> {
        let mut cache = KernelCache::with_memory_limit(self.config.cache_size, samples.len());
        self.solve_with_cache(samples, &mut cache)
    }

    /// Solve with a caller-provided row cache. The cache must be empty or
    /// hold rows computed for this exact `samples` slice.
    pub fn solve_with_cache(
        &self,
        samples: &[Sample],
        cache: &mut KernelCache,
    ) -> Result<OptimizationResult> {
        if samples.is_empty() {
            return Err(PredictorError::EmptyDataset);
        }
        if self.config.c <= 0.0 {
            return Err(PredictorError::InvalidParameter(format!(
                "C must be positive, got {}",
                self.config.c
            )));
        }
        for sample in samples {
            if sample.label != 1.0 && sample.label != -1.0 {
                return Err(PredictorError::InvalidLabel(sample.label));
            }
        }

        let n = samples.len();

        // One-sided problem: no margin to optimize, the bias alone fits it
        let first_label = samples[0].label;
        if samples.iter().all(|s| s.label == first_label) {
            return Ok(OptimizationResult {
                alpha: vec![0.0; n],
                b: first_label,
                support_vectors: Vec::new(),
                iterations: 0,
                objective_value: 0.0,
            });
        }

        let mut run = SmoRun {
            kernel: self.kernel.as_ref(),
            config: &self.config,
            samples,
            norms: samples.iter().map(|s| s.features.norm_squared()).collect(),
            cache,
            alpha: vec![0.0; n],
            errors: samples.iter().map(|s| -s.label).collect(),
            b: 0.0,
        };

        let mut iterations = 0;
        let mut num_changed = 0;
        let mut examine_all = true;

        while (num_changed > 0 || examine_all) && iterations < self.config.max_iterations {
            num_changed = 0;

            for i in 0..n {
                if (examine_all || run.is_free(i)) && run.examine_example(i) {
                    num_changed += 1;
                }
            }

            if examine_all {
                examine_all = false;
            } else if num_changed == 0 {
                examine_all = true;
            }

            iterations += 1;
        }

        if num_changed > 0 {
            warn!(
                "SMO stopped at the iteration cap ({}) before convergence",
                self.config.max_iterations
            );
        }

        let objective_value = run.objective();
        let stats = run.cache.stats();
        debug!(
            "SMO finished after {} passes, kernel cache {}/{} hits",
            iterations,
            stats.hits,
            stats.hits + stats.misses
        );

        let support_vectors = run
            .alpha
            .iter()
            .enumerate()
            .filter_map(|(i, &a)| if a > 0.0 { Some(i) } else { None })
            .collect();

        Ok(OptimizationResult {
            alpha: run.alpha,
            b: run.b,
            support_vectors,
            iterations,
            objective_value,
        })
    }
}

/// Mutable state of one SMO run
struct SmoRun<'a, K: Kernel> {
    kernel: &'a K,
    config: &'a OptimizerConfig,
    samples: &'a [Sample],
    norms: Vec<f64>,
    cache: &'a mut KernelCache,
    alpha: Vec<f64>,
    errors: Vec<f64>,
    b: f64,
}

impl<K: Kernel> SmoRun<'_, K> {
    fn is_free(&self, i: usize) -> bool {
        self.alpha[i] > 0.0 && self.alpha[i] < self.config.c
    }

    fn row(&mut self, i: usize) -> KernelRow {
        let kernel = self.kernel;
        let samples = self.samples;
        let norms = &self.norms;
        self.cache.row_or_insert_with(i, || {
            samples
                .iter()
                .zip(norms.iter())
                .map(|(other, &other_norm)| {
                    kernel.compute_with_norms(
                        &samples[i].features,
                        &other.features,
                        norms[i],
                        other_norm,
                    )
                })
                .collect()
        })
    }

    /// Try to make progress on sample `i2`; returns whether any alpha moved
    fn examine_example(&mut self, i2: usize) -> bool {
        let n = self.samples.len();
        let y2 = self.samples[i2].label;
        let alpha2 = self.alpha[i2];
        let e2 = self.errors[i2];
        let r2 = e2 * y2;
        let tol = self.config.epsilon;

        let violates_kkt =
            (r2 < -tol && alpha2 < self.config.c) || (r2 > tol && alpha2 > 0.0);
        if !violates_kkt {
            return false;
        }

        let free: Vec<usize> = (0..n).filter(|&k| self.is_free(k)).collect();

        // Second-choice heuristic: maximize |E1 − E2| among free alphas
        if free.len() > 1 {
            let best = free.iter().copied().max_by(|&a, &b| {
                let da = (self.errors[a] - e2).abs();
                let db = (self.errors[b] - e2).abs();
                da.partial_cmp(&db).unwrap_or(Ordering::Equal)
            });
            if let Some(i1) = best {
                if self.take_step(i1, i2) {
                    return true;
                }
            }
        }

        for offset in 0..free.len() {
            let i1 = free[(i2 + offset) % free.len()];
            if self.take_step(i1, i2) {
                return true;
            }
        }

        for offset in 1..n {
            let i1 = (i2 + offset) % n;
            if self.take_step(i1, i2) {
                return true;
            }
        }

        false
    }

    /// Jointly optimize alphas `i1` and `i2`
    fn take_step(&mut self, i1: usize, i2: usize) -> bool {
        if i1 == i2 {
            return false;
        }

        let c = self.config.c;
        let eps = self.config.epsilon;
        let y1 = self.samples[i1].label;
        let y2 = self.samples[i2].label;
        let alpha1_old = self.alpha[i1];
        let alpha2_old = self.alpha[i2];
        let e1 = self.errors[i1];
        let e2 = self.errors[i2];
        let s = y1 * y2;

        let (low, high) = if y1 != y2 {
            (
                (alpha2_old - alpha1_old).max(0.0),
                (c + alpha2_old - alpha1_old).min(c),
            )
        } else {
            (
                (alpha1_old + alpha2_old - c).max(0.0),
                (alpha1_old + alpha2_old).min(c),
            )
        };
        if high - low < 1e-12 {
            return false;
        }

        let row1 = self.row(i1);
        let row2 = self.row(i2);
        let k11 = row1[i1];
        let k12 = row1[i2];
        let k22 = row2[i2];
        let eta = k11 + k22 - 2.0 * k12;

        let mut alpha2 = if eta > 0.0 {
            (alpha2_old + y2 * (e1 - e2) / eta).clamp(low, high)
        } else {
            // Degenerate curvature: pick the better end of the segment
            let f1 = y1 * (e1 - self.b) - alpha1_old * k11 - s * alpha2_old * k12;
            let f2 = y2 * (e2 - self.b) - s * alpha1_old * k12 - alpha2_old * k22;
            let objective_at = |a2: f64| {
                let a1 = alpha1_old + s * (alpha2_old - a2);
                a1 * f1 + a2 * f2 + 0.5 * a1 * a1 * k11 + 0.5 * a2 * a2 * k22 + s * a2 * a1 * k12
            };
            let low_obj = objective_at(low);
            let high_obj = objective_at(high);
            if low_obj < high_obj - eps {
                low
            } else if low_obj > high_obj + eps {
                high
            } else {
                alpha2_old
            }
        };

        if alpha2 < BOUND_SNAP {
            alpha2 = 0.0;
        } else if alpha2 > c - BOUND_SNAP {
            alpha2 = c;
        }

        if (alpha2 - alpha2_old).abs() < eps * (alpha2 + alpha2_old + eps) {
            return false;
        }

        let mut alpha1 = alpha1_old + s * (alpha2_old - alpha2);
        if alpha1 < BOUND_SNAP {
            alpha2 += s * alpha1;
            alpha1 = 0.0;
        } else if alpha1 > c - BOUND_SNAP {
            alpha2 += s * (alpha1 - c);
            alpha1 = c;
        }

        let d1 = y1 * (alpha1 - alpha1_old);
        let d2 = y2 * (alpha2 - alpha2_old);
        let b1 = self.b - e1 - d1 * k11 - d2 * k12;
        let b2 = self.b - e2 - d1 * k12 - d2 * k22;
        let new_b = if alpha1 > 0.0 && alpha1 < c {
            b1
        } else if alpha2 > 0.0 && alpha2 < c {
            b2
        } else {
            0.5 * (b1 + b2)
        };
        let delta_b = new_b - self.b;

        for (k, error) in self.errors.iter_mut().enumerate() {
            *error += d1 * row1[k] + d2 * row2[k] + delta_b;
        }
        self.alpha[i1] = alpha1;
        self.alpha[i2] = alpha2;
        self.b = new_b;

        true
    }

    /// Dual objective Σα − ½ ΣΣ αᵢαⱼyᵢyⱼK(xᵢ, xⱼ)
    fn objective(&mut self) -> f64 {
        let support: Vec<usize> = (0..self.samples.len())
            .filter(|&i| self.alpha[i] > 0.0)
            .collect();
        let mut obj: f64 = support.iter().map(|&i| self.alpha[i]).sum();

        for &i in &support {
            let row = self.row(i);
            for &j in &support {
                obj -= 0.5
                    * self.alpha[i]
                    * self.alpha[j]
                    * self.samples[i].label
                    * self.samples[j].label
                    * row[j];
            }
        }

        obj
    }
}
