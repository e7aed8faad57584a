//! Probability calibration for SVM decision values
//!
//! Each one-vs-one machine gets a Platt sigmoid P(y = +1 | f) =
//! 1 / (1 + exp(A·f + B)) fitted to held-out decision values. The pairwise
//! probabilities are then coupled into one distribution over all classes
//! (Wu, Lin & Weng 2004, method 2).

use log::warn;
use serde::{Deserialize, Serialize};

/// Pairwise probabilities are kept inside [MIN_PROB, 1 − MIN_PROB]
pub const MIN_PROB: f64 = 1e-7;

const MAX_NEWTON_ITERATIONS: usize = 100;
const MIN_STEP: f64 = 1e-10;
const HESSIAN_RIDGE: f64 = 1e-12;
const GRADIENT_TOLERANCE: f64 = 1e-5;

/// Platt sigmoid parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlattSigmoid {
    pub a: f64,
    pub b: f64,
}

impl PlattSigmoid {
    /// Fit A and B by regularized maximum likelihood with Newton's method
    /// and backtracking line search. `labels` are ±1.
    pub fn fit(decision_values: &[f64], labels: &[f64]) -> Self {
        debug_assert_eq!(decision_values.len(), labels.len());

        let prior1 = labels.iter().filter(|&&y| y > 0.0).count() as f64;
        let prior0 = labels.len() as f64 - prior1;

        let hi_target = (prior1 + 1.0) / (prior1 + 2.0);
        let lo_target = 1.0 / (prior0 + 2.0);
        let targets: Vec<f64> = labels
            .iter()
            .map(|&y| if y > 0.0 { hi_target } else { lo_target })
            .collect();

        let mut a = 0.0;
        let mut b = ((prior0 + 1.0) / (prior1 + 1.0)).ln();
        let mut fval = negative_log_likelihood(decision_values, &targets, a, b);

        for _ in 0..MAX_NEWTON_ITERATIONS {
            let mut h11 = HESSIAN_RIDGE;
            let mut h22 = HESSIAN_RIDGE;
            let mut h21 = 0.0;
            let mut g1 = 0.0;
            let mut g2 = 0.0;

            for (&dec, &t) in decision_values.iter().zip(targets.iter()) {
                let f_ap_b = dec * a + b;
                let (p, q) = if f_ap_b >= 0.0 {
                    let e = (-f_ap_b).exp();
                    (e / (1.0 + e), 1.0 / (1.0 + e))
                } else {
                    let e = f_ap_b.exp();
                    (1.0 / (1.0 + e), e / (1.0 + e))
                };
                let d2 = p * q;
                h11 += dec * dec * d2;
                h22 += d2;
                h21 += dec * d2;
                let d1 = t - p;
                g1 += dec * d1;
                g2 += d1;
            }

            if g1.abs() < GRADIENT_TOLERANCE && g2.abs() < GRADIENT_TOLERANCE {
                break;
            }

            let det = h11 * h22 - h21 * h21;
            let da = -(h22 * g1 - h21 * g2) / det;
            let db = -(-h21 * g1 + h11 * g2) / det;
            let gd = g1 * da + g2 * db;

            let mut step = 1.0;
            while step >= MIN_STEP {
                let new_a = a + step * da;
                let new_b = b + step * db;
                let new_f = negative_log_likelihood(decision_values, &targets, new_a, new_b);
                if new_f < fval + 0.0001 * step * gd {
                    a = new_a;
                    b = new_b;
                    fval = new_f;
                    break;
                }
                step /= 2.0;
            }

            if step < MIN_STEP {
                warn!("Platt scaling line search failed");
                break;
            }
        }

        Self { a, b }
    }

    /// P(y = +1 | decision value)
    pub fn predict(&self, decision_value: f64) -> f64 {
        let f_ap_b = decision_value * self.a + self.b;
        if f_ap_b >= 0.0 {
            let e = (-f_ap_b).exp();
            e / (1.0 + e)
        } else {
            1.0 / (1.0 + f_ap_b.exp())
        }
    }
}

fn negative_log_likelihood(decision_values: &[f64], targets: &[f64], a: f64, b: f64) -> f64 {
    decision_values
        .iter()
        .zip(targets.iter())
        .map(|(&dec, &t)| {
            let f_ap_b = dec * a + b;
            if f_ap_b >= 0.0 {
                t * f_ap_b + (1.0 + (-f_ap_b).exp()).ln()
            } else {
                (t - 1.0) * f_ap_b + (1.0 + f_ap_b.exp()).ln()
            }
        })
        .sum()
}

/// Couple pairwise probabilities `r[i][j] = P(i | i or j)` into a
/// distribution over all `r.len()` classes.
pub fn pairwise_coupling(r: &[Vec<f64>]) -> Vec<f64> {
    let k = r.len();
    if k == 0 {
        return Vec::new();
    }
    if k == 1 {
        return vec![1.0];
    }

    let max_iterations = k.max(100);
    let eps = 0.005 / k as f64;
    let mut p = vec![1.0 / k as f64; k];
    let mut q = vec![vec![0.0; k]; k];
    let mut qp = vec![0.0; k];

    for t in 0..k {
        for j in 0..k {
            if j == t {
                continue;
            }
            q[t][t] += r[j][t] * r[j][t];
            q[t][j] = -r[j][t] * r[t][j];
        }
    }

    for iteration in 0..max_iterations {
        let mut pqp = 0.0;
        for t in 0..k {
            qp[t] = (0..k).map(|j| q[t][j] * p[j]).sum();
            pqp += p[t] * qp[t];
        }

        let max_error = qp
            .iter()
            .map(|&v| (v - pqp).abs())
            .fold(0.0_f64, f64::max);
        if max_error < eps {
            break;
        }
        if iteration + 1 == max_iterations {
            warn!("Pairwise coupling reached {} iterations", max_iterations);
        }

        for t in 0..k {
            let diff = (-qp[t] + pqp) / q[t][t];
            p[t] += diff;
            pqp = (pqp + diff * (diff * q[t][t] + 2.0 * qp[t])) / ((1.0 + diff) * (1.0 + diff));
            for j in 0..k {
                qp[j] = (qp[j] + diff * q[t][j]) / (1.0 + diff);
                p[j] /= 1.0 + diff;
            }
        }
    }

    p
}
