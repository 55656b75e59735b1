//! L2-regularized logistic regression over WoE-encoded features.
//!
//! Fitted with iteratively reweighted least squares: each step solves
//! the weighted normal equations (X'WX + lambda*I) b = X'Wz with a
//! partial-pivot LU decomposition. WoE encoding leaves the design
//! well-scaled, so convergence is fast and no standardization pass is
//! needed. The intercept is never penalized.

use anyhow::Result;
use faer::prelude::*;
use faer::Mat;
use serde::Serialize;

use super::error::PipelineError;

/// Weights below this are clamped so the working response stays finite
const MIN_IRLS_WEIGHT: f64 = 1e-10;

/// Convergence controls for the IRLS fit
#[derive(Debug, Clone, Copy)]
pub struct FitOptions {
    pub max_iterations: usize,
    pub tolerance: f64,
    pub l2_penalty: f64,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            tolerance: 1e-8,
            l2_penalty: 1.0,
        }
    }
}

/// Frozen fitted model: coefficient per feature plus intercept
#[derive(Debug, Clone, Serialize)]
pub struct LogisticModel {
    pub feature_names: Vec<String>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    pub iterations: usize,
    pub converged: bool,
}

impl LogisticModel {
    /// Probability of the bad outcome for one encoded row.
    pub fn predict_row(&self, row: &[f64]) -> f64 {
        let linear = self.intercept
            + self
                .coefficients
                .iter()
                .zip(row.iter())
                .map(|(c, x)| c * x)
                .sum::<f64>();
        sigmoid(linear)
    }

    /// Probabilities for a column-major feature matrix (one Vec per feature,
    /// in `feature_names` order).
    pub fn predict_proba(&self, features: &[Vec<f64>]) -> Vec<f64> {
        let rows = features.first().map(|c| c.len()).unwrap_or(0);
        (0..rows)
            .map(|r| {
                let linear = self.intercept
                    + self
                        .coefficients
                        .iter()
                        .zip(features.iter())
                        .map(|(c, col)| c * col[r])
                        .sum::<f64>();
                sigmoid(linear)
            })
            .collect()
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Fit the model on training rows only. `features` is column-major, one
/// Vec per feature aligned with `feature_names`.
pub fn fit_logistic(
    feature_names: &[String],
    features: &[Vec<f64>],
    targets: &[i32],
    options: &FitOptions,
) -> Result<LogisticModel> {
    let n_features = features.len();
    let n_rows = targets.len();

    if n_features == 0 || n_rows == 0 {
        return Err(PipelineError::UndefinedStatistic {
            context: "model fit".to_string(),
            detail: format!("{} features over {} rows", n_features, n_rows),
        }
        .into());
    }

    let positives = targets.iter().filter(|&&y| y == 1).count();
    if positives == 0 || positives == n_rows {
        return Err(PipelineError::UndefinedStatistic {
            context: "model fit".to_string(),
            detail: "training target has a single class".to_string(),
        }
        .into());
    }

    // Design matrix with the intercept in column 0
    let p = n_features + 1;
    let mut x = Mat::<f64>::zeros(n_rows, p);
    for r in 0..n_rows {
        x[(r, 0)] = 1.0;
        for (c, col) in features.iter().enumerate() {
            x[(r, c + 1)] = col[r];
        }
    }

    let mut beta = vec![0.0f64; p];
    let mut converged = false;
    let mut iterations = 0;

    for iter in 0..options.max_iterations {
        iterations = iter + 1;

        let mut a = Mat::<f64>::zeros(p, p);
        let mut b = Mat::<f64>::zeros(p, 1);

        for r in 0..n_rows {
            let mut eta = 0.0;
            for c in 0..p {
                eta += x[(r, c)] * beta[c];
            }
            let mu = sigmoid(eta);
            let w = (mu * (1.0 - mu)).max(MIN_IRLS_WEIGHT);
            // Working response of the current linearization
            let z = eta + (targets[r] as f64 - mu) / w;

            for i in 0..p {
                let xi = x[(r, i)];
                b[(i, 0)] += w * xi * z;
                for j in i..p {
                    a[(i, j)] += w * xi * x[(r, j)];
                }
            }
        }
        // Mirror the upper triangle and add the ridge penalty (skip intercept)
        for i in 0..p {
            for j in 0..i {
                a[(i, j)] = a[(j, i)];
            }
            if i > 0 {
                a[(i, i)] += options.l2_penalty;
            }
        }

        let solution = a.partial_piv_lu().solve(&b);

        let mut max_delta = 0.0f64;
        for c in 0..p {
            let delta = (solution[(c, 0)] - beta[c]).abs();
            if delta > max_delta {
                max_delta = delta;
            }
            beta[c] = solution[(c, 0)];
        }

        if max_delta < options.tolerance {
            converged = true;
            break;
        }
    }

    Ok(LogisticModel {
        feature_names: feature_names.to_vec(),
        coefficients: beta[1..].to_vec(),
        intercept: beta[0],
        iterations,
        converged,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("var_{}", i)).collect()
    }

    #[test]
    fn test_separable_data_orders_correctly() {
        // Feature strongly positive for bads
        let feature: Vec<f64> = vec![-2.0, -1.5, -1.0, -0.5, 0.5, 1.0, 1.5, 2.0];
        let targets = vec![0, 0, 0, 0, 1, 1, 1, 1];

        let model = fit_logistic(&names(1), &[feature.clone()], &targets, &FitOptions::default())
            .unwrap();

        assert!(model.converged);
        assert!(model.coefficients[0] > 0.0);

        let probs = model.predict_proba(&[feature]);
        assert!(probs[0] < probs[7]);
        assert!(probs.iter().all(|p| *p > 0.0 && *p < 1.0));
    }

    #[test]
    fn test_intercept_matches_base_rate_without_signal() {
        // Uninformative feature: probability collapses to the base rate
        let feature = vec![0.0; 100];
        let targets: Vec<i32> = (0..100).map(|i| (i < 25) as i32).collect();

        let model =
            fit_logistic(&names(1), &[feature], &targets, &FitOptions::default()).unwrap();

        let p = sigmoid(model.intercept);
        assert!((p - 0.25).abs() < 0.02, "base rate estimate {}", p);
    }

    #[test]
    fn test_single_class_target_errors() {
        let feature = vec![1.0, 2.0, 3.0];
        let result = fit_logistic(&names(1), &[feature], &[1, 1, 1], &FitOptions::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_penalty_shrinks_coefficients() {
        let feature: Vec<f64> = (0..40).map(|i| i as f64 / 10.0 - 2.0).collect();
        let targets: Vec<i32> = feature.iter().map(|&x| (x > 0.0) as i32).collect();

        let loose = fit_logistic(
            &names(1),
            &[feature.clone()],
            &targets,
            &FitOptions {
                l2_penalty: 0.1,
                ..Default::default()
            },
        )
        .unwrap();
        let tight = fit_logistic(
            &names(1),
            &[feature],
            &targets,
            &FitOptions {
                l2_penalty: 10.0,
                ..Default::default()
            },
        )
        .unwrap();

        assert!(tight.coefficients[0].abs() < loose.coefficients[0].abs());
    }

    #[test]
    fn test_predict_row_matches_predict_proba() {
        let features = vec![vec![0.5, -0.3, 1.2], vec![-1.0, 0.4, 0.0]];
        let targets = vec![1, 0, 1];
        let model =
            fit_logistic(&names(2), &features, &targets, &FitOptions::default()).unwrap();

        let batch = model.predict_proba(&features);
        for r in 0..3 {
            let row = vec![features[0][r], features[1][r]];
            assert!((model.predict_row(&row) - batch[r]).abs() < 1e-12);
        }
    }
}
