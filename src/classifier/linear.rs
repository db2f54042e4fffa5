//! Linear models

use serde::{Deserialize, Serialize};

use super::{PointModel, ProbabilisticModel};

fn decision_function(coef: &[f64], intercept: f64, features: &[f64]) -> f64 {
    coef.iter()
        .zip(features.iter())
        .map(|(w, x)| w * x)
        .sum::<f64>()
        + intercept
}

fn validate_coef(coef: &[f64], intercept: f64) -> Result<(), String> {
    if coef.is_empty() {
        return Err("linear model has no coefficients".into());
    }
    if !intercept.is_finite() || coef.iter().any(|w| !w.is_finite()) {
        return Err("linear model has non-finite weights".into());
    }
    Ok(())
}

/// Binary logistic regression: `[1 - p, p]` with `p = sigmoid(w.x + b)`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub coef: Vec<f64>,
    pub intercept: f64,
}

impl LogisticRegression {
    pub fn validate(&self) -> Result<(), String> {
        validate_coef(&self.coef, self.intercept)
    }
}

impl ProbabilisticModel for LogisticRegression {
    fn predict_proba(&self, features: &[f64]) -> Vec<f64> {
        let z = decision_function(&self.coef, self.intercept, features);
        let p = 1.0 / (1.0 + (-z).exp());
        vec![1.0 - p, p]
    }

    fn n_features(&self) -> Option<usize> {
        Some(self.coef.len())
    }
}

/// Linear support vector classifier. No probabilities, only a class label:
/// `1.0` when the margin is positive, else `0.0`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearSvc {
    pub coef: Vec<f64>,
    pub intercept: f64,
}

impl LinearSvc {
    pub fn validate(&self) -> Result<(), String> {
        validate_coef(&self.coef, self.intercept)
    }
}

impl PointModel for LinearSvc {
    fn predict(&self, features: &[f64]) -> f64 {
        if decision_function(&self.coef, self.intercept, features) > 0.0 {
            1.0
        } else {
            0.0
        }
    }

    fn n_features(&self) -> Option<usize> {
        Some(self.coef.len())
    }
}
