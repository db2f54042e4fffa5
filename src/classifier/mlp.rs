//! Multi-layer perceptron classifier
//!
//! Architecture: Input → Linear(hidden) → ReLU → Linear(2) → Softmax

use serde::{Deserialize, Serialize};

use super::ProbabilisticModel;

/// 2-layer MLP with pre-trained weights
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MlpClassifier {
    /// First layer weights [hidden_size x input_size]
    pub w1: Vec<Vec<f64>>,
    /// First layer bias [hidden_size]
    pub b1: Vec<f64>,
    /// Second layer weights [2 x hidden_size]
    pub w2: Vec<Vec<f64>>,
    /// Second layer bias [2]
    pub b2: Vec<f64>,
}

impl MlpClassifier {
    pub fn with_weights(w1: Vec<Vec<f64>>, b1: Vec<f64>, w2: Vec<Vec<f64>>, b2: Vec<f64>) -> Self {
        Self { w1, b1, w2, b2 }
    }

    pub fn input_size(&self) -> usize {
        self.w1.first().map(|r| r.len()).unwrap_or(0)
    }

    pub fn hidden_size(&self) -> usize {
        self.w1.len()
    }

    pub fn validate(&self) -> Result<(), String> {
        let input = self.input_size();
        let hidden = self.hidden_size();
        if input == 0 || hidden == 0 {
            return Err("mlp has an empty layer".into());
        }
        if self.w1.iter().any(|r| r.len() != input) {
            return Err("mlp w1 rows differ in length".into());
        }
        if self.b1.len() != hidden {
            return Err(format!("mlp b1 has {} entries, expected {hidden}", self.b1.len()));
        }
        if self.w2.len() != 2 || self.b2.len() != 2 {
            return Err("mlp output layer must have exactly 2 units".into());
        }
        if self.w2.iter().any(|r| r.len() != hidden) {
            return Err(format!("mlp w2 rows must have {hidden} entries"));
        }
        Ok(())
    }

    fn logits(&self, features: &[f64]) -> [f64; 2] {
        // Layer 1: Linear + ReLU
        let hidden: Vec<f64> = self
            .w1
            .iter()
            .zip(&self.b1)
            .map(|(row, b)| {
                let sum: f64 = row.iter().zip(features).map(|(w, x)| w * x).sum();
                (sum + b).max(0.0)
            })
            .collect();

        // Layer 2: Linear
        let mut logits = [0.0f64; 2];
        for (i, logit) in logits.iter_mut().enumerate() {
            *logit = self.b2[i] + self.w2[i].iter().zip(&hidden).map(|(w, h)| w * h).sum::<f64>();
        }
        logits
    }
}

impl ProbabilisticModel for MlpClassifier {
    fn predict_proba(&self, features: &[f64]) -> Vec<f64> {
        let logits = self.logits(features);

        // Softmax
        let max_logit = logits[0].max(logits[1]);
        let exp0 = (logits[0] - max_logit).exp();
        let exp1 = (logits[1] - max_logit).exp();
        let sum = exp0 + exp1;

        vec![exp0 / sum, exp1 / sum]
    }

    fn n_features(&self) -> Option<usize> {
        Some(self.input_size())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity_mlp() -> MlpClassifier {
        // hidden = relu(x), logits = [0, h0 - h1]
        MlpClassifier::with_weights(
            vec![vec![1.0, 0.0], vec![0.0, 1.0]],
            vec![0.0, 0.0],
            vec![vec![0.0, 0.0], vec![1.0, -1.0]],
            vec![0.0, 0.0],
        )
    }

    #[test]
    fn test_forward_probabilities_sum_to_one() {
        let mlp = identity_mlp();
        mlp.validate().unwrap();
        let proba = mlp.predict_proba(&[2.0, 0.0]);
        assert!((proba[0] + proba[1] - 1.0).abs() < 1e-12);
        assert!(proba[1] > 0.5);

        let proba = mlp.predict_proba(&[0.0, 2.0]);
        assert!(proba[1] < 0.5);
    }

    #[test]
    fn test_relu_clamps_negative_hidden() {
        let mlp = identity_mlp();
        let proba = mlp.predict_proba(&[-5.0, -5.0]);
        assert!((proba[1] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_validate_shapes() {
        let mut mlp = identity_mlp();
        mlp.b1.pop();
        assert!(mlp.validate().is_err());

        let mut mlp = identity_mlp();
        mlp.w2.pop();
        mlp.b2.pop();
        assert!(mlp.validate().unwrap_err().contains("exactly 2"));

        assert_eq!(identity_mlp().n_features(), Some(2));
    }
}
