//! GBDT model wrapper for pair classification
//!
//! Wraps the `gbdt` crate. A model trained with the `LogLikelyhood` loss
//! yields calibrated probabilities and is loaded as a probabilistic
//! classifier; regression losses yield raw values and are loaded as point
//! classifiers. Which one applies is recorded in the artifact's `output`
//! field because the crate does not expose the loss of a loaded model.
//!
//! Note: the gbdt crate internally uses `f32` (`ValueType`), while feature
//! rows are `f64`. Conversions happen at the crate boundary.

use gbdt::decision_tree::Data;
use gbdt::gradient_boost::GBDT;
use serde::{Deserialize, Serialize};

use super::{Classifier, PointModel, ProbabilisticModel};

/// How to read the model's output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GbdtOutput {
    /// Probability of the "similar" class
    #[default]
    Probability,
    /// Raw regression value, used as the score directly
    Raw,
}

/// Persisted GBDT classifier
#[derive(Serialize, Deserialize)]
pub struct GbdtSpec {
    #[serde(default)]
    pub output: GbdtOutput,
    #[serde(default)]
    pub n_features: Option<usize>,
    /// gbdt-rs native model
    pub model: GBDT,
}

impl GbdtSpec {
    /// Check the trained shape and pick the capability variant.
    ///
    /// The feature width defaults to the trained `feature_size` when the
    /// artifact does not record one.
    pub fn into_classifier(self) -> Result<Classifier, String> {
        let trained = trained_feature_size(&self.model)?;
        let n_features = match self.n_features {
            Some(n) if n != trained => {
                return Err(format!(
                    "n_features is {n} but the gbdt model was trained on {trained} features"
                ))
            }
            _ => trained,
        };

        let classifier = GbdtClassifier::from_trained(self.model, Some(n_features));
        Ok(match self.output {
            GbdtOutput::Probability => Classifier::Probabilistic(Box::new(classifier)),
            GbdtOutput::Raw => Classifier::Point(Box::new(classifier)),
        })
    }
}

/// Trained feature width of a gbdt model whose trees are safe to evaluate.
///
/// The crate keeps its config and trees private and panics on malformed
/// ones, so the shape is read from the serialized form: one tree per
/// iteration, every split on a feature below `feature_size`, and every
/// split node pointing at existing children.
fn trained_feature_size(model: &GBDT) -> Result<usize, String> {
    let value = serde_json::to_value(model).map_err(|e| format!("unreadable gbdt model: {e}"))?;

    let conf = &value["conf"];
    let feature_size = conf["feature_size"]
        .as_u64()
        .ok_or("gbdt model has no conf.feature_size")? as usize;
    let iterations = conf["iterations"]
        .as_u64()
        .ok_or("gbdt model has no conf.iterations")? as usize;
    let trees = value["trees"]
        .as_array()
        .ok_or("gbdt model has no trees")?;

    if trees.len() != iterations {
        return Err(format!(
            "gbdt model has {} trees for {} iterations",
            trees.len(),
            iterations
        ));
    }

    for (t, tree) in trees.iter().enumerate() {
        let nodes = tree["tree"]["tree"]
            .as_array()
            .ok_or_else(|| format!("gbdt tree {t} has no nodes"))?;
        if nodes.is_empty() {
            return Err(format!("gbdt tree {t} is empty"));
        }
        for node in nodes {
            if node["value"]["is_leaf"].as_bool().unwrap_or(false) {
                continue;
            }
            let feature = node["value"]["feature_index"].as_u64().unwrap_or(u64::MAX);
            if feature >= feature_size as u64 {
                return Err(format!(
                    "gbdt tree {t} splits on feature {feature}, model has {feature_size}"
                ));
            }
            for side in ["left", "right"] {
                let child = node[side].as_u64().unwrap_or(0);
                if child == 0 || child >= nodes.len() as u64 {
                    return Err(format!("gbdt tree {t} has a split with no {side} child"));
                }
            }
        }
    }

    Ok(feature_size)
}

/// Thin wrapper around `gbdt::gradient_boost::GBDT`
pub struct GbdtClassifier {
    model: GBDT,
    n_features: Option<usize>,
}

impl GbdtClassifier {
    pub fn from_trained(model: GBDT, n_features: Option<usize>) -> Self {
        Self { model, n_features }
    }

    /// Raw model output for one row
    pub fn raw_prediction(&self, features: &[f64]) -> f64 {
        let row: Vec<f32> = features.iter().map(|&v| v as f32).collect();
        let data = vec![Data::new_test_data(row, None)];
        let preds = self.model.predict(&data);
        preds.first().copied().unwrap_or(0.5_f32) as f64
    }
}

impl ProbabilisticModel for GbdtClassifier {
    fn predict_proba(&self, features: &[f64]) -> Vec<f64> {
        let p = self.raw_prediction(features).clamp(0.0, 1.0);
        vec![1.0 - p, p]
    }

    fn n_features(&self) -> Option<usize> {
        self.n_features
    }
}

impl PointModel for GbdtClassifier {
    fn predict(&self, features: &[f64]) -> f64 {
        self.raw_prediction(features)
    }

    fn n_features(&self) -> Option<usize> {
        self.n_features
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::ModelSpec;
    use gbdt::config::Config;

    /// Two clusters: first feature high means similar
    fn train(loss: &str) -> GBDT {
        let mut cfg = Config::new();
        cfg.set_feature_size(2);
        cfg.set_max_depth(2);
        cfg.set_iterations(10);
        cfg.set_shrinkage(0.3);
        cfg.set_loss(loss);
        cfg.set_debug(false);
        cfg.set_training_optimization_level(2);
        cfg.set_min_leaf_size(1);

        // LogLikelyhood expects labels in {-1, 1}
        let negative = if loss == "LogLikelyhood" { -1.0 } else { 0.0 };

        let mut data: Vec<Data> = (0..20)
            .map(|i| {
                let similar = i % 2 == 0;
                let x = if similar { 0.8 + (i as f32) * 0.005 } else { 0.1 + (i as f32) * 0.005 };
                let label = if similar { 1.0 } else { negative };
                Data::new_training_data(vec![x, 0.5], 1.0, label, None)
            })
            .collect();

        let mut model = GBDT::new(&cfg);
        model.fit(&mut data);
        model
    }

    #[test]
    fn test_probability_output_is_probabilistic() {
        let spec = GbdtSpec {
            output: GbdtOutput::Probability,
            n_features: Some(2),
            model: train("LogLikelyhood"),
        };
        let classifier = spec.into_classifier().unwrap();
        assert_eq!(classifier.capability(), "probabilistic");
        assert_eq!(classifier.n_features(), Some(2));

        let high = classifier.score(&[0.9, 0.5]);
        let low = classifier.score(&[0.1, 0.5]);
        assert!((0.0..=1.0).contains(&high));
        assert!((0.0..=1.0).contains(&low));
        assert!(high >= low);
    }

    #[test]
    fn test_raw_output_is_point() {
        let spec = GbdtSpec {
            output: GbdtOutput::Raw,
            n_features: None,
            model: train("SquaredError"),
        };
        let classifier = spec.into_classifier().unwrap();
        assert_eq!(classifier.capability(), "point");
        // Width taken from the trained config
        assert_eq!(classifier.n_features(), Some(2));
        assert!(classifier.score(&[0.9, 0.5]).is_finite());
    }

    #[test]
    fn test_model_spec_json_roundtrip() {
        let model = train("LogLikelyhood");
        let json = serde_json::json!({
            "kind": "gbdt",
            "n_features": 2,
            "model": serde_json::to_value(&model).unwrap(),
        });
        let spec: ModelSpec = serde_json::from_value(json).unwrap();
        assert_eq!(spec.kind(), "gbdt");

        let classifier = spec.into_classifier().unwrap();
        let direct = GbdtClassifier::from_trained(model, Some(2));
        let expected = direct.predict_proba(&[0.9, 0.5])[1];
        assert!((classifier.score(&[0.9, 0.5]) - expected).abs() < 1e-6);
    }

    #[test]
    fn test_declared_width_must_match_training() {
        let spec = GbdtSpec {
            output: GbdtOutput::Probability,
            n_features: Some(3),
            model: train("LogLikelyhood"),
        };
        let err = spec.into_classifier().err().unwrap();
        assert!(err.contains("trained on 2 features"), "{err}");
    }

    #[test]
    fn test_missing_trees_are_rejected() {
        let mut value = serde_json::to_value(train("LogLikelyhood")).unwrap();
        value["trees"].as_array_mut().unwrap().pop();
        let spec = GbdtSpec {
            output: GbdtOutput::Probability,
            n_features: None,
            model: serde_json::from_value(value).unwrap(),
        };
        let err = spec.into_classifier().err().unwrap();
        assert!(err.contains("9 trees for 10 iterations"), "{err}");
    }

    #[test]
    fn test_out_of_range_split_is_rejected() {
        let mut value = serde_json::to_value(train("LogLikelyhood")).unwrap();
        let nodes = value["trees"][0]["tree"]["tree"].as_array_mut().unwrap();
        let split = nodes
            .iter_mut()
            .find(|n| !n["value"]["is_leaf"].as_bool().unwrap())
            .unwrap();
        split["value"]["feature_index"] = serde_json::json!(7);
        let spec = GbdtSpec {
            output: GbdtOutput::Probability,
            n_features: None,
            model: serde_json::from_value(value).unwrap(),
        };
        let err = spec.into_classifier().err().unwrap();
        assert!(err.contains("splits on feature 7"), "{err}");
    }

    #[test]
    fn test_narrow_vectorizer_fails_at_load() {
        use crate::model::tests::write_model;
        use crate::model::{ModelArtifacts, ModelError};

        let dir = tempfile::tempdir().unwrap();
        let model = serde_json::json!({
            "kind": "gbdt",
            "model": serde_json::to_value(train("LogLikelyhood")).unwrap(),
        });
        let path = write_model(
            dir.path(),
            &model.to_string(),
            r#"{"vocabulary": {"keyword": 0}}"#,
        );

        match ModelArtifacts::load(&path) {
            Err(ModelError::DimensionMismatch {
                vectorizer,
                classifier,
            }) => {
                assert_eq!(vectorizer, 1);
                assert_eq!(classifier, 2);
            }
            other => panic!("expected dimension mismatch, got {other:?}"),
        }
    }
}
