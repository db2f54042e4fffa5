//! Similarity classifier
//!
//! A classifier maps a dense feature row to a similarity score. Models come in
//! two capabilities, fixed when the model is loaded:
//!
//! - **probabilistic**: a distribution over `[dissimilar, similar]`; the score
//!   is the mass on "similar"
//! - **point**: a single raw prediction used directly as the score
//!
//! Either way the verdict is `score >= 0.5`.
//!
//! Persisted models are JSON documents tagged by `kind`:
//! `random_forest`, `logistic_regression`, `mlp`, `linear_svc`, `gbdt`.

pub mod forest;
pub mod gbdt_model;
pub mod linear;
pub mod mlp;

pub use forest::{DecisionTree, RandomForest};
pub use gbdt_model::{GbdtClassifier, GbdtOutput, GbdtSpec};
pub use linear::{LinearSvc, LogisticRegression};
pub use mlp::MlpClassifier;

use serde::{Deserialize, Serialize};

/// Scores at or above this are "similar". Not configurable.
pub const SIMILARITY_THRESHOLD: f64 = 0.5;

/// Model exposing a class probability distribution
pub trait ProbabilisticModel: Send + Sync {
    /// Class probabilities in class order; "similar" is the second class
    fn predict_proba(&self, features: &[f64]) -> Vec<f64>;

    /// Expected input width, when the model records one
    fn n_features(&self) -> Option<usize>;
}

/// Model exposing only a single prediction value
pub trait PointModel: Send + Sync {
    fn predict(&self, features: &[f64]) -> f64;

    fn n_features(&self) -> Option<usize>;
}

/// Loaded classifier, tagged by capability
pub enum Classifier {
    Probabilistic(Box<dyn ProbabilisticModel>),
    Point(Box<dyn PointModel>),
}

impl Classifier {
    /// Raw similarity score for one dense row
    pub fn score(&self, features: &[f64]) -> f64 {
        match self {
            Classifier::Probabilistic(model) => {
                similar_class_probability(&model.predict_proba(features))
            }
            Classifier::Point(model) => model.predict(features),
        }
    }

    pub fn predict(&self, features: &[f64]) -> SimilarityResult {
        SimilarityResult::from_score(self.score(features))
    }

    pub fn n_features(&self) -> Option<usize> {
        match self {
            Classifier::Probabilistic(model) => model.n_features(),
            Classifier::Point(model) => model.n_features(),
        }
    }

    pub fn capability(&self) -> &'static str {
        match self {
            Classifier::Probabilistic(_) => "probabilistic",
            Classifier::Point(_) => "point",
        }
    }
}

impl std::fmt::Debug for Classifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Classifier")
            .field("capability", &self.capability())
            .field("n_features", &self.n_features())
            .finish()
    }
}

/// Mass on the "similar" class.
///
/// A single-entry distribution comes from a model fitted on one class only;
/// its sole probability is used as-is.
pub fn similar_class_probability(proba: &[f64]) -> f64 {
    match proba {
        [_, similar, ..] => *similar,
        [only] => *only,
        [] => 0.0,
    }
}

/// Score plus thresholded verdict
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SimilarityResult {
    pub score: f64,
    pub is_similar: bool,
}

impl SimilarityResult {
    pub fn from_score(score: f64) -> Self {
        Self {
            score,
            is_similar: score >= SIMILARITY_THRESHOLD,
        }
    }

    pub fn as_pair(&self) -> (Option<f64>, Option<bool>) {
        (Some(self.score), Some(self.is_similar))
    }
}

/// Two-slot view of a possibly absent result: `(score, is_similar)`
pub fn into_pair(result: Option<SimilarityResult>) -> (Option<f64>, Option<bool>) {
    result.map_or((None, None), |r| r.as_pair())
}

/// Persisted classifier document
#[derive(Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelSpec {
    RandomForest(RandomForest),
    LogisticRegression(LogisticRegression),
    Mlp(MlpClassifier),
    LinearSvc(LinearSvc),
    Gbdt(GbdtSpec),
}

impl ModelSpec {
    pub fn kind(&self) -> &'static str {
        match self {
            ModelSpec::RandomForest(_) => "random_forest",
            ModelSpec::LogisticRegression(_) => "logistic_regression",
            ModelSpec::Mlp(_) => "mlp",
            ModelSpec::LinearSvc(_) => "linear_svc",
            ModelSpec::Gbdt(_) => "gbdt",
        }
    }

    /// Validate the model and pick its capability variant
    pub fn into_classifier(self) -> Result<Classifier, String> {
        match self {
            ModelSpec::RandomForest(m) => {
                m.validate()?;
                Ok(Classifier::Probabilistic(Box::new(m)))
            }
            ModelSpec::LogisticRegression(m) => {
                m.validate()?;
                Ok(Classifier::Probabilistic(Box::new(m)))
            }
            ModelSpec::Mlp(m) => {
                m.validate()?;
                Ok(Classifier::Probabilistic(Box::new(m)))
            }
            ModelSpec::LinearSvc(m) => {
                m.validate()?;
                Ok(Classifier::Point(Box::new(m)))
            }
            ModelSpec::Gbdt(spec) => spec.into_classifier(),
        }
    }
}
