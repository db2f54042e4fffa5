//! Model artifacts on disk
//!
//! A model is a pair of JSON files: the classifier at `<base>.<ext>` and the
//! vectorizer it was trained against at `<base>_vectorizer.<ext>`. Both are
//! loaded together and checked for a matching feature width.

pub mod cache;

pub use cache::ModelCache;

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::classifier::{Classifier, ModelSpec};
use crate::vectorizer::{FeatureEncoder, TokenVectorizer, VectorizerError, VectorizerSpec};

/// Suffix appended to the model file stem to locate its vectorizer
pub const VECTORIZER_SUFFIX: &str = "_vectorizer";

/// Errors while locating or loading model artifacts. Always fatal.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Model artifact not found: {}", path.display())]
    Missing { path: PathBuf },

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid model {}: {reason}", path.display())]
    Invalid { path: PathBuf, reason: String },

    #[error("Invalid vectorizer {}: {source}", path.display())]
    Vectorizer {
        path: PathBuf,
        #[source]
        source: VectorizerError,
    },

    #[error("Vectorizer produces {vectorizer} features but the classifier expects {classifier}")]
    DimensionMismatch { vectorizer: usize, classifier: usize },
}

/// Companion vectorizer path for a model path.
///
/// `models/rf_model.json` -> `models/rf_model_vectorizer.json`,
/// `rf_model` -> `rf_model_vectorizer`.
pub fn vectorizer_path_for(model_path: &Path) -> PathBuf {
    let stem = model_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match model_path.extension() {
        Some(ext) => format!("{stem}{VECTORIZER_SUFFIX}.{}", ext.to_string_lossy()),
        None => format!("{stem}{VECTORIZER_SUFFIX}"),
    };
    model_path.with_file_name(name)
}

/// Fail with [`ModelError::Missing`] unless both artifact files exist
pub fn ensure_artifacts_exist(model_path: &Path) -> Result<(), ModelError> {
    for path in [model_path.to_path_buf(), vectorizer_path_for(model_path)] {
        if !path.is_file() {
            return Err(ModelError::Missing { path });
        }
    }
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ModelError> {
    if !path.exists() {
        return Err(ModelError::Missing {
            path: path.to_path_buf(),
        });
    }
    let content = std::fs::read_to_string(path).map_err(|source| ModelError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| ModelError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Classifier plus the vectorizer it was trained against
#[derive(Debug)]
pub struct ModelArtifacts {
    pub classifier: Classifier,
    pub vectorizer: TokenVectorizer,
    /// Persisted model kind, e.g. `random_forest`
    pub kind: &'static str,
    pub model_path: PathBuf,
    pub vectorizer_path: PathBuf,
}

impl ModelArtifacts {
    /// Load and validate both artifacts for `model_path`
    pub fn load(model_path: &Path) -> Result<Self, ModelError> {
        let vectorizer_path = vectorizer_path_for(model_path);
        debug!(
            "Loading model {} with vectorizer {}",
            model_path.display(),
            vectorizer_path.display()
        );

        let spec: ModelSpec = read_json(model_path)?;
        let kind = spec.kind();
        let classifier = spec
            .into_classifier()
            .map_err(|reason| ModelError::Invalid {
                path: model_path.to_path_buf(),
                reason,
            })?;

        let vectorizer_spec: VectorizerSpec = read_json(&vectorizer_path)?;
        let vectorizer =
            TokenVectorizer::try_from(vectorizer_spec).map_err(|source| ModelError::Vectorizer {
                path: vectorizer_path.clone(),
                source,
            })?;

        let artifacts = Self::from_parts(classifier, vectorizer, kind)?;
        info!(
            "Loaded {} model ({}, {} features) from {}",
            kind,
            artifacts.classifier.capability(),
            artifacts.n_features(),
            model_path.display()
        );
        Ok(Self {
            model_path: model_path.to_path_buf(),
            vectorizer_path,
            ..artifacts
        })
    }

    /// Assemble artifacts already in memory, checking their widths agree
    pub fn from_parts(
        classifier: Classifier,
        vectorizer: TokenVectorizer,
        kind: &'static str,
    ) -> Result<Self, ModelError> {
        if let Some(expected) = classifier.n_features() {
            let produced = vectorizer.n_features();
            if expected != produced {
                return Err(ModelError::DimensionMismatch {
                    vectorizer: produced,
                    classifier: expected,
                });
            }
        }
        Ok(Self {
            classifier,
            vectorizer,
            kind,
            model_path: PathBuf::new(),
            vectorizer_path: PathBuf::new(),
        })
    }

    /// Width of the feature rows fed to the classifier
    pub fn n_features(&self) -> usize {
        self.vectorizer.n_features()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::fs;

    pub(crate) const VECTORIZER_JSON: &str = r#"{
        "vocabulary": {"keyword": 0, "name": 1, "operator": 2}
    }"#;

    pub(crate) const LOGISTIC_JSON: &str = r#"{
        "kind": "logistic_regression",
        "coef": [0.1, 0.1, 0.1],
        "intercept": 0.0
    }"#;

    pub(crate) fn write_model(dir: &Path, model: &str, vectorizer: &str) -> PathBuf {
        let model_path = dir.join("model.json");
        fs::write(&model_path, model).unwrap();
        fs::write(vectorizer_path_for(&model_path), vectorizer).unwrap();
        model_path
    }

    #[test]
    fn test_vectorizer_path_naming() {
        assert_eq!(
            vectorizer_path_for(Path::new("models/rf_model.json")),
            PathBuf::from("models/rf_model_vectorizer.json")
        );
        assert_eq!(
            vectorizer_path_for(Path::new("rf_model.pkl")),
            PathBuf::from("rf_model_vectorizer.pkl")
        );
        assert_eq!(
            vectorizer_path_for(Path::new("rf_model")),
            PathBuf::from("rf_model_vectorizer")
        );
        assert_eq!(
            vectorizer_path_for(Path::new("/opt/m/model.v2.json")),
            PathBuf::from("/opt/m/model.v2_vectorizer.json")
        );
    }

    #[test]
    fn test_load_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_model(dir.path(), LOGISTIC_JSON, VECTORIZER_JSON);

        let artifacts = ModelArtifacts::load(&path).unwrap();
        assert_eq!(artifacts.kind, "logistic_regression");
        assert_eq!(artifacts.n_features(), 3);
        assert_eq!(artifacts.classifier.capability(), "probabilistic");
        assert_eq!(artifacts.model_path, path);
        assert_eq!(artifacts.vectorizer_path, dir.path().join("model_vectorizer.json"));
    }

    #[test]
    fn test_missing_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        assert!(matches!(
            ModelArtifacts::load(&path),
            Err(ModelError::Missing { .. })
        ));
        assert!(ensure_artifacts_exist(&path).is_err());

        // Model present, vectorizer missing
        fs::write(&path, LOGISTIC_JSON).unwrap();
        match ensure_artifacts_exist(&path) {
            Err(ModelError::Missing { path: missing }) => {
                assert_eq!(missing, dir.path().join("absent_vectorizer.json"))
            }
            other => panic!("expected missing vectorizer, got {other:?}"),
        }
        assert!(matches!(
            ModelArtifacts::load(&path),
            Err(ModelError::Missing { .. })
        ));
    }

    #[test]
    fn test_parse_and_validation_errors() {
        let dir = tempfile::tempdir().unwrap();

        let path = write_model(dir.path(), "not json", VECTORIZER_JSON);
        assert!(matches!(
            ModelArtifacts::load(&path),
            Err(ModelError::Parse { .. })
        ));

        let path = write_model(
            dir.path(),
            r#"{"kind": "logistic_regression", "coef": [], "intercept": 0.0}"#,
            VECTORIZER_JSON,
        );
        assert!(matches!(
            ModelArtifacts::load(&path),
            Err(ModelError::Invalid { .. })
        ));

        let path = write_model(dir.path(), LOGISTIC_JSON, r#"{"vocabulary": {"a": 3}}"#);
        assert!(matches!(
            ModelArtifacts::load(&path),
            Err(ModelError::Vectorizer { .. })
        ));
    }

    #[test]
    fn test_dimension_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_model(
            dir.path(),
            r#"{"kind": "logistic_regression", "coef": [1.0, 1.0], "intercept": 0.0}"#,
            VECTORIZER_JSON,
        );
        match ModelArtifacts::load(&path) {
            Err(ModelError::DimensionMismatch {
                vectorizer,
                classifier,
            }) => {
                assert_eq!(vectorizer, 3);
                assert_eq!(classifier, 2);
            }
            other => panic!("expected mismatch, got {other:?}"),
        }
    }
}
