//! Similarity prediction pipeline
//!
//! Runs the four stages for one pair of files:
//! 1. Lex each file into a token stream
//! 2. Pair the streams into one feature string (A then B)
//! 3. Vectorize the paired string
//! 4. Classify the dense row into a score and verdict
//!
//! Input problems (unreadable, not UTF-8, too large) are logged and reported
//! as an absent result. Model problems are returned as errors.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use crate::classifier::SimilarityResult;
use crate::lexer::{JavaTokenizer, Tokenizer};
use crate::model::{ModelArtifacts, ModelCache, ModelError};
use crate::pairing::{encode_pair, PairedFeatures};
use crate::vectorizer::FeatureEncoder;

/// Failure reading one of the compared files
#[derive(Error, Debug)]
pub enum InputError {
    #[error("Cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not valid UTF-8", path.display())]
    Decode { path: PathBuf },

    #[error("{} is {size} bytes, limit is {limit}", path.display())]
    TooLarge { path: PathBuf, size: u64, limit: u64 },
}

/// Read a whole file as UTF-8, optionally bounded by `limit` bytes
pub fn read_source(path: &Path, limit: Option<u64>) -> Result<String, InputError> {
    let read_err = |source| InputError::Read {
        path: path.to_path_buf(),
        source,
    };

    if let Some(limit) = limit {
        let size = std::fs::metadata(path).map_err(read_err)?.len();
        if size > limit {
            return Err(InputError::TooLarge {
                path: path.to_path_buf(),
                size,
                limit,
            });
        }
    }

    let bytes = std::fs::read(path).map_err(read_err)?;
    String::from_utf8(bytes).map_err(|_| InputError::Decode {
        path: path.to_path_buf(),
    })
}

/// Pair scorer over an explicitly supplied tokenizer
pub struct SimilarityPipeline<T: Tokenizer> {
    tokenizer: T,
    cache: ModelCache,
    max_file_bytes: Option<u64>,
}

impl Default for SimilarityPipeline<JavaTokenizer> {
    fn default() -> Self {
        Self::new(JavaTokenizer::new())
    }
}

impl<T: Tokenizer> SimilarityPipeline<T> {
    pub fn new(tokenizer: T) -> Self {
        Self {
            tokenizer,
            cache: ModelCache::new(),
            max_file_bytes: None,
        }
    }

    /// Refuse files larger than `limit` bytes
    pub fn with_max_file_bytes(mut self, limit: Option<u64>) -> Self {
        self.max_file_bytes = limit;
        self
    }

    /// Score two files with the model at `model_path`.
    ///
    /// Returns `Ok(None)` when either file cannot be read; the cause is
    /// logged. Model loading failures are returned as errors.
    pub fn predict(
        &self,
        file_a: &Path,
        file_b: &Path,
        model_path: &Path,
    ) -> Result<Option<SimilarityResult>, ModelError> {
        let artifacts = self.cache.get_or_load(model_path)?;

        let (source_a, source_b) = match self.read_pair(file_a, file_b) {
            Ok(sources) => sources,
            Err(e) => {
                warn!("Prediction skipped: {}", e);
                return Ok(None);
            }
        };

        Ok(Some(self.score_sources(&source_a, &source_b, &artifacts)))
    }

    fn read_pair(&self, file_a: &Path, file_b: &Path) -> Result<(String, String), InputError> {
        let a = read_source(file_a, self.max_file_bytes)?;
        let b = read_source(file_b, self.max_file_bytes)?;
        Ok((a, b))
    }

    /// Paired feature string for two in-memory sources
    pub fn features_for(&self, source_a: &str, source_b: &str) -> PairedFeatures {
        let stream_a = self.tokenizer.extract(source_a);
        let stream_b = self.tokenizer.extract(source_b);
        debug!(
            "Token streams: {} and {} tokens",
            stream_a.len(),
            stream_b.len()
        );
        encode_pair(&stream_a, &stream_b)
    }

    /// Score two in-memory sources against loaded artifacts
    pub fn score_sources(
        &self,
        source_a: &str,
        source_b: &str,
        artifacts: &ModelArtifacts,
    ) -> SimilarityResult {
        let features = self.features_for(source_a, source_b);
        let row = artifacts
            .vectorizer
            .transform(&[features.as_str()])
            .into_iter()
            .next()
            .map(|v| v.to_dense())
            .unwrap_or_else(|| vec![0.0; artifacts.n_features()]);

        let result = artifacts.classifier.predict(&row);
        debug!(
            "Score {:.4} ({})",
            result.score,
            if result.is_similar {
                "similar"
            } else {
                "dissimilar"
            }
        );
        result
    }
}

/// Score two Java files with a fresh pipeline
pub fn predict_similarity(
    file_a: &Path,
    file_b: &Path,
    model_path: &Path,
) -> Result<Option<SimilarityResult>, ModelError> {
    SimilarityPipeline::new(JavaTokenizer::new()).predict(file_a, file_b, model_path)
}
