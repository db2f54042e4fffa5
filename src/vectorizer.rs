//! Feature vectorizer
//!
//! Maps a paired token document to a fixed-width numeric vector. The concrete
//! [`TokenVectorizer`] reproduces the inference side of scikit-learn's
//! `CountVectorizer` / `TfidfVectorizer` (word analyzer): lowercase, regex
//! tokenization, stop words, word n-grams, vocabulary lookup, optional
//! sublinear tf, idf weighting and row normalization.
//!
//! The vocabulary is fitted elsewhere and loaded from JSON:
//!
//! ```json
//! {
//!   "vocabulary": {"keyword": 0, "name": 1, "class": 2},
//!   "idf": [1.0, 1.0, 1.69],
//!   "norm": "l2"
//! }
//! ```

use regex::Regex;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// scikit-learn's default `token_pattern`, minus the redundant `(?u)`
pub const DEFAULT_TOKEN_PATTERN: &str = r"\b\w\w+\b";

#[derive(Error, Debug)]
pub enum VectorizerError {
    #[error("Invalid token pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("Token pattern may contain at most one capture group, found {0}")]
    TooManyGroups(usize),

    #[error("Invalid vocabulary: {0}")]
    BadVocabulary(String),

    #[error("idf has {found} weights but the vocabulary has {expected} terms")]
    IdfLength { expected: usize, found: usize },

    #[error("Invalid ngram range ({min}, {max})")]
    NgramRange { min: usize, max: usize },
}

/// Row normalization applied after weighting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    #[default]
    None,
    L1,
    L2,
}

/// Sparse row; entries are sorted by column and never zero-width
#[derive(Debug, Clone, PartialEq)]
pub struct SparseVector {
    dim: usize,
    entries: Vec<(usize, f64)>,
}

impl SparseVector {
    pub fn new(dim: usize, mut entries: Vec<(usize, f64)>) -> Self {
        entries.retain(|&(col, _)| col < dim);
        entries.sort_by_key(|&(col, _)| col);
        Self { dim, entries }
    }

    /// Number of stored (non-zero) entries
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    pub fn to_dense(&self) -> Vec<f64> {
        let mut dense = vec![0.0; self.dim];
        for &(col, value) in &self.entries {
            dense[col] = value;
        }
        dense
    }
}

/// Turns documents into feature rows of a fixed width
pub trait FeatureEncoder {
    /// Width of every produced row
    fn n_features(&self) -> usize;

    /// One row per document, in input order
    fn transform(&self, documents: &[&str]) -> Vec<SparseVector>;
}

fn default_lowercase() -> bool {
    true
}

fn default_token_pattern() -> String {
    DEFAULT_TOKEN_PATTERN.to_string()
}

fn default_ngram_range() -> (usize, usize) {
    (1, 1)
}

/// Persisted vectorizer state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorizerSpec {
    /// Term -> column index
    pub vocabulary: FxHashMap<String, usize>,

    #[serde(default = "default_lowercase")]
    pub lowercase: bool,

    #[serde(default = "default_token_pattern")]
    pub token_pattern: String,

    #[serde(default)]
    pub stop_words: Vec<String>,

    /// Inclusive word n-gram range
    #[serde(default = "default_ngram_range")]
    pub ngram_range: (usize, usize),

    /// Clip counts to 1
    #[serde(default)]
    pub binary: bool,

    /// Replace tf with 1 + ln(tf)
    #[serde(default)]
    pub sublinear_tf: bool,

    /// Per-column idf weights; absent for plain counts
    #[serde(default)]
    pub idf: Option<Vec<f64>>,

    #[serde(default)]
    pub norm: Norm,
}

impl VectorizerSpec {
    /// Plain count vectorizer over `vocabulary` with default settings
    pub fn counts(vocabulary: FxHashMap<String, usize>) -> Self {
        Self {
            vocabulary,
            lowercase: default_lowercase(),
            token_pattern: default_token_pattern(),
            stop_words: Vec::new(),
            ngram_range: default_ngram_range(),
            binary: false,
            sublinear_tf: false,
            idf: None,
            norm: Norm::None,
        }
    }
}

/// Ready-to-use vectorizer built from a validated [`VectorizerSpec`]
#[derive(Debug, Clone)]
pub struct TokenVectorizer {
    spec: VectorizerSpec,
    pattern: Regex,
    stop_words: FxHashSet<String>,
}

impl TryFrom<VectorizerSpec> for TokenVectorizer {
    type Error = VectorizerError;

    fn try_from(spec: VectorizerSpec) -> Result<Self, Self::Error> {
        let pattern = Regex::new(&spec.token_pattern)?;
        let groups = pattern.captures_len() - 1;
        if groups > 1 {
            return Err(VectorizerError::TooManyGroups(groups));
        }

        let (min, max) = spec.ngram_range;
        if min == 0 || min > max {
            return Err(VectorizerError::NgramRange { min, max });
        }

        let n = spec.vocabulary.len();
        if n == 0 {
            return Err(VectorizerError::BadVocabulary("vocabulary is empty".into()));
        }
        let mut columns: Vec<usize> = spec.vocabulary.values().copied().collect();
        columns.sort_unstable();
        if columns.iter().enumerate().any(|(i, &col)| i != col) {
            return Err(VectorizerError::BadVocabulary(format!(
                "column indices must be exactly 0..{n} with no duplicates"
            )));
        }

        if let Some(idf) = &spec.idf {
            if idf.len() != n {
                return Err(VectorizerError::IdfLength {
                    expected: n,
                    found: idf.len(),
                });
            }
        }

        let stop_words = spec.stop_words.iter().cloned().collect();
        Ok(Self {
            spec,
            pattern,
            stop_words,
        })
    }
}

impl TokenVectorizer {
    /// Whether rows are idf-weighted
    pub fn is_tfidf(&self) -> bool {
        self.spec.idf.is_some()
    }

    /// Split a document into the terms looked up in the vocabulary
    pub fn analyze(&self, document: &str) -> Vec<String> {
        let document = if self.spec.lowercase {
            document.to_lowercase()
        } else {
            document.to_string()
        };

        let tokens: Vec<String> = if self.pattern.captures_len() == 2 {
            self.pattern
                .captures_iter(&document)
                .filter_map(|c| c.get(1).map(|m| m.as_str().to_string()))
                .collect()
        } else {
            self.pattern
                .find_iter(&document)
                .map(|m| m.as_str().to_string())
                .collect()
        };

        let tokens: Vec<String> = tokens
            .into_iter()
            .filter(|t| !self.stop_words.contains(t))
            .collect();

        word_ngrams(tokens, self.spec.ngram_range)
    }

    fn transform_one(&self, document: &str) -> SparseVector {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for term in self.analyze(document) {
            if let Some(&col) = self.spec.vocabulary.get(&term) {
                *counts.entry(col).or_insert(0.0) += 1.0;
            }
        }

        let mut entries: Vec<(usize, f64)> = counts
            .into_iter()
            .map(|(col, tf)| {
                let mut value = if self.spec.binary { 1.0 } else { tf };
                if self.spec.sublinear_tf {
                    value = 1.0 + value.ln();
                }
                if let Some(idf) = &self.spec.idf {
                    value *= idf[col];
                }
                (col, value)
            })
            .collect();

        let norm = match self.spec.norm {
            Norm::None => 0.0,
            Norm::L1 => entries.iter().map(|(_, v)| v.abs()).sum::<f64>(),
            Norm::L2 => entries.iter().map(|(_, v)| v * v).sum::<f64>().sqrt(),
        };
        if norm > 0.0 {
            for (_, value) in entries.iter_mut() {
                *value /= norm;
            }
        }

        SparseVector::new(self.n_features(), entries)
    }
}

impl FeatureEncoder for TokenVectorizer {
    fn n_features(&self) -> usize {
        self.spec.vocabulary.len()
    }

    fn transform(&self, documents: &[&str]) -> Vec<SparseVector> {
        documents.iter().map(|d| self.transform_one(d)).collect()
    }
}

/// Expand unigrams into the configured n-gram range, joined by spaces
fn word_ngrams(tokens: Vec<String>, (min_n, max_n): (usize, usize)) -> Vec<String> {
    if max_n == 1 {
        return tokens;
    }

    let mut out = Vec::new();
    let mut start_n = min_n;
    if min_n == 1 {
        out.extend(tokens.iter().cloned());
        start_n = 2;
    }

    let len = tokens.len();
    for n in start_n..=max_n.min(len) {
        for window in tokens.windows(n) {
            out.push(window.join(" "));
        }
    }
    out
}
