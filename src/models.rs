//! Data models shared by the CLI and reporters

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::classifier::{into_pair, SimilarityResult};

/// Outcome of comparing two files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub file_a: String,
    pub file_b: String,
    pub score: Option<f64>,
    pub is_similar: Option<bool>,
    pub model: String,
}

impl ComparisonReport {
    pub fn new(
        file_a: &Path,
        file_b: &Path,
        model: &Path,
        result: Option<SimilarityResult>,
    ) -> Self {
        let (score, is_similar) = into_pair(result);
        Self {
            file_a: file_a.display().to_string(),
            file_b: file_b.display().to_string(),
            score,
            is_similar,
            model: model.display().to_string(),
        }
    }

    /// Whether a prediction was produced
    pub fn is_complete(&self) -> bool {
        self.score.is_some()
    }
}

/// Summary of loaded model artifacts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSummary {
    pub model: String,
    pub vectorizer: String,
    pub kind: String,
    pub capability: String,
    pub n_features: usize,
    pub tfidf: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_from_result() {
        let report = ComparisonReport::new(
            Path::new("A.java"),
            Path::new("B.java"),
            Path::new("rf_model.json"),
            Some(SimilarityResult::from_score(0.25)),
        );
        assert_eq!(report.score, Some(0.25));
        assert_eq!(report.is_similar, Some(false));
        assert!(report.is_complete());

        let absent = ComparisonReport::new(
            Path::new("A.java"),
            Path::new("B.java"),
            Path::new("rf_model.json"),
            None,
        );
        assert!(!absent.is_complete());
        assert_eq!(absent.is_similar, None);
    }
}
