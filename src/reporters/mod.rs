//! Output reporters for comparison results
//!
//! Supports two output formats:
//! - `text` - Localized terminal output (Spanish by default)
//! - `json` - Machine-readable JSON

mod json;
pub mod text;

use crate::config::Locale;
use crate::models::{ComparisonReport, ModelSummary};
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" | "terminal" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(anyhow!("Unknown format '{}'. Valid formats: text, json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Render a comparison in the specified format
pub fn report(report: &ComparisonReport, format: &str, locale: Locale) -> Result<String> {
    let fmt = OutputFormat::from_str(format)?;
    report_with_format(report, fmt, locale, false)
}

/// Render a comparison using an OutputFormat enum
pub fn report_with_format(
    report: &ComparisonReport,
    format: OutputFormat,
    locale: Locale,
    color: bool,
) -> Result<String> {
    match format {
        OutputFormat::Text => text::render(report, locale, color),
        OutputFormat::Json => json::render(report),
    }
}

/// Render a model summary
pub fn summary_with_format(summary: &ModelSummary, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => text::render_summary(summary),
        OutputFormat::Json => json::render_summary(summary),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::classifier::SimilarityResult;
    use std::path::Path;

    pub(crate) fn test_report(score: f64) -> ComparisonReport {
        ComparisonReport::new(
            Path::new("a/Foo.java"),
            Path::new("b/Bar.java"),
            Path::new("rf_model.json"),
            Some(SimilarityResult::from_score(score)),
        )
    }

    pub(crate) fn test_summary() -> ModelSummary {
        ModelSummary {
            model: "rf_model.json".into(),
            vectorizer: "rf_model_vectorizer.json".into(),
            kind: "random_forest".into(),
            capability: "probabilistic".into(),
            n_features: 42,
            tfidf: false,
        }
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!(OutputFormat::from_str("text").unwrap(), OutputFormat::Text);
        assert_eq!(OutputFormat::from_str("JSON").unwrap(), OutputFormat::Json);
        assert_eq!(OutputFormat::from_str("txt").unwrap(), OutputFormat::Text);
        assert!(OutputFormat::from_str("sarif").is_err());
        assert_eq!(OutputFormat::Json.to_string(), "json");
    }

    #[test]
    fn test_report_dispatch() {
        let report = test_report(0.9);
        let text = super::report(&report, "text", Locale::Es).unwrap();
        assert!(text.contains("Puntuación de similitud: 0.9000"));
        let json = super::report(&report, "json", Locale::Es).unwrap();
        assert!(json.trim_start().starts_with('{'));
        assert!(super::report(&report, "html", Locale::Es).is_err());
    }
}
