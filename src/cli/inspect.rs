//! Inspect command - describe the configured model artifacts

use anyhow::Result;

use super::EXIT_MODEL;
use crate::config::Config;
use crate::model::{ModelArtifacts, ModelError};
use crate::models::ModelSummary;
use crate::reporters::{self, text};

/// Run the inspect command
pub fn run(config: &Config) -> Result<()> {
    let artifacts = match ModelArtifacts::load(&config.model) {
        Ok(artifacts) => artifacts,
        Err(ModelError::Missing { path }) => {
            eprintln!("{}", text::missing_model(&path, config.locale));
            std::process::exit(EXIT_MODEL);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(EXIT_MODEL);
        }
    };

    let summary = ModelSummary {
        model: artifacts.model_path.display().to_string(),
        vectorizer: artifacts.vectorizer_path.display().to_string(),
        kind: artifacts.kind.to_string(),
        capability: artifacts.classifier.capability().to_string(),
        n_features: artifacts.n_features(),
        tfidf: artifacts.vectorizer.is_tfidf(),
    };
    print!("{}", reporters::summary_with_format(&summary, config.format)?);
    Ok(())
}
