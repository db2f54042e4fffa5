//! Compare command - score two files

use anyhow::Result;
use std::path::Path;
use tracing::debug;

use super::{EXIT_INPUT, EXIT_MODEL};
use crate::config::Config;
use crate::lexer::JavaTokenizer;
use crate::model::{ensure_artifacts_exist, ModelError};
use crate::models::ComparisonReport;
use crate::pipeline::SimilarityPipeline;
use crate::reporters::{self, text, OutputFormat};

/// Run the compare command
pub fn run(file_a: &Path, file_b: &Path, config: &Config) -> Result<()> {
    for path in [file_a, file_b] {
        if !path.exists() {
            eprintln!("{}", text::missing_file(path, config.locale));
            std::process::exit(EXIT_INPUT);
        }
    }

    if let Err(ModelError::Missing { path }) = ensure_artifacts_exist(&config.model) {
        eprintln!("{}", text::missing_model(&path, config.locale));
        std::process::exit(EXIT_MODEL);
    }

    let tokenizer = JavaTokenizer::new().with_label_style(config.labels);
    let pipeline = SimilarityPipeline::new(tokenizer).with_max_file_bytes(config.max_file_bytes);
    debug!(
        "Comparing {} and {} with {}",
        file_a.display(),
        file_b.display(),
        config.model.display()
    );

    let result = match pipeline.predict(file_a, file_b, &config.model) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(EXIT_MODEL);
        }
    };

    let report = ComparisonReport::new(file_a, file_b, &config.model, result);
    if !report.is_complete() {
        eprintln!("{}", text::prediction_failed(config.locale));
        std::process::exit(EXIT_INPUT);
    }

    let color = config.format == OutputFormat::Text && console::colors_enabled();
    let out = reporters::report_with_format(&report, config.format, config.locale, color)?;
    print!("{}", out);
    if config.format == OutputFormat::Json {
        println!();
    }
    Ok(())
}
