//! Tokens command - show what the lexer extracts from one file

use anyhow::{Context, Result};
use std::path::Path;

use super::EXIT_INPUT;
use crate::config::Config;
use crate::lexer::{JavaTokenizer, Tokenizer};
use crate::pipeline::read_source;
use crate::reporters::{text, OutputFormat};

/// Run the tokens command
pub fn run(file: &Path, config: &Config) -> Result<()> {
    if !file.exists() {
        eprintln!("{}", text::missing_file(file, config.locale));
        std::process::exit(EXIT_INPUT);
    }

    let source = read_source(file, config.max_file_bytes)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let tokenizer = JavaTokenizer::new().with_label_style(config.labels);

    match config.format {
        OutputFormat::Text => println!("{}", tokenizer.extract(&source)),
        OutputFormat::Json => {
            let tokens: Vec<serde_json::Value> = tokenizer
                .descriptors(&source)
                .into_iter()
                .map(|t| serde_json::json!({ "category": t.category, "text": t.text }))
                .collect();
            println!("{}", serde_json::to_string_pretty(&tokens)?);
        }
    }
    Ok(())
}
