//! CLI command definitions and handlers

mod compare;
mod init;
mod inspect;
mod tokens;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::config::{Config, Locale};
use crate::lexer::LabelStyle;
use crate::reporters::OutputFormat;

/// Exit code when an input file is missing or unreadable
pub const EXIT_INPUT: i32 = 1;
/// Exit code when the model cannot be found or loaded
pub const EXIT_MODEL: i32 = 2;

/// clonescore - pairwise source code similarity
#[derive(Parser, Debug)]
#[command(name = "clonescore")]
#[command(
    version,
    about = "Score how similar two Java source files are with a pretrained token classifier",
    long_about = "clonescore lexes both files into token streams, pairs them, vectorizes \
the pair and runs it through a pretrained classifier. It prints a similarity score \
between 0 and 1 and whether the files count as similar (score >= 0.5).\n\n\
The classifier is read from --model (default: rf_model.json) and its vectorizer \
from the sibling file <name>_vectorizer.<ext>.",
    subcommand_negates_reqs = true,
    after_help = "\
Examples:
  clonescore A.java B.java                       Compare two files
  clonescore A.java B.java --model m/rf.json     Use another model
  clonescore A.java B.java --format json         JSON output for scripting
  clonescore A.java B.java --locale en           English output
  clonescore tokens A.java                       Show the token stream of a file
  clonescore inspect --model m/rf.json           Describe a model"
)]
pub struct Cli {
    /// First file to compare
    #[arg(required = true)]
    pub file_a: Option<PathBuf>,

    /// Second file to compare
    #[arg(required = true)]
    pub file_b: Option<PathBuf>,

    /// Classifier artifact (default: rf_model.json)
    #[arg(long, short = 'm', global = true)]
    pub model: Option<PathBuf>,

    /// Output format: text, json
    #[arg(long, short = 'f', global = true, value_parser = ["text", "json"])]
    pub format: Option<String>,

    /// Output language: es, en
    #[arg(long, global = true, value_parser = ["es", "en"])]
    pub locale: Option<String>,

    /// Label every token `_TokenType` instead of its category
    #[arg(long, global = true)]
    pub legacy_labels: bool,

    /// Refuse input files larger than this many bytes
    #[arg(long, global = true)]
    pub max_file_bytes: Option<u64>,

    /// Log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long, global = true, default_value = "warn", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the token stream extracted from one file
    Tokens {
        /// Source file
        file: PathBuf,
    },

    /// Load the model artifacts and describe them
    Inspect,

    /// Create a clonescore.toml with commented defaults
    Init {
        /// Write the user config (~/.config/clonescore/config.toml) instead
        #[arg(long)]
        user: bool,
    },
}

impl Cli {
    /// Apply flags on top of the loaded config
    pub fn resolve_config(&self, mut config: Config) -> Result<Config> {
        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        if let Some(format) = &self.format {
            config.format = format.parse::<OutputFormat>()?;
        }
        if let Some(locale) = &self.locale {
            config.locale = locale.parse::<Locale>()?;
        }
        if self.legacy_labels {
            config.labels = LabelStyle::Legacy;
        }
        if self.max_file_bytes.is_some() {
            config.max_file_bytes = self.max_file_bytes;
        }
        Ok(config)
    }
}

/// Run the CLI
pub fn run(cli: Cli) -> Result<()> {
    let config = cli.resolve_config(Config::load(Path::new(".")))?;

    match &cli.command {
        Some(Commands::Tokens { file }) => tokens::run(file, &config),
        Some(Commands::Inspect) => inspect::run(&config),
        Some(Commands::Init { user }) => init::run(Path::new("."), *user),
        None => match (&cli.file_a, &cli.file_b) {
            (Some(a), Some(b)) => compare::run(a, b, &config),
            _ => anyhow::bail!("Two files are required"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_compare() {
        let cli = Cli::try_parse_from(["clonescore", "A.java", "B.java", "--locale", "en"]).unwrap();
        assert_eq!(cli.file_a, Some(PathBuf::from("A.java")));
        assert_eq!(cli.file_b, Some(PathBuf::from("B.java")));
        assert!(cli.command.is_none());
        assert_eq!(cli.log_level, "warn");

        let config = cli.resolve_config(Config::default()).unwrap();
        assert_eq!(config.locale, Locale::En);
        assert_eq!(config.model, PathBuf::from("rf_model.json"));
    }

    #[test]
    fn test_parse_requires_two_files() {
        assert!(Cli::try_parse_from(["clonescore", "A.java"]).is_err());
        assert!(Cli::try_parse_from(["clonescore"]).is_err());
    }

    #[test]
    fn test_parse_subcommands() {
        let cli = Cli::try_parse_from(["clonescore", "tokens", "A.java"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Tokens { .. })));

        let cli =
            Cli::try_parse_from(["clonescore", "inspect", "--model", "m/rf.json"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Inspect)));
        assert_eq!(cli.model, Some(PathBuf::from("m/rf.json")));
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::try_parse_from([
            "clonescore",
            "A.java",
            "B.java",
            "--model",
            "other.json",
            "--format",
            "json",
            "--legacy-labels",
            "--max-file-bytes",
            "100",
        ])
        .unwrap();
        let base = Config {
            locale: Locale::En,
            ..Config::default()
        };
        let config = cli.resolve_config(base).unwrap();
        assert_eq!(config.model, PathBuf::from("other.json"));
        assert_eq!(config.format, OutputFormat::Json);
        assert_eq!(config.labels, LabelStyle::Legacy);
        assert_eq!(config.max_file_bytes, Some(100));
        // Untouched by flags
        assert_eq!(config.locale, Locale::En);
    }

    #[test]
    fn test_rejects_unknown_format() {
        assert!(Cli::try_parse_from(["clonescore", "A", "B", "--format", "sarif"]).is_err());
    }
}
