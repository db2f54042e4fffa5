//! Configuration for clonescore
//!
//! Settings are layered, lowest priority first:
//! - Built-in defaults
//! - User config (`~/.config/clonescore/config.toml`)
//! - Project config (`clonescore.toml` in the working directory)
//! - Environment (`CLONESCORE_MODEL`, `CLONESCORE_LOCALE`)
//! - CLI flags, applied by the caller

mod user_config;

pub use user_config::{init_user_config, user_config_path, ConfigFile};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, warn};

use crate::lexer::LabelStyle;
use crate::reporters::OutputFormat;

/// Project config file name
pub const PROJECT_CONFIG_FILE: &str = "clonescore.toml";

/// Model used when nothing else is configured
pub const DEFAULT_MODEL: &str = "rf_model.json";

pub const ENV_MODEL: &str = "CLONESCORE_MODEL";
pub const ENV_LOCALE: &str = "CLONESCORE_LOCALE";

/// Language of user-facing messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Es,
    En,
}

impl FromStr for Locale {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "es" | "spanish" => Ok(Locale::Es),
            "en" | "english" => Ok(Locale::En),
            _ => anyhow::bail!("Unknown locale '{}'. Valid locales: es, en", s),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locale::Es => write!(f, "es"),
            Locale::En => write!(f, "en"),
        }
    }
}

/// Resolved settings
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub model: PathBuf,
    pub locale: Locale,
    pub labels: LabelStyle,
    pub max_file_bytes: Option<u64>,
    pub format: OutputFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: PathBuf::from(DEFAULT_MODEL),
            locale: Locale::default(),
            labels: LabelStyle::default(),
            max_file_bytes: None,
            format: OutputFormat::default(),
        }
    }
}

impl Config {
    /// Load defaults, config files and environment for `project_dir`.
    ///
    /// Unreadable or malformed files are logged and skipped.
    pub fn load(project_dir: &Path) -> Self {
        let mut layered = ConfigFile::default();

        let candidates = user_config_path()
            .into_iter()
            .chain(std::iter::once(project_dir.join(PROJECT_CONFIG_FILE)));
        for path in candidates {
            if !path.exists() {
                continue;
            }
            match ConfigFile::load(&path) {
                Ok(file) => {
                    debug!("Loaded config from {}", path.display());
                    layered.merge(file);
                }
                Err(e) => {
                    warn!("Failed to load {}: {:#}", path.display(), e);
                }
            }
        }

        let mut config = Config::default();
        config.apply(layered);
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    /// Override with every key set in `file`
    pub fn apply(&mut self, file: ConfigFile) {
        if let Some(model) = file.model {
            self.model = model;
        }
        if let Some(locale) = file.locale {
            self.locale = locale;
        }
        if let Some(labels) = file.labels {
            self.labels = labels;
        }
        if file.max_file_bytes.is_some() {
            self.max_file_bytes = file.max_file_bytes;
        }
        if let Some(format) = file.format {
            self.format = format;
        }
    }

    /// Override from environment variables read through `lookup`
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(model) = lookup(ENV_MODEL).filter(|v| !v.is_empty()) {
            self.model = PathBuf::from(model);
        }
        if let Some(locale) = lookup(ENV_LOCALE).filter(|v| !v.is_empty()) {
            match locale.parse() {
                Ok(locale) => self.locale = locale,
                Err(e) => warn!("Ignoring {}: {}", ENV_LOCALE, e),
            }
        }
    }
}
