//! Config file layer
//!
//! Both the user file (`~/.config/clonescore/config.toml`) and the project
//! file (`./clonescore.toml`) share this format. Every key is optional; set
//! keys override the layer below.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::Locale;
use crate::lexer::LabelStyle;
use crate::reporters::OutputFormat;

#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
pub struct ConfigFile {
    /// Path to the classifier artifact
    pub model: Option<PathBuf>,

    /// Output language: "es" (default) or "en"
    pub locale: Option<Locale>,

    /// Token label style: "category" (default) or "legacy"
    pub labels: Option<LabelStyle>,

    /// Refuse input files larger than this many bytes
    pub max_file_bytes: Option<u64>,

    /// Output format: "text" (default) or "json"
    pub format: Option<OutputFormat>,
}

impl ConfigFile {
    /// Parse one config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let file: ConfigFile = toml::from_str(&content)
            .with_context(|| format!("Invalid TOML in {}", path.display()))?;
        Ok(file.relative_to(path.parent()))
    }

    /// Resolve a relative model path against the directory of the file it
    /// came from
    fn relative_to(mut self, dir: Option<&Path>) -> Self {
        if let (Some(model), Some(dir)) = (&self.model, dir) {
            if model.is_relative() && !dir.as_os_str().is_empty() {
                self.model = Some(dir.join(model));
            }
        }
        self
    }

    /// Merge another file into this one (other takes priority)
    pub fn merge(&mut self, other: ConfigFile) {
        if other.model.is_some() {
            self.model = other.model;
        }
        if other.locale.is_some() {
            self.locale = other.locale;
        }
        if other.labels.is_some() {
            self.labels = other.labels;
        }
        if other.max_file_bytes.is_some() {
            self.max_file_bytes = other.max_file_bytes;
        }
        if other.format.is_some() {
            self.format = other.format;
        }
    }
}

/// Get the user config file path
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("clonescore").join("config.toml"))
}

/// Create the user config directory with a commented example file
pub fn init_user_config() -> Result<PathBuf> {
    let config_path =
        user_config_path().ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !config_path.exists() {
        let example = r#"# clonescore user configuration

# Classifier artifact; the vectorizer is read from <name>_vectorizer.<ext>
# model = "/path/to/rf_model.json"

# Output language: "es" or "en"
# locale = "es"

# Token labels: "category" or "legacy"
# labels = "category"

# Refuse input files above this size
# max_file_bytes = 10485760

# Output format: "text" or "json"
# format = "text"
"#;
        std::fs::write(&config_path, example)?;
    }

    Ok(config_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toml_parsing() {
        let toml_str = r#"
model = "/models/rf.json"
locale = "en"
labels = "legacy"
max_file_bytes = 1024
format = "json"
"#;
        let file: ConfigFile = toml::from_str(toml_str).unwrap();
        assert_eq!(file.model, Some(PathBuf::from("/models/rf.json")));
        assert_eq!(file.locale, Some(Locale::En));
        assert_eq!(file.labels, Some(LabelStyle::Legacy));
        assert_eq!(file.max_file_bytes, Some(1024));
        assert_eq!(file.format, Some(OutputFormat::Json));
    }

    #[test]
    fn test_empty_file_sets_nothing() {
        let file: ConfigFile = toml::from_str("").unwrap();
        assert_eq!(file, ConfigFile::default());
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(toml::from_str::<ConfigFile>(r#"locale = "fr""#).is_err());
        assert!(toml::from_str::<ConfigFile>(r#"format = "sarif""#).is_err());
    }

    #[test]
    fn test_merge_prefers_other() {
        let mut base = ConfigFile {
            locale: Some(Locale::Es),
            max_file_bytes: Some(10),
            ..Default::default()
        };
        base.merge(ConfigFile {
            locale: Some(Locale::En),
            ..Default::default()
        });
        assert_eq!(base.locale, Some(Locale::En));
        assert_eq!(base.max_file_bytes, Some(10));
    }

    #[test]
    fn test_relative_model_resolved_against_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clonescore.toml");
        std::fs::write(&path, r#"model = "models/rf.json""#).unwrap();

        let file = ConfigFile::load(&path).unwrap();
        assert_eq!(file.model, Some(dir.path().join("models/rf.json")));
    }

    #[test]
    fn test_load_reports_bad_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clonescore.toml");
        std::fs::write(&path, "model = [").unwrap();
        let err = ConfigFile::load(&path).unwrap_err();
        assert!(err.to_string().contains("Invalid TOML"));
    }
}
