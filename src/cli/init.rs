//! Init command - write a starter config file

use anyhow::{Context, Result};
use console::style;
use std::path::Path;

use crate::config::{init_user_config, PROJECT_CONFIG_FILE};

const PROJECT_TEMPLATE: &str = r#"# clonescore configuration
# Settings here override ~/.config/clonescore/config.toml and are
# overridden by CLONESCORE_MODEL / CLONESCORE_LOCALE and CLI flags.

# Classifier artifact, relative to this file.
# The vectorizer is read from <name>_vectorizer.<ext>
model = "rf_model.json"

# Output language: "es" or "en"
locale = "es"

# Token labels: "category" or "legacy"
# labels = "category"

# Refuse input files above this size
# max_file_bytes = 10485760

# Output format: "text" or "json"
# format = "text"
"#;

/// Run the init command
pub fn run(dir: &Path, user: bool) -> Result<()> {
    let config_path = if user {
        init_user_config()?
    } else {
        let path = dir.join(PROJECT_CONFIG_FILE);
        if path.exists() {
            println!(
                "{} Already initialized at {}",
                style("✓").green(),
                style(path.display()).cyan()
            );
            return Ok(());
        }
        std::fs::write(&path, PROJECT_TEMPLATE)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        path
    };

    println!(
        "{} Created {}",
        style("✓").green(),
        style(config_path.display()).cyan()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigFile;

    #[test]
    fn test_template_is_valid_config() {
        let file: ConfigFile = toml::from_str(PROJECT_TEMPLATE).unwrap();
        assert!(file.model.is_some());
        assert!(file.locale.is_some());
    }

    #[test]
    fn test_init_writes_once() {
        let dir = tempfile::tempdir().unwrap();
        run(dir.path(), false).unwrap();
        let path = dir.path().join(PROJECT_CONFIG_FILE);
        assert!(path.exists());

        std::fs::write(&path, "locale = \"en\"\n").unwrap();
        run(dir.path(), false).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "locale = \"en\"\n");
    }
}
