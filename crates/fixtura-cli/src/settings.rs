use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use fixtura_generate::{FactoryConfig, OutputFormat};

use crate::CliError;

pub const DEFAULT_SETTINGS_FILE: &str = "fixtura.toml";
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Defaults read from `fixtura.toml`. Command-line flags win over them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliSettings {
    /// Installed as the process default; models and plans still win.
    pub factory: FactoryConfig,
    pub format: OutputFormat,
    /// Filter used when `FIXTURA_LOG` is unset.
    pub log_filter: String,
}

impl Default for CliSettings {
    fn default() -> Self {
        Self {
            factory: FactoryConfig::default(),
            format: OutputFormat::default(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

pub fn parse_settings(content: &str) -> Result<CliSettings, CliError> {
    Ok(toml::from_str(content)?)
}

/// Loads `explicit`, or `fixtura.toml` from the working directory when it
/// exists. Returns the path the settings came from.
pub fn load_settings(explicit: Option<&Path>) -> Result<(CliSettings, Option<PathBuf>), CliError> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let fallback = PathBuf::from(DEFAULT_SETTINGS_FILE);
            if !fallback.exists() {
                return Ok((CliSettings::default(), None));
            }
            fallback
        }
    };
    let content = std::fs::read_to_string(&path)?;
    Ok((parse_settings(&content)?, Some(path)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixtura_generate::LocaleKey;

    #[test]
    fn empty_file_uses_defaults() {
        let settings = parse_settings("").expect("settings");
        assert_eq!(settings, CliSettings::default());
        assert_eq!(settings.log_filter, "info");
    }

    #[test]
    fn reads_factory_table() {
        let settings = parse_settings(
            r#"
format = "csv"
log_filter = "fixtura_generate=debug"

[factory]
seed = 42
locale = "pt_BR"
"#,
        )
        .expect("settings");
        assert_eq!(settings.format, OutputFormat::Csv);
        assert_eq!(settings.factory.seed, Some(42));
        assert_eq!(settings.factory.locale, LocaleKey::PtBr);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(matches!(
            parse_settings("colour = \"blue\""),
            Err(CliError::Toml(_))
        ));
    }
}
