//! `fulfillment.toml` settings.
//!
//! Every key is optional. A missing file yields [`Settings::default`].
//!
//! ```toml
//! rate_card = "standard"
//!
//! [db]
//! backend = "sqlite"
//! connection_string = "fulfillment.db"
//!
//! [logging]
//! level = "info"
//! directory = "logs"
//! stdout = true
//! ```

use std::path::{Path, PathBuf};

use fulfill_core::DEFAULT_RATE_CARD;
use fulfill_core::db::DbConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

pub const DEFAULT_SETTINGS_FILE: &str = "fulfillment.toml";
pub const DEFAULT_DATABASE_FILE: &str = "fulfillment.db";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub db: DbConfig,
    /// Rate card loaded at startup.
    pub rate_card: String,
    pub logging: LoggingSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            db: DbConfig::sqlite_file(DEFAULT_DATABASE_FILE),
            rate_card: DEFAULT_RATE_CARD.to_string(),
            logging: LoggingSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `EnvFilter` directive, e.g. `info` or `fulfill_ui=trace`.
    pub level: String,
    /// Directory for the log file; no file logging when unset.
    pub directory: Option<PathBuf>,
    pub stdout: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
            stdout: true,
        }
    }
}

impl Settings {
    /// Reads settings from `path`, falling back to defaults when the file
    /// does not exist.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no settings file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(SettingsError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let settings = Self::from_toml(&text).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        assert_eq!(
            Settings::from_toml("").expect("empty settings"),
            Settings::default()
        );
    }

    #[test]
    fn defaults_point_at_local_database() {
        let settings = Settings::default();
        assert_eq!(settings.db, DbConfig::sqlite_file("fulfillment.db"));
        assert_eq!(settings.rate_card, "standard");
        assert_eq!(settings.logging.level, "info");
        assert!(settings.logging.stdout);
        assert_eq!(settings.logging.directory, None);
    }

    #[test]
    fn partial_tables_keep_remaining_defaults() {
        let settings = Settings::from_toml(
            r#"
rate_card = "peak-season"

[db]
connection_string = ":memory:"

[logging]
directory = "logs"
"#,
        )
        .expect("valid settings");

        assert_eq!(settings.rate_card, "peak-season");
        assert_eq!(settings.db.backend, "sqlite");
        assert_eq!(settings.db.connection_string, ":memory:");
        assert_eq!(settings.logging.directory, Some(PathBuf::from("logs")));
        assert_eq!(settings.logging.level, "info");
    }

    #[test]
    fn wrong_type_is_a_parse_error() {
        assert!(Settings::from_toml("rate_card = 5").is_err());
    }

    #[test]
    fn missing_file_uses_defaults() {
        let path = Path::new("definitely/not/here/fulfillment.toml");
        let settings = Settings::load(path).expect("missing file is not an error");
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn load_reports_the_offending_path() {
        let dir = std::env::temp_dir().join(format!("fulfill-settings-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("temp dir");
        let path = dir.join("broken.toml");
        std::fs::write(&path, "[db\n").expect("write settings");

        let err = Settings::load(&path).expect_err("broken toml");
        assert!(err.to_string().contains("broken.toml"));

        std::fs::remove_dir_all(&dir).ok();
    }
}
