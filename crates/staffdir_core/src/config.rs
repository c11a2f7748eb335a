//! Runtime configuration.
//!
//! Values are merged from (lowest precedence first) built-in defaults, an
//! optional TOML file and `STAFFDIR_`-prefixed environment variables, where
//! `__` separates nesting levels (`STAFFDIR_ACCESS__SECRET`).

use crate::media::compress::CompressionOptions;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::path::{Path, PathBuf};

const ENV_PREFIX: &str = "STAFFDIR_";
const DATA_DIR_NAME: &str = "staffdir";
const DATABASE_FILE_NAME: &str = "staffdir.sqlite3";
const BLOB_DIR_NAME: &str = "blobs";
const EXPORT_DIR_NAME: &str = "exports";
const LOG_DIR_NAME: &str = "logs";

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug)]
pub enum ConfigError {
    Load(Box<figment::Error>),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Load(err) => write!(f, "failed to load configuration: {err}"),
            Self::Invalid(message) => write!(f, "invalid configuration: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Load(err) => Some(err.as_ref()),
            Self::Invalid(_) => None,
        }
    }
}

impl From<figment::Error> for ConfigError {
    fn from(value: figment::Error) -> Self {
        Self::Load(Box::new(value))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub access: AccessConfig,
    pub media: MediaConfig,
    pub export: ExportConfig,
    pub logging: LoggingConfig,
}

/// Record store and photo store locations. Unset paths resolve under the
/// default data directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub database_path: Option<PathBuf>,
    pub blob_dir: Option<PathBuf>,
}

/// Shared secret guarding edit, export and delete. No secret denies all
/// guarded actions.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessConfig {
    pub secret: Option<String>,
}

impl Debug for AccessConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessConfig")
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    pub max_width_or_height: u32,
    pub max_size_bytes: usize,
    pub jpeg_quality: u8,
}

impl Default for MediaConfig {
    fn default() -> Self {
        let defaults = CompressionOptions::default();
        Self {
            max_width_or_height: defaults.max_width_or_height,
            max_size_bytes: defaults.max_size_bytes,
            jpeg_quality: defaults.jpeg_quality,
        }
    }
}

impl MediaConfig {
    pub fn compression_options(&self) -> CompressionOptions {
        CompressionOptions {
            max_width_or_height: self.max_width_or_height,
            max_size_bytes: self.max_size_bytes,
            jpeg_quality: self.jpeg_quality,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub output_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Falls back to the build-mode default when unset.
    pub level: Option<String>,
    pub log_dir: Option<PathBuf>,
}

impl Config {
    /// Loads defaults, then `config_file` when given, then the environment.
    pub fn load(config_file: Option<&Path>) -> ConfigResult<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));
        if let Some(path) = config_file {
            if !path.is_file() {
                return Err(ConfigError::Invalid(format!(
                    "config file `{}` does not exist",
                    path.display()
                )));
            }
            figment = figment.merge(Toml::file(path));
        }
        Self::from_figment(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Extracts and validates a config from an assembled provider stack.
    pub fn from_figment(figment: Figment) -> ConfigResult<Self> {
        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.media.max_width_or_height == 0 {
            return Err(ConfigError::Invalid(
                "media.max_width_or_height must be greater than 0".to_string(),
            ));
        }
        if self.media.max_size_bytes == 0 {
            return Err(ConfigError::Invalid(
                "media.max_size_bytes must be greater than 0".to_string(),
            ));
        }
        if !(1..=100).contains(&self.media.jpeg_quality) {
            return Err(ConfigError::Invalid(format!(
                "media.jpeg_quality must be within 1..=100, got {}",
                self.media.jpeg_quality
            )));
        }
        if let Some(level) = &self.logging.level {
            crate::logging::normalize_level(level)
                .map_err(|err| ConfigError::Invalid(err.to_string()))?;
        }
        Ok(())
    }

    /// Base directory for every unset path.
    pub fn default_data_dir() -> PathBuf {
        std::env::temp_dir().join(DATA_DIR_NAME)
    }

    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    pub fn blob_dir(&self) -> PathBuf {
        self.storage
            .blob_dir
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(BLOB_DIR_NAME))
    }

    pub fn export_dir(&self) -> PathBuf {
        self.export
            .output_dir
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(EXPORT_DIR_NAME))
    }

    pub fn log_dir(&self) -> PathBuf {
        self.logging
            .log_dir
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(LOG_DIR_NAME))
    }

    pub fn log_level(&self) -> &str {
        self.logging
            .level
            .as_deref()
            .unwrap_or(crate::logging::default_log_level())
    }
}

#[cfg(test)]
mod tests {
    use super::{Config, ConfigError};
    use figment::providers::{Format, Serialized, Toml};
    use figment::Figment;
    use std::path::PathBuf;

    fn with_toml(toml: &str) -> Result<Config, ConfigError> {
        Config::from_figment(
            Figment::new()
                .merge(Serialized::defaults(Config::default()))
                .merge(Toml::string(toml)),
        )
    }

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.media.max_width_or_height, 800);
        assert_eq!(config.media.max_size_bytes, 1024 * 1024);
        assert!(config.access.secret.is_none());
        assert!(config.database_path().ends_with("staffdir.sqlite3"));
    }

    #[test]
    fn toml_overrides_nested_values() {
        let config = with_toml(
            r#"
            [storage]
            database_path = "/srv/staff/db.sqlite3"

            [access]
            secret = "letmein"

            [media]
            jpeg_quality = 70
            "#,
        )
        .expect("config");

        assert_eq!(
            config.database_path(),
            PathBuf::from("/srv/staff/db.sqlite3")
        );
        assert_eq!(config.access.secret.as_deref(), Some("letmein"));
        assert_eq!(config.media.compression_options().jpeg_quality, 70);
        assert_eq!(config.media.max_width_or_height, 800);
    }

    #[test]
    fn rejects_zero_limits_and_bad_quality() {
        let err = with_toml("[media]\nmax_size_bytes = 0").expect_err("zero size");
        assert!(err.to_string().contains("max_size_bytes"));

        let err = with_toml("[media]\njpeg_quality = 0").expect_err("zero quality");
        assert!(err.to_string().contains("jpeg_quality"));

        let err = with_toml("[logging]\nlevel = \"loud\"").expect_err("bad level");
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn load_reads_toml_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("staffdir.toml");
        std::fs::write(&path, "[export]\noutput_dir = \"/tmp/out\"\n").expect("write");

        let config = Config::load(Some(&path)).expect("load");
        assert_eq!(config.export_dir(), PathBuf::from("/tmp/out"));
    }

    #[test]
    fn load_rejects_missing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("missing.toml");

        let err = Config::load(Some(&path)).expect_err("missing file");
        assert!(matches!(err, ConfigError::Invalid(_)));
        assert!(err.to_string().contains("missing.toml"));
    }

    #[test]
    fn log_level_prefers_configured_value() {
        let config = with_toml("[logging]\nlevel = \"warn\"").expect("config");
        assert_eq!(config.log_level(), "warn");
        assert_eq!(
            Config::default().log_level(),
            crate::logging::default_log_level()
        );
    }

    #[test]
    fn debug_hides_secret() {
        let mut config = Config::default();
        config.access.secret = Some("letmein".to_string());
        assert!(!format!("{config:?}").contains("letmein"));
    }
}
