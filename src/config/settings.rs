//! Application settings loaded from a TOML file.
//!
//! Every section and key is optional; anything left out falls back to its
//! default. The database URL is taken from the file first, then from the
//! `DATABASE_URL` environment variable.
//!
//! ```toml
//! [database]
//! url = "sqlite://data/donation_tracker.sqlite?mode=rwc"
//! max_connections = 5
//! sqlx_logging = false
//!
//! [query]
//! default_take = 100
//! max_take = 1000
//! ```

use crate::{
    errors::{Error, Result},
    query::QueryLimits,
};
use serde::Deserialize;
use std::path::Path;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub database: DatabaseSettings,
    /// Page size limits for `find_many`
    pub query: QueryLimits,
}

/// Connection settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Overrides `DATABASE_URL` when set
    pub url: Option<String>,
    /// Upper bound of the connection pool
    pub max_connections: u32,
    /// Log every SQL statement through `tracing`
    pub sqlx_logging: bool,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 5,
            sqlx_logging: false,
        }
    }
}

/// Loads settings from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - A key has the wrong type
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path = path.as_ref();
    tracing::debug!("Loading settings from {:?}", path);
    let contents = std::fs::read_to_string(path).map_err(|e| Error::Config {
        message: format!("Failed to read config file {path:?}: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {path:?}: {e}"),
    })
}

/// Loads settings from `path`, falling back to defaults when the file is missing.
///
/// A file that exists but cannot be parsed is still an error.
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path = path.as_ref();
    if path.exists() {
        load_config(path)
    } else {
        tracing::info!("No config file at {:?}, using default settings", path);
        Ok(Settings::default())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_full_settings() {
        let toml_str = r#"
            [database]
            url = "sqlite::memory:"
            max_connections = 1
            sqlx_logging = true

            [query]
            default_take = 20
            max_take = 200
        "#;

        let settings: Settings = toml::from_str(toml_str).unwrap();
        assert_eq!(settings.database.url.as_deref(), Some("sqlite::memory:"));
        assert_eq!(settings.database.max_connections, 1);
        assert!(settings.database.sqlx_logging);
        assert_eq!(settings.query.default_take, 20);
        assert_eq!(settings.query.max_take, 200);
    }

    #[test]
    fn test_partial_settings_use_defaults() {
        let settings: Settings = toml::from_str("[query]\nmax_take = 50\n").unwrap();
        assert!(settings.database.url.is_none());
        assert_eq!(settings.database.max_connections, 5);
        assert_eq!(settings.query.default_take, 100);
        assert_eq!(settings.query.max_take, 50);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let settings = load_settings("does/not/exist/config.toml").unwrap();
        assert!(settings.database.url.is_none());
        assert_eq!(settings.query, QueryLimits::default());
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let path = std::env::temp_dir().join(format!("donation-tracker-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(&path, "[database\nurl = ").unwrap();
        let result = load_settings(&path);
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(result, Err(Error::Config { .. })));
    }
}
