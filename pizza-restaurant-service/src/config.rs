use std::env::{self, VarError};

use dotenvy::dotenv;
use thiserror::Error;

pub const DEFAULT_DATABASE_URL: &str = "pizza_catalog.db";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_url: String,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("DATABASE_URL is not valid unicode")]
    InvalidDatabaseUrl,
    #[error("DATABASE_URL must not be empty")]
    EmptyDatabaseUrl,
}

impl Config {
    /// Reads settings from the process environment, after loading `.env` if one
    /// exists. `DATABASE_URL` falls back to [`DEFAULT_DATABASE_URL`].
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();
        Self::from_database_url(env::var("DATABASE_URL"))
    }

    fn from_database_url(value: Result<String, VarError>) -> Result<Self, ConfigError> {
        let database_url = match value {
            Ok(url) if url.trim().is_empty() => return Err(ConfigError::EmptyDatabaseUrl),
            Ok(url) => url,
            Err(VarError::NotPresent) => DEFAULT_DATABASE_URL.to_string(),
            Err(VarError::NotUnicode(_)) => return Err(ConfigError::InvalidDatabaseUrl),
        };

        Ok(Self { database_url })
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::OsString;

    use super::*;

    #[test]
    fn test_database_url_from_env() {
        let config = Config::from_database_url(Ok("catalog.db".to_string())).unwrap();
        assert_eq!(config.database_url, "catalog.db");
    }

    #[test]
    fn test_database_url_defaults_when_unset() {
        let config = Config::from_database_url(Err(VarError::NotPresent)).unwrap();
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
    }

    #[test]
    fn test_database_url_rejects_blank_and_non_unicode() {
        assert_eq!(
            Config::from_database_url(Ok("  ".to_string())),
            Err(ConfigError::EmptyDatabaseUrl)
        );
        assert_eq!(
            Config::from_database_url(Err(VarError::NotUnicode(OsString::new()))),
            Err(ConfigError::InvalidDatabaseUrl)
        );
    }
}
