//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::str::FromStr;
use tracing::Level;

const MAX_LOOKBACK_DAYS: std::ops::RangeInclusive<i64> = 1..=365;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub log_level: Level,
    pub cors_origin: String,
    pub openai_api_key: Option<String>,
    pub sst_model: String,
    pub embedding_model: String,
    pub embedding_base_url: String,
    pub recommendation_max_items: usize,
    pub recommendation_lookback_days: i64,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // --- Server and Database Settings ---
        let bind_address: SocketAddr = parse_or(&lookup, "BIND_ADDRESS", "0.0.0.0:3000".parse().ok())?;

        let database_url = lookup("DATABASE_URL")
            .ok_or_else(|| ConfigError::MissingVar("DATABASE_URL".to_string()))?;

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let cors_origin =
            lookup("CORS_ORIGIN").unwrap_or_else(|| "http://localhost:3000".to_string());

        // --- API Key (optional) ---
        let openai_api_key = lookup("OPENAI_API_KEY");

        // --- Adapter-specific Settings ---
        let sst_model = lookup("SST_MODEL").unwrap_or_else(|| "whisper-1".to_string());
        let embedding_model =
            lookup("EMBEDDING_MODEL").unwrap_or_else(|| "text-embedding-3-small".to_string());
        let embedding_base_url = lookup("EMBEDDING_BASE_URL")
            .unwrap_or_else(|| "https://api.openai.com".to_string());

        // --- Recommendation Policy ---
        let recommendation_max_items: usize = parse_or(&lookup, "RECOMMENDATION_MAX_ITEMS", Some(5))?;
        let recommendation_lookback_days: i64 =
            parse_or(&lookup, "RECOMMENDATION_LOOKBACK_DAYS", Some(14))?;
        if !MAX_LOOKBACK_DAYS.contains(&recommendation_lookback_days) {
            return Err(ConfigError::InvalidValue(
                "RECOMMENDATION_LOOKBACK_DAYS".to_string(),
                format!(
                    "{} is outside {}..={}",
                    recommendation_lookback_days,
                    MAX_LOOKBACK_DAYS.start(),
                    MAX_LOOKBACK_DAYS.end()
                ),
            ));
        }

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            cors_origin,
            openai_api_key,
            sst_model,
            embedding_model,
            embedding_base_url,
            recommendation_max_items,
            recommendation_lookback_days,
        })
    }
}

fn parse_or<F, T>(lookup: &F, name: &str, default: Option<T>) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string())),
        None => default.ok_or_else(|| ConfigError::MissingVar(name.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_only_database_is_set() {
        let config = load(&[("DATABASE_URL", "postgres://localhost/classroom")]).unwrap();
        assert_eq!(config.bind_address.port(), 3000);
        assert_eq!(config.log_level, Level::INFO);
        assert_eq!(config.sst_model, "whisper-1");
        assert_eq!(config.recommendation_max_items, 5);
        assert_eq!(config.recommendation_lookback_days, 14);
        assert!(config.openai_api_key.is_none());
    }

    #[test]
    fn lookback_days_outside_range_are_rejected() {
        for value in ["0", "-3", "366", "9223372036854775807"] {
            let result = load(&[
                ("DATABASE_URL", "postgres://localhost/classroom"),
                ("RECOMMENDATION_LOOKBACK_DAYS", value),
            ]);
            assert!(
                matches!(result, Err(ConfigError::InvalidValue(ref name, _)) if name == "RECOMMENDATION_LOOKBACK_DAYS"),
                "value: {value}"
            );
        }
        let config = load(&[
            ("DATABASE_URL", "postgres://localhost/classroom"),
            ("RECOMMENDATION_LOOKBACK_DAYS", "365"),
        ])
        .unwrap();
        assert_eq!(config.recommendation_lookback_days, 365);
    }

    #[test]
    fn missing_database_url_is_an_error() {
        assert!(matches!(load(&[]), Err(ConfigError::MissingVar(name)) if name == "DATABASE_URL"));
    }

    #[test]
    fn invalid_numbers_are_rejected() {
        let result = load(&[
            ("DATABASE_URL", "postgres://localhost/classroom"),
            ("RECOMMENDATION_MAX_ITEMS", "many"),
        ]);
        assert!(matches!(result, Err(ConfigError::InvalidValue(name, _)) if name == "RECOMMENDATION_MAX_ITEMS"));
    }

    #[test]
    fn invalid_log_level_is_rejected() {
        let result = load(&[
            ("DATABASE_URL", "postgres://localhost/classroom"),
            ("RUST_LOG", "chatty"),
        ]);
        assert!(matches!(result, Err(ConfigError::InvalidValue(name, _)) if name == "RUST_LOG"));
    }
}
