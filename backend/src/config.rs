//! Runtime configuration loaded from environment variables.
//!
//! `main` calls `dotenvy::dotenv()` first, so every variable may also come
//! from a `.env` file next to the binary.

use axum::http::HeaderValue;
use chrono::FixedOffset;
use std::net::SocketAddr;
use thiserror::Error;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5000";
const DEFAULT_DATABASE_URL: &str = "sqlite:attendance.db";
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Deployment environment; controls whether internal error details reach clients
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub database_url: String,
    /// HMAC key used to verify bearer tokens
    pub token_secret: String,
    /// `None` allows any origin
    pub cors_origin: Option<HeaderValue>,
    pub environment: Environment,
    /// Offset used to turn RFC 3339 timestamps into calendar days and to
    /// stamp the time of day on attendance records
    pub utc_offset: FixedOffset,
}

impl AppConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let bind_addr = read("ATTENDANCE_BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                name: "ATTENDANCE_BIND_ADDR",
                reason: e.to_string(),
            })?;

        let database_url =
            read("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let token_secret =
            read("ATTENDANCE_TOKEN_SECRET").ok_or(ConfigError::Missing("ATTENDANCE_TOKEN_SECRET"))?;

        let cors_origin = match read("ATTENDANCE_CORS_ORIGIN")
            .unwrap_or_else(|| DEFAULT_CORS_ORIGIN.to_string())
            .trim()
        {
            "*" => None,
            origin => Some(origin.parse::<HeaderValue>().map_err(|e| ConfigError::Invalid {
                name: "ATTENDANCE_CORS_ORIGIN",
                reason: e.to_string(),
            })?),
        };

        let environment = match read("ATTENDANCE_ENV").as_deref().map(str::trim) {
            None => Environment::Production,
            Some(value) if value.eq_ignore_ascii_case("production") => Environment::Production,
            Some(value) if value.eq_ignore_ascii_case("development") => Environment::Development,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "ATTENDANCE_ENV",
                    reason: format!("expected 'development' or 'production', got '{}'", other),
                })
            }
        };

        let offset_minutes = match read("ATTENDANCE_UTC_OFFSET_MINUTES") {
            Some(raw) => raw.trim().parse::<i32>().map_err(|e| ConfigError::Invalid {
                name: "ATTENDANCE_UTC_OFFSET_MINUTES",
                reason: e.to_string(),
            })?,
            None => 0,
        };
        let utc_offset = offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| ConfigError::Invalid {
                name: "ATTENDANCE_UTC_OFFSET_MINUTES",
                reason: format!("{} minutes is outside +/-24h", offset_minutes),
            })?;

        Ok(Self {
            bind_addr,
            database_url,
            token_secret,
            cors_origin,
            environment,
            utc_offset,
        })
    }

    pub fn expose_error_details(&self) -> bool {
        self.environment == Environment::Development
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults_apply_when_only_secret_is_set() {
        let config = load(&[("ATTENDANCE_TOKEN_SECRET", "s3cret")]).unwrap();

        assert_eq!(config.bind_addr, "127.0.0.1:5000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.database_url, "sqlite:attendance.db");
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.utc_offset, FixedOffset::east_opt(0).unwrap());
        assert_eq!(
            config.cors_origin,
            Some(HeaderValue::from_static("http://localhost:5173"))
        );
        assert!(!config.expose_error_details());
    }

    #[test]
    fn test_missing_secret_is_rejected() {
        let err = load(&[]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("ATTENDANCE_TOKEN_SECRET")));
    }

    #[test]
    fn test_overrides_are_parsed() {
        let config = load(&[
            ("ATTENDANCE_TOKEN_SECRET", "s3cret"),
            ("ATTENDANCE_BIND_ADDR", "0.0.0.0:8080"),
            ("DATABASE_URL", "sqlite::memory:"),
            ("ATTENDANCE_CORS_ORIGIN", "*"),
            ("ATTENDANCE_ENV", "Development"),
            ("ATTENDANCE_UTC_OFFSET_MINUTES", "330"),
        ])
        .unwrap();

        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.database_url, "sqlite::memory:");
        assert!(config.cors_origin.is_none());
        assert!(config.expose_error_details());
        assert_eq!(config.utc_offset.local_minus_utc(), 330 * 60);
    }

    #[test]
    fn test_invalid_values_are_reported() {
        let err = load(&[
            ("ATTENDANCE_TOKEN_SECRET", "s3cret"),
            ("ATTENDANCE_ENV", "staging"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "ATTENDANCE_ENV", .. }));

        let err = load(&[
            ("ATTENDANCE_TOKEN_SECRET", "s3cret"),
            ("ATTENDANCE_UTC_OFFSET_MINUTES", "5000"),
        ])
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid { name: "ATTENDANCE_UTC_OFFSET_MINUTES", .. }
        ));
    }
}
