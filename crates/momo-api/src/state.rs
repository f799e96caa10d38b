//! # Application State
//!
//! Shared state for the Axum application.
//! Contains configuration, validation rules, the rate limiter and the
//! outcome source. Everything except the limiter's counters is immutable
//! after startup.

use crate::middleware::rate_limit::{RateLimitConfig, RateLimiter};
use axum::http::HeaderValue;
use momo_core::{SharedOutcomeSource, ThreadRngOutcomeSource, ValidationRules};
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Configuration errors raised while reading the environment
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    fn invalid(key: &'static str, value: &str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            key,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Application configuration
#[derive(Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Environment (development, staging, production)
    pub environment: String,
    /// CORS origin, `*` for any
    pub allowed_origin: String,
    /// Access-gate secret. `None` means open access.
    pub api_key: Option<String>,
    /// Per-client request ceiling and window
    pub rate_limit: RateLimitConfig,
    /// Key the rate limiter on `x-forwarded-for`
    pub trust_proxy: bool,
    /// Maximum accepted request body, in bytes
    pub body_limit: usize,
    /// Explicit validation-rules file
    pub rules_path: Option<PathBuf>,
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Load from environment variables (and `.env` if present)
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key/value source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let port = parse_or("PORT", var("PORT"), 8001u16)?;
        let window_secs = parse_or("RATE_LIMIT_WINDOW_SECS", var("RATE_LIMIT_WINDOW_SECS"), 60u64)?;
        let max_requests = parse_or("RATE_LIMIT_MAX", var("RATE_LIMIT_MAX"), 60u32)?;
        let body_limit = parse_or("BODY_LIMIT_BYTES", var("BODY_LIMIT_BYTES"), 10 * 1024usize)?;

        if window_secs == 0 {
            return Err(ConfigError::invalid("RATE_LIMIT_WINDOW_SECS", "0", "must be greater than 0"));
        }
        if max_requests == 0 {
            return Err(ConfigError::invalid("RATE_LIMIT_MAX", "0", "must be greater than 0"));
        }
        if body_limit == 0 {
            return Err(ConfigError::invalid("BODY_LIMIT_BYTES", "0", "must be greater than 0"));
        }

        let trust_proxy = match var("TRUST_PROXY") {
            None => false,
            Some(v) => parse_bool(&v).ok_or_else(|| {
                ConfigError::invalid("TRUST_PROXY", &v, "expected true or false")
            })?,
        };

        let log_format = match var("LOG_FORMAT").as_deref() {
            None | Some("text") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::invalid("LOG_FORMAT", other, "expected text or json"))
            }
        };

        let allowed_origin = var("ALLOWED_ORIGIN").unwrap_or_else(|| "*".to_string());
        if allowed_origin != "*" && HeaderValue::from_str(&allowed_origin).is_err() {
            return Err(ConfigError::invalid("ALLOWED_ORIGIN", &allowed_origin, "not a valid header value"));
        }

        let host = var("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        if host.parse::<IpAddr>().is_err() {
            return Err(ConfigError::invalid("HOST", &host, "expected an IP address"));
        }

        Ok(Self {
            host,
            port,
            environment: var("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
            allowed_origin,
            api_key: var("API_KEY"),
            rate_limit: RateLimitConfig {
                window: Duration::from_secs(window_secs),
                max_requests,
            },
            trust_proxy,
            body_limit,
            rules_path: var("SIMULATOR_RULES").map(PathBuf::from),
            log_format,
        })
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|_| ConfigError::invalid("HOST", &self.host, "expected an IP address"))?;
        Ok(SocketAddr::new(ip, self.port))
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Whether the API-key gate is active
    pub fn access_gate_enabled(&self) -> bool {
        self.api_key.is_some()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8001,
            environment: "development".to_string(),
            allowed_origin: "*".to_string(),
            api_key: None,
            rate_limit: RateLimitConfig::default(),
            trust_proxy: false,
            body_limit: 10 * 1024,
            rules_path: None,
            log_format: LogFormat::Text,
        }
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("environment", &self.environment)
            .field("allowed_origin", &self.allowed_origin)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("rate_limit", &self.rate_limit)
            .field("trust_proxy", &self.trust_proxy)
            .field("body_limit", &self.body_limit)
            .field("rules_path", &self.rules_path)
            .field("log_format", &self.log_format)
            .finish()
    }
}

fn parse_or<T>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(v) => v
            .parse()
            .map_err(|e: T::Err| ConfigError::invalid(key, &v, e.to_string())),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Application config
    pub config: Arc<AppConfig>,
    /// Validation rules for payment requests
    pub rules: Arc<ValidationRules>,
    /// Per-client request counters
    pub limiter: Arc<RateLimiter>,
    /// Random source for outcome draws
    pub outcomes: SharedOutcomeSource,
}

impl AppState {
    /// Create state from the environment, loading validation rules from disk
    pub fn new() -> anyhow::Result<Self> {
        Self::from_config(AppConfig::from_env()?)
    }

    /// Create state from a loaded config, reading validation rules from disk
    pub fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let rules = load_validation_rules(config.rules_path.as_deref())?;
        Ok(Self::with_rules(config, rules))
    }

    /// Create state from explicit config and rules
    pub fn with_rules(config: AppConfig, rules: ValidationRules) -> Self {
        let limiter = RateLimiter::new(config.rate_limit.clone());
        Self {
            config: Arc::new(config),
            rules: Arc::new(rules),
            limiter: Arc::new(limiter),
            outcomes: Arc::new(ThreadRngOutcomeSource),
        }
    }

    /// Builder: replace the outcome source
    pub fn with_outcome_source(mut self, outcomes: SharedOutcomeSource) -> Self {
        self.outcomes = outcomes;
        self
    }
}

/// Load validation rules from `explicit`, else from a conventional path,
/// else fall back to the built-in defaults.
fn load_validation_rules(explicit: Option<&Path>) -> anyhow::Result<ValidationRules> {
    if let Some(path) = explicit {
        let rules = ValidationRules::from_file(path)?;
        tracing::info!("Loaded validation rules from {}", path.display());
        return Ok(rules);
    }

    let config_paths = [
        "config/simulator.toml",
        "../config/simulator.toml",
        "../../config/simulator.toml",
    ];

    for path in config_paths {
        if Path::new(path).is_file() {
            let rules = ValidationRules::from_file(path)?;
            tracing::info!("Loaded validation rules from {}", path);
            return Ok(rules);
        }
    }

    tracing::info!("No validation rules file found, using built-in rules");
    Ok(ValidationRules::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_app_config_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8001);
        assert_eq!(config.allowed_origin, "*");
        assert!(config.api_key.is_none());
        assert!(!config.access_gate_enabled());
        assert_eq!(config.rate_limit.window, Duration::from_secs(60));
        assert_eq!(config.rate_limit.max_requests, 60);
        assert_eq!(config.body_limit, 10_240);
        assert!(!config.trust_proxy);
        assert_eq!(config.log_format, LogFormat::Text);
    }

    #[test]
    fn test_empty_api_key_means_open_access() {
        let config = config_from(&[("API_KEY", "   ")]).unwrap();
        assert!(!config.access_gate_enabled());

        let config = config_from(&[("API_KEY", "s3cret")]).unwrap();
        assert_eq!(config.api_key.as_deref(), Some("s3cret"));
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "3000"),
            ("ENVIRONMENT", "production"),
            ("RATE_LIMIT_WINDOW_SECS", "30"),
            ("RATE_LIMIT_MAX", "5"),
            ("TRUST_PROXY", "true"),
            ("LOG_FORMAT", "json"),
            ("SIMULATOR_RULES", "/etc/momo/rules.toml"),
        ])
        .unwrap();

        assert!(config.is_production());
        assert_eq!(config.rate_limit.window, Duration::from_secs(30));
        assert_eq!(config.rate_limit.max_requests, 5);
        assert!(config.trust_proxy);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(
            config.rules_path.as_deref(),
            Some(Path::new("/etc/momo/rules.toml"))
        );
        assert_eq!(config.socket_addr().unwrap().to_string(), "127.0.0.1:3000");
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(config_from(&[("PORT", "eighty")]).is_err());
        assert!(config_from(&[("RATE_LIMIT_MAX", "0")]).is_err());
        assert!(config_from(&[("RATE_LIMIT_WINDOW_SECS", "0")]).is_err());
        assert!(config_from(&[("RATE_LIMIT_WINDOW_SECS", "-1")]).is_err());
        assert!(config_from(&[("TRUST_PROXY", "maybe")]).is_err());
        assert!(config_from(&[("LOG_FORMAT", "xml")]).is_err());
        assert!(config_from(&[("HOST", "localhost")]).is_err());
        assert!(config_from(&[("ALLOWED_ORIGIN", "https://bad\norigin")]).is_err());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = config_from(&[("API_KEY", "s3cret")]).unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("s3cret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_explicit_rules_file_must_exist() {
        let result = load_validation_rules(Some(Path::new("/no/such/rules.toml")));
        assert!(result.is_err());
    }
}
