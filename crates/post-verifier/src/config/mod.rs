use crate::workflows::submission::GuildPolicy;
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

pub const DEFAULT_APIFY_BASE_URL: &str = "https://api.apify.com";
pub const DEFAULT_PARALON_BASE_URL: &str = "https://paraloncloud.com/v1";
pub const DEFAULT_PREFERRED_MODEL: &str = "qwen3-14b";
pub const DEFAULT_FALLBACK_MODEL: &str = "qwen3-8b";

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the verifier service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub extraction: ExtractionConfig,
    pub classifier: ClassifierConfig,
    pub policy_defaults: GuildPolicy,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(&var_or("APP_ENV", "development"));

        let host = var_or("APP_HOST", "127.0.0.1");
        let port = var_or("APP_PORT", "3000")
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let telemetry = TelemetryConfig {
            log_level: var_or("APP_LOG_LEVEL", "info"),
            format: LogFormat::from_str(&var_or("APP_LOG_FORMAT", "compact"))?,
        };

        let timeout_ms = parse_var::<u64>("APIFY_TASK_TIMEOUT_MS", "90000")?;
        let extraction = ExtractionConfig {
            base_url: var_or("APIFY_BASE_URL", DEFAULT_APIFY_BASE_URL),
            token: optional_var("APIFY_TOKEN"),
            task_id: optional_var("APIFY_TASK_ID"),
            timeout: Duration::from_millis(timeout_ms),
            poll_interval: Duration::from_secs(2),
        };

        let classifier = ClassifierConfig {
            base_url: var_or("PARALON_BASE_URL", DEFAULT_PARALON_BASE_URL),
            api_key: optional_var("PARALON_API_KEY"),
            preferred_model: var_or("PARALON_MODEL", DEFAULT_PREFERRED_MODEL),
            fallback_model: var_or("PARALON_FALLBACK_MODEL", DEFAULT_FALLBACK_MODEL),
            model_cache_ttl: Duration::from_secs(10 * 60),
        };

        let max_post_age_days = parse_var::<u32>("DEFAULT_MAX_POST_AGE_DAYS", "7")?;
        if max_post_age_days < 1 {
            return Err(ConfigError::OutOfRange {
                name: "DEFAULT_MAX_POST_AGE_DAYS",
            });
        }
        let sentiment_min_confidence = parse_var::<f64>("DEFAULT_SENTIMENT_MIN_CONFIDENCE", "0.65")?;
        if !(0.0..=1.0).contains(&sentiment_min_confidence) {
            return Err(ConfigError::OutOfRange {
                name: "DEFAULT_SENTIMENT_MIN_CONFIDENCE",
            });
        }

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry,
            extraction,
            classifier,
            policy_defaults: GuildPolicy {
                max_post_age_days,
                sentiment_min_confidence,
            },
        })
    }
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn optional_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_var<T: std::str::FromStr>(name: &'static str, default: &str) -> Result<T, ConfigError> {
    var_or(name, default)
        .trim()
        .parse::<T>()
        .map_err(|_| ConfigError::InvalidNumber { name })
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

impl LogFormat {
    fn from_str(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" | "" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            _ => Err(ConfigError::InvalidLogFormat(value.to_string())),
        }
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub format: LogFormat,
}

/// Remote extraction task settings.
#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub task_id: Option<String>,
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl ExtractionConfig {
    pub fn credentials(&self) -> Result<(&str, &str), ConfigError> {
        let token = self
            .token
            .as_deref()
            .ok_or(ConfigError::Missing("APIFY_TOKEN"))?;
        let task_id = self
            .task_id
            .as_deref()
            .ok_or(ConfigError::Missing("APIFY_TASK_ID"))?;
        Ok((token, task_id))
    }
}

/// Completion service settings for sentiment classification.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub preferred_model: String,
    pub fallback_model: String,
    pub model_cache_ttl: Duration,
}

impl ClassifierConfig {
    pub fn api_key(&self) -> Result<&str, ConfigError> {
        self.api_key
            .as_deref()
            .ok_or(ConfigError::Missing("PARALON_API_KEY"))
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { name: &'static str },
    OutOfRange { name: &'static str },
    InvalidLogFormat(String),
    Missing(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { name } => write!(f, "{name} must be numeric"),
            ConfigError::OutOfRange { name } => write!(f, "{name} is outside its allowed range"),
            ConfigError::InvalidLogFormat(value) => {
                write!(f, "APP_LOG_FORMAT must be 'compact' or 'json', got '{value}'")
            }
            ConfigError::Missing(name) => write!(f, "{name} must be set"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for name in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "APP_LOG_FORMAT",
            "APIFY_TOKEN",
            "APIFY_TASK_ID",
            "APIFY_TASK_TIMEOUT_MS",
            "PARALON_API_KEY",
            "PARALON_MODEL",
            "DEFAULT_MAX_POST_AGE_DAYS",
            "DEFAULT_SENTIMENT_MIN_CONFIDENCE",
        ] {
            env::remove_var(name);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.format, LogFormat::Compact);
        assert_eq!(config.extraction.timeout, Duration::from_secs(90));
        assert_eq!(config.classifier.preferred_model, DEFAULT_PREFERRED_MODEL);
        assert_eq!(config.policy_defaults.max_post_age_days, 7);
        assert!((config.policy_defaults.sentiment_min_confidence - 0.65).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_credentials_are_reported_by_name() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads");
        match config.extraction.credentials() {
            Err(ConfigError::Missing("APIFY_TOKEN")) => {}
            other => panic!("expected missing token, got {other:?}"),
        }
        assert!(config.classifier.api_key().is_err());
    }

    #[test]
    fn rejects_out_of_range_confidence() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("DEFAULT_SENTIMENT_MIN_CONFIDENCE", "1.5");
        let error = AppConfig::load().expect_err("confidence above one is rejected");
        assert!(error.to_string().contains("DEFAULT_SENTIMENT_MIN_CONFIDENCE"));
        reset_env();
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }
}
