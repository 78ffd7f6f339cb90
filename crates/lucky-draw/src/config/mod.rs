use crate::roster::RosterFormat;
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_ROSTER_URL: &str = "https://h3iruobmqaxiuwr1.public.blob.vercel-storage.com/%E4%B8%AD%E7%8D%8E%E5%90%8D%E5%96%AE.csv";
const DEFAULT_DIRECTORY_URL: &str = "https://h3iruobmqaxiuwr1.public.blob.vercel-storage.com/%E6%99%AE%E7%8D%8EFinal_%E7%8D%8E%E9%A0%85%E6%B8%85%E5%96%AE-20260130.csv";

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

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub roster: RosterConfig,
    pub admin: AdminConfig,
    pub storage: StorageConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let roster = RosterConfig::from_env()?;

        let admin_password = env::var("LUCKY_DRAW_ADMIN_PASSWORD")
            .ok()
            .filter(|value| !value.is_empty());

        let storage = StorageConfig {
            signup_log: env::var("LUCKY_DRAW_SIGNUP_LOG")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data/signups.csv")),
            roster_table: env::var("LUCKY_DRAW_ROSTER_TABLE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data/prizes.csv")),
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            roster,
            admin: AdminConfig {
                password: admin_password,
            },
            storage,
        })
    }
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

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Where the prize roster and the company directory are read from, and how.
#[derive(Debug, Clone)]
pub struct RosterConfig {
    pub roster_url: String,
    pub roster_format: RosterFormat,
    pub directory_url: String,
    pub directory_format: RosterFormat,
    pub fetch: FetchPolicy,
}

impl RosterConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let roster_url =
            env::var("LUCKY_DRAW_ROSTER_URL").unwrap_or_else(|_| DEFAULT_ROSTER_URL.to_string());
        let roster_format = format_from_env("LUCKY_DRAW_ROSTER_FORMAT", RosterFormat::VOUCHER_LEDGER)?;

        let directory_url = env::var("LUCKY_DRAW_DIRECTORY_URL")
            .unwrap_or_else(|_| DEFAULT_DIRECTORY_URL.to_string());
        let directory_format =
            format_from_env("LUCKY_DRAW_DIRECTORY_FORMAT", RosterFormat::PRIZE_SUMMARY)?;

        let timeout = millis_from_env("LUCKY_DRAW_FETCH_TIMEOUT_MS", 10_000)?;
        let backoff = millis_from_env("LUCKY_DRAW_FETCH_BACKOFF_MS", 250)?;

        Ok(Self {
            roster_url,
            roster_format,
            directory_url,
            directory_format,
            fetch: FetchPolicy {
                timeout,
                retry_backoff: backoff,
            },
        })
    }
}

/// Deadline for a single upstream attempt and the pause before the one retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchPolicy {
    pub timeout: Duration,
    pub retry_backoff: Duration,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            retry_backoff: Duration::from_millis(250),
        }
    }
}

/// The single static credential guarding roster uploads. `None` disables uploads.
#[derive(Clone, Default)]
pub struct AdminConfig {
    pub password: Option<String>,
}

impl fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminConfig")
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// File locations for the service's own writable state.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub signup_log: PathBuf,
    pub roster_table: PathBuf,
}

fn format_from_env(key: &'static str, default: RosterFormat) -> Result<RosterFormat, ConfigError> {
    match env::var(key) {
        Ok(value) => RosterFormat::from_name(&value).ok_or(ConfigError::UnknownRosterFormat {
            key,
            value,
        }),
        Err(_) => Ok(default),
    }
}

fn millis_from_env(key: &'static str, default: u64) -> Result<Duration, ConfigError> {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|_| ConfigError::InvalidDuration { key }),
        Err(_) => Ok(Duration::from_millis(default)),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidDuration { key: &'static str },
    UnknownRosterFormat { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidDuration { key } => {
                write!(f, "{key} must be a whole number of milliseconds")
            }
            ConfigError::UnknownRosterFormat { key, value } => write!(
                f,
                "{key} names an unknown roster format '{value}' (expected one of: {})",
                RosterFormat::known_names().join(", ")
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidDuration { .. }
            | ConfigError::UnknownRosterFormat { .. } => None,
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
        for key in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "LUCKY_DRAW_ROSTER_URL",
            "LUCKY_DRAW_ROSTER_FORMAT",
            "LUCKY_DRAW_DIRECTORY_URL",
            "LUCKY_DRAW_DIRECTORY_FORMAT",
            "LUCKY_DRAW_FETCH_TIMEOUT_MS",
            "LUCKY_DRAW_FETCH_BACKOFF_MS",
            "LUCKY_DRAW_ADMIN_PASSWORD",
            "LUCKY_DRAW_SIGNUP_LOG",
            "LUCKY_DRAW_ROSTER_TABLE",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.roster.roster_format, RosterFormat::VOUCHER_LEDGER);
        assert_eq!(config.roster.directory_format, RosterFormat::PRIZE_SUMMARY);
        assert_eq!(config.roster.fetch, FetchPolicy::default());
        assert!(config.admin.password.is_none());
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
    }

    #[test]
    fn roster_format_and_fetch_policy_follow_env() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("LUCKY_DRAW_ROSTER_FORMAT", "unit_roster");
        env::set_var("LUCKY_DRAW_FETCH_TIMEOUT_MS", "1500");
        env::set_var("LUCKY_DRAW_ADMIN_PASSWORD", "s3cret");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.roster.roster_format, RosterFormat::UNIT_ROSTER);
        assert_eq!(config.roster.fetch.timeout, Duration::from_millis(1500));
        assert_eq!(config.admin.password.as_deref(), Some("s3cret"));
        assert!(!format!("{:?}", config.admin).contains("s3cret"));
        reset_env();
    }

    #[test]
    fn rejects_unknown_roster_format() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("LUCKY_DRAW_DIRECTORY_FORMAT", "xlsx-magic");
        let error = AppConfig::load().expect_err("unknown format rejected");
        assert!(matches!(
            error,
            ConfigError::UnknownRosterFormat {
                key: "LUCKY_DRAW_DIRECTORY_FORMAT",
                ..
            }
        ));
        reset_env();
    }
}
