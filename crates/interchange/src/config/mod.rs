use std::env;
use std::fmt;
use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

use crate::qualification::{QualificationConfig, RateTableError};

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
    pub qualification: QualificationConfig,
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

        let mut qualification = match env::var("APP_RATE_TABLE") {
            Ok(path) if !path.trim().is_empty() => load_rate_table(Path::new(path.trim()))?,
            _ => QualificationConfig::default(),
        };

        if let Ok(raw) = env::var("APP_DISCOUNT_FRACTION") {
            qualification.discount_fraction = raw
                .trim()
                .parse::<f64>()
                .map_err(|_| ConfigError::InvalidDiscount(raw.clone()))?;
        }

        qualification.rate_table()?;

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            qualification,
        })
    }
}

/// Reads a JSON rate table so operators can retune pricing without a redeploy.
pub fn load_rate_table(path: &Path) -> Result<QualificationConfig, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::RateTableRead {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&raw).map_err(|source| ConfigError::RateTableParse {
        path: path.to_path_buf(),
        source,
    })
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

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost {
        source: std::net::AddrParseError,
    },
    InvalidDiscount(String),
    RateTableRead {
        path: PathBuf,
        source: std::io::Error,
    },
    RateTableParse {
        path: PathBuf,
        source: serde_json::Error,
    },
    RateTable(RateTableError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidDiscount(raw) => {
                write!(f, "APP_DISCOUNT_FRACTION must be a number, got '{raw}'")
            }
            ConfigError::RateTableRead { path, .. } => {
                write!(f, "unable to read rate table {}", path.display())
            }
            ConfigError::RateTableParse { path, source } => {
                write!(f, "rate table {} is not valid JSON: {source}", path.display())
            }
            ConfigError::RateTable(err) => write!(f, "invalid rate table: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidDiscount(_) => None,
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::RateTableRead { source, .. } => Some(source),
            ConfigError::RateTableParse { source, .. } => Some(source),
            ConfigError::RateTable(err) => Some(err),
        }
    }
}

impl From<RateTableError> for ConfigError {
    fn from(value: RateTableError) -> Self {
        Self::RateTable(value)
    }
}
