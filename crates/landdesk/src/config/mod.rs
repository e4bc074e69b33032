use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

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

        let admin_email = env::var("APP_ADMIN_EMAIL")
            .unwrap_or_else(|_| "admin@gctour.com".to_string())
            .trim()
            .to_ascii_lowercase();

        let photo_url_ttl_hours = env::var("APP_PHOTO_URL_TTL_HOURS")
            .unwrap_or_else(|_| "24".to_string())
            .parse::<u32>()
            .map_err(|_| ConfigError::InvalidPhotoUrlTtl)?;

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            admin: AdminConfig {
                email: admin_email,
            },
            storage: StorageConfig {
                photo_url_ttl_hours,
            },
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

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// The single back-office administrator identity.
///
/// Sessions whose account email matches are given the admin role when the
/// session is loaded; every other session is a tenant.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    pub email: String,
}

impl AdminConfig {
    pub fn is_admin_email(&self, email: &str) -> bool {
        email.trim().eq_ignore_ascii_case(&self.email)
    }
}

/// Photo storage controls. Signed URLs expire after the configured TTL.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub photo_url_ttl_hours: u32,
}

impl StorageConfig {
    pub fn photo_url_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(i64::from(self.photo_url_ttl_hours))
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidPhotoUrlTtl,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidPhotoUrlTtl => {
                write!(f, "APP_PHOTO_URL_TTL_HOURS must be a whole number of hours")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidPhotoUrlTtl => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}
