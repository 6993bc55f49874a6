use anyhow::{Context, Result};
use secrecy::{ExposeSecret, SecretBox};
use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub mail: MailConfig,
    pub app: AppConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
}

#[derive(Debug)]
pub struct AuthConfig {
    pub jwt_secret: SecretBox<String>,
    pub access_token_ttl_secs: i64,
    pub refresh_token_ttl_secs: i64,
}

impl Clone for AuthConfig {
    fn clone(&self) -> Self {
        Self {
            jwt_secret: SecretBox::new(Box::new(self.jwt_secret.expose_secret().clone())),
            access_token_ttl_secs: self.access_token_ttl_secs,
            refresh_token_ttl_secs: self.refresh_token_ttl_secs,
        }
    }
}

impl AuthConfig {
    pub fn access_token_ttl(&self) -> Duration {
        Duration::seconds(self.access_token_ttl_secs)
    }

    pub fn refresh_token_ttl(&self) -> Duration {
        Duration::seconds(self.refresh_token_ttl_secs)
    }
}

#[derive(Debug, Clone)]
pub struct MailConfig {
    pub enabled: bool,
    pub from: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub name: String,
    pub environment: Environment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "production" => Ok(Environment::Production),
            "staging" => Ok(Environment::Staging),
            "development" => Ok(Environment::Development),
            _ => Err(format!("Unknown environment: {}", s)),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let host = env::var("SERVER_HOST")
            .unwrap_or_else(|_| "0.0.0.0".to_string())
            .parse::<IpAddr>()
            .context("Failed to parse SERVER_HOST")?;

        let port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "8000".to_string())
            .parse::<u16>()
            .context("Failed to parse SERVER_PORT")?;

        let db_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let db_max_connections = match env::var("DATABASE_MAX_CONNECTIONS") {
            Ok(val) => Some(val.parse().context("Failed to parse DATABASE_MAX_CONNECTIONS")?),
            Err(_) => Some(10),
        };
        let db_min_connections = match env::var("DATABASE_MIN_CONNECTIONS") {
            Ok(val) => Some(val.parse().context("Failed to parse DATABASE_MIN_CONNECTIONS")?),
            Err(_) => Some(1),
        };

        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET must be set")?;
        let access_token_ttl_secs = env::var("JWT_EXPIRATION_SECS")
            .unwrap_or_else(|_| "3600".to_string())
            .parse::<i64>()
            .context("Failed to parse JWT_EXPIRATION_SECS")?;
        // 30 days unless overridden.
        let refresh_token_ttl_secs = env::var("REFRESH_EXPIRATION_SECS")
            .unwrap_or_else(|_| "2592000".to_string())
            .parse::<i64>()
            .context("Failed to parse REFRESH_EXPIRATION_SECS")?;

        let mail_enabled = env::var("MAIL_ENABLED")
            .map(|v| v.parse::<bool>().unwrap_or(false))
            .unwrap_or(false);
        let mail_from =
            env::var("MAIL_FROM").unwrap_or_else(|_| "noreply@portfolio.dev".to_string());

        let environment = env::var("APP_ENVIRONMENT")
            .unwrap_or_else(|_| "development".to_string())
            .parse::<Environment>()
            .unwrap_or_default();
        let app_name = env::var("APP_NAME").unwrap_or_else(|_| "Advisory Backend".to_string());

        Ok(Config {
            server: ServerConfig { host, port },
            database: DatabaseConfig {
                url: db_url,
                max_connections: db_max_connections,
                min_connections: db_min_connections,
            },
            auth: AuthConfig {
                jwt_secret: SecretBox::new(Box::new(jwt_secret)),
                access_token_ttl_secs,
                refresh_token_ttl_secs,
            },
            mail: MailConfig {
                enabled: mail_enabled,
                from: mail_from,
            },
            app: AppConfig {
                name: app_name,
                environment,
            },
        })
    }

    pub fn server_addr(&self) -> SocketAddr {
        SocketAddr::new(self.server.host, self.server.port)
    }

    #[allow(unused)]
    pub fn is_production(&self) -> bool {
        self.app.environment == Environment::Production
    }
}

// Global config instance, initialized once at startup.
use once_cell::sync::OnceCell;

static CONFIG: OnceCell<Config> = OnceCell::new();

pub fn init() -> Result<&'static Config> {
    CONFIG.get_or_try_init(Config::from_env)
}

pub fn get() -> &'static Config {
    CONFIG.get().expect("Config is not initialized")
}
