//! Configuration Module
//!
//! Centralized configuration management for the service: server binding,
//! session signing, and the optional database, cache, and email backends.
//! Subsystems are switched on by the presence of their env vars, so a bare
//! environment still boots a fully in-memory development server.

use crate::service::notifier::SmtpConfig;
use crate::store::DatabaseConfig;
use crate::utils::security::DEFAULT_BCRYPT_COST;

/// Environment variable helpers
pub mod env {
    use std::env;
    use std::str::FromStr;

    /// Get environment variable as string with default
    pub fn get_string(key: &str, default: &str) -> String {
        env::var(key).unwrap_or_else(|_| default.to_string())
    }

    /// Get environment variable parsed into `T`, falling back to the
    /// default when unset or unparseable
    pub fn get_parsed<T: FromStr>(key: &str, default: T) -> T {
        env::var(key)
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(default)
    }

    /// Check if environment variable is set
    pub fn is_set(key: &str) -> bool {
        env::var(key).is_ok()
    }

    /// Get required environment variable or panic
    pub fn get_required(key: &str) -> String {
        env::var(key).unwrap_or_else(|_| panic!("environment variable {} must be set", key))
    }
}

/// Application configuration combining all service configurations
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Server configuration
    pub server: ServerConfig,

    /// Session and password configuration
    pub auth: AuthConfig,

    /// Database configuration, when DATABASE_URL is set
    pub database: Option<DatabaseConfig>,

    /// Redis connection string, when REDIS_URL is set
    pub redis_url: Option<String>,

    /// SMTP configuration, when SMTP_HOST is set
    pub email: Option<SmtpConfig>,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub cors_origins: Vec<String>,
}

/// Session and password configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Secret used to sign session tokens
    pub session_secret: String,
    /// Bcrypt work factor for new password hashes
    pub bcrypt_cost: u32,
    /// Public base URL used in password reset links
    pub base_url: String,
}

impl ServerConfig {
    /// Read the server section from the environment
    pub fn from_env() -> Self {
        Self {
            host: env::get_string("SERVER_HOST", "0.0.0.0"),
            port: env::get_parsed("SERVER_PORT", 3000),
            log_level: env::get_string("LOG_LEVEL", "info"),
            cors_origins: split_origins(&env::get_string("CORS_ORIGINS", "*")),
        }
    }

    /// Whether CORS should allow any origin
    ///
    /// A wildcard origin cannot be combined with credentialed requests, so
    /// the session cookie only works cross-origin once CORS_ORIGINS names
    /// the frontend explicitly.
    pub fn cors_allows_any_origin(&self) -> bool {
        self.cors_origins.iter().any(|origin| origin == "*")
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

impl AuthConfig {
    /// Read the auth section from the environment; SESSION_SECRET has no
    /// default and panics when missing
    pub fn from_env() -> Self {
        Self {
            session_secret: env::get_required("SESSION_SECRET"),
            bcrypt_cost: env::get_parsed("BCRYPT_COST", DEFAULT_BCRYPT_COST),
            base_url: env::get_string("APP_BASE_URL", "http://localhost:3000"),
        }
    }
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|origin| origin.trim().to_string())
        .filter(|origin| !origin.is_empty())
        .collect()
}

impl AppConfig {
    /// Load complete application configuration from environment
    pub fn from_env() -> anyhow::Result<Self> {
        let database = if env::is_set("DATABASE_URL") {
            Some(DatabaseConfig::from_env()?)
        } else {
            None
        };

        let email = if env::is_set("SMTP_HOST") {
            Some(SmtpConfig::from_env()?)
        } else {
            None
        };

        Ok(Self {
            server: ServerConfig::from_env(),
            auth: AuthConfig::from_env(),
            database,
            redis_url: std::env::var("REDIS_URL").ok(),
            email,
        })
    }

    /// Validate the complete configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("Server port must be greater than 0");
        }

        if self.server.cors_origins.is_empty() {
            anyhow::bail!("CORS_ORIGINS must name at least one origin (or '*')");
        }

        if self.auth.session_secret.is_empty() {
            anyhow::bail!("Session secret cannot be empty");
        }

        if !(4..=31).contains(&self.auth.bcrypt_cost) {
            anyhow::bail!("Bcrypt cost must be between 4 and 31");
        }

        if let Some(database) = &self.database {
            if database.max_connections == 0 {
                anyhow::bail!("Database max_connections must be greater than 0");
            }

            if database.min_connections > database.max_connections {
                anyhow::bail!("Database min_connections cannot be greater than max_connections");
            }
        }

        Ok(())
    }
}
