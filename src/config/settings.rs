//! Application settings loaded from environment variables.

use std::env;

use super::constants::{DEFAULT_DATABASE_MAX_CONNECTIONS, DEFAULT_DATABASE_URL};

/// Application configuration
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("database_max_connections", &self.database_max_connections)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables (and `.env` if present).
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            database_max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_DATABASE_MAX_CONNECTIONS),
        }
    }

    /// Build a configuration pointing at an explicit database URL.
    pub fn with_database_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            database_max_connections: DEFAULT_DATABASE_MAX_CONNECTIONS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_database_url() {
        let config = Config::with_database_url("postgres://user:secret@db/activer");
        let printed = format!("{:?}", config);

        assert!(!printed.contains("secret"));
        assert!(printed.contains("[REDACTED]"));
    }
}
