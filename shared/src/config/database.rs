//! Database configuration module

use serde::{Deserialize, Serialize};

use super::env_or;

/// Database configuration for the MySQL-backed passcode store
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Database connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Connection timeout in seconds
    pub connect_timeout: u64,

    /// Idle connection timeout in seconds
    pub idle_timeout: u64,

    /// Create the passcode table on startup when missing
    #[serde(default = "default_auto_migrate")]
    pub auto_migrate: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::from("mysql://localhost:3306/job_portal"),
            max_connections: 10,
            connect_timeout: 30,
            idle_timeout: 600,
            auto_migrate: default_auto_migrate(),
        }
    }
}

impl DatabaseConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        Self::from_env_or(Self::default())
    }

    /// Override `base` with any `DATABASE_*` variables that are set
    pub fn from_env_or(base: Self) -> Self {
        Self {
            url: env_or("DATABASE_URL", base.url),
            max_connections: env_or("DATABASE_MAX_CONNECTIONS", base.max_connections),
            connect_timeout: env_or("DATABASE_CONNECT_TIMEOUT", base.connect_timeout),
            idle_timeout: env_or("DATABASE_IDLE_TIMEOUT", base.idle_timeout),
            auto_migrate: env_or("DATABASE_AUTO_MIGRATE", base.auto_migrate),
        }
    }

    /// Create a new database configuration with URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set the maximum number of connections
    pub fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }
}

fn default_auto_migrate() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_config_builder() {
        let config = DatabaseConfig::new("mysql://db:3306/jobs").with_max_connections(25);
        assert_eq!(config.url, "mysql://db:3306/jobs");
        assert_eq!(config.max_connections, 25);
        assert!(config.auto_migrate);
    }
}
