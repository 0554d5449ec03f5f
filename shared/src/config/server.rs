//! Server configuration module

use serde::{Deserialize, Serialize};

use super::env_or;

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Server host address
    pub host: String,

    /// Server port
    pub port: u16,

    /// Worker threads (0 = number of CPU cores)
    #[serde(default)]
    pub workers: usize,

    /// Keep-alive timeout in seconds
    #[serde(default = "default_keep_alive")]
    pub keep_alive: u64,

    /// Maximum JSON payload size in bytes
    #[serde(default = "default_max_payload_size")]
    pub max_payload_size: usize,

    /// Origins allowed by CORS; empty means any origin
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: String::from("0.0.0.0"),
            port: 8080,
            workers: 0, // Use all CPU cores
            keep_alive: default_keep_alive(),
            max_payload_size: default_max_payload_size(),
            allowed_origins: vec![],
        }
    }
}

impl ServerConfig {
    /// Create a new server configuration
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Override `base` with any `SERVER_*` variables that are set
    pub fn from_env_or(base: Self) -> Self {
        let allowed_origins = std::env::var("SERVER_ALLOWED_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|o| !o.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or(base.allowed_origins);

        Self {
            host: env_or("SERVER_HOST", base.host),
            port: env_or("SERVER_PORT", base.port),
            workers: env_or("SERVER_WORKERS", base.workers),
            keep_alive: env_or("SERVER_KEEP_ALIVE", base.keep_alive),
            max_payload_size: env_or("SERVER_MAX_PAYLOAD_SIZE", base.max_payload_size),
            allowed_origins,
        }
    }

    /// Get the bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn default_keep_alive() -> u64 {
    75 // 75 seconds
}

fn default_max_payload_size() -> usize {
    64 * 1024 // 64 KB
}
