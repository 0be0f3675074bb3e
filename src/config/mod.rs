//! Configuration module - environment variable parsing

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use crate::game::r#match::DEFAULT_ROUND_END_DELAY;

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Server binding address
    pub server_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Allowed client origins for CORS (comma-separated)
    pub client_origin: String,
    /// Pause between a round ending and the reset
    pub round_end_delay: Duration,
    /// Fixed seed for the AI's random source; fresh per session when unset
    pub match_seed: Option<u64>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup, so parsing can be tested without touching the process env
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // PORT wins over SERVER_ADDR for hosts that only hand out a port
        let server_addr = match lookup("PORT") {
            Some(port) => format!("0.0.0.0:{}", port),
            None => lookup("SERVER_ADDR").unwrap_or_else(|| "0.0.0.0:8080".to_string()),
        };

        let round_end_delay = match lookup("ROUND_END_DELAY_MS") {
            Some(ms) => Duration::from_millis(
                ms.trim()
                    .parse::<u64>()
                    .map_err(|_| ConfigError::Invalid("ROUND_END_DELAY_MS"))?,
            ),
            None => DEFAULT_ROUND_END_DELAY,
        };

        let match_seed = lookup("MATCH_SEED")
            .map(|seed| {
                seed.trim()
                    .parse::<u64>()
                    .map_err(|_| ConfigError::Invalid("MATCH_SEED"))
            })
            .transpose()?;

        Ok(Self {
            server_addr: server_addr
                .parse()
                .map_err(|_| ConfigError::InvalidAddress)?,
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            client_origin: lookup("CLIENT_ORIGIN")
                .unwrap_or_else(|| "http://localhost:8080".to_string()),
            round_end_delay,
            match_seed,
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),

    #[error("Invalid server address format")]
    InvalidAddress,
}
