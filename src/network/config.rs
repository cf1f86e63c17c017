//! Server Configuration
//!
//! Defaults suit a local demo; every field can be overridden from the
//! environment. Bad values are reported instead of silently ignored.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use thiserror::Error;

use crate::game::transition::MatchConfig;
use crate::{DEFAULT_HISTORY_LIMIT, DEFAULT_MAX_CONNECTIONS, DEFAULT_PORT};

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A variable could not be parsed.
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue {
        /// Variable name.
        key: &'static str,
        /// Raw value.
        value: String,
    },

    /// No card values were given.
    #[error("Card alphabet is empty")]
    EmptyAlphabet,

    /// A card value was listed twice, which would deal four of a kind.
    #[error("Card value {0:?} listed more than once")]
    DuplicateCardValue(String),
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address.
    pub bind_addr: SocketAddr,
    /// Maximum concurrent connections.
    pub max_connections: usize,
    /// Game rules.
    pub match_config: MatchConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_PORT),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            match_config: MatchConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Create config from environment variables.
    ///
    /// - `HOST`, `PORT`: listen address (default `0.0.0.0:3000`)
    /// - `MAX_CONNECTIONS`
    /// - `MISMATCH_DELAY_MS`
    /// - `HISTORY_LIMIT`: at most 20
    /// - `CARD_VALUES`: comma-separated face values
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        let host = match lookup("HOST") {
            Some(raw) => parse::<IpAddr>("HOST", &raw)?,
            None => config.bind_addr.ip(),
        };
        let port = match lookup("PORT") {
            Some(raw) => parse::<u16>("PORT", &raw)?,
            None => config.bind_addr.port(),
        };
        config.bind_addr = SocketAddr::new(host, port);

        if let Some(raw) = lookup("MAX_CONNECTIONS") {
            config.max_connections = parse("MAX_CONNECTIONS", &raw)?;
        }
        if let Some(raw) = lookup("MISMATCH_DELAY_MS") {
            config.match_config.mismatch_delay =
                Duration::from_millis(parse("MISMATCH_DELAY_MS", &raw)?);
        }
        if let Some(raw) = lookup("HISTORY_LIMIT") {
            let limit: usize = parse("HISTORY_LIMIT", &raw)?;
            if limit > DEFAULT_HISTORY_LIMIT {
                return Err(ConfigError::InvalidValue { key: "HISTORY_LIMIT", value: raw });
            }
            config.match_config.history_limit = limit;
        }
        if let Some(raw) = lookup("CARD_VALUES") {
            config.match_config.card_values = parse_card_values(&raw)?;
        }

        Ok(config)
    }
}

/// Parse a comma-separated card alphabet.
pub fn parse_card_values(raw: &str) -> Result<Vec<String>, ConfigError> {
    let mut values: Vec<String> = Vec::new();
    for value in raw.split(',').map(str::trim).filter(|v| !v.is_empty()) {
        if values.iter().any(|v| v == value) {
            return Err(ConfigError::DuplicateCardValue(value.to_string()));
        }
        values.push(value.to_string());
    }

    if values.is_empty() {
        return Err(ConfigError::EmptyAlphabet);
    }
    Ok(values)
}

fn parse<T: std::str::FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: raw.to_string(),
    })
}
