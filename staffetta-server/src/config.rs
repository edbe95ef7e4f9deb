//! Configurazione del processo, letta dalle variabili d'ambiente.
//!
//! I default riproducono il deploy originale: HTTP su 0.0.0.0:3000, relay su 0.0.0.0:5000,
//! database `messages_db`, tabella `messages`, payload del relay limitato a 1024 byte.

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

use crate::storage::is_valid_table_name;

pub const DEFAULT_HTTP_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_RELAY_ADDR: &str = "0.0.0.0:5000";
pub const DEFAULT_DATABASE_NAME: &str = "messages_db";
pub const DEFAULT_MESSAGES_TABLE: &str = "messages";
pub const DEFAULT_MAX_PAYLOAD: usize = 1024;
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {var}={value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Parametri per connessione del relay listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelaySettings {
    /// Byte massimi letti da una connessione; il resto viene troncato.
    pub max_payload: usize,
    pub read_timeout: Duration,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            max_payload: DEFAULT_MAX_PAYLOAD,
            read_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub http_addr: SocketAddr,
    pub relay_addr: SocketAddr,
    /// Dove il front end si connette. `None` => loopback sulla porta a cui il relay è legato.
    pub relay_target: Option<SocketAddr>,
    pub database_url: Option<String>,
    pub database_name: String,
    pub messages_table: String,
    pub relay: RelaySettings,
    pub connect_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            relay_addr: SocketAddr::from(([0, 0, 0, 0], 5000)),
            relay_target: None,
            database_url: None,
            database_name: DEFAULT_DATABASE_NAME.to_string(),
            messages_table: DEFAULT_MESSAGES_TABLE.to_string(),
            relay: RelaySettings::default(),
            connect_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }
}

impl Config {
    /// Legge HTTP_ADDR, RELAY_ADDR, RELAY_TARGET, DATABASE_URL, DATABASE_NAME, MESSAGES_TABLE,
    /// RELAY_MAX_PAYLOAD, RELAY_READ_TIMEOUT_MS, RELAY_CONNECT_TIMEOUT_MS.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let http_addr = parse_addr("HTTP_ADDR", get("HTTP_ADDR").unwrap_or_else(|| DEFAULT_HTTP_ADDR.to_string()))?;
        let relay_addr = parse_addr("RELAY_ADDR", get("RELAY_ADDR").unwrap_or_else(|| DEFAULT_RELAY_ADDR.to_string()))?;
        let relay_target = get("RELAY_TARGET")
            .map(|raw| parse_addr("RELAY_TARGET", raw))
            .transpose()?;

        let database_name = get("DATABASE_NAME").unwrap_or_else(|| DEFAULT_DATABASE_NAME.to_string());
        let messages_table = get("MESSAGES_TABLE").unwrap_or_else(|| DEFAULT_MESSAGES_TABLE.to_string());
        if !is_valid_table_name(&messages_table) {
            return Err(invalid("MESSAGES_TABLE", messages_table, "must be a plain SQL identifier"));
        }

        let max_payload = parse_number("RELAY_MAX_PAYLOAD", get("RELAY_MAX_PAYLOAD"), DEFAULT_MAX_PAYLOAD as u64)?;
        if max_payload == 0 {
            return Err(invalid("RELAY_MAX_PAYLOAD", "0".to_string(), "must be greater than zero"));
        }
        let read_timeout = parse_number("RELAY_READ_TIMEOUT_MS", get("RELAY_READ_TIMEOUT_MS"), DEFAULT_TIMEOUT_MS)?;
        let connect_timeout =
            parse_number("RELAY_CONNECT_TIMEOUT_MS", get("RELAY_CONNECT_TIMEOUT_MS"), DEFAULT_TIMEOUT_MS)?;

        Ok(Self {
            http_addr,
            relay_addr,
            relay_target,
            database_url: get("DATABASE_URL"),
            database_name,
            messages_table,
            relay: RelaySettings {
                max_payload: max_payload as usize,
                read_timeout: Duration::from_millis(read_timeout),
            },
            connect_timeout: Duration::from_millis(connect_timeout),
        })
    }
}

fn invalid(var: &'static str, value: String, reason: impl ToString) -> ConfigError {
    ConfigError::Invalid {
        var,
        value,
        reason: reason.to_string(),
    }
}

fn parse_addr(var: &'static str, raw: String) -> Result<SocketAddr, ConfigError> {
    raw.trim().parse().map_err(|e| invalid(var, raw.clone(), e))
}

fn parse_number(var: &'static str, raw: Option<String>, default: u64) -> Result<u64, ConfigError> {
    match raw {
        Some(raw) => raw.trim().parse().map_err(|e| invalid(var, raw.clone(), e)),
        None => Ok(default),
    }
}
