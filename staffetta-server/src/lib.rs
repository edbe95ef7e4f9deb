use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

pub mod config;
pub mod controllers;
pub mod relay;
pub mod routes;
pub mod storage;
pub mod supervisor;

pub use config::{Config, ConfigError, RelaySettings};
pub use relay::{RelayError, RelayListener};
pub use storage::{build_sqlite_url, connect_pool, health_with_pool, run_migrations, sqlite_url_for_path, MessageStore, SqliteStore};
pub use supervisor::App;

/// Stato condiviso dagli handler HTTP.
#[derive(Clone)]
pub struct AppState {
    /// Indirizzo del relay listener a cui inoltrare i messaggi.
    pub relay_target: SocketAddr,
    pub connect_timeout: Duration,
    /// Usato solo da /health: il front end non scrive mai direttamente nello store.
    pub store: Arc<dyn MessageStore>,
}
