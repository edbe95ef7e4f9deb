//! Avvio del processo: relay listener e server HTTP girano in parallelo per tutta la vita del processo.

use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;

use crate::{config::Config, relay::RelayListener, routes, storage::MessageStore, AppState};

/// Processo con entrambi i socket già legati, pronto a partire.
pub struct App {
    relay: RelayListener,
    http: TcpListener,
    router: Router,
}

impl App {
    /// Lega prima il relay e poi l'HTTP: se uno dei due bind fallisce l'avvio fallisce.
    pub async fn bind(config: &Config, store: Arc<dyn MessageStore>) -> anyhow::Result<Self> {
        let relay = RelayListener::bind(config.relay_addr, Arc::clone(&store), config.relay.clone())
            .await
            .context("start relay listener")?;
        let relay_target = match config.relay_target {
            Some(target) => target,
            None => default_relay_target(relay.local_addr().context("read relay listener address")?),
        };

        let http = TcpListener::bind(config.http_addr)
            .await
            .with_context(|| format!("bind http listener on {}", config.http_addr))?;

        let state = Arc::new(AppState {
            relay_target,
            connect_timeout: config.connect_timeout,
            store,
        });
        Ok(Self {
            relay,
            http,
            router: routes::router(state),
        })
    }

    pub fn relay_addr(&self) -> io::Result<SocketAddr> {
        self.relay.local_addr()
    }

    pub fn http_addr(&self) -> io::Result<SocketAddr> {
        self.http.local_addr()
    }

    /// Il relay gira su un task tokio separato, il server HTTP sul task chiamante.
    /// Ritorna solo se il server HTTP si ferma.
    pub async fn run(self) -> anyhow::Result<()> {
        let relay_task = tokio::spawn(self.relay.run());

        let addr = self.http.local_addr().context("read http listener address")?;
        tracing::info!("HTTP server running on http://{}", addr);
        let served = axum::serve(self.http, self.router.into_make_service())
            .await
            .context("server shutdown");

        relay_task.abort();
        served
    }
}

/// Target del front end quando RELAY_TARGET non è impostato: l'indirizzo a cui il relay è legato,
/// oppure il loopback della stessa famiglia se il relay ascolta su tutte le interfacce.
pub fn default_relay_target(bound: SocketAddr) -> SocketAddr {
    let ip = match bound.ip() {
        IpAddr::V4(ip) if ip.is_unspecified() => IpAddr::V4(Ipv4Addr::LOCALHOST),
        IpAddr::V6(ip) if ip.is_unspecified() => IpAddr::V6(Ipv6Addr::LOCALHOST),
        ip => ip,
    };
    SocketAddr::new(ip, bound.port())
}
