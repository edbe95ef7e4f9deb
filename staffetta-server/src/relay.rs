//! Relay interno tra front end HTTP e storage.
//!
//! Protocollo: TCP in chiaro, una connessione = un messaggio JSON
//! `{"username": .., "message": ..}`, nessun framing oltre alla chiusura della connessione
//! e nessuna risposta. Il listener legge fino a EOF o fino al limite di byte, decodifica,
//! assegna la data di ricezione e inserisce nello store. Ogni errore viene loggato e
//! la connessione abbandonata: il loop di accept non si ferma mai.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use staffetta_core::{new_connection_id, now_timestamp, DecodeError, Message, RelayEnvelope};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::Instrument;

use crate::config::RelaySettings;
use crate::storage::MessageStore;

/// Pausa dopo un accept fallito (es. file descriptor esauriti), evita un loop caldo.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(50);

#[derive(Debug, Error)]
pub enum RelayError {
    /// Fatale, solo all'avvio.
    #[error("failed to bind relay listener on {addr}: {source}")]
    Bind { addr: SocketAddr, source: io::Error },

    #[error("failed to decode relay payload: {0}")]
    Decode(#[from] DecodeError),

    #[error("failed to encode relay envelope: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("relay at {addr} is unavailable: {source}")]
    Unavailable { addr: SocketAddr, source: io::Error },

    #[error("failed to format receive timestamp: {0}")]
    Timestamp(#[from] time::error::Format),

    #[error("failed to store message: {0:#}")]
    Storage(anyhow::Error),
}

pub struct RelayListener {
    listener: TcpListener,
    store: Arc<dyn MessageStore>,
    settings: RelaySettings,
}

impl RelayListener {
    /// Lega il listener all'indirizzo. Un errore qui deve interrompere l'avvio del processo.
    pub async fn bind(
        addr: SocketAddr,
        store: Arc<dyn MessageStore>,
        settings: RelaySettings,
    ) -> Result<Self, RelayError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| RelayError::Bind { addr, source })?;
        Ok(Self {
            listener,
            store,
            settings,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Loop di accept. Non ritorna: ogni connessione viene gestita in un task separato.
    pub async fn run(self) {
        match self.listener.local_addr() {
            Ok(addr) => tracing::info!("Relay listener listening on {}", addr),
            Err(e) => tracing::warn!("relay listener started, local address unknown: {}", e),
        }
        loop {
            match self.listener.accept().await {
                Ok((stream, peer)) => {
                    let span = tracing::info_span!("relay_conn", conn_id = %new_connection_id(), %peer);
                    let store = Arc::clone(&self.store);
                    let settings = self.settings.clone();
                    tokio::spawn(handle_connection(stream, store, settings).instrument(span));
                }
                Err(e) => {
                    tracing::warn!("relay accept failed: {}", e);
                    tokio::time::sleep(ACCEPT_BACKOFF).await;
                }
            }
        }
    }
}

/// Gestisce una connessione: lettura, decodifica, timestamp, insert.
/// Lo stream è posseduto dalla funzione e viene chiuso all'uscita, qualunque sia l'esito.
async fn handle_connection(mut stream: TcpStream, store: Arc<dyn MessageStore>, settings: RelaySettings) {
    tracing::info!("connection accepted");

    let payload = match read_payload(&mut stream, &settings).await {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!("error reading relay payload: {}", e);
            return;
        }
    };

    match process_payload(&payload, store.as_ref()).await {
        Ok(Some(message)) => tracing::info!(
            username = %message.author,
            date = %message.received_at,
            "saved message"
        ),
        Ok(None) => tracing::debug!("empty payload, nothing to store"),
        Err(e @ RelayError::Storage(_)) => tracing::error!("{}", e),
        Err(e) => tracing::warn!(bytes = payload.len(), "{}", e),
    }
}

/// Legge fino a EOF o fino a `max_payload` byte: quello che eccede viene troncato, non rifiutato.
/// Se scade il timeout si usa quanto letto fino a quel momento.
pub async fn read_payload<R>(reader: &mut R, settings: &RelaySettings) -> io::Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::with_capacity(settings.max_payload.min(64 * 1024));
    let mut limited = reader.take(settings.max_payload as u64);
    let read = tokio::time::timeout(settings.read_timeout, limited.read_to_end(&mut buf)).await;
    match read {
        Ok(res) => {
            res?;
        }
        Err(_) => tracing::warn!(bytes = buf.len(), "relay read timed out, using partial payload"),
    }
    Ok(buf)
}

/// Decodifica il payload, gli assegna la data di ricezione e lo inserisce nello store.
/// `Ok(None)` per un payload vuoto, che viene ignorato senza errori.
pub async fn process_payload(payload: &[u8], store: &dyn MessageStore) -> Result<Option<Message>, RelayError> {
    if payload.is_empty() {
        return Ok(None);
    }
    let envelope = RelayEnvelope::decode(payload)?;
    let message = Message::stamp(envelope, now_timestamp()?);
    store.insert(&message).await.map_err(RelayError::Storage)?;
    Ok(Some(message))
}

/// Lato front end: apre una connessione verso il relay, scrive l'envelope e chiude.
/// Fire-and-forget: non si legge nessuna risposta.
pub async fn send(target: SocketAddr, envelope: &RelayEnvelope, connect_timeout: Duration) -> Result<(), RelayError> {
    let unavailable = |source| RelayError::Unavailable { addr: target, source };

    let bytes = envelope.encode()?;
    let mut stream = match tokio::time::timeout(connect_timeout, TcpStream::connect(target)).await {
        Ok(res) => res.map_err(unavailable)?,
        Err(_) => {
            return Err(unavailable(io::Error::new(io::ErrorKind::TimedOut, "connect timed out")));
        }
    };
    stream.write_all(&bytes).await.map_err(unavailable)?;
    stream.shutdown().await.map_err(unavailable)?;
    Ok(())
}
