use serde::{Deserialize, Serialize};

use crate::protocol::relay::RelayEnvelope;

/// Documento persistito dal relay: `{ username, message, date }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "username")]
    pub author: String,
    #[serde(rename = "message")]
    pub body: String,
    /// Assegnato dal relay quando decodifica il payload, mai dal client.
    #[serde(rename = "date")]
    pub received_at: String, // "YYYY-MM-DD HH:MM:SS.ffffff" UTC
}

impl Message {
    /// Completa un envelope appena decodificato con il timestamp di ricezione.
    /// L'envelope non ha un campo data, quindi quello che arriva dal client non può sopravvivere.
    pub fn stamp(envelope: RelayEnvelope, received_at: String) -> Self {
        Self {
            author: envelope.author,
            body: envelope.body,
            received_at,
        }
    }
}
