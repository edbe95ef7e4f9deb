/* This file defines what travels on the internal TCP connection between the HTTP front end and the relay listener.
    One connection carries exactly one envelope, there is no length framing: the sender writes the JSON and closes,
    the listener reads until EOF (or until its byte cap) and never answers.
    On the wire the fields keep the form names (username / message); they become author / body only once decoded.
*/
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{error::DecodeError, protocol::http::SubmitForm};

/// Envelope del relay: `{"username": <string>, "message": <string>}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayEnvelope {
    /// Accetta anche `author` in ingresso.
    #[serde(rename = "username", alias = "author", default)]
    pub author: String,
    /// Accetta anche `body` in ingresso.
    #[serde(rename = "message", alias = "body", default)]
    pub body: String,
}

impl RelayEnvelope {
    pub fn new(author: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            body: body.into(),
        }
    }

    /// Serializza l'envelope nei byte da scrivere sul socket.
    pub fn encode(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    /// Decodifica un payload letto dal socket.
    /// Solo un oggetto JSON è un envelope: array e scalari sono errori anche se hanno la forma giusta.
    /// Campi mancanti => stringa vuota, campi sconosciuti (anche un eventuale `date`) ignorati.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let text = std::str::from_utf8(bytes)?;
        let object: Map<String, Value> = serde_json::from_str(text)?;
        Ok(serde_json::from_value(Value::Object(object))?)
    }
}

impl From<SubmitForm> for RelayEnvelope {
    fn from(form: SubmitForm) -> Self {
        Self {
            author: form.username,
            body: form.message,
        }
    }
}
