//! staffetta-core: tipi condivisi tra front end HTTP e relay listener
//! (envelope sul filo, documento persistito, DTO del form, errori di decodifica).
//! Niente I/O qui dentro: solo serde e funzioni pure.

pub mod models;
pub mod protocol;
pub mod error;
pub mod utils;

// Re-export utili per ridurre i percorsi nel crate server
pub use error::DecodeError;
pub use models::message::Message;
pub use protocol::http::SubmitForm;
pub use protocol::relay::RelayEnvelope;
pub use utils::{format_timestamp, new_connection_id, now_timestamp};
