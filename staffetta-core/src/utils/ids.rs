use uuid::Uuid;

/// Genera un id (UUIDv4) per correlare i log di una singola connessione del relay.
pub fn new_connection_id() -> String {
    Uuid::new_v4().to_string()
}
