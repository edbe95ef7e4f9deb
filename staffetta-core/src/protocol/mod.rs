pub mod relay;
pub mod http;

// Re-export comodi
pub use relay::RelayEnvelope;
pub use http::SubmitForm;
