use axum::{routing::{get, post}, Router, Extension};
use std::sync::Arc;

use crate::AppState;
use crate::controllers;

/// Endpoint del form di invio messaggio.
pub const MESSAGE_PATH: &str = "/message";
/// Destinazione del redirect dopo l'invio.
pub const HOME_PATH: &str = "/";

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(controllers::health))
        .route(MESSAGE_PATH, post(controllers::submit_message))
        .fallback(controllers::not_found)
        .layer(Extension(state))
}
