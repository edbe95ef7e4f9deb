use axum::{body::Bytes, extract::Extension, http::{header, StatusCode}, response::IntoResponse};
use staffetta_core::{RelayEnvelope, SubmitForm};
use std::sync::Arc;
use url::form_urlencoded;

use crate::{relay, routes::HOME_PATH, AppState};

/// Handler per POST /message
pub async fn submit_message(
    Extension(state): Extension<Arc<AppState>>,
    body: Bytes,
) -> impl IntoResponse {
    let form = parse_submission(&body);
    let envelope = RelayEnvelope::from(form);

    /* Il relay è fire-and-forget: se non è raggiungibile logghiamo e basta,
       l'utente viene rediretto alla home in ogni caso. */
    if let Err(e) = relay::send(state.relay_target, &envelope, state.connect_timeout).await {
        tracing::warn!("error sending to relay: {}", e);
    }

    (StatusCode::FOUND, [(header::LOCATION, HOME_PATH)])
}

/// Decodifica un body `application/x-www-form-urlencoded`. Non fallisce mai:
/// coppie malformate vengono saltate e i campi mancanti restano vuoti.
pub fn parse_submission(body: &[u8]) -> SubmitForm {
    SubmitForm::from_pairs(form_urlencoded::parse(body))
}

/// Handler per GET /health
pub async fn health(Extension(state): Extension<Arc<AppState>>) -> StatusCode {
    if state.store.healthy().await {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// Qualsiasi percorso non registrato.
pub async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "not found")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_url_encoded_form() {
        let form = parse_submission(b"username=alice&message=hello+world%21");
        assert_eq!(form.username, "alice");
        assert_eq!(form.message, "hello world!");
    }

    #[test]
    fn missing_and_garbage_fields_default_to_empty() {
        assert_eq!(parse_submission(b""), SubmitForm::default());
        assert_eq!(parse_submission(b"&&=&junk"), SubmitForm::default());

        let form = parse_submission(b"message=solo");
        assert_eq!(form.username, "");
        assert_eq!(form.message, "solo");
    }

    #[test]
    fn values_are_not_trimmed() {
        let form = parse_submission(b"username=%20bob%20&message=%0Aline%0A");
        assert_eq!(form.username, " bob ");
        assert_eq!(form.message, "\nline\n");
    }
}
