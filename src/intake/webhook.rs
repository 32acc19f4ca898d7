//! Marketplace-B webhook adapter (§4.1, §6): a single axum endpoint that
//! validates payload shape syntactically, enqueues, and returns 2xx
//! immediately. Duplicate deliveries are accepted — downstream is idempotent
//! on (seller, sku).

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use tokio::sync::mpsc;

use crate::model::Source;

use super::{AckHandle, RawEvent};

#[derive(Clone)]
pub struct WebhookState {
    pub tx: mpsc::Sender<RawEvent>,
    pub shared_secret: Option<String>,
}

const SECRET_HEADER: &str = "x-repricer-webhook-secret";

pub async fn handle_webhook(
    State(state): State<WebhookState>,
    headers: HeaderMap,
    body: String,
) -> StatusCode {
    if let Some(expected) = &state.shared_secret {
        let provided = headers
            .get(SECRET_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        if provided != expected {
            return StatusCode::UNAUTHORIZED;
        }
    }

    if serde_json::from_str::<serde_json::Value>(&body).is_err() {
        return StatusCode::BAD_REQUEST;
    }

    let event = RawEvent {
        source: Source::B,
        payload: body,
        ack: AckHandle::Webhook,
    };

    match state.tx.try_send(event) {
        Ok(()) => StatusCode::ACCEPTED,
        Err(mpsc::error::TrySendError::Full(_)) => StatusCode::SERVICE_UNAVAILABLE,
        Err(mpsc::error::TrySendError::Closed(_)) => StatusCode::SERVICE_UNAVAILABLE,
    }
}
