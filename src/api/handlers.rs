//! HTTP request handlers

use super::AppState;
use crate::action::{ChatScope, RawCardAction};
use crate::dispatch::Outcome;
use crate::platform::ReplyContext;
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/webhook/card", post(card_callback))
        .route("/webhook/message", post(message_event))
        .route("/healthz", get(health))
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Card interaction payload, flattened by the edge gateway from the
/// platform's native callback shape.
#[derive(Debug, Deserialize)]
struct CardCallback {
    /// URL-verification handshake; echoed back verbatim when present.
    challenge: Option<String>,
    #[serde(default)]
    action: CardActionPayload,
}

#[derive(Debug, Default, Deserialize)]
struct CardActionPayload {
    #[serde(default)]
    value: Value,
    option: Option<String>,
}

async fn card_callback(
    State(state): State<AppState>,
    Json(callback): Json<CardCallback>,
) -> Json<Value> {
    if let Some(challenge) = callback.challenge {
        return Json(json!({ "challenge": challenge }));
    }

    let raw = RawCardAction {
        value: callback.action.value,
        option: callback.action.option,
    };
    match state.dispatcher.handle_card_action(&raw).await {
        Ok(Outcome::Handled(Some(card))) => Json(card),
        Ok(Outcome::Handled(None)) => Json(json!({})),
        Ok(Outcome::PassToNext) => {
            // End of the chain in this deployment; acknowledge and move on.
            info!("card action not claimed by any handler");
            Json(json!({}))
        }
        Err(e) => {
            // The platform retries non-2xx responses, so a failed reply is
            // logged rather than reported.
            error!(error = %e, "card reply delivery failed");
            Json(json!({}))
        }
    }
}

/// Message event payload, flattened by the edge gateway.
#[derive(Debug, Deserialize)]
struct MessageEvent {
    challenge: Option<String>,
    #[serde(default)]
    session_id: String,
    #[serde(default)]
    message_id: String,
    chat_type: Option<String>,
    #[serde(default)]
    text: String,
}

async fn message_event(
    State(state): State<AppState>,
    Json(event): Json<MessageEvent>,
) -> Json<Value> {
    if let Some(challenge) = event.challenge {
        return Json(json!({ "challenge": challenge }));
    }

    let scope = match event.chat_type.as_deref() {
        Some("group") => ChatScope::Group,
        _ => ChatScope::Direct,
    };
    let ctx = ReplyContext::new(&event.session_id, &event.message_id).with_scope(scope);

    if let Err(e) = state.dispatcher.handle_message(&event.text, &ctx).await {
        error!(session_key = %event.session_id, error = %e, "message handling failed");
    }
    Json(json!({}))
}
