//! HTTP handlers for the Chatwoot webhook, the operator copilot and health checks.

use std::sync::Arc;

use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::mediator::{Mediator, TaskExecutor};

use super::payload::InboundEvent;

/// Shared state for the HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub mediator: Arc<Mediator>,
    /// Runs mediations after the webhook has been acknowledged.
    pub executor: Arc<dyn TaskExecutor>,
}

impl AppState {
    pub fn new(mediator: Arc<Mediator>, executor: Arc<dyn TaskExecutor>) -> Self {
        Self { mediator, executor }
    }
}

#[derive(Debug, Serialize)]
struct StatusResponse {
    status: &'static str,
}

const OK: StatusResponse = StatusResponse { status: "ok" };

#[derive(Debug, Deserialize)]
struct CopilotRequest {
    message: String,
}

#[derive(Debug, Serialize)]
struct CopilotResponse {
    suggestion: String,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/chatwoot/webhook", post(webhook))
        .route("/chatwoot/copilot", post(copilot))
        .route("/health", get(health))
        .with_state(state)
}

async fn health() -> Json<StatusResponse> {
    Json(OK)
}

/// Always acknowledges; mediation happens on the executor.
async fn webhook(State(state): State<AppState>, body: Bytes) -> Json<StatusResponse> {
    let value: Value = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(e) => {
            warn!("Chatwoot webhook: invalid JSON body: {e}");
            return Json(OK);
        }
    };

    let event = match InboundEvent::from_value(value) {
        Ok(event) => event,
        Err(e) => {
            warn!("Chatwoot webhook: unexpected payload shape: {e}");
            return Json(OK);
        }
    };

    info!(
        "Chatwoot webhook: event={} message_type={} conversation_id={:?}",
        event.event_kind(),
        event.message_kind(),
        event.conversation_id()
    );
    debug!("Chatwoot webhook content length: {}", event.raw_content().len());

    state.mediator.dispatch(state.executor.as_ref(), event);
    Json(OK)
}

/// Suggestion for an operator; nothing is posted to Chatwoot.
async fn copilot(
    State(state): State<AppState>,
    Json(request): Json<CopilotRequest>,
) -> Result<Json<CopilotResponse>, (StatusCode, Json<ErrorResponse>)> {
    if request.message.trim().is_empty() {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorResponse {
                error: "message must not be empty".to_string(),
            }),
        ));
    }

    match state.mediator.suggest(&request.message).await {
        Ok(suggestion) => Ok(Json(CopilotResponse { suggestion })),
        Err(e) => {
            error!("Copilot suggestion failed: {e}");
            Err((
                StatusCode::BAD_GATEWAY,
                Json(ErrorResponse {
                    error: e.user_message(),
                }),
            ))
        }
    }
}
