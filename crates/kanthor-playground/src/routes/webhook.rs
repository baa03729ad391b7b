//! `POST /app/{id}` -- receive a signed delivery for an application.

use std::time::Duration;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use serde_json::{Value, json};
use tracing::{info, warn};

use kanthor_playground_core::{MessageRecord, keys};

use super::{AppState, header_values};
use crate::error::{ApiError, PlaygroundError};
use crate::sdk::webhook::HEADER_WEBHOOK_ID;
use crate::sdk::{Endpoint, WebhookError, WebhookVerifier};

/// How long a received message stays visible.
pub const MESSAGE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

pub async fn receive(
    Path(app_id): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let record = accept(&state, &app_id, &headers, &body)
        .await
        .inspect_err(|e| warn!(app_id = %app_id, error = %e, "Rejected webhook"))?;

    info!(app_id = %app_id, msg_id = %record.id, "Received webhook");
    Ok(Json(json!({
        "msg_id": record.id,
        "timestamp": record.timestamp,
    })))
}

async fn accept(
    state: &AppState,
    app_id: &str,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<MessageRecord, PlaygroundError> {
    let endpoint: Endpoint = state.store.get(&keys::endpoint(app_id)).await?;

    let msg_id = headers
        .get(HEADER_WEBHOOK_ID)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .ok_or(WebhookError::MissingHeader(HEADER_WEBHOOK_ID))?;

    let clock = state.clock();
    WebhookVerifier::new(&endpoint.secret_key)?.verify(body, headers, clock.unix_millis())?;

    let record = MessageRecord {
        id: msg_id.to_string(),
        timestamp: clock.rfc3339_nanos(),
        headers: header_values(headers),
        body: String::from_utf8_lossy(body).into_owned(),
    };
    state
        .store
        .set_expire(&keys::message(app_id, msg_id), &record, MESSAGE_TTL)
        .await?;
    Ok(record)
}
