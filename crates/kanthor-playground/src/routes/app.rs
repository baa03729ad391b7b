//! Application pages.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Html;
use uuid::Uuid;

use kanthor_playground_core::{MessageRecord, RecordStore, StoreError, keys};

use super::AppState;
use super::bootstrap::MESSAGE_TYPE;
use crate::error::{PageError, PlaygroundError};
use crate::views::{self, AppView};

/// `GET /app/{id}`
pub async fn detail(
    Path(app_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Html<String>, PageError> {
    let Some(sdk) = state.registry.get(&app_id).await else {
        return Err(PageError::client(
            StatusCode::NOT_FOUND,
            "App does not have any associated SDK",
        ));
    };

    let deadline = state.config.bootstrap_timeout;
    let app = match tokio::time::timeout(deadline, sdk.get_application(&app_id)).await {
        Ok(Ok(app)) => app,
        Ok(Err(e)) => return Err(PageError::client(StatusCode::BAD_GATEWAY, e.to_string())),
        Err(_) => {
            return Err(PageError::client(
                StatusCode::GATEWAY_TIMEOUT,
                PlaygroundError::Timeout(deadline).to_string(),
            ));
        }
    };

    let messages = list_messages(&state.store, &app_id).await?;
    let timestamp = state.clock().rfc3339_nanos();
    let idempotency_key = Uuid::new_v4().to_string();
    let view = AppView {
        app: &app,
        sdk_endpoint: state
            .config
            .sdk_endpoint_public
            .as_deref()
            .unwrap_or_else(|| sdk.api_url()),
        authorization: sdk.authorization(),
        timestamp: &timestamp,
        message_type: MESSAGE_TYPE,
        idempotency_key: &idempotency_key,
        messages: &messages,
    };
    Ok(Html(views::app_page(&view)))
}

/// `GET /app/{id}/message` -- the message list fragment.
pub async fn messages(
    Path(app_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Html<String>, PageError> {
    let messages = list_messages(&state.store, &app_id).await?;
    Ok(Html(views::messages_fragment(&messages)))
}

/// `GET /app/{id}/message/count`
pub async fn message_count(
    Path(app_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Html<String>, PageError> {
    let messages = list_messages(&state.store, &app_id).await?;
    Ok(Html(views::message_count_fragment(messages.len())))
}

/// Live messages of an application, newest first.
async fn list_messages(
    store: &RecordStore,
    app_id: &str,
) -> Result<Vec<MessageRecord>, StoreError> {
    store.list_decoded(&keys::messages_pattern(app_id)).await
}
