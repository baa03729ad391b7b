//! `/printout` -- capture arbitrary requests and list them back.

use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use tracing::{debug, error};
use uuid::Uuid;

use kanthor_playground_core::{PrintoutRecord, keys};

use super::{AppState, header_values};
use crate::error::PageError;
use crate::views;

/// How long a captured request stays visible.
pub const PRINTOUT_TTL: Duration = Duration::from_secs(60 * 60);

pub async fn printout(
    method: Method,
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if matches!(method, Method::POST | Method::PATCH | Method::PUT) {
        return capture(&state, method, &headers, &body).await;
    }

    match state
        .store
        .list_decoded::<PrintoutRecord>(keys::PRINTOUT_PATTERN)
        .await
    {
        Ok(items) => Html(views::printout_page(&items)).into_response(),
        Err(e) => PageError::from(e).into_response(),
    }
}

async fn capture(state: &AppState, method: Method, headers: &HeaderMap, body: &[u8]) -> Response {
    let clock = state.clock();
    let id = keys::printout_id(clock.unix_nanos(), &Uuid::new_v4().simple().to_string());
    let record = PrintoutRecord {
        method: method.to_string(),
        headers: header_values(headers),
        body: String::from_utf8_lossy(body).into_owned(),
        timestamp: clock.rfc3339_nanos(),
    };

    match state
        .store
        .set_expire(&keys::printout(&id), &record, PRINTOUT_TTL)
        .await
    {
        Ok(()) => {
            debug!(id = %id, method = %record.method, "Captured printout");
            StatusCode::CREATED.into_response()
        }
        Err(e) => {
            error!(error = %e, "Could not store printout");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
