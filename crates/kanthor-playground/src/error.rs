//! Error types for the playground server and their HTTP renderings.

use std::backtrace::Backtrace;
use std::time::Duration;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use thiserror::Error;

use kanthor_playground_core::StoreError;

use crate::portal::PortalError;
use crate::sdk::{SdkError, WebhookError};
use crate::views;

#[derive(Debug, Error)]
pub enum PlaygroundError {
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Sdk(#[from] SdkError),

    #[error(transparent)]
    Portal(#[from] PortalError),

    #[error(transparent)]
    Webhook(#[from] WebhookError),

    #[error("Invalid playground endpoint: {0}")]
    Endpoint(String),

    #[error("Deadline exceeded after {0:?}")]
    Timeout(Duration),
}

/// Server-rendered error page.
#[derive(Debug)]
pub struct PageError {
    pub status: StatusCode,
    pub message: String,
    pub backtrace: Option<String>,
}

impl PageError {
    /// A client-facing page without a backtrace.
    pub fn client(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            backtrace: None,
        }
    }

    /// A server failure page carrying a backtrace captured here.
    pub fn server(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
            backtrace: Some(Backtrace::force_capture().to_string()),
        }
    }
}

impl From<StoreError> for PageError {
    fn from(e: StoreError) -> Self {
        Self::server(e.to_string())
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let page = views::error_page(self.status, &self.message, self.backtrace.as_deref());
        (self.status, Html(page)).into_response()
    }
}

/// JSON error body for API-style routes: `{"error": "..."}`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl From<PlaygroundError> for ApiError {
    fn from(e: PlaygroundError) -> Self {
        match e {
            PlaygroundError::Webhook(WebhookError::InvalidSecret) => {
                Self::internal(WebhookError::InvalidSecret.to_string())
            }
            PlaygroundError::Webhook(e) => Self::bad_request(e.to_string()),
            other => Self::internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}
