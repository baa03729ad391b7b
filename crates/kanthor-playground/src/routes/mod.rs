//! HTTP routes.
//!
//! - `GET /readiness`, `GET /liveness`: health probes
//! - `GET /`: provision a new playground application
//! - `GET /app/{id}`, `/app/{id}/message`, `/app/{id}/message/count`: views
//! - `POST /app/{id}`: webhook receiver
//! - `GET|POST|PATCH|PUT /printout`: generic request capture
//! - `GET /assets/*`: static files

pub mod app;
pub mod bootstrap;
pub mod health;
pub mod printout;
pub mod webhook;

use std::sync::Arc;

use axum::Router;
use axum::http::HeaderMap;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use kanthor_playground_core::models::HeaderValues;
use kanthor_playground_core::{Clock, RecordStore};

use crate::config::PlaygroundConfig;
use crate::portal::{PortalClient, PortalConfig, PortalError};
use crate::registry::ClientRegistry;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<PlaygroundConfig>,
    pub store: RecordStore,
    pub registry: ClientRegistry,
    pub portal: Arc<PortalClient>,
}

impl AppState {
    /// Wire the state together; the portal client shares the store's clock.
    pub fn new(
        config: PlaygroundConfig,
        store: RecordStore,
        registry: ClientRegistry,
    ) -> Result<Self, PortalError> {
        let portal = PortalClient::new(
            PortalConfig::new(&config.portal_endpoint, &config.portal_auth_credentials),
            Arc::clone(store.clock()),
        )?;
        Ok(Self {
            config: Arc::new(config),
            store,
            registry,
            portal: Arc::new(portal),
        })
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        self.store.clock()
    }
}

pub fn build_router(state: AppState) -> Router {
    let printout = get(printout::printout)
        .post(printout::printout)
        .patch(printout::printout)
        .put(printout::printout)
        .layer(CorsLayer::permissive());

    Router::new()
        .route("/readiness", get(health::readiness))
        .route("/liveness", get(health::liveness))
        .route("/", get(bootstrap::bootstrap))
        .route("/app/{id}", get(app::detail).post(webhook::receive))
        .route("/app/{id}/message", get(app::messages))
        .route("/app/{id}/message/count", get(app::message_count))
        .route("/printout", printout)
        .nest_service("/assets", ServeDir::new(&state.config.assets_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Request headers grouped by name, values decoded lossily.
pub(crate) fn header_values(headers: &HeaderMap) -> HeaderValues {
    let mut out = HeaderValues::new();
    for (name, value) in headers {
        out.entry(name.as_str().to_string())
            .or_default()
            .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
    }
    out
}
