//! `GET /` -- provision a fresh application wired back to this server.
//!
//! Each visit creates a workspace through the portal, then an application,
//! an endpoint pointing at `/app/{id}` on this server and a rule routing
//! every message of the application to it. A sample message is sent last so
//! the new page has something to show.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use reqwest::Url;
use thiserror::Error;
use tracing::{error, info};

use kanthor_playground_core::{Credentials, keys};

use super::AppState;
use crate::error::{PageError, PlaygroundError};
use crate::sdk::routing::{CONDITION_SOURCE_APP_ID, match_equal};
use crate::sdk::{
    ApplicationCreateReq, EndpointCreateReq, EndpointRuleCreateReq, KanthorClient,
    MessageCreateReq,
};

/// Message type used for every message the playground sends.
pub const MESSAGE_TYPE: &str = "testing.playground";

const RULE_PRIORITY: i32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapStep {
    ProvisionWorkspace,
    InitSdk,
    CreateApplication,
    CreateEndpoint,
    CreateRoutingRule,
    PersistEndpoint,
    PersistCredentials,
    SendSampleMessage,
}

impl fmt::Display for BootstrapStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ProvisionWorkspace => "provision workspace",
            Self::InitSdk => "initialize sdk",
            Self::CreateApplication => "create application",
            Self::CreateEndpoint => "create endpoint",
            Self::CreateRoutingRule => "create routing rule",
            Self::PersistEndpoint => "persist endpoint",
            Self::PersistCredentials => "persist credentials",
            Self::SendSampleMessage => "send sample message",
        };
        f.write_str(name)
    }
}

/// A provisioning failure and the step it happened in.
#[derive(Debug, Error)]
#[error("{step}: {source}")]
pub struct BootstrapError {
    pub step: BootstrapStep,
    #[source]
    pub source: PlaygroundError,
}

fn at<T, E: Into<PlaygroundError>>(
    step: BootstrapStep,
    result: Result<T, E>,
) -> Result<T, BootstrapError> {
    result.map_err(|e| BootstrapError {
        step,
        source: e.into(),
    })
}

pub async fn bootstrap(State(state): State<AppState>) -> Response {
    let deadline = state.config.bootstrap_timeout;
    match tokio::time::timeout(deadline, provision_app(&state)).await {
        Ok(Ok(app_id)) => {
            (StatusCode::FOUND, [(header::LOCATION, format!("/app/{app_id}"))]).into_response()
        }
        Ok(Err(e)) => {
            error!(step = %e.step, error = %e.source, "Bootstrap failed");
            PageError::server(e.to_string()).into_response()
        }
        Err(_) => {
            error!(?deadline, "Bootstrap timed out");
            PageError::server(PlaygroundError::Timeout(deadline).to_string()).into_response()
        }
    }
}

/// Run every provisioning step and return the new application id.
pub async fn provision_app(state: &AppState) -> Result<String, BootstrapError> {
    let clock = state.clock();
    let credentials = at(BootstrapStep::ProvisionWorkspace, state.portal.provision().await)?;
    let sdk = Arc::new(at(
        BootstrapStep::InitSdk,
        KanthorClient::new(
            &credentials.user,
            &credentials.password,
            state.config.sdk_host.as_deref(),
        ),
    )?);

    let app = at(
        BootstrapStep::CreateApplication,
        sdk.create_application(&ApplicationCreateReq {
            name: format!("playground at {}", clock.now_utc().to_rfc3339()),
        })
        .await,
    )?;

    let target = at(
        BootstrapStep::CreateEndpoint,
        webhook_target(&state.config.playground_endpoint, &app.id),
    )?;
    let endpoint = at(
        BootstrapStep::CreateEndpoint,
        sdk.create_endpoint(&EndpointCreateReq {
            app_id: app.id.clone(),
            name: format!("POST {target}"),
            method: "POST".to_string(),
            uri: target.to_string(),
        })
        .await,
    )?;

    let rule = at(
        BootstrapStep::CreateRoutingRule,
        sdk.create_endpoint_rule(&EndpointRuleCreateReq {
            ep_id: endpoint.id.clone(),
            name: format!("passthrough all messages from the app_id:{}", app.id),
            priority: RULE_PRIORITY,
            exclusionary: false,
            condition_source: CONDITION_SOURCE_APP_ID.to_string(),
            condition_expression: match_equal(&app.id),
        })
        .await,
    )?;

    at(
        BootstrapStep::PersistEndpoint,
        state.store.set(&keys::endpoint(&app.id), &endpoint).await,
    )?;

    state.registry.insert(app.id.clone(), Arc::clone(&sdk)).await;
    let stored = Credentials {
        app_id: app.id.clone(),
        user: credentials.user,
        password: credentials.password,
    };
    at(
        BootstrapStep::PersistCredentials,
        state.store.set(&keys::credentials(&app.id), &stored).await,
    )?;

    let message = at(
        BootstrapStep::SendSampleMessage,
        sdk.create_message(&MessageCreateReq {
            app_id: app.id.clone(),
            kind: MESSAGE_TYPE.to_string(),
            body: serde_json::json!({ "ping": clock.unix_millis() }),
            headers: BTreeMap::from([(
                "X-Powered-By".to_string(),
                "Kanthor SDK".to_string(),
            )]),
        })
        .await,
    )?;

    info!(
        app_id = %app.id,
        ep_id = %endpoint.id,
        rule_id = %rule.id,
        msg_id = %message.id,
        "Provisioned playground application"
    );
    Ok(app.id)
}

/// The endpoint URI for an application: the configured base with its path
/// replaced by `/app/{app_id}`.
fn webhook_target(base: &str, app_id: &str) -> Result<Url, PlaygroundError> {
    let mut url = Url::parse(base).map_err(|e| PlaygroundError::Endpoint(format!("{base}: {e}")))?;
    url.set_path(&format!("/app/{app_id}"));
    Ok(url)
}
