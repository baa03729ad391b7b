//! Workspace provisioning through the Kanthor portal.
//!
//! Each playground session gets a brand-new workspace plus a credential pair
//! scoped to it. Requests time out after 15 s and are retried only when the
//! portal answers with a server error; every logical request carries its own
//! idempotency key, reused across its retries.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use kanthor_playground_core::Clock;

pub const HEADER_IDEMPOTENCY_KEY: &str = "idempotency-key";
pub const HEADER_WORKSPACE: &str = "x-authorization-workspace";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);
const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_RETRY_WAIT: Duration = Duration::from_millis(100);
const MAX_RETRY_WAIT: Duration = Duration::from_secs(2);
const CREDENTIALS_LIFETIME: Duration = Duration::from_secs(365 * 24 * 60 * 60);

#[derive(Debug, Error)]
pub enum PortalError {
    #[error("Portal request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Portal API error ({status}): {message}")]
    Api { status: u16, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Workspace {
    pub id: String,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
    #[serde(default)]
    pub owner_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub tier: String,
}

/// Credential pair scoped to one workspace.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorkspaceCredentials {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub user: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
struct WorkspaceCreateReq<'a> {
    name: &'a str,
}

#[derive(Debug, Serialize)]
struct CredentialsCreateReq<'a> {
    name: &'a str,
    expired_at: i64,
}

/// Connection settings for the portal.
#[derive(Debug, Clone)]
pub struct PortalConfig {
    /// Base URL, e.g. `https://portal.kanthorlabs.com/api`.
    pub endpoint: String,
    /// Pre-encoded basic-auth token.
    pub auth_credentials: String,
    pub timeout: Duration,
    /// Retries after the first attempt, for 5xx responses only.
    pub max_retries: u32,
    /// Wait before the first retry; doubles per retry up to 2 s.
    pub retry_wait: Duration,
}

impl PortalConfig {
    pub fn new(endpoint: impl Into<String>, auth_credentials: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            auth_credentials: auth_credentials.into(),
            timeout: DEFAULT_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_wait: DEFAULT_RETRY_WAIT,
        }
    }
}

#[derive(Debug)]
pub struct PortalClient {
    http: reqwest::Client,
    config: PortalConfig,
    clock: Arc<dyn Clock>,
}

impl PortalClient {
    pub fn new(config: PortalConfig, clock: Arc<dyn Clock>) -> Result<Self, PortalError> {
        let _ = rustls::crypto::ring::default_provider().install_default();
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http,
            config,
            clock,
        })
    }

    /// Create a workspace, then credentials scoped to it.
    ///
    /// A failure in the second step leaves the workspace behind.
    pub async fn provision(&self) -> Result<WorkspaceCredentials, PortalError> {
        let name = format!("playground at {}", self.clock.now_utc().to_rfc3339());

        let workspace: Workspace = self
            .post("/workspace", &WorkspaceCreateReq { name: &name }, None)
            .await?;
        info!(workspace_id = %workspace.id, "Workspace created");

        let expired_at = self
            .clock
            .unix_millis()
            .saturating_add(kanthor_playground_core::clock::duration_millis(CREDENTIALS_LIFETIME));
        let credentials: WorkspaceCredentials = self
            .post(
                "/credentials",
                &CredentialsCreateReq {
                    name: &name,
                    expired_at,
                },
                Some(&workspace.id),
            )
            .await?;
        info!(workspace_id = %workspace.id, user = %credentials.user, "Workspace credentials created");

        Ok(credentials)
    }

    async fn post<B: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        workspace_id: Option<&str>,
    ) -> Result<R, PortalError> {
        let url = format!("{}{}", self.config.endpoint.trim_end_matches('/'), path);
        let idempotency_key = Uuid::new_v4().to_string();
        let mut wait = self.config.retry_wait;
        let mut attempt: u32 = 0;

        loop {
            let mut request = self
                .http
                .post(&url)
                .header(AUTHORIZATION, format!("Basic {}", self.config.auth_credentials))
                .header(HEADER_IDEMPOTENCY_KEY, &idempotency_key)
                .json(body);
            if let Some(ws) = workspace_id {
                request = request.header(HEADER_WORKSPACE, ws);
            }

            let resp = request.send().await?;
            let status = resp.status();

            if status.is_server_error() && attempt < self.config.max_retries {
                attempt += 1;
                warn!(
                    url = %url,
                    status = status.as_u16(),
                    attempt,
                    "Portal returned server error, retrying"
                );
                tokio::time::sleep(wait).await;
                wait = (wait * 2).min(MAX_RETRY_WAIT);
                continue;
            }

            if !status.is_success() {
                let message = resp.text().await.unwrap_or_default();
                return Err(PortalError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            return Ok(resp.json().await?);
        }
    }
}
