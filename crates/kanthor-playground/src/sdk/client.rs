//! Platform REST API client.
//!
//! Uses reqwest with the application's credentials baked into the default
//! `Authorization` header.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use super::types::{
    Application, ApplicationCreateReq, Endpoint, EndpointCreateReq, EndpointRule,
    EndpointRuleCreateReq, Message, MessageCreateReq,
};

/// Host used when no override is configured.
pub const DEFAULT_SDK_HOST: &str = "api.kanthorlabs.com";

/// Platform API client errors.
#[derive(Debug, Error)]
pub enum SdkError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Kanthor API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Client for one set of platform credentials.
#[derive(Debug)]
pub struct KanthorClient {
    http: reqwest::Client,
    api_url: String,
    authorization: String,
}

impl KanthorClient {
    /// Create a client authenticating as `user:password`.
    ///
    /// `host` overrides [`DEFAULT_SDK_HOST`]; a bare host is reached over
    /// https, a value with a scheme (`http://127.0.0.1:8080`) is used as is.
    pub fn new(user: &str, password: &str, host: Option<&str>) -> Result<Self, SdkError> {
        if user.is_empty() {
            return Err(SdkError::Config("user is empty".into()));
        }

        let authorization = format!("Basic {}", BASE64.encode(format!("{user}:{password}")));
        let mut headers = HeaderMap::new();
        let value = HeaderValue::from_str(&authorization)
            .map_err(|_| SdkError::Config("Invalid credentials format".into()))?;
        headers.insert(AUTHORIZATION, value);

        // reqwest is built with rustls-no-provider; `Err` means a provider is
        // already installed.
        let _ = rustls::crypto::ring::default_provider().install_default();

        let http = reqwest::Client::builder().default_headers(headers).build()?;

        Ok(Self {
            http,
            api_url: api_base_url(host.unwrap_or(DEFAULT_SDK_HOST)),
            authorization,
        })
    }

    /// Base URL of the API, e.g. `https://api.kanthorlabs.com/api`.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Value of the `Authorization` header this client sends.
    pub fn authorization(&self) -> &str {
        &self.authorization
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    /// Turn non-success responses into [`SdkError::Api`] carrying the body.
    async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, SdkError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        let message = if body.is_empty() {
            status.canonical_reason().unwrap_or("Unknown").to_string()
        } else {
            body
        };
        Err(SdkError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn post<B: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, SdkError> {
        debug!(path, "POST");
        let resp = self.http.post(self.url(path)).json(body).send().await?;
        Ok(Self::check_status(resp).await?.json().await?)
    }

    // =========================================================================
    // Applications
    // =========================================================================

    pub async fn create_application(
        &self,
        req: &ApplicationCreateReq,
    ) -> Result<Application, SdkError> {
        self.post("/application", req).await
    }

    pub async fn get_application(&self, app_id: &str) -> Result<Application, SdkError> {
        debug!(app_id, "GET application");
        let resp = self
            .http
            .get(self.url(&format!("/application/{app_id}")))
            .send()
            .await?;
        Ok(Self::check_status(resp).await?.json().await?)
    }

    // =========================================================================
    // Endpoints and routing
    // =========================================================================

    pub async fn create_endpoint(&self, req: &EndpointCreateReq) -> Result<Endpoint, SdkError> {
        self.post("/endpoint", req).await
    }

    pub async fn create_endpoint_rule(
        &self,
        req: &EndpointRuleCreateReq,
    ) -> Result<EndpointRule, SdkError> {
        self.post("/rule", req).await
    }

    // =========================================================================
    // Messages
    // =========================================================================

    pub async fn create_message(&self, req: &MessageCreateReq) -> Result<Message, SdkError> {
        self.post("/message", req).await
    }
}

fn api_base_url(host: &str) -> String {
    let host = host.trim_end_matches('/');
    if host.contains("://") {
        format!("{host}/api")
    } else {
        format!("https://{host}/api")
    }
}
