//! Shared harness: an in-memory store on a test clock, and one mock server
//! standing in for both the portal and the platform API.

#![allow(dead_code, clippy::unwrap_used)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use serde_json::json;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use kanthor_playground::config::PlaygroundConfig;
use kanthor_playground::registry::ClientRegistry;
use kanthor_playground::sdk::{KanthorClient, WebhookVerifier};
use kanthor_playground::{AppState, build_router};
use kanthor_playground_core::clock::TestClock;
use kanthor_playground_core::{Clock, RecordStore, keys};

pub const APP_ID: &str = "app_1";
pub const SECRET: &str = "epsk_test_secret";

pub struct Harness {
    pub state: AppState,
    pub clock: TestClock,
    pub platform: MockServer,
}

pub struct Reply {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl Harness {
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Harness whose config is adjusted by `configure` before the state is
    /// built.
    pub async fn with_config(configure: impl FnOnce(&mut PlaygroundConfig)) -> Self {
        let platform = MockServer::start().await;
        let clock = TestClock::new();
        let store = RecordStore::open_in_memory_with_clock(Arc::new(clock.clone()))
            .await
            .unwrap();
        let mut config = PlaygroundConfig::new(
            "http://playground.test",
            platform.uri(),
            Some(platform.uri()),
        );
        configure(&mut config);
        let state = AppState::new(config, store, ClientRegistry::new()).unwrap();
        Self {
            state,
            clock,
            platform,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Reply {
        let resp = build_router(self.state.clone())
            .oneshot(request)
            .await
            .unwrap();
        let status = resp.status();
        let headers = resp.headers().clone();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        Reply {
            status,
            headers,
            body: String::from_utf8_lossy(&body).into_owned(),
        }
    }

    pub async fn get(&self, uri: &str) -> Reply {
        self.send(Request::get(uri).body(Body::empty()).unwrap())
            .await
    }

    /// POST a delivery to `/app/{app_id}`, signed with `secret` at the
    /// current test time.
    pub async fn deliver(&self, app_id: &str, msg_id: &str, body: &str, secret: &str) -> Reply {
        let now = self.clock.unix_millis();
        let signature = WebhookVerifier::new(secret)
            .unwrap()
            .sign(msg_id, now, body.as_bytes())
            .unwrap();
        let request = Request::post(format!("/app/{app_id}"))
            .header("content-type", "application/json")
            .header("webhook-id", msg_id)
            .header("webhook-timestamp", now.to_string())
            .header("webhook-signature", signature)
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// Store an endpoint for `APP_ID` and register a client for it, as a
    /// finished bootstrap would.
    pub async fn seed_app(&self) {
        let endpoint = json!({
            "id": "ep_1", "app_id": APP_ID, "name": "POST http://playground.test/app/app_1",
            "secret_key": SECRET, "method": "POST", "uri": "http://playground.test/app/app_1",
            "created_at": 1, "updated_at": 1
        });
        self.state
            .store
            .set(&keys::endpoint(APP_ID), &endpoint)
            .await
            .unwrap();
        let client = KanthorClient::new("wsc_1", "pw", Some(&self.platform.uri())).unwrap();
        self.state
            .registry
            .insert(APP_ID.to_string(), Arc::new(client))
            .await;
    }

    /// Mount every portal and platform route the bootstrap flow uses.
    pub async fn mount_platform(&self) {
        let routes = [
            (
                "POST",
                "/workspace",
                json!({"id": "ws_1", "owner_id": "owner", "name": "playground", "tier": "default"}),
            ),
            (
                "POST",
                "/credentials",
                json!({"id": "wsc_1", "name": "playground", "user": "wsc_1", "password": "pw"}),
            ),
            (
                "POST",
                "/api/application",
                json!({"id": APP_ID, "ws_id": "ws_1", "name": "playground"}),
            ),
            (
                "GET",
                "/api/application/app_1",
                json!({"id": APP_ID, "ws_id": "ws_1", "name": "playground"}),
            ),
            (
                "POST",
                "/api/endpoint",
                json!({
                    "id": "ep_1", "app_id": APP_ID, "name": "POST http://playground.test/app/app_1",
                    "secret_key": SECRET, "method": "POST", "uri": "http://playground.test/app/app_1"
                }),
            ),
            ("POST", "/api/rule", json!({"id": "epr_1", "ep_id": "ep_1"})),
            (
                "POST",
                "/api/message",
                json!({"id": "msg_sample", "app_id": APP_ID, "type": "testing.playground"}),
            ),
        ];
        for (verb, route, body) in routes {
            Mock::given(method(verb))
                .and(path(route))
                .respond_with(ResponseTemplate::new(201).set_body_json(body))
                .mount(&self.platform)
                .await;
        }
    }
}
