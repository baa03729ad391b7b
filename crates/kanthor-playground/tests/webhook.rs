#![allow(clippy::unwrap_used)] // Integration tests use unwrap for brevity

//! Webhook receiver: `POST /app/{id}`.

mod common;

use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};

use common::{APP_ID, Harness, SECRET};
use kanthor_playground::sdk::WebhookVerifier;
use kanthor_playground_core::{Clock, MessageRecord, keys};

#[tokio::test]
async fn verified_delivery_is_stored_and_acknowledged() {
    let h = Harness::new().await;
    h.seed_app().await;

    let reply = h.deliver(APP_ID, "msg_1", r#"{"n":1}"#, SECRET).await;
    assert_eq!(reply.status, StatusCode::OK, "{}", reply.body);

    let ack: serde_json::Value = serde_json::from_str(&reply.body).unwrap();
    assert_eq!(ack["msg_id"], "msg_1");
    assert!(ack["timestamp"].as_str().unwrap().ends_with('Z'));

    let record: MessageRecord = h
        .state
        .store
        .get(&keys::message(APP_ID, "msg_1"))
        .await
        .unwrap();
    assert_eq!(record.body, r#"{"n":1}"#);
    assert_eq!(record.headers["webhook-id"], vec!["msg_1"]);
}

#[tokio::test]
async fn tampered_signature_is_rejected_without_storing() {
    let h = Harness::new().await;
    h.seed_app().await;

    let reply = h.deliver(APP_ID, "msg_1", r#"{"n":1}"#, "some-other-secret").await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert!(reply.body.contains("error"));

    let stored = h
        .state
        .store
        .list(&keys::messages_pattern(APP_ID))
        .await
        .unwrap();
    assert!(stored.is_empty());
}

#[tokio::test]
async fn missing_webhook_id_is_a_bad_request() {
    let h = Harness::new().await;
    h.seed_app().await;

    let request = Request::post("/app/app_1")
        .header("webhook-timestamp", "0")
        .header("webhook-signature", "v1=00")
        .body(Body::from("{}"))
        .unwrap();
    let reply = h.send(request).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert!(reply.body.contains("webhook-id"), "{}", reply.body);
}

#[tokio::test]
async fn unknown_app_is_a_server_error() {
    let h = Harness::new().await;

    let reply = h.deliver("app_unknown", "msg_1", "{}", SECRET).await;
    assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = serde_json::from_str(&reply.body).unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn stale_delivery_is_rejected() {
    let h = Harness::new().await;
    h.seed_app().await;

    let sent_at = h.clock.unix_millis() - 10 * 60 * 1000;
    let signature = WebhookVerifier::new(SECRET)
        .unwrap()
        .sign("msg_old", sent_at, b"{}")
        .unwrap();
    let request = Request::post("/app/app_1")
        .header("webhook-id", "msg_old")
        .header("webhook-timestamp", sent_at.to_string())
        .header("webhook-signature", signature)
        .body(Body::from("{}"))
        .unwrap();

    assert_eq!(h.send(request).await.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn messages_expire_after_a_day() {
    let h = Harness::new().await;
    h.seed_app().await;
    assert_eq!(
        h.deliver(APP_ID, "msg_1", "{}", SECRET).await.status,
        StatusCode::OK
    );

    h.clock.advance(Duration::from_secs(23 * 60 * 60));
    assert!(h.get("/app/app_1/message/count").await.body.contains("1 messages"));

    h.clock.advance(Duration::from_secs(2 * 60 * 60));
    assert!(h.get("/app/app_1/message/count").await.body.contains("0 messages"));
}
