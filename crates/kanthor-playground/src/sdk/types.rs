//! Request and response bodies of the platform API.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Serialize)]
pub struct ApplicationCreateReq {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub id: String,
    #[serde(default)]
    pub ws_id: String,
    pub name: String,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct EndpointCreateReq {
    pub app_id: String,
    pub name: String,
    pub method: String,
    pub uri: String,
}

/// A webhook endpoint as returned on creation.
///
/// This is what gets persisted per application; fields the playground does
/// not model are kept in `extra` so the stored record matches the response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Endpoint {
    pub id: String,
    pub app_id: String,
    #[serde(default)]
    pub name: String,
    /// Key used to sign deliveries to this endpoint.
    pub secret_key: String,
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EndpointRuleCreateReq {
    pub ep_id: String,
    pub name: String,
    pub priority: i32,
    pub exclusionary: bool,
    pub condition_source: String,
    pub condition_expression: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointRule {
    pub id: String,
    pub ep_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub exclusionary: bool,
    #[serde(default)]
    pub condition_source: String,
    #[serde(default)]
    pub condition_expression: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageCreateReq {
    pub app_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub body: Value,
    pub headers: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    #[serde(default)]
    pub app_id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub timestamp: i64,
}
