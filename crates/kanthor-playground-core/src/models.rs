//! Records persisted in the store.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Header name to every value it was sent with.
pub type HeaderValues = BTreeMap<String, Vec<String>>;

/// Platform login pair scoped to one provisioned application.
///
/// Persisted without expiry so clients can be rebuilt after a restart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub app_id: String,
    pub user: String,
    pub password: String,
}

/// A verified webhook delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    pub id: String,
    /// RFC 3339 receive time.
    pub timestamp: String,
    #[serde(default)]
    pub headers: HeaderValues,
    #[serde(default)]
    pub body: String,
}

/// A request captured by the printout endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintoutRecord {
    pub method: String,
    #[serde(default)]
    pub headers: HeaderValues,
    #[serde(default)]
    pub body: String,
    pub timestamp: String,
}
