//! Routing-rule conditions understood by the platform.

/// Match on the id of the application a message was created under.
pub const CONDITION_SOURCE_APP_ID: &str = "app_id";

/// Condition expression matching `value` exactly.
pub fn match_equal(value: &str) -> String {
    format!("equal::{value}")
}
