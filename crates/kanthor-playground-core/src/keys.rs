//! Key namespace for stored records.
//!
//! Every key the playground writes is produced here. Listing patterns rely on
//! the namespaces never overlapping:
//!
//! | Record      | Key                          | Listing pattern          |
//! |-------------|------------------------------|--------------------------|
//! | credentials | `credentials/<app>/wsc`      | `credentials/*/wsc`      |
//! | endpoint    | `<app>/ep`                   | -                        |
//! | message     | `<app>/message/<id>`         | `<app>/message/*`        |
//! | printout    | `printout/<id>`              | `printout/*`             |

/// Pattern matching every persisted credential record.
pub const CREDENTIALS_PATTERN: &str = "credentials/*/wsc";

/// Pattern matching every printout record.
pub const PRINTOUT_PATTERN: &str = "printout/*";

pub fn credentials(app_id: &str) -> String {
    format!("credentials/{app_id}/wsc")
}

pub fn endpoint(app_id: &str) -> String {
    format!("{app_id}/ep")
}

pub fn message(app_id: &str, message_id: &str) -> String {
    format!("{app_id}/message/{message_id}")
}

pub fn printout(id: &str) -> String {
    format!("printout/{id}")
}

/// Pattern matching every message of one application.
///
/// The application id is glob-escaped, so an id such as `*` only ever
/// matches an application literally named `*`.
pub fn messages_pattern(app_id: &str) -> String {
    format!("{}/message/*", escape_glob(app_id))
}

/// Printout id derived from a nanosecond timestamp plus a `nonce` that
/// keeps captures taken in the same nanosecond apart.
///
/// The timestamp is zero-padded so lexicographic order equals
/// chronological order.
pub fn printout_id(unix_nanos: u128, nonce: &str) -> String {
    format!("{unix_nanos:020}-{nonce}")
}

/// Escape glob metacharacters (`*`, `?`, `[`) for literal matching.
pub fn escape_glob(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for c in segment.chars() {
        match c {
            '*' => out.push_str("[*]"),
            '?' => out.push_str("[?]"),
            '[' => out.push_str("[[]"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_formats() {
        assert_eq!(credentials("app_1"), "credentials/app_1/wsc");
        assert_eq!(endpoint("app_1"), "app_1/ep");
        assert_eq!(message("app_1", "msg_1"), "app_1/message/msg_1");
        assert_eq!(printout("42"), "printout/42");
    }

    #[test]
    fn messages_pattern_escapes_app_id() {
        assert_eq!(messages_pattern("app_1"), "app_1/message/*");
        assert_eq!(messages_pattern("a*b?c[d"), "a[*]b[?]c[[]d/message/*");
    }

    #[test]
    fn printout_ids_sort_chronologically() {
        let earlier = printout_id(999, "ffff");
        let later = printout_id(1_000, "0000");
        assert!(earlier.starts_with("00000000000000000999-"));
        assert!(earlier < later);
    }

    #[test]
    fn printout_ids_in_same_nanosecond_differ() {
        assert_ne!(printout_id(1_000, "a1"), printout_id(1_000, "b2"));
    }
}
