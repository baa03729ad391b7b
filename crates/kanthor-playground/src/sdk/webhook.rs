//! Webhook signature verification.
//!
//! Every delivery carries three headers:
//! - `webhook-id`: unique message id
//! - `webhook-timestamp`: send time in Unix milliseconds
//! - `webhook-signature`: space-separated `v1=<hex>` entries
//!
//! A `v1` signature is the hex HMAC-SHA256 of `<id>.<timestamp>.<body>`,
//! keyed with the endpoint's secret. Multiple entries allow secret rotation;
//! any matching entry is accepted.

use std::time::Duration;

use axum::http::HeaderMap;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

pub const HEADER_WEBHOOK_ID: &str = "webhook-id";
pub const HEADER_WEBHOOK_TIMESTAMP: &str = "webhook-timestamp";
pub const HEADER_WEBHOOK_SIGNATURE: &str = "webhook-signature";

/// Allowed distance between the delivery timestamp and local time.
pub const DEFAULT_TOLERANCE: Duration = Duration::from_secs(5 * 60);

const SIGNATURE_VERSION: &str = "v1=";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WebhookError {
    #[error("missing required header: {0}")]
    MissingHeader(&'static str),

    #[error("invalid webhook timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("webhook timestamp is outside the allowed tolerance")]
    TimestampOutOfTolerance,

    #[error("no v1 signature found in webhook-signature")]
    InvalidSignatureFormat,

    #[error("signature verification failed")]
    VerificationFailed,

    #[error("invalid secret key")]
    InvalidSecret,
}

/// Verifies deliveries signed with one endpoint secret.
#[derive(Clone)]
pub struct WebhookVerifier {
    secret: Vec<u8>,
    tolerance: Duration,
}

impl std::fmt::Debug for WebhookVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookVerifier")
            .field("tolerance", &self.tolerance)
            .finish_non_exhaustive()
    }
}

impl WebhookVerifier {
    pub fn new(secret: &str) -> Result<Self, WebhookError> {
        if secret.is_empty() {
            return Err(WebhookError::InvalidSecret);
        }
        Ok(Self {
            secret: secret.as_bytes().to_vec(),
            tolerance: DEFAULT_TOLERANCE,
        })
    }

    pub const fn with_tolerance(mut self, tolerance: Duration) -> Self {
        self.tolerance = tolerance;
        self
    }

    fn mac(&self, id: &str, timestamp: &str, body: &[u8]) -> Result<HmacSha256, WebhookError> {
        let mut mac =
            HmacSha256::new_from_slice(&self.secret).map_err(|_| WebhookError::InvalidSecret)?;
        mac.update(id.as_bytes());
        mac.update(b".");
        mac.update(timestamp.as_bytes());
        mac.update(b".");
        mac.update(body);
        Ok(mac)
    }

    /// `webhook-signature` value for a delivery.
    pub fn sign(&self, id: &str, timestamp_ms: i64, body: &[u8]) -> Result<String, WebhookError> {
        let mac = self.mac(id, &timestamp_ms.to_string(), body)?;
        Ok(format!(
            "{SIGNATURE_VERSION}{}",
            hex::encode(mac.finalize().into_bytes())
        ))
    }

    /// Check `body` and `headers` against the secret at time `now_ms`.
    pub fn verify(&self, body: &[u8], headers: &HeaderMap, now_ms: i64) -> Result<(), WebhookError> {
        let id = header_str(headers, HEADER_WEBHOOK_ID)?;
        let timestamp = header_str(headers, HEADER_WEBHOOK_TIMESTAMP)?;
        let signatures = header_str(headers, HEADER_WEBHOOK_SIGNATURE)?;

        let sent_at: i64 = timestamp
            .trim()
            .parse()
            .map_err(|_| WebhookError::InvalidTimestamp(timestamp.to_string()))?;
        let tolerance = i64::try_from(self.tolerance.as_millis()).unwrap_or(i64::MAX);
        if now_ms.saturating_sub(sent_at).abs() > tolerance {
            return Err(WebhookError::TimestampOutOfTolerance);
        }

        let mac = self.mac(id, timestamp.trim(), body)?;
        let mut candidates = 0;
        for entry in signatures.split_whitespace() {
            let Some(encoded) = entry.strip_prefix(SIGNATURE_VERSION) else {
                continue;
            };
            candidates += 1;
            let Ok(expected) = hex::decode(encoded) else {
                continue;
            };
            // verify_slice compares in constant time.
            if mac.clone().verify_slice(&expected).is_ok() {
                return Ok(());
            }
        }

        if candidates == 0 {
            Err(WebhookError::InvalidSignatureFormat)
        } else {
            Err(WebhookError::VerificationFailed)
        }
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &'static str) -> Result<&'a str, WebhookError> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .ok_or(WebhookError::MissingHeader(name))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    const NOW: i64 = 1_704_067_200_000;

    fn signed_headers(verifier: &WebhookVerifier, id: &str, ts: i64, body: &[u8]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(HEADER_WEBHOOK_ID, HeaderValue::from_str(id).unwrap());
        headers.insert(
            HEADER_WEBHOOK_TIMESTAMP,
            HeaderValue::from_str(&ts.to_string()).unwrap(),
        );
        headers.insert(
            HEADER_WEBHOOK_SIGNATURE,
            HeaderValue::from_str(&verifier.sign(id, ts, body).unwrap()).unwrap(),
        );
        headers
    }

    #[test]
    fn valid_signature_verifies() {
        let verifier = WebhookVerifier::new("epsk_secret").unwrap();
        let body = br#"{"ping":1}"#;
        let headers = signed_headers(&verifier, "msg_1", NOW, body);

        assert_eq!(verifier.verify(body, &headers, NOW), Ok(()));
    }

    #[test]
    fn tampered_body_fails() {
        let verifier = WebhookVerifier::new("epsk_secret").unwrap();
        let headers = signed_headers(&verifier, "msg_1", NOW, br#"{"ping":1}"#);

        assert_eq!(
            verifier.verify(br#"{"ping":2}"#, &headers, NOW),
            Err(WebhookError::VerificationFailed)
        );
    }

    #[test]
    fn wrong_secret_fails() {
        let signer = WebhookVerifier::new("epsk_one").unwrap();
        let verifier = WebhookVerifier::new("epsk_two").unwrap();
        let body = b"payload";
        let headers = signed_headers(&signer, "msg_1", NOW, body);

        assert_eq!(
            verifier.verify(body, &headers, NOW),
            Err(WebhookError::VerificationFailed)
        );
    }

    #[test]
    fn any_matching_entry_is_accepted() {
        let old = WebhookVerifier::new("epsk_old").unwrap();
        let current = WebhookVerifier::new("epsk_current").unwrap();
        let body = b"payload";

        let mut headers = signed_headers(&current, "msg_1", NOW, body);
        let combined = format!(
            "{} {}",
            old.sign("msg_1", NOW, body).unwrap(),
            current.sign("msg_1", NOW, body).unwrap()
        );
        headers.insert(HEADER_WEBHOOK_SIGNATURE, HeaderValue::from_str(&combined).unwrap());

        assert_eq!(current.verify(body, &headers, NOW), Ok(()));
    }

    #[test]
    fn missing_headers_are_reported() {
        let verifier = WebhookVerifier::new("epsk_secret").unwrap();
        let mut headers = signed_headers(&verifier, "msg_1", NOW, b"x");

        headers.remove(HEADER_WEBHOOK_SIGNATURE);
        assert_eq!(
            verifier.verify(b"x", &headers, NOW),
            Err(WebhookError::MissingHeader(HEADER_WEBHOOK_SIGNATURE))
        );

        headers.remove(HEADER_WEBHOOK_ID);
        assert_eq!(
            verifier.verify(b"x", &headers, NOW),
            Err(WebhookError::MissingHeader(HEADER_WEBHOOK_ID))
        );
    }

    #[test]
    fn stale_timestamp_is_rejected() {
        let verifier = WebhookVerifier::new("epsk_secret").unwrap();
        let sent = NOW - 6 * 60 * 1000;
        let headers = signed_headers(&verifier, "msg_1", sent, b"x");

        assert_eq!(
            verifier.verify(b"x", &headers, NOW),
            Err(WebhookError::TimestampOutOfTolerance)
        );
        let relaxed = verifier.with_tolerance(Duration::from_secs(10 * 60));
        assert_eq!(relaxed.verify(b"x", &headers, NOW), Ok(()));
    }

    #[test]
    fn unversioned_signature_is_a_format_error() {
        let verifier = WebhookVerifier::new("epsk_secret").unwrap();
        let mut headers = signed_headers(&verifier, "msg_1", NOW, b"x");
        headers.insert(HEADER_WEBHOOK_SIGNATURE, HeaderValue::from_static("sha256=abc"));

        assert_eq!(
            verifier.verify(b"x", &headers, NOW),
            Err(WebhookError::InvalidSignatureFormat)
        );
    }

    #[test]
    fn empty_secret_is_rejected() {
        assert_eq!(WebhookVerifier::new("").unwrap_err(), WebhookError::InvalidSecret);
    }
}
