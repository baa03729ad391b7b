//! Client for the Kanthor webhook-delivery platform API.
//!
//! Covers the handful of calls the playground makes (applications,
//! endpoints, routing rules, messages) and verification of the webhooks the
//! platform delivers back.

mod client;
pub mod routing;
mod types;
pub mod webhook;

pub use client::{DEFAULT_SDK_HOST, KanthorClient, SdkError};
pub use types::*;
pub use webhook::{WebhookError, WebhookVerifier};
