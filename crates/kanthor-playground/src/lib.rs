//! Kanthor playground server.
//!
//! Provisions demo applications on the Kanthor platform, receives and
//! verifies the webhooks they deliver, and keeps a short-lived record of
//! everything it sees.

pub mod config;
pub mod error;
pub mod portal;
pub mod registry;
pub mod routes;
pub mod sdk;
pub mod views;

pub use routes::{AppState, build_router};
