//! Kanthor Playground Core Library
//!
//! Shared functionality for the playground server:
//! - Embedded record store with TTL expiry (SQLite)
//! - Key namespace builders for stored records
//! - Stored record models
//! - Clock abstraction for expiry and timestamps

pub mod clock;
pub mod keys;
pub mod models;
pub mod store;
pub mod tracing_init;

pub use clock::{Clock, RealClock};
pub use models::{Credentials, MessageRecord, PrintoutRecord};
pub use store::{RecordStore, StoreError};
