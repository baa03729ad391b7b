//! Embedded record store for the playground.
//!
//! A key/value table in SQLite with optional per-key expiry. Values are JSON
//! strings; keys come from [`crate::keys`].

mod db;
mod records;


pub use db::{RecordStore, StoreError, weekly_file_name};
pub use records::decode_all;
