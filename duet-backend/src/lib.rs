//! A barebones client for the managed backend that hosts duet's collections.
//!
//! The backend exposes a PostgREST-style query API under `/rest/v1` and a
//! password-based auth API under `/auth/v1`.
#![deny(missing_docs)]

mod client;
pub use client::*;

mod query;
pub use query::*;

mod mutation;

mod auth;
pub use auth::*;

mod request;

/// A single row as returned by the backend: a JSON object of field name to value.
///
/// Joined relations arrive as nested objects or arrays inside the row.
pub type Row = serde_json::Map<String, serde_json::Value>;
