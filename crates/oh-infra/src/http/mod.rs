//! reqwest adapters for the OneHealth backend REST API.

mod accounts;
mod address;
mod auth;
mod client;
mod fingerprint;

pub use client::{BackendClient, BackendConfig, DEFAULT_TIMEOUT};
pub use fingerprint::machine_visitor_id;
