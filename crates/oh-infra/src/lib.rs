//! # oh-infra
//!
//! Adapters for the ports declared in `oh-core`: the backend REST client,
//! the local state file, countdown timers and the payment gateway.

pub mod fs;
pub mod http;
pub mod payment;
pub mod time;

pub use fs::{DirsAppDirsAdapter, FileAppStateStore};
pub use http::{BackendClient, BackendConfig};
pub use payment::{SimulatedPaymentGateway, UnconfiguredPaymentGateway};
pub use time::{SystemClock, TokioCooldownTimer};
