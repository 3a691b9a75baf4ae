//! Port interfaces for the application layer
//!
//! Ports define the contract between the use cases in `oh-app` and the
//! adapters in `oh-infra`. Backend-facing ports return [`ApiError`] so the
//! use cases can surface the server's message; local ports return
//! `anyhow::Result`.
//!
//! [`ApiError`]: crate::api::ApiError

pub mod app_dirs;
mod address;
mod auth;
mod clock;
mod cooldown;
pub mod errors;
mod notification;
mod otp;
mod payment;
mod registration;
mod state_store;

#[cfg(any(test, feature = "mocks"))]
pub mod mocks;

pub use address::AddressLookupPort;
pub use app_dirs::AppDirsPort;
pub use auth::{AuthPort, LoginCredentials};
pub use clock::*;
pub use cooldown::CooldownTimerPort;
pub use notification::{Notification, NotificationLevel, NotificationPort};
pub use otp::OtpPort;
pub use payment::PaymentGatewayPort;
pub use registration::RegistrationPort;
pub use state_store::AppStateStorePort;
