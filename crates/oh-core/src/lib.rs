//! # oh-core
//!
//! Core domain models and state machines for the OneHealth registration client.
//!
//! This crate contains pure business logic without any infrastructure dependencies.

pub mod address;
pub mod api;
pub mod app_dirs;
pub mod config;
pub mod contact;
pub mod ids;
pub mod payment;
pub mod ports;
pub mod registration;
pub mod route_guard;
pub mod session;
pub mod user;
pub mod validation;
pub mod verification;
pub mod wizard;

// Re-export commonly used types at the crate root
pub use api::ApiError;
pub use config::AppConfig;
pub use contact::{Contact, ContactType};
pub use ids::{PaymentReference, ServiceCode, UserId, VisitorId};
pub use session::{AppState, Role, Session, SignupDraft};
pub use validation::ValidationError;
pub use wizard::{FlowKind, WizardState, WizardStep};
