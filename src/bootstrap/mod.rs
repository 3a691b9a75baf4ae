pub mod config;
pub mod run;
pub mod runtime;
pub mod tracing;
pub mod wiring;

pub use config::{load_config, resolve_config, PaymentSettings, ResolvedConfig};
pub use run::run_app;
pub use runtime::{AppRuntime, UseCases};
pub use wiring::{wire_dependencies, SessionCookies, WiringError};
