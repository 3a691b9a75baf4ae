//! OneHealth command-line client
//!
//! Bootstrap and CLI on top of `oh-app`: collector signup, public-user and
//! sub-account registration, login and admin decisions against the backend.

pub mod bootstrap;
pub mod cli;
pub mod commands;
pub mod notifier;
pub mod prompt;

pub use bootstrap::run_app;
pub use cli::Cli;
