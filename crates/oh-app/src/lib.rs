//! OneHealth application layer
//!
//! Use cases and the registration wizard orchestrator, written against the
//! ports of `oh-core`.

pub mod app_paths;
pub mod deps;
pub mod usecases;

#[cfg(test)]
pub(crate) mod test_support;

pub use app_paths::AppPaths;
pub use deps::AppDeps;
