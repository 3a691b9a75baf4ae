//! Application entry: paths, config, tracing, wiring, then one command.

use std::sync::Arc;

use anyhow::Context;
use oh_app::AppPaths;
use oh_core::ports::AppDirsPort;
use oh_infra::DirsAppDirsAdapter;
use tracing::{info, warn};

use super::config::{load_config_or_empty, resolve_config};
use super::runtime::AppRuntime;
use super::tracing::init_tracing_subscriber;
use super::wiring::wire_dependencies;
use crate::cli::Cli;
use crate::commands;
use crate::notifier::ConsoleNotifier;

/// Runs one CLI invocation to completion.
pub fn run_app(cli: Cli) -> anyhow::Result<()> {
    // A missing .env is the normal case.
    let _ = dotenvy::dotenv();

    let app_dirs = DirsAppDirsAdapter::new()
        .get_app_dirs()
        .context("Failed to resolve the application data directory")?;
    let paths = AppPaths::from_app_dirs(&app_dirs);

    if let Err(err) = init_tracing_subscriber(&paths.logs_dir) {
        eprintln!("Failed to initialize tracing: {err}");
    }

    let config_path = cli.config.clone().unwrap_or_else(|| paths.config_path.clone());
    let config = load_config_or_empty(&config_path)?;
    let resolved = resolve_config(config, &paths, cli.api_url.clone());
    info!(
        api = %resolved.api_base_url,
        state = %resolved.state_path.display(),
        "configuration resolved"
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to build the tokio runtime")?;

    runtime.block_on(async move {
        let wired = wire_dependencies(&resolved, Arc::new(ConsoleNotifier::stdout()))?;
        let app = AppRuntime::new(wired.deps, wired.cookies, resolved.resend_cooldown_secs);

        if let Err(err) = app.app_state().rehydrate().await {
            warn!(error = %err, "failed to rehydrate app state, starting fresh");
        }
        app.cookies().restore().await;

        commands::dispatch(&app, cli.command).await
    })
}
