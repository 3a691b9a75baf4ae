//! # Configuration Loader / 配置加载器
//!
//! Two stages, kept apart on purpose:
//!
//! - [`load_config`] reads the TOML file into the pure [`AppConfig`] DTO and
//!   accepts whatever is in it (empty strings and zeros are facts).
//! - [`resolve_config`] turns that DTO into the [`ResolvedConfig`] the wiring
//!   consumes: empty values become defaults and overrides are applied.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use oh_app::AppPaths;
use oh_core::config::AppConfig;
use oh_core::verification::DEFAULT_RESEND_COOLDOWN_SECS;
use oh_infra::http::DEFAULT_TIMEOUT;
use oh_infra::payment::{DEFAULT_PROCESSING_DELAY, DEFAULT_SUCCESS_RATE};
use tracing::debug;

pub const API_URL_ENV: &str = "ONEHEALTH_API_URL";
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api/";

const SIMULATED_PAYMENT_MODE: &str = "simulated";

/// Load configuration from a TOML file
/// 从 TOML 文件加载配置
///
/// **NO validation is performed**: missing sections result in empty values.
///
/// # Errors / 错误
///
/// Returns error if the file cannot be read or is not valid TOML.
pub fn load_config(config_path: &Path) -> anyhow::Result<AppConfig> {
    let content = std::fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;
    let toml_value: toml::Value =
        toml::from_str(&content).context("Failed to parse config as TOML")?;
    AppConfig::from_toml(&toml_value)
}

/// Like [`load_config`], but a missing file yields [`AppConfig::empty`].
pub fn load_config_or_empty(config_path: &Path) -> anyhow::Result<AppConfig> {
    if !config_path.exists() {
        debug!(path = %config_path.display(), "no config file, using defaults");
        return Ok(AppConfig::empty());
    }
    load_config(config_path)
}

#[derive(Debug, Clone, PartialEq)]
pub enum PaymentSettings {
    Simulated {
        success_rate: f64,
        processing_delay: Duration,
    },
    Unconfigured,
}

/// Settings after defaults and overrides were applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub api_base_url: String,
    pub api_timeout: Duration,
    pub state_path: PathBuf,
    pub cookie_path: PathBuf,
    pub resend_cooldown_secs: u64,
    pub payment: PaymentSettings,
}

/// Fills empty values with defaults.
///
/// The API URL comes from, in order: `api_url_override` (the `--api-url`
/// flag), the `ONEHEALTH_API_URL` environment variable, the file, the default.
pub fn resolve_config(
    config: AppConfig,
    paths: &AppPaths,
    api_url_override: Option<String>,
) -> ResolvedConfig {
    let api_base_url = api_url_override
        .filter(|url| !url.trim().is_empty())
        .or_else(|| {
            std::env::var(API_URL_ENV)
                .ok()
                .filter(|url| !url.trim().is_empty())
        })
        .or_else(|| Some(config.api_base_url.clone()).filter(|url| !url.trim().is_empty()))
        .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

    let api_timeout = match config.api_timeout_secs {
        0 => DEFAULT_TIMEOUT,
        secs => Duration::from_secs(secs),
    };

    let state_path = if config.state_path.as_os_str().is_empty() {
        paths.state_path.clone()
    } else {
        config.state_path.clone()
    };
    let cookie_path = state_path.with_file_name("cookies");

    let resend_cooldown_secs = match config.resend_cooldown_secs {
        0 => DEFAULT_RESEND_COOLDOWN_SECS,
        secs => secs,
    };

    let payment = if config.payment_mode.trim() == SIMULATED_PAYMENT_MODE {
        PaymentSettings::Simulated {
            success_rate: config.payment_success_rate.unwrap_or(DEFAULT_SUCCESS_RATE),
            processing_delay: match config.payment_processing_delay_ms {
                0 => DEFAULT_PROCESSING_DELAY,
                ms => Duration::from_millis(ms),
            },
        }
    } else {
        PaymentSettings::Unconfigured
    };

    ResolvedConfig {
        api_base_url,
        api_timeout,
        state_path,
        cookie_path,
        resend_cooldown_secs,
        payment,
    }
}
