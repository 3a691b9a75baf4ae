//! # Configuration DTO
//!
//! Pure data: TOML → [`AppConfig`] mapping only.
//!
//! No validation and no default value calculation happen here. Missing keys
//! become empty values; the bootstrap layer decides what an empty value means.

use std::path::PathBuf;

/// Application configuration DTO (pure data, no logic)
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Backend base URL (may be empty - resolved by the caller)
    pub api_base_url: String,

    /// Request timeout in seconds, 0 when unset
    pub api_timeout_secs: u64,

    /// Persisted application state file (path info only, no existence check)
    pub state_path: PathBuf,

    /// OTP resend cooldown in seconds, 0 when unset
    pub resend_cooldown_secs: u64,

    /// Payment gateway selection, e.g. "simulated"
    pub payment_mode: String,

    /// Success probability used by the simulated gateway; `None` when unset
    pub payment_success_rate: Option<f64>,

    /// Simulated processing delay in milliseconds
    pub payment_processing_delay_ms: u64,
}

impl AppConfig {
    /// Create AppConfig from TOML value
    ///
    /// **Prohibited**: This method must NOT contain any validation or default
    /// value logic. Empty strings and zeros are valid "facts".
    pub fn from_toml(toml_value: &toml::Value) -> anyhow::Result<Self> {
        let section = |name: &str, key: &str| toml_value.get(name).and_then(|s| s.get(key));

        Ok(Self {
            api_base_url: section("api", "base_url")
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string(),
            api_timeout_secs: section("api", "timeout_secs")
                .and_then(|v| v.as_integer())
                .unwrap_or(0) as u64,
            state_path: PathBuf::from(
                section("storage", "state_path")
                    .and_then(|v| v.as_str())
                    .unwrap_or(""),
            ),
            resend_cooldown_secs: section("verification", "resend_cooldown_secs")
                .and_then(|v| v.as_integer())
                .unwrap_or(0) as u64,
            payment_mode: section("payment", "mode")
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string(),
            payment_success_rate: section("payment", "success_rate")
                .and_then(|v| v.as_float().or_else(|| v.as_integer().map(|i| i as f64))),
            payment_processing_delay_ms: section("payment", "processing_delay_ms")
                .and_then(|v| v.as_integer())
                .unwrap_or(0) as u64,
        })
    }

    /// Create empty AppConfig (all empty/zero values)
    pub fn empty() -> Self {
        Self {
            api_base_url: String::new(),
            api_timeout_secs: 0,
            state_path: PathBuf::new(),
            resend_cooldown_secs: 0,
            payment_mode: String::new(),
            payment_success_rate: None,
            payment_processing_delay_ms: 0,
        }
    }

    /// Create AppConfig with paths derived from `data_dir`.
    ///
    /// The base directory is computed by the caller (e.g. with the `dirs` crate).
    pub fn with_system_defaults(data_dir: PathBuf) -> Self {
        Self {
            state_path: data_dir.join("onehealth_state.json"),
            ..Self::empty()
        }
    }
}
