//! # Dependency Injection / 依赖注入模块
//!
//! ## Responsibilities / 职责
//!
//! - ✅ Create infra implementations (HTTP client, state file, timers) / 创建 infra 层具体实现
//! - ✅ Pick the payment gateway named by the resolved config / 按配置选择支付网关
//! - ✅ Inject everything into [`AppDeps`] / 将所有依赖注入到 AppDeps
//!
//! ## Prohibited / 禁止事项
//!
//! ❌ **No business logic / 禁止包含任何业务逻辑**
//! ❌ **No configuration defaults / 禁止默认值逻辑** (done in `config.rs`)
//!
//! > **This is the only place allowed to depend on oh-infra + oh-app simultaneously.**
//! > **这是唯一允许同时依赖 oh-infra 和 oh-app 的地方。**

use std::path::PathBuf;
use std::sync::Arc;

use oh_app::AppDeps;
use oh_core::ports::*;
use oh_infra::http::machine_visitor_id;
use oh_infra::{
    BackendClient, BackendConfig, FileAppStateStore, SimulatedPaymentGateway, SystemClock,
    TokioCooldownTimer, UnconfiguredPaymentGateway,
};
use tracing::{debug, info, warn};

use super::config::{PaymentSettings, ResolvedConfig};

/// Result type for wiring operations
pub type WiringResult<T> = Result<T, WiringError>;

/// Errors during dependency injection
/// 依赖注入错误（基础设施初始化失败）
#[derive(Debug, thiserror::Error)]
pub enum WiringError {
    #[error("Backend client initialization failed: {0}")]
    BackendClient(String),
}

/// Backend session cookies kept on disk between invocations.
pub struct SessionCookies {
    client: Arc<BackendClient>,
    path: PathBuf,
}

impl SessionCookies {
    pub async fn restore(&self) {
        if let Err(err) = self.client.load_cookies(&self.path).await {
            warn!(error = %err, "failed to restore backend cookies");
        }
    }

    pub async fn persist(&self) {
        if let Err(err) = self.client.save_cookies(&self.path).await {
            warn!(error = %err, "failed to persist backend cookies");
        }
    }

    pub async fn forget(&self) {
        match tokio::fs::remove_file(&self.path).await {
            Err(err) if err.kind() != std::io::ErrorKind::NotFound => {
                warn!(error = %err, "failed to remove backend cookies");
            }
            _ => debug!("backend cookies removed"),
        }
    }
}

/// Everything the runtime is built from.
pub struct WiredDependencies {
    pub deps: AppDeps,
    pub cookies: SessionCookies,
}

fn create_payment_gateway(settings: &PaymentSettings) -> Arc<dyn PaymentGatewayPort> {
    match settings {
        PaymentSettings::Simulated {
            success_rate,
            processing_delay,
        } => Arc::new(SimulatedPaymentGateway::new(*success_rate, *processing_delay)),
        PaymentSettings::Unconfigured => {
            info!("no payment gateway configured, payments will fail");
            Arc::new(UnconfiguredPaymentGateway)
        }
    }
}

/// Wire all dependencies together
/// 连接所有依赖
pub fn wire_dependencies(
    config: &ResolvedConfig,
    notifier: Arc<dyn NotificationPort>,
) -> WiringResult<WiredDependencies> {
    let backend = Arc::new(
        BackendClient::new(BackendConfig {
            base_url: config.api_base_url.clone(),
            timeout: config.api_timeout,
            visitor_id: machine_visitor_id(),
        })
        .map_err(|e| WiringError::BackendClient(e.to_string()))?,
    );
    debug!(base_url = %backend.base_url(), "backend client ready");

    let deps = AppDeps {
        auth: backend.clone(),
        registration: backend.clone(),
        otp: backend.clone(),
        address: backend.clone(),
        payment: create_payment_gateway(&config.payment),
        state_store: Arc::new(FileAppStateStore::new(config.state_path.clone())),
        cooldown: Arc::new(TokioCooldownTimer::new()),
        clock: Arc::new(SystemClock),
        notifier,
    };

    Ok(WiredDependencies {
        deps,
        cookies: SessionCookies {
            client: backend,
            path: config.cookie_path.clone(),
        },
    })
}
