use tokio::sync::watch;

use crate::ids::UserId;

/// Per-account resend cooldown.
///
/// `start` publishes the remaining seconds on the returned receiver, counting
/// down once per second and stopping at zero. Starting again for the same key
/// replaces the running countdown.
#[async_trait::async_trait]
pub trait CooldownTimerPort: Send + Sync {
    async fn start(&self, key: &UserId, secs: u64) -> anyhow::Result<watch::Receiver<u64>>;
    async fn stop(&self, key: &UserId) -> anyhow::Result<()>;
}
