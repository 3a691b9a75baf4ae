use async_trait::async_trait;

use crate::session::AppState;

/// Persistence of the application state snapshot.
#[async_trait]
pub trait AppStateStorePort: Send + Sync {
    /// Returns the default state when nothing has been stored yet.
    async fn load(&self) -> anyhow::Result<AppState>;
    async fn save(&self, state: &AppState) -> anyhow::Result<()>;
    async fn clear(&self) -> anyhow::Result<()>;
}
