//! File-based application state store
//!
//! Persists the session and the collector signup draft as one JSON document,
//! so an interrupted signup can be resumed on the next start.

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use oh_core::ports::AppStateStorePort;
use oh_core::session::AppState;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

pub const DEFAULT_STATE_FILE: &str = "onehealth_state.json";

pub struct FileAppStateStore {
    state_file_path: PathBuf,
}

impl FileAppStateStore {
    pub fn new(state_file_path: PathBuf) -> Self {
        Self { state_file_path }
    }

    pub fn with_defaults(base_dir: PathBuf) -> Self {
        Self {
            state_file_path: base_dir.join(DEFAULT_STATE_FILE),
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.state_file_path
    }

    async fn ensure_parent_dir(&self) -> anyhow::Result<()> {
        if let Some(parent) = self.state_file_path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl AppStateStorePort for FileAppStateStore {
    async fn load(&self) -> anyhow::Result<AppState> {
        let content = match fs::read_to_string(&self.state_file_path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(AppState::default()),
            Err(e) => return Err(anyhow::anyhow!("Failed to read state file: {e}")),
        };

        if content.trim().is_empty() {
            return Ok(AppState::default());
        }

        let state: AppState = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse app state: {e}"))?;

        Ok(state)
    }

    async fn save(&self, state: &AppState) -> anyhow::Result<()> {
        self.ensure_parent_dir().await?;

        let json = serde_json::to_string_pretty(state)
            .map_err(|e| anyhow::anyhow!("Failed to serialize app state: {e}"))?;

        let mut file = fs::File::create(&self.state_file_path)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to create state file: {e}"))?;

        file.write_all(json.as_bytes())
            .await
            .map_err(|e| anyhow::anyhow!("Failed to write state file: {e}"))?;

        file.sync_all()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to sync state file: {e}"))?;

        debug!(path = %self.state_file_path.display(), "app state saved");
        Ok(())
    }

    async fn clear(&self) -> anyhow::Result<()> {
        match fs::remove_file(&self.state_file_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(anyhow::anyhow!("Failed to remove state file: {e}")),
        }
    }
}
