use std::sync::Arc;

use tokio::sync::{watch, Mutex};
use tracing::{debug, info};

use oh_core::ports::AppStateStorePort;
use oh_core::session::{AppState, Session};

/// Shared application state with a rehydrate-on-start, persist-on-change contract.
///
/// Every mutation goes through [`AppStateContext::update`], which writes the new
/// snapshot to the store before returning and publishes the session to
/// subscribers when it changed.
pub struct AppStateContext {
    state: Mutex<AppState>,
    store: Arc<dyn AppStateStorePort>,
    session_tx: watch::Sender<Session>,
}

impl AppStateContext {
    /// Creates a context holding the default (logged-out) state.
    pub fn new(store: Arc<dyn AppStateStorePort>) -> Self {
        let (session_tx, _) = watch::channel(Session::default());
        Self {
            state: Mutex::new(AppState::default()),
            store,
            session_tx,
        }
    }

    /// Returns the context wrapped in Arc for shared ownership.
    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Loads the persisted snapshot and makes it current.
    pub async fn rehydrate(&self) -> anyhow::Result<AppState> {
        let loaded = self.store.load().await?.rehydrated();
        let mut guard = self.state.lock().await;
        *guard = loaded.clone();
        self.session_tx.send_replace(loaded.session.clone());
        info!(
            authenticated = loaded.session.authenticated,
            role = ?loaded.session.role,
            "application state rehydrated"
        );
        Ok(loaded)
    }

    pub async fn snapshot(&self) -> AppState {
        self.state.lock().await.clone()
    }

    pub async fn session(&self) -> Session {
        self.state.lock().await.session.clone()
    }

    /// Applies `f` and persists the result when anything changed.
    pub async fn update<F, R>(&self, f: F) -> anyhow::Result<R>
    where
        F: FnOnce(&mut AppState) -> R,
    {
        let mut guard = self.state.lock().await;
        let before = guard.clone();
        let result = f(&mut guard);

        if *guard != before {
            self.store.save(&guard).await?;
            debug!("application state persisted");
            if guard.session != before.session {
                self.session_tx.send_replace(guard.session.clone());
            }
        }
        Ok(result)
    }

    /// Clears session and signup draft and removes the persisted snapshot.
    pub async fn clear(&self) -> anyhow::Result<()> {
        let mut guard = self.state.lock().await;
        guard.clear();
        self.store.clear().await?;
        self.session_tx.send_replace(guard.session.clone());
        Ok(())
    }

    /// Receiver that observes every session change.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.session_tx.subscribe()
    }
}
