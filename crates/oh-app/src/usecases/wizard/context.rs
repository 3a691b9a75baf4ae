use std::sync::Arc;

use tokio::sync::Mutex;
use oh_core::wizard::{FlowKind, WizardState};

/// State and dispatch lock of one wizard instance.
///
/// Acquire `dispatch_lock` before `state` when both are needed.
#[derive(Clone)]
pub struct WizardContext {
    state: Arc<Mutex<WizardState>>,
    /// Serializes transition + actions + state update of concurrent dispatches.
    dispatch_lock: Arc<Mutex<()>>,
}

impl WizardContext {
    pub fn new(flow: FlowKind) -> Self {
        Self {
            state: Arc::new(Mutex::new(WizardState::new(flow))),
            dispatch_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Does not take the dispatch lock.
    pub async fn get_state(&self) -> WizardState {
        self.state.lock().await.clone()
    }

    pub async fn acquire_dispatch_lock(&self) -> tokio::sync::MutexGuard<'_, ()> {
        self.dispatch_lock.lock().await
    }

    /// Only call while holding the dispatch lock.
    pub async fn set_state(&self, state: WizardState) {
        *self.state.lock().await = state;
    }
}
