//! Fakes shared by the unit tests of this crate.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::watch;

use oh_core::ids::UserId;
use oh_core::ports::{
    AppStateStorePort, CooldownTimerPort, Notification, NotificationLevel, NotificationPort,
};
use oh_core::session::AppState;

use crate::usecases::session::AppStateContext;

#[derive(Default)]
pub struct MemoryStateStore {
    saved: Mutex<Option<AppState>>,
}

#[async_trait]
impl AppStateStorePort for MemoryStateStore {
    async fn load(&self) -> anyhow::Result<AppState> {
        Ok(self.saved.lock().unwrap().clone().unwrap_or_default())
    }

    async fn save(&self, state: &AppState) -> anyhow::Result<()> {
        *self.saved.lock().unwrap() = Some(state.clone());
        Ok(())
    }

    async fn clear(&self) -> anyhow::Result<()> {
        *self.saved.lock().unwrap() = None;
        Ok(())
    }
}

pub fn memory_state() -> Arc<AppStateContext> {
    AppStateContext::new(Arc::new(MemoryStateStore::default())).arc()
}

#[derive(Default)]
pub struct RecordingNotifier {
    seen: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn arc() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn messages(&self) -> Vec<String> {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .map(|n| n.message.clone())
            .collect()
    }

    pub fn last(&self) -> Option<Notification> {
        self.seen.lock().unwrap().last().cloned()
    }

    pub fn errors(&self) -> Vec<String> {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .filter(|n| n.level == NotificationLevel::Error)
            .map(|n| n.message.clone())
            .collect()
    }
}

impl NotificationPort for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.seen.lock().unwrap().push(notification);
    }
}

/// Cooldown whose counter is driven by the test instead of a clock.
#[derive(Default)]
pub struct ManualCooldown {
    senders: Mutex<HashMap<String, watch::Sender<u64>>>,
}

impl ManualCooldown {
    pub fn arc() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set(&self, key: &UserId, remaining: u64) {
        if let Some(tx) = self.senders.lock().unwrap().get(key.as_str()) {
            tx.send_replace(remaining);
        }
    }
}

#[async_trait]
impl CooldownTimerPort for ManualCooldown {
    async fn start(&self, key: &UserId, secs: u64) -> anyhow::Result<watch::Receiver<u64>> {
        let (tx, rx) = watch::channel(secs);
        self.senders
            .lock()
            .unwrap()
            .insert(key.as_str().to_string(), tx);
        Ok(rx)
    }

    async fn stop(&self, key: &UserId) -> anyhow::Result<()> {
        if let Some(tx) = self.senders.lock().unwrap().get(key.as_str()) {
            tx.send_replace(0);
        }
        Ok(())
    }
}
