use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use oh_core::ids::UserId;
use oh_core::ports::CooldownTimerPort;
use tokio::sync::{watch, Mutex};
use tokio::time::{sleep_until, Duration, Instant};
use tracing::debug;

struct Countdown {
    generation: u64,
    handle: tokio::task::AbortHandle,
    remaining: Arc<watch::Sender<u64>>,
}

/// Resend cooldowns keyed by account, one spawned task per running countdown.
pub struct TokioCooldownTimer {
    countdowns: Arc<Mutex<HashMap<UserId, Countdown>>>,
    next_generation: AtomicU64,
}

impl TokioCooldownTimer {
    pub fn new() -> Self {
        Self {
            countdowns: Arc::new(Mutex::new(HashMap::new())),
            next_generation: AtomicU64::new(0),
        }
    }
}

impl Default for TokioCooldownTimer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl CooldownTimerPort for TokioCooldownTimer {
    async fn start(&self, key: &UserId, secs: u64) -> anyhow::Result<watch::Receiver<u64>> {
        let (tx, rx) = watch::channel(secs);
        let tx = Arc::new(tx);
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);

        let mut countdowns = self.countdowns.lock().await;
        if let Some(existing) = countdowns.remove(key) {
            existing.handle.abort();
        }

        let countdowns_for_task = Arc::clone(&self.countdowns);
        let remaining = Arc::clone(&tx);
        let key_for_task = key.clone();
        let started = Instant::now();
        let handle = tokio::spawn(async move {
            for elapsed in 1..=secs {
                sleep_until(started + Duration::from_secs(elapsed)).await;
                remaining.send_replace(secs - elapsed);
            }
            let mut countdowns = countdowns_for_task.lock().await;
            if countdowns
                .get(&key_for_task)
                .is_some_and(|c| c.generation == generation)
            {
                countdowns.remove(&key_for_task);
            }
        });

        countdowns.insert(
            key.clone(),
            Countdown {
                generation,
                handle: handle.abort_handle(),
                remaining: tx,
            },
        );
        debug!(user_id = %key, secs, "resend cooldown started");
        Ok(rx)
    }

    async fn stop(&self, key: &UserId) -> anyhow::Result<()> {
        let mut countdowns = self.countdowns.lock().await;
        if let Some(countdown) = countdowns.remove(key) {
            countdown.handle.abort();
            countdown.remaining.send_replace(0);
            debug!(user_id = %key, "resend cooldown stopped");
        }
        Ok(())
    }
}
