use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use crate::config::FanConfig;

/// Integer shared between tasks, only reachable through its lock.
///
/// The optional hold delay keeps the lock held for longer during each
/// increment, which widens the window in which a broken lock would lose an
/// update. Clones share the same value.
#[derive(Debug, Clone, Default)]
pub struct SharedCounter {
    value: Arc<Mutex<i64>>,
    hold: Option<Duration>,
}

impl SharedCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hold(hold: Duration) -> Self {
        Self {
            value: Arc::new(Mutex::new(0)),
            hold: Some(hold),
        }
    }

    pub fn from_config(config: &FanConfig) -> Self {
        match config.increment_hold() {
            Some(hold) => Self::with_hold(hold),
            None => Self::new(),
        }
    }

    pub fn hold(&self) -> Option<Duration> {
        self.hold
    }

    pub async fn increment(&self) {
        let mut value = self.value.lock().await;
        if let Some(hold) = self.hold {
            tokio::time::sleep(hold).await;
        }
        let current = *value;
        *value = current + 1;
    }

    pub async fn value(&self) -> i64 {
        *self.value.lock().await
    }
}
