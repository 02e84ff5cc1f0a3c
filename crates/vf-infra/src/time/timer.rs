use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tokio::time::{sleep, Duration};
use tracing::debug;
use vf_core::{otp::ChallengeKey, ports::TimerPort};

/// Tokio-backed expiry countdowns, one per challenge key.
///
/// When a countdown elapses the key is sent to the optional notifier so the
/// owner can drop the expired challenge.
pub struct Timer {
    timers: Arc<Mutex<HashMap<ChallengeKey, tokio::task::AbortHandle>>>,
    notifier: Option<mpsc::UnboundedSender<ChallengeKey>>,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            timers: Arc::new(Mutex::new(HashMap::new())),
            notifier: None,
        }
    }

    pub fn with_notifier(notifier: mpsc::UnboundedSender<ChallengeKey>) -> Self {
        Self {
            timers: Arc::new(Mutex::new(HashMap::new())),
            notifier: Some(notifier),
        }
    }

    pub async fn active_count(&self) -> usize {
        self.timers.lock().await.len()
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl TimerPort for Timer {
    async fn start(&mut self, key: &ChallengeKey, ttl_secs: u64) -> anyhow::Result<()> {
        let timers = Arc::clone(&self.timers);
        let notifier = self.notifier.clone();
        let key_clone = key.clone();

        let mut timers_guard = self.timers.lock().await;
        if let Some(existing) = timers_guard.remove(key) {
            existing.abort();
        }

        let handle = tokio::spawn(async move {
            sleep(Duration::from_secs(ttl_secs)).await;
            let mut timers_guard = timers.lock().await;
            timers_guard.remove(&key_clone);
            drop(timers_guard);
            if let Some(notifier) = notifier {
                let _ = notifier.send(key_clone);
            }
        });

        timers_guard.insert(key.clone(), handle.abort_handle());
        debug!(key = %key, ttl_secs, "expiry timer started");
        Ok(())
    }

    async fn stop(&mut self, key: &ChallengeKey) -> anyhow::Result<()> {
        let mut timers_guard = self.timers.lock().await;
        if let Some(handle) = timers_guard.remove(key) {
            handle.abort();
            debug!(key = %key, "expiry timer stopped");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::advance;
    use vf_core::otp::OtpChannel;

    fn key(id: &str) -> ChallengeKey {
        ChallengeKey::new(id, OtpChannel::Sms)
    }

    #[tokio::test]
    async fn start_notifies_after_ttl() -> anyhow::Result<()> {
        tokio::time::pause();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut timer = Timer::with_notifier(tx);

        timer.start(&key("+15550000001"), 5).await?;
        assert_eq!(timer.active_count().await, 1);
        advance(Duration::from_secs(5)).await;
        tokio::task::yield_now().await;

        assert_eq!(timer.active_count().await, 0);
        assert_eq!(rx.recv().await, Some(key("+15550000001")));
        Ok(())
    }

    #[tokio::test]
    async fn stop_cancels_timer() -> anyhow::Result<()> {
        tokio::time::pause();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut timer = Timer::with_notifier(tx);

        timer.start(&key("+15550000002"), 5).await?;
        timer.stop(&key("+15550000002")).await?;
        advance(Duration::from_secs(10)).await;
        tokio::task::yield_now().await;

        assert_eq!(timer.active_count().await, 0);
        assert!(rx.try_recv().is_err());
        Ok(())
    }

    #[tokio::test]
    async fn start_replaces_existing_timer_for_same_key() -> anyhow::Result<()> {
        tokio::time::pause();
        let mut timer = Timer::new();
        let key = key("+15550000003");

        timer.start(&key, 5).await?;
        timer.start(&key, 10).await?;
        advance(Duration::from_secs(5)).await;
        tokio::task::yield_now().await;

        assert!(timer.timers.lock().await.contains_key(&key));

        advance(Duration::from_secs(5)).await;
        tokio::task::yield_now().await;
        assert!(!timer.timers.lock().await.contains_key(&key));
        Ok(())
    }
}
