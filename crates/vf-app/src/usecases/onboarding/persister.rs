//! Debounced session persistence.
//!
//! Field edits schedule a save after the debounce window; a newer edit
//! replaces the pending save. Navigation flushes immediately. The first
//! store failure switches the persister to [`PersistenceStatus::Degraded`]:
//! the workflow keeps running in memory and no further writes are attempted.
//!
//! Writes are never aborted once started. Every schedule, flush or cancel
//! bumps a generation counter; a debounced save only writes if its generation
//! is still current once it holds the write lock, and a flush waits for a
//! save already in flight instead of racing it.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use vf_core::ids::UserId;
use vf_core::onboarding::{FlowType, OnboardingSession};
use vf_core::ports::{ProgressKey, ProgressStoreError, ProgressStorePort};

pub const DEFAULT_SAVE_DEBOUNCE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PersistenceStatus {
    Healthy,
    /// A save or load failed; progress is only held in memory.
    Degraded,
}

pub struct SessionPersister {
    store: Arc<dyn ProgressStorePort>,
    debounce: Duration,
    generation: Arc<AtomicU64>,
    write_lock: Arc<Mutex<()>>,
    degraded: Arc<AtomicBool>,
}

impl SessionPersister {
    pub fn new(store: Arc<dyn ProgressStorePort>, debounce: Duration) -> Self {
        Self {
            store,
            debounce,
            generation: Arc::new(AtomicU64::new(0)),
            write_lock: Arc::new(Mutex::new(())),
            degraded: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_default_debounce(store: Arc<dyn ProgressStorePort>) -> Self {
        Self::new(store, DEFAULT_SAVE_DEBOUNCE)
    }

    pub fn status(&self) -> PersistenceStatus {
        if self.degraded.load(Ordering::SeqCst) {
            PersistenceStatus::Degraded
        } else {
            PersistenceStatus::Healthy
        }
    }

    /// Saves `session` once the debounce window passes without another schedule.
    pub async fn schedule(&self, session: OnboardingSession) {
        if self.is_degraded() {
            return;
        }

        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let store = Arc::clone(&self.store);
        let generation = Arc::clone(&self.generation);
        let write_lock = Arc::clone(&self.write_lock);
        let degraded = Arc::clone(&self.degraded);
        let debounce = self.debounce;

        tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            let _write_guard = write_lock.lock().await;
            if generation.load(Ordering::SeqCst) != ticket || degraded.load(Ordering::SeqCst) {
                return;
            }
            save_or_degrade(store.as_ref(), &degraded, &session).await;
        });
    }

    /// Supersedes any pending save and writes `session` now, after a save
    /// already in flight has finished.
    pub async fn flush(&self, session: &OnboardingSession) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        let _write_guard = self.write_lock.lock().await;
        if self.is_degraded() {
            return;
        }
        save_or_degrade(self.store.as_ref(), &self.degraded, session).await;
    }

    /// Drops the pending save and waits for one already in flight.
    pub async fn cancel_pending(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        drop(self.write_lock.lock().await);
    }

    /// Loads a saved session. Read failures degrade and are treated as a fresh start.
    pub async fn load(&self, user_id: &UserId, flow_type: FlowType) -> Option<OnboardingSession> {
        if self.is_degraded() {
            return None;
        }
        match self.store.load(user_id, flow_type).await {
            Ok(session) => session,
            Err(err) => {
                self.degrade(&ProgressKey::new(user_id.clone(), flow_type), &err);
                None
            }
        }
    }

    pub async fn clear(&self, user_id: &UserId, flow_type: FlowType) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        let _write_guard = self.write_lock.lock().await;
        if self.is_degraded() {
            return;
        }
        if let Err(err) = self.store.clear(user_id, flow_type).await {
            self.degrade(&ProgressKey::new(user_id.clone(), flow_type), &err);
        }
    }

    fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::SeqCst)
    }

    fn degrade(&self, key: &ProgressKey, err: &ProgressStoreError) {
        mark_degraded(&self.degraded, key, err);
    }
}

impl Drop for SessionPersister {
    fn drop(&mut self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

async fn save_or_degrade(
    store: &dyn ProgressStorePort,
    degraded: &AtomicBool,
    session: &OnboardingSession,
) {
    match store.save(session).await {
        Ok(()) => debug!(key = %ProgressKey::of(session), "session persisted"),
        Err(err) => mark_degraded(degraded, &ProgressKey::of(session), &err),
    }
}

fn mark_degraded(degraded: &AtomicBool, key: &ProgressKey, err: &ProgressStoreError) {
    if !degraded.swap(true, Ordering::SeqCst) {
        warn!(key = %key, error = %err, "progress store failed, continuing in memory");
    }
}
