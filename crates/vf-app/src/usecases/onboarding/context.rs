use std::sync::Arc;

use tokio::sync::Mutex;
use vf_core::onboarding::{OnboardingSession, StepSequencer};

/// The session being driven and the sequencer shaped for its account type.
#[derive(Debug, Clone)]
pub(crate) struct ActiveSession {
    pub sequencer: StepSequencer,
    pub session: OnboardingSession,
}

/// Shared onboarding context containing the active session and dispatch lock.
///
/// ## Lock Ordering
/// When acquiring both locks, acquire `dispatch_lock` first, then `active`.
/// - `dispatch_lock`: serializes mutating operations so a field write and an
///   advance never interleave between read and write-back.
/// - `active`: read by queries, written at the end of a dispatch.
#[derive(Clone, Default)]
pub(crate) struct OnboardingContext {
    active: Arc<Mutex<Option<ActiveSession>>>,
    dispatch_lock: Arc<Mutex<()>>,
}

impl OnboardingContext {
    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub async fn get_active(&self) -> Option<ActiveSession> {
        self.active.lock().await.clone()
    }

    pub async fn acquire_dispatch_lock(&self) -> tokio::sync::MutexGuard<'_, ()> {
        self.dispatch_lock.lock().await
    }

    /// Should only be called after acquiring `dispatch_lock`.
    pub async fn set_active(&self, active: ActiveSession) {
        *self.active.lock().await = Some(active);
    }

    /// Should only be called after acquiring `dispatch_lock`.
    pub async fn take_active(&self) -> Option<ActiveSession> {
        self.active.lock().await.take()
    }
}
