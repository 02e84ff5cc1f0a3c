//! Onboarding orchestrator.
//!
//! This module drives one user's onboarding session through the step
//! sequencer and hands every change to the session persister.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, info_span, Instrument};
use vf_core::ids::UserId;
use vf_core::onboarding::{
    AccountType, FlowType, OnboardingSession, Step, StepId, StepProgress, StepSequencer,
    ValidationErrors,
};
use vf_core::ports::{ClockPort, ProgressStorePort};

use super::context::{ActiveSession, OnboardingContext};
use super::persister::{PersistenceStatus, SessionPersister};

/// Errors produced by the onboarding orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OnboardingError {
    #[error("no onboarding session has been started")]
    NotStarted,
    #[error("onboarding cannot finish on step {current}")]
    NotFinished { current: StepId },
}

/// Result of an advance attempt. A blocked advance is not an error: the
/// field errors of the current step are returned for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdvanceOutcome {
    pub session: OnboardingSession,
    pub advanced: bool,
    pub errors: ValidationErrors,
}

/// How a dispatch hands the updated session to the persister.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Persist {
    Skip,
    Debounced,
    Immediate,
}

pub struct OnboardingOrchestrator {
    context: Arc<OnboardingContext>,
    persister: Arc<SessionPersister>,
    clock: Arc<dyn ClockPort>,
}

impl OnboardingOrchestrator {
    pub fn new(persister: Arc<SessionPersister>, clock: Arc<dyn ClockPort>) -> Self {
        Self {
            context: OnboardingContext::default().arc(),
            persister,
            clock,
        }
    }

    pub fn from_ports(
        store: Arc<dyn ProgressStorePort>,
        clock: Arc<dyn ClockPort>,
        save_debounce: Duration,
    ) -> Self {
        Self::new(Arc::new(SessionPersister::new(store, save_debounce)), clock)
    }

    pub fn persistence_status(&self) -> PersistenceStatus {
        self.persister.status()
    }

    /// Resumes the saved session for `(user_id, flow_type)` or starts a fresh
    /// one. A resumed session keeps its saved account type.
    pub async fn start_or_resume(
        &self,
        user_id: UserId,
        flow_type: FlowType,
        account_type: AccountType,
    ) -> OnboardingSession {
        let _dispatch_guard = self.context.acquire_dispatch_lock().await;
        let span = info_span!(
            "usecase.onboarding.start_or_resume",
            user_id = %user_id,
            flow_type = %flow_type
        );
        async {
            self.persister.cancel_pending().await;
            let active = match self.persister.load(&user_id, flow_type).await {
                Some(session) => {
                    let sequencer = StepSequencer::for_account(session.account_type());
                    info!(
                        step = %sequencer.current_step(&session).id,
                        account_type = %session.account_type(),
                        "onboarding resumed"
                    );
                    ActiveSession { sequencer, session }
                }
                None => {
                    let session =
                        OnboardingSession::new(user_id, flow_type, account_type, self.clock.now());
                    self.persister.flush(&session).await;
                    info!(account_type = %account_type, "onboarding started");
                    ActiveSession {
                        sequencer: StepSequencer::for_account(account_type),
                        session,
                    }
                }
            };
            let session = active.session.clone();
            self.context.set_active(active).await;
            session
        }
        .instrument(span)
        .await
    }

    pub async fn session(&self) -> Result<OnboardingSession, OnboardingError> {
        Ok(self.active().await?.session)
    }

    pub async fn steps(&self) -> Result<Vec<Step>, OnboardingError> {
        Ok(self.active().await?.sequencer.steps().to_vec())
    }

    pub async fn current_step(&self) -> Result<Step, OnboardingError> {
        let active = self.active().await?;
        Ok(active.sequencer.current_step(&active.session))
    }

    pub async fn can_advance(&self) -> Result<bool, OnboardingError> {
        let active = self.active().await?;
        Ok(active.sequencer.can_advance(&active.session))
    }

    pub async fn current_errors(&self) -> Result<ValidationErrors, OnboardingError> {
        let active = self.active().await?;
        Ok(active.sequencer.current_errors(&active.session))
    }

    pub async fn progress(&self) -> Result<StepProgress, OnboardingError> {
        let active = self.active().await?;
        Ok(active.sequencer.progress(&active.session))
    }

    pub async fn set_field(
        &self,
        name: impl Into<String>,
        value: Value,
    ) -> Result<OnboardingSession, OnboardingError> {
        let name = name.into();
        self.dispatch("set_field", move |active, now| {
            let changed = active.session.set_field(name, value, now);
            let persist = if changed { Persist::Debounced } else { Persist::Skip };
            (active.session.clone(), persist)
        })
        .await
    }

    pub async fn clear_field(&self, name: &str) -> Result<OnboardingSession, OnboardingError> {
        let name = name.to_string();
        self.dispatch("clear_field", move |active, now| {
            let changed = active.session.clear_field(&name, now);
            let persist = if changed { Persist::Debounced } else { Persist::Skip };
            (active.session.clone(), persist)
        })
        .await
    }

    pub async fn change_account_type(
        &self,
        account_type: AccountType,
    ) -> Result<OnboardingSession, OnboardingError> {
        self.dispatch("change_account_type", move |active, now| {
            let from = active.session.account_type();
            let mut session = active
                .sequencer
                .change_account_type(active.session.clone(), account_type);
            session.touch(now);
            info!(
                from = %from,
                to = %account_type,
                steps = active.sequencer.steps().len(),
                "account type changed"
            );
            active.session = session.clone();
            (session, Persist::Immediate)
        })
        .await
    }

    pub async fn advance(&self) -> Result<AdvanceOutcome, OnboardingError> {
        self.dispatch("advance", |active, now| {
            let errors = active.sequencer.current_errors(&active.session);
            if !active.sequencer.can_advance(&active.session) {
                debug!(errors = ?errors, "advance blocked by validation");
                let outcome = AdvanceOutcome {
                    session: active.session.clone(),
                    advanced: false,
                    errors,
                };
                return (outcome, Persist::Skip);
            }
            navigate(active, now, "advance", |sequencer, session| {
                sequencer.advance(session)
            });
            let outcome = AdvanceOutcome {
                session: active.session.clone(),
                advanced: true,
                errors: ValidationErrors::new(),
            };
            (outcome, Persist::Immediate)
        })
        .await
    }

    /// Moves past an optional step. Required steps are left untouched.
    pub async fn skip(&self) -> Result<OnboardingSession, OnboardingError> {
        self.dispatch("skip", |active, now| {
            if active.sequencer.current_step(&active.session).required {
                return (active.session.clone(), Persist::Skip);
            }
            navigate(active, now, "skip", |sequencer, session| sequencer.skip(session));
            (active.session.clone(), Persist::Immediate)
        })
        .await
    }

    pub async fn back(&self) -> Result<OnboardingSession, OnboardingError> {
        self.dispatch("back", |active, now| {
            navigate(active, now, "back", |sequencer, session| sequencer.back(session));
            (active.session.clone(), Persist::Immediate)
        })
        .await
    }

    /// Writes any pending field edits now.
    pub async fn flush(&self) -> Result<(), OnboardingError> {
        let _dispatch_guard = self.context.acquire_dispatch_lock().await;
        let active = self.active().await?;
        self.persister.flush(&active.session).await;
        Ok(())
    }

    /// Ends a session that reached its terminal step and clears its saved progress.
    pub async fn finish(&self) -> Result<OnboardingSession, OnboardingError> {
        let _dispatch_guard = self.context.acquire_dispatch_lock().await;
        let active = self.active().await?;
        if !active.sequencer.is_terminal(&active.session) {
            return Err(OnboardingError::NotFinished {
                current: active.sequencer.current_step(&active.session).id,
            });
        }
        self.end(active, "onboarding finished").await
    }

    /// Drops the active session and its saved progress regardless of position.
    pub async fn abandon(&self) -> Result<OnboardingSession, OnboardingError> {
        let _dispatch_guard = self.context.acquire_dispatch_lock().await;
        let active = self.active().await?;
        self.end(active, "onboarding abandoned").await
    }

    async fn end(
        &self,
        active: ActiveSession,
        message: &'static str,
    ) -> Result<OnboardingSession, OnboardingError> {
        let session = active.session;
        self.persister
            .clear(session.user_id(), session.flow_type())
            .await;
        self.context.take_active().await;
        info!(
            user_id = %session.user_id(),
            flow_type = %session.flow_type(),
            "{message}"
        );
        Ok(session)
    }

    async fn active(&self) -> Result<ActiveSession, OnboardingError> {
        self.context
            .get_active()
            .await
            .ok_or(OnboardingError::NotStarted)
    }

    async fn dispatch<T, F>(&self, operation: &'static str, apply: F) -> Result<T, OnboardingError>
    where
        F: FnOnce(&mut ActiveSession, DateTime<Utc>) -> (T, Persist),
    {
        // Serialize read-modify-write so concurrent edits never overwrite each other.
        let _dispatch_guard = self.context.acquire_dispatch_lock().await;

        let span = info_span!("usecase.onboarding.dispatch", operation);
        async {
            let mut active = self.active().await?;
            let (result, persist) = apply(&mut active, self.clock.now());
            let session = active.session.clone();
            self.context.set_active(active).await;

            match persist {
                Persist::Skip => {}
                Persist::Debounced => self.persister.schedule(session).await,
                Persist::Immediate => self.persister.flush(&session).await,
            }
            Ok(result)
        }
        .instrument(span)
        .await
    }
}

fn navigate(
    active: &mut ActiveSession,
    now: DateTime<Utc>,
    action: &'static str,
    step: impl FnOnce(&StepSequencer, OnboardingSession) -> OnboardingSession,
) {
    let from = active.sequencer.current_step(&active.session).id;
    let mut session = step(&active.sequencer, active.session.clone());
    session.touch(now);
    let to = active.sequencer.current_step(&session).id;
    info!(action, from = %from, to = %to, "onboarding step transition");
    active.session = session;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use vf_core::ports::ProgressStoreError;
    use vf_infra::{InMemoryProgressStore, SystemClock};

    fn orchestrator(store: Arc<dyn ProgressStorePort>) -> OnboardingOrchestrator {
        OnboardingOrchestrator::from_ports(store, Arc::new(SystemClock), Duration::ZERO)
    }

    async fn fill_profile(orchestrator: &OnboardingOrchestrator) {
        orchestrator.set_field("firstName", json!("Ada")).await.unwrap();
        orchestrator.set_field("lastName", json!("Lovelace")).await.unwrap();
        orchestrator
            .set_field("email", json!("ada@example.com"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn operations_require_a_started_session() {
        let orchestrator = orchestrator(Arc::new(InMemoryProgressStore::new()));

        assert_eq!(orchestrator.advance().await, Err(OnboardingError::NotStarted));
        assert_eq!(orchestrator.steps().await, Err(OnboardingError::NotStarted));
    }

    #[tokio::test]
    async fn blocked_advance_reports_field_errors() {
        let orchestrator = orchestrator(Arc::new(InMemoryProgressStore::new()));
        orchestrator
            .start_or_resume(UserId::from("u1"), FlowType::Registration, AccountType::Individual)
            .await;
        orchestrator.advance().await.unwrap();

        let outcome = orchestrator.advance().await.unwrap();

        assert!(!outcome.advanced);
        assert_eq!(outcome.session.current_step_index(), 1);
        assert_eq!(outcome.errors.len(), 3);
    }

    #[tokio::test]
    async fn skip_is_ignored_on_required_steps() {
        let orchestrator = orchestrator(Arc::new(InMemoryProgressStore::new()));
        orchestrator
            .start_or_resume(UserId::from("u1"), FlowType::Registration, AccountType::Individual)
            .await;
        orchestrator.skip().await.unwrap();

        let session = orchestrator.skip().await.unwrap();

        assert_eq!(session.current_step_index(), 1);
        assert_eq!(orchestrator.current_step().await.unwrap().id, StepId::Profile);
    }

    #[tokio::test]
    async fn advance_persists_immediately() {
        let store = Arc::new(InMemoryProgressStore::new());
        let orchestrator = OnboardingOrchestrator::from_ports(
            store.clone(),
            Arc::new(SystemClock),
            Duration::from_secs(3600),
        );
        orchestrator
            .start_or_resume(UserId::from("u1"), FlowType::Registration, AccountType::Individual)
            .await;
        orchestrator.advance().await.unwrap();
        fill_profile(&orchestrator).await;

        let outcome = orchestrator.advance().await.unwrap();

        assert!(outcome.advanced);
        let saved = store
            .load(&UserId::from("u1"), FlowType::Registration)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(saved, outcome.session);
        assert_eq!(saved.current_step_index(), 2);
    }

    #[tokio::test]
    async fn changing_account_type_reshapes_steps() {
        let orchestrator = orchestrator(Arc::new(InMemoryProgressStore::new()));
        orchestrator
            .start_or_resume(UserId::from("u1"), FlowType::SellerOnboarding, AccountType::Individual)
            .await;
        assert!(!orchestrator
            .steps()
            .await
            .unwrap()
            .iter()
            .any(|step| step.id == StepId::BusinessSetup));

        orchestrator
            .change_account_type(AccountType::Business)
            .await
            .unwrap();

        let ids: Vec<StepId> = orchestrator
            .steps()
            .await
            .unwrap()
            .iter()
            .map(|step| step.id)
            .collect();
        assert!(ids.contains(&StepId::BusinessSetup));
        assert!(ids.contains(&StepId::SellerTools));
    }

    #[tokio::test]
    async fn finish_requires_terminal_step_and_clears_progress() {
        let store = Arc::new(InMemoryProgressStore::new());
        let orchestrator = orchestrator(store.clone());
        orchestrator
            .start_or_resume(UserId::from("u1"), FlowType::Registration, AccountType::Individual)
            .await;

        assert_eq!(
            orchestrator.finish().await,
            Err(OnboardingError::NotFinished {
                current: StepId::Welcome
            })
        );

        orchestrator.abandon().await.unwrap();
        assert!(store.is_empty().await);
        assert_eq!(orchestrator.session().await, Err(OnboardingError::NotStarted));
    }

    struct BrokenStore;

    #[async_trait::async_trait]
    impl ProgressStorePort for BrokenStore {
        async fn save(&self, _session: &OnboardingSession) -> Result<(), ProgressStoreError> {
            Err(ProgressStoreError::Unavailable("read-only volume".into()))
        }

        async fn load(
            &self,
            _user_id: &UserId,
            _flow_type: FlowType,
        ) -> Result<Option<OnboardingSession>, ProgressStoreError> {
            Ok(None)
        }

        async fn clear(
            &self,
            _user_id: &UserId,
            _flow_type: FlowType,
        ) -> Result<(), ProgressStoreError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn store_failure_degrades_but_workflow_continues() {
        let orchestrator = orchestrator(Arc::new(BrokenStore));
        orchestrator
            .start_or_resume(UserId::from("u1"), FlowType::Registration, AccountType::Individual)
            .await;

        assert_eq!(orchestrator.persistence_status(), PersistenceStatus::Degraded);

        orchestrator.advance().await.unwrap();
        fill_profile(&orchestrator).await;
        let outcome = orchestrator.advance().await.unwrap();
        assert!(outcome.advanced);
        assert_eq!(outcome.session.current_step_index(), 2);
    }
}
