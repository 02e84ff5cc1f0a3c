//! Application runtime with dependencies.
//!
//! `AppRuntime` owns the shared use cases (OTP service, review queue, tier
//! gate) and hands out per-session onboarding orchestrators that share the
//! same progress store and clock.

use std::sync::Arc;

use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::info;
use vf_app::usecases::{DocumentReviewQueue, OnboardingOrchestrator, OtpService, TierGate};
use vf_core::config::AppConfig;
use vf_core::ids::UserId;
use vf_core::onboarding::{FlowType, StepId, StepProgress, StepSequencer};
use vf_core::ports::{ClockPort, ProgressStorePort, ProgressStoreError};

use super::wiring::{resolve_settings, wire_dependencies, ResolvedSettings};

pub struct AppRuntime {
    settings: ResolvedSettings,
    progress_store: Arc<dyn ProgressStorePort>,
    clock: Arc<dyn ClockPort>,
    otp: Arc<OtpService>,
    review_queue: Arc<DocumentReviewQueue>,
    tier_gate: Arc<TierGate>,
    expiry_listener: JoinHandle<()>,
}

/// Read-only summary of a saved onboarding session.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressReport {
    pub user_id: UserId,
    pub flow_type: FlowType,
    pub current_step: StepId,
    pub progress: StepProgress,
    pub fields: Vec<String>,
}

/// Builds the runtime from a loaded config. Must run inside a tokio runtime.
pub fn create_runtime(config: &AppConfig) -> anyhow::Result<AppRuntime> {
    let settings = resolve_settings(config)?;
    let deps = wire_dependencies(&settings);

    let otp = Arc::new(OtpService::new(
        settings.otp_policy.clone(),
        deps.otp_delivery,
        deps.timer,
        deps.clock.clone(),
    ));
    let expiry_listener = otp.spawn_expiry_listener(deps.expired_challenges);

    let tier_gate = Arc::new(TierGate::from_ports(deps.documents.clone()));
    let review_queue = Arc::new(DocumentReviewQueue::new(
        deps.documents,
        tier_gate.clone(),
        settings.upload_policy.clone(),
        deps.clock.clone(),
    ));

    info!(data_dir = %settings.data_dir.display(), "runtime ready");

    Ok(AppRuntime {
        settings,
        progress_store: deps.progress_store,
        clock: deps.clock,
        otp,
        review_queue,
        tier_gate,
        expiry_listener,
    })
}

impl AppRuntime {
    pub fn settings(&self) -> &ResolvedSettings {
        &self.settings
    }

    /// A fresh orchestrator for one user session.
    pub fn onboarding(&self) -> OnboardingOrchestrator {
        OnboardingOrchestrator::from_ports(
            self.progress_store.clone(),
            self.clock.clone(),
            self.settings.save_debounce,
        )
    }

    pub fn otp(&self) -> Arc<OtpService> {
        self.otp.clone()
    }

    pub fn review_queue(&self) -> Arc<DocumentReviewQueue> {
        self.review_queue.clone()
    }

    pub fn tier_gate(&self) -> Arc<TierGate> {
        self.tier_gate.clone()
    }

    /// Summarises saved progress without starting or touching a session.
    pub async fn progress_report(
        &self,
        user_id: &UserId,
        flow_type: FlowType,
    ) -> Result<Option<ProgressReport>, ProgressStoreError> {
        let Some(session) = self.progress_store.load(user_id, flow_type).await? else {
            return Ok(None);
        };
        let sequencer = StepSequencer::for_account(session.account_type());
        Ok(Some(ProgressReport {
            user_id: session.user_id().clone(),
            flow_type,
            current_step: sequencer.current_step(&session).id,
            progress: sequencer.progress(&session),
            fields: session.field_data().keys().cloned().collect(),
        }))
    }

    pub fn shutdown(self) {
        self.expiry_listener.abort();
        info!("runtime stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::PathBuf;
    use vf_core::onboarding::AccountType;

    fn config_in(dir: &std::path::Path) -> AppConfig {
        AppConfig {
            data_dir: PathBuf::from(dir),
            save_debounce_ms: Some(0),
            ..AppConfig::empty()
        }
    }

    #[tokio::test]
    async fn progress_report_reflects_saved_session() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let runtime = create_runtime(&config_in(temp_dir.path())).unwrap();
        let user = UserId::from("report-1");

        let onboarding = runtime.onboarding();
        onboarding
            .start_or_resume(user.clone(), FlowType::Registration, AccountType::Individual)
            .await;
        onboarding.advance().await.unwrap();
        onboarding.set_field("firstName", json!("Ada")).await.unwrap();
        onboarding.flush().await.unwrap();

        let report = runtime
            .progress_report(&user, FlowType::Registration)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(report.current_step, StepId::Profile);
        assert_eq!(report.progress.completed, 1);
        assert_eq!(report.fields, vec!["firstName".to_string()]);
        assert!(runtime
            .progress_report(&user, FlowType::VendorKyc)
            .await
            .unwrap()
            .is_none());

        runtime.shutdown();
    }

    #[tokio::test]
    async fn runtime_shares_review_queue_and_tier_gate() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let runtime = create_runtime(&config_in(temp_dir.path())).unwrap();

        assert!(runtime.review_queue().pending().await.unwrap().is_empty());
        assert_eq!(
            runtime.tier_gate().current_level(&UserId::from("nobody")).await,
            None
        );
        assert_eq!(runtime.otp().policy().await.ttl_secs, 300);

        runtime.shutdown();
    }
}
