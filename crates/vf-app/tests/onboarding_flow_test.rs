use std::sync::Arc;
use std::sync::Once;
use std::time::Duration;

use serde_json::json;
use vf_app::usecases::{OnboardingError, OnboardingOrchestrator, PersistenceStatus};
use vf_core::ids::UserId;
use vf_core::onboarding::{AccountType, FlowType, StepId, ValidationErrorCode};
use vf_core::ports::ProgressStorePort;
use vf_infra::{FileProgressStore, InMemoryProgressStore, SystemClock};

static TRACE_INIT: Once = Once::new();

fn init_tracing() {
    TRACE_INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

fn orchestrator_over(store: Arc<dyn ProgressStorePort>, debounce: Duration) -> OnboardingOrchestrator {
    OnboardingOrchestrator::from_ports(store, Arc::new(SystemClock), debounce)
}

async fn fill_profile(orchestrator: &OnboardingOrchestrator) {
    for (field, value) in [
        ("firstName", json!("Ada")),
        ("lastName", json!("Lovelace")),
        ("email", json!("ada@example.com")),
        ("phone", json!("+44 20 7946 0958")),
    ] {
        orchestrator.set_field(field, value).await.expect("set field");
    }
}

#[tokio::test]
async fn business_setup_blocks_without_business_name() {
    init_tracing();
    let orchestrator = orchestrator_over(Arc::new(InMemoryProgressStore::new()), Duration::ZERO);
    orchestrator
        .start_or_resume(UserId::from("biz-1"), FlowType::SellerOnboarding, AccountType::Business)
        .await;

    orchestrator.advance().await.expect("welcome");
    fill_profile(&orchestrator).await;
    let outcome = orchestrator.advance().await.expect("profile");
    assert!(outcome.advanced);
    assert_eq!(
        orchestrator.current_step().await.expect("current step").id,
        StepId::BusinessSetup
    );

    orchestrator
        .set_field("companyName", json!("Analytical Engines Ltd"))
        .await
        .expect("company name");
    assert!(!orchestrator.can_advance().await.expect("can advance"));

    let outcome = orchestrator.advance().await.expect("business setup");
    assert!(!outcome.advanced);
    assert_eq!(outcome.errors.len(), 1);
    assert_eq!(
        outcome.errors.get("businessName"),
        Some(&ValidationErrorCode::Required)
    );

    orchestrator
        .set_field("businessName", json!("Engines"))
        .await
        .expect("business name");
    let outcome = orchestrator.advance().await.expect("business setup");
    assert!(outcome.advanced);
    assert_eq!(
        orchestrator.current_step().await.expect("current step").id,
        StepId::Preferences
    );
}

#[tokio::test]
async fn full_registration_reaches_completion() {
    init_tracing();
    let orchestrator = orchestrator_over(Arc::new(InMemoryProgressStore::new()), Duration::ZERO);
    orchestrator
        .start_or_resume(UserId::from("ind-1"), FlowType::Registration, AccountType::Individual)
        .await;

    orchestrator.advance().await.expect("welcome");
    fill_profile(&orchestrator).await;
    assert!(orchestrator.advance().await.expect("profile").advanced);
    orchestrator.skip().await.expect("preferences");
    orchestrator.skip().await.expect("notifications");

    orchestrator.set_field("password", json!("hunter22")).await.expect("password");
    orchestrator
        .set_field("confirmPassword", json!("hunter23"))
        .await
        .expect("confirm");
    let outcome = orchestrator.advance().await.expect("security");
    assert_eq!(
        outcome.errors.get("confirmPassword"),
        Some(&ValidationErrorCode::Mismatch)
    );

    orchestrator
        .set_field("confirmPassword", json!("hunter22"))
        .await
        .expect("confirm");
    assert!(orchestrator.advance().await.expect("security").advanced);
    assert_eq!(
        orchestrator.current_step().await.expect("current step").id,
        StepId::Completion
    );

    let progress = orchestrator.progress().await.expect("progress");
    assert_eq!(progress.total, 6);
    assert_eq!(progress.completed, 5);

    let session = orchestrator.finish().await.expect("finish");
    assert!(session.is_step_completed(StepId::Security));
}

#[tokio::test]
async fn saved_progress_survives_restart() {
    init_tracing();
    let temp_dir = tempfile::TempDir::new().expect("temp dir");
    let user = UserId::from("resume-1");

    {
        let store = Arc::new(FileProgressStore::with_defaults(temp_dir.path()));
        let orchestrator = orchestrator_over(store, Duration::from_secs(60));
        orchestrator
            .start_or_resume(user.clone(), FlowType::VendorKyc, AccountType::Hybrid)
            .await;
        orchestrator.advance().await.expect("welcome");
        fill_profile(&orchestrator).await;
        orchestrator.advance().await.expect("profile");
        orchestrator
            .set_field("businessName", json!("Hybrid Goods"))
            .await
            .expect("business name");
        orchestrator.flush().await.expect("flush");
        assert_eq!(orchestrator.persistence_status(), PersistenceStatus::Healthy);
    }

    let store = Arc::new(FileProgressStore::with_defaults(temp_dir.path()));
    let orchestrator = orchestrator_over(store, Duration::from_secs(60));
    let resumed = orchestrator
        .start_or_resume(user, FlowType::VendorKyc, AccountType::Individual)
        .await;

    assert_eq!(resumed.account_type(), AccountType::Hybrid);
    assert_eq!(resumed.current_step_index(), 2);
    assert_eq!(resumed.field("businessName"), Some(&json!("Hybrid Goods")));
    assert_eq!(resumed.field("phone"), Some(&json!("+44 20 7946 0958")));
    assert_eq!(
        orchestrator.current_step().await.expect("current step").id,
        StepId::BusinessSetup
    );
}

#[tokio::test(start_paused = true)]
async fn field_edits_are_saved_after_debounce() {
    let store = Arc::new(InMemoryProgressStore::new());
    let orchestrator = orchestrator_over(store.clone(), Duration::from_millis(500));
    let user = UserId::from("debounce-1");
    orchestrator
        .start_or_resume(user.clone(), FlowType::Registration, AccountType::Individual)
        .await;

    orchestrator.set_field("firstName", json!("Ada")).await.expect("set");
    tokio::task::yield_now().await;
    let saved = store.load(&user, FlowType::Registration).await.expect("load");
    assert_eq!(saved.expect("initial save").field("firstName"), None);

    tokio::time::sleep(Duration::from_millis(600)).await;
    let saved = store.load(&user, FlowType::Registration).await.expect("load");
    assert_eq!(saved.expect("debounced save").field("firstName"), Some(&json!("Ada")));
}

async fn set_passwords(orchestrator: &OnboardingOrchestrator) {
    orchestrator.set_field("password", json!("hunter22")).await.expect("password");
    orchestrator
        .set_field("confirmPassword", json!("hunter22"))
        .await
        .expect("confirm");
}

#[tokio::test]
async fn switching_to_business_reopens_business_setup() {
    let orchestrator = orchestrator_over(Arc::new(InMemoryProgressStore::new()), Duration::ZERO);
    orchestrator
        .start_or_resume(UserId::from("switch-1"), FlowType::SellerOnboarding, AccountType::Individual)
        .await;
    orchestrator.advance().await.expect("welcome");
    fill_profile(&orchestrator).await;
    orchestrator.advance().await.expect("profile");
    assert_eq!(
        orchestrator.current_step().await.expect("current step").id,
        StepId::Preferences
    );

    let session = orchestrator
        .change_account_type(AccountType::Business)
        .await
        .expect("change account type");

    assert_eq!(
        orchestrator.current_step().await.expect("current step").id,
        StepId::BusinessSetup
    );
    assert_eq!(session.current_step_index(), 2);
    assert!(session.is_step_completed(StepId::Profile));
}

#[tokio::test]
async fn switching_to_business_at_security_cannot_finish_without_business_setup() {
    let orchestrator = orchestrator_over(Arc::new(InMemoryProgressStore::new()), Duration::ZERO);
    orchestrator
        .start_or_resume(UserId::from("switch-2"), FlowType::SellerOnboarding, AccountType::Individual)
        .await;
    orchestrator.advance().await.expect("welcome");
    fill_profile(&orchestrator).await;
    orchestrator.advance().await.expect("profile");
    orchestrator.skip().await.expect("preferences");
    orchestrator.skip().await.expect("notifications");
    set_passwords(&orchestrator).await;
    assert_eq!(
        orchestrator.current_step().await.expect("current step").id,
        StepId::Security
    );

    orchestrator
        .change_account_type(AccountType::Business)
        .await
        .expect("change account type");
    let outcome = orchestrator.advance().await.expect("advance");

    assert!(!outcome.advanced);
    assert_eq!(
        outcome.errors.get("businessName"),
        Some(&ValidationErrorCode::Required)
    );
    assert!(!outcome.session.is_step_completed(StepId::BusinessSetup));
    assert_eq!(
        orchestrator.finish().await.expect_err("not finished"),
        OnboardingError::NotFinished {
            current: StepId::BusinessSetup
        }
    );
}

#[tokio::test]
async fn leaving_business_at_seller_tools_lands_on_security() {
    let orchestrator = orchestrator_over(Arc::new(InMemoryProgressStore::new()), Duration::ZERO);
    orchestrator
        .start_or_resume(UserId::from("switch-3"), FlowType::SellerOnboarding, AccountType::Business)
        .await;
    orchestrator.advance().await.expect("welcome");
    fill_profile(&orchestrator).await;
    orchestrator.advance().await.expect("profile");
    orchestrator
        .set_field("businessName", json!("Engines"))
        .await
        .expect("business name");
    orchestrator
        .set_field("companyName", json!("Analytical Engines Ltd"))
        .await
        .expect("company name");
    orchestrator.advance().await.expect("business setup");
    orchestrator.skip().await.expect("preferences");
    orchestrator.skip().await.expect("notifications");
    assert_eq!(
        orchestrator.current_step().await.expect("current step").id,
        StepId::SellerTools
    );

    let session = orchestrator
        .change_account_type(AccountType::Individual)
        .await
        .expect("change account type");

    assert_eq!(
        orchestrator.current_step().await.expect("current step").id,
        StepId::Security
    );
    assert!(!session.is_step_completed(StepId::Security));
    assert!(orchestrator.finish().await.is_err());

    set_passwords(&orchestrator).await;
    assert!(orchestrator.advance().await.expect("security").advanced);
    let session = orchestrator.finish().await.expect("finish");
    assert!(session.is_step_completed(StepId::Security));
}
