//! # Dependency Injection
//!
//! Resolves the loaded `AppConfig` into concrete settings (this is where
//! defaults live) and builds the infrastructure adapters behind their ports.
//!
//! This is the only place allowed to depend on vf-infra and vf-app at the
//! same time. It assembles; it does not decide workflow behaviour.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::sync::{mpsc, Mutex};
use vf_app::usecases::onboarding::DEFAULT_SAVE_DEBOUNCE;
use vf_core::config::AppConfig;
use vf_core::otp::{ChallengeKey, OtpPolicy};
use vf_core::ports::{
    ClockPort, DocumentRepositoryPort, OtpDeliveryPort, ProgressStorePort, TimerPort,
};
use vf_core::verification::UploadPolicy;
use vf_infra::{FileProgressStore, InMemoryDocumentRepository, LogOtpDelivery, SystemClock, Timer};

pub const APP_DIR_NAME: &str = "verifyflow";

/// Settings with every default applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSettings {
    pub data_dir: PathBuf,
    pub log_dir: Option<PathBuf>,
    pub save_debounce: Duration,
    pub otp_policy: OtpPolicy,
    pub upload_policy: UploadPolicy,
}

/// `<platform data dir>/verifyflow`
pub fn default_data_dir() -> anyhow::Result<PathBuf> {
    let base = dirs::data_local_dir().context("platform data directory is not available")?;
    Ok(base.join(APP_DIR_NAME))
}

pub fn resolve_settings(config: &AppConfig) -> anyhow::Result<ResolvedSettings> {
    let data_dir = if config.data_dir.as_os_str().is_empty() {
        default_data_dir()?
    } else {
        config.data_dir.clone()
    };
    let log_dir = (!config.log_dir.as_os_str().is_empty()).then(|| config.log_dir.clone());

    let defaults = OtpPolicy::default();
    let otp_policy = OtpPolicy {
        code_length: config.otp_code_length.unwrap_or(defaults.code_length),
        ttl_secs: config.otp_ttl_secs.unwrap_or(defaults.ttl_secs),
        max_attempts: config.otp_max_attempts.unwrap_or(defaults.max_attempts),
        lockout_secs: config.otp_lockout_secs.unwrap_or(defaults.lockout_secs),
    };
    otp_policy.validate().context("invalid [otp] settings")?;

    let defaults = UploadPolicy::default();
    let upload_policy = UploadPolicy {
        max_bytes: config.max_upload_bytes.unwrap_or(defaults.max_bytes),
        allowed_content_types: if config.allowed_content_types.is_empty() {
            defaults.allowed_content_types
        } else {
            config.allowed_content_types.clone()
        },
    };
    if upload_policy.max_bytes == 0 {
        anyhow::bail!("documents.max_upload_bytes must be greater than zero");
    }

    Ok(ResolvedSettings {
        data_dir,
        log_dir,
        save_debounce: config
            .save_debounce_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_SAVE_DEBOUNCE),
        otp_policy,
        upload_policy,
    })
}

/// Adapters behind their ports, ready to be handed to the use cases.
pub struct AppDeps {
    pub progress_store: Arc<dyn ProgressStorePort>,
    pub documents: Arc<dyn DocumentRepositoryPort>,
    pub otp_delivery: Arc<dyn OtpDeliveryPort>,
    pub clock: Arc<dyn ClockPort>,
    pub timer: Arc<Mutex<dyn TimerPort>>,
    /// Keys whose expiry countdown elapsed; drained by the OTP service.
    pub expired_challenges: mpsc::UnboundedReceiver<ChallengeKey>,
}

pub fn wire_dependencies(settings: &ResolvedSettings) -> AppDeps {
    let (expiry_tx, expiry_rx) = mpsc::unbounded_channel();

    AppDeps {
        progress_store: Arc::new(FileProgressStore::with_defaults(&settings.data_dir)),
        documents: Arc::new(InMemoryDocumentRepository::new()),
        otp_delivery: Arc::new(LogOtpDelivery),
        clock: Arc::new(SystemClock),
        timer: Arc::new(Mutex::new(Timer::with_notifier(expiry_tx))),
        expired_challenges: expiry_rx,
    }
}
