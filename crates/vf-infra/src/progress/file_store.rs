//! File-based progress store
//!
//! One pretty-printed JSON document per `(flow, user)` pair, laid out as
//! `<base_dir>/<flow>/<hex(user_id)>.json`. Writes go through a temp file and
//! a rename so a crash mid-save never leaves a truncated session behind.

use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use tokio::fs;
use tracing::debug;
use uuid::Uuid;
use vf_core::ids::UserId;
use vf_core::onboarding::{FlowType, OnboardingSession};
use vf_core::ports::{ProgressKey, ProgressStoreError, ProgressStorePort};

pub const DEFAULT_PROGRESS_DIR: &str = "onboarding";

pub struct FileProgressStore {
    base_dir: PathBuf,
}

impl FileProgressStore {
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Store rooted at `<data_dir>/onboarding`.
    pub fn with_defaults(data_dir: &Path) -> Self {
        Self::new(data_dir.join(DEFAULT_PROGRESS_DIR))
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// User ids are opaque, so they are hex-encoded rather than trusted as file names.
    fn path_for(&self, user_id: &UserId, flow_type: FlowType) -> PathBuf {
        self.base_dir
            .join(flow_type.as_str())
            .join(format!("{}.json", hex::encode(user_id.as_str())))
    }

    async fn atomic_write(path: &Path, content: &str) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("create progress dir failed: {}", parent.display()))?;
        }

        // Unique per write so concurrent saves never rename each other's temp file.
        let tmp_path = path.with_extension(format!("json.{}.tmp", Uuid::new_v4().simple()));
        if let Err(err) = fs::write(&tmp_path, content).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(anyhow::Error::new(err)
                .context(format!("write temp progress failed: {}", tmp_path.display())));
        }

        if let Err(err) = fs::rename(&tmp_path, path).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(anyhow::Error::new(err).context(format!(
                "rename temp progress to target failed: {} -> {}",
                tmp_path.display(),
                path.display()
            )));
        }

        Ok(())
    }
}

fn unavailable(err: anyhow::Error) -> ProgressStoreError {
    ProgressStoreError::Unavailable(format!("{err:#}"))
}

#[async_trait]
impl ProgressStorePort for FileProgressStore {
    async fn save(&self, session: &OnboardingSession) -> Result<(), ProgressStoreError> {
        let path = self.path_for(session.user_id(), session.flow_type());
        let json = serde_json::to_string_pretty(session)
            .map_err(|e| ProgressStoreError::Corrupt(format!("serialize session failed: {e}")))?;

        Self::atomic_write(&path, &json).await.map_err(unavailable)?;
        debug!(key = %ProgressKey::of(session), "session saved");
        Ok(())
    }

    async fn load(
        &self,
        user_id: &UserId,
        flow_type: FlowType,
    ) -> Result<Option<OnboardingSession>, ProgressStoreError> {
        let path = self.path_for(user_id, flow_type);
        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(unavailable(
                    anyhow::Error::new(e).context(format!("read progress failed: {}", path.display())),
                ))
            }
        };

        if content.trim().is_empty() {
            return Ok(None);
        }

        let session: OnboardingSession = serde_json::from_str(&content).map_err(|e| {
            ProgressStoreError::Corrupt(format!("parse {} failed: {e}", path.display()))
        })?;

        if session.user_id() != user_id || session.flow_type() != flow_type {
            return Err(ProgressStoreError::Corrupt(format!(
                "{} holds {}, expected {}",
                path.display(),
                ProgressKey::of(&session),
                ProgressKey::new(user_id.clone(), flow_type)
            )));
        }

        Ok(Some(session))
    }

    async fn clear(&self, user_id: &UserId, flow_type: FlowType) -> Result<(), ProgressStoreError> {
        let path = self.path_for(user_id, flow_type);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(unavailable(
                anyhow::Error::new(e).context(format!("remove progress failed: {}", path.display())),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use tempfile::TempDir;
    use vf_core::onboarding::{AccountType, StepSequencer};

    fn session(user: &str) -> OnboardingSession {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        let mut session =
            OnboardingSession::new(UserId::from(user), FlowType::Registration, AccountType::Business, now);
        session.set_field("firstName", json!("Ada"), now);
        session.set_field("lastName", json!("Lovelace"), now);
        session.set_field("email", json!("ada@example.com"), now);
        session
    }

    #[tokio::test]
    async fn load_returns_none_when_nothing_saved() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileProgressStore::new(temp_dir.path().to_path_buf());

        let loaded = store
            .load(&UserId::from("nobody"), FlowType::Registration)
            .await
            .unwrap();

        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn save_then_load_restores_session() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileProgressStore::with_defaults(temp_dir.path());
        let sequencer = StepSequencer::for_account(AccountType::Business);
        let saved = sequencer.advance(sequencer.advance(session("user-1")));

        store.save(&saved).await.unwrap();
        let loaded = store
            .load(&UserId::from("user-1"), FlowType::Registration)
            .await
            .unwrap();

        assert_eq!(loaded, Some(saved));
    }

    #[tokio::test]
    async fn save_is_idempotent_upsert() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileProgressStore::new(temp_dir.path().to_path_buf());
        let session = session("user-2");

        store.save(&session).await.unwrap();
        store.save(&session).await.unwrap();

        let loaded = store
            .load(&UserId::from("user-2"), FlowType::Registration)
            .await
            .unwrap();
        assert_eq!(loaded, Some(session));
    }

    #[tokio::test]
    async fn flows_are_stored_independently() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileProgressStore::new(temp_dir.path().to_path_buf());

        store.save(&session("user-3")).await.unwrap();

        let other = store
            .load(&UserId::from("user-3"), FlowType::VendorKyc)
            .await
            .unwrap();
        assert!(other.is_none());
    }

    #[tokio::test]
    async fn user_ids_with_path_separators_stay_inside_base_dir() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileProgressStore::new(temp_dir.path().join("progress"));
        let session = session("../escape/attempt");

        store.save(&session).await.unwrap();

        assert!(!temp_dir.path().join("escape").exists());
        let loaded = store
            .load(&UserId::from("../escape/attempt"), FlowType::Registration)
            .await
            .unwrap();
        assert_eq!(loaded, Some(session));
    }

    #[tokio::test]
    async fn no_temp_file_is_left_after_save() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileProgressStore::new(temp_dir.path().to_path_buf());
        store.save(&session("user-4")).await.unwrap();

        let flow_dir = temp_dir.path().join("registration");
        let names: Vec<String> = std::fs::read_dir(&flow_dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();

        assert_eq!(names.len(), 1);
        assert!(names[0].ends_with(".json"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_saves_of_one_key_all_succeed() {
        let temp_dir = TempDir::new().unwrap();
        let store = std::sync::Arc::new(FileProgressStore::new(temp_dir.path().to_path_buf()));

        let writers: Vec<_> = (0..16)
            .map(|i| {
                let store = std::sync::Arc::clone(&store);
                let mut session = session("user-7");
                session.set_field("storeName", json!(format!("store-{i}")), Utc::now());
                tokio::spawn(async move { store.save(&session).await })
            })
            .collect();
        for writer in writers {
            writer.await.unwrap().unwrap();
        }

        let loaded = store
            .load(&UserId::from("user-7"), FlowType::Registration)
            .await
            .unwrap()
            .unwrap();
        let name = loaded.field("storeName").and_then(|v| v.as_str()).unwrap();
        assert!(name.starts_with("store-"));

        let leftovers = std::fs::read_dir(temp_dir.path().join("registration"))
            .unwrap()
            .count();
        assert_eq!(leftovers, 1);
    }

    #[tokio::test]
    async fn corrupt_file_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileProgressStore::new(temp_dir.path().to_path_buf());
        let path = store.path_for(&UserId::from("user-5"), FlowType::Registration);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{ not json").unwrap();

        let result = store.load(&UserId::from("user-5"), FlowType::Registration).await;

        assert!(matches!(result, Err(ProgressStoreError::Corrupt(_))));
    }

    #[tokio::test]
    async fn clear_removes_session_and_tolerates_missing() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileProgressStore::new(temp_dir.path().to_path_buf());
        store.save(&session("user-6")).await.unwrap();

        store.clear(&UserId::from("user-6"), FlowType::Registration).await.unwrap();
        store.clear(&UserId::from("user-6"), FlowType::Registration).await.unwrap();

        let loaded = store
            .load(&UserId::from("user-6"), FlowType::Registration)
            .await
            .unwrap();
        assert!(loaded.is_none());
    }
}
