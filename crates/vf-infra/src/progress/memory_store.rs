use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use vf_core::ids::UserId;
use vf_core::onboarding::{FlowType, OnboardingSession};
use vf_core::ports::{ProgressKey, ProgressStoreError, ProgressStorePort};

/// Process-local progress store, used when no data directory is configured
/// and in tests.
#[derive(Default)]
pub struct InMemoryProgressStore {
    sessions: RwLock<HashMap<ProgressKey, OnboardingSession>>,
}

impl InMemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl ProgressStorePort for InMemoryProgressStore {
    async fn save(&self, session: &OnboardingSession) -> Result<(), ProgressStoreError> {
        self.sessions
            .write()
            .await
            .insert(ProgressKey::of(session), session.clone());
        Ok(())
    }

    async fn load(
        &self,
        user_id: &UserId,
        flow_type: FlowType,
    ) -> Result<Option<OnboardingSession>, ProgressStoreError> {
        let key = ProgressKey::new(user_id.clone(), flow_type);
        Ok(self.sessions.read().await.get(&key).cloned())
    }

    async fn clear(&self, user_id: &UserId, flow_type: FlowType) -> Result<(), ProgressStoreError> {
        let key = ProgressKey::new(user_id.clone(), flow_type);
        self.sessions.write().await.remove(&key);
        Ok(())
    }
}
