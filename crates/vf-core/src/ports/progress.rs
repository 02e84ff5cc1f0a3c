//! Progress store port
//!
//! This port defines the key-value contract for persisting and resuming
//! onboarding sessions. Implementations are provided by the infrastructure
//! layer (e.g., file-based storage).

use async_trait::async_trait;
use thiserror::Error;

use crate::ids::UserId;
use crate::onboarding::{FlowType, OnboardingSession};

#[derive(Debug, Error)]
pub enum ProgressStoreError {
    #[error("progress store unavailable: {0}")]
    Unavailable(String),

    #[error("progress data corrupt: {0}")]
    Corrupt(String),
}

/// Storage key of a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProgressKey {
    pub user_id: UserId,
    pub flow_type: FlowType,
}

impl ProgressKey {
    pub fn new(user_id: UserId, flow_type: FlowType) -> Self {
        Self { user_id, flow_type }
    }

    pub fn of(session: &OnboardingSession) -> Self {
        Self::new(session.user_id().clone(), session.flow_type())
    }
}

impl std::fmt::Display for ProgressKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.flow_type, self.user_id)
    }
}

#[async_trait]
pub trait ProgressStorePort: Send + Sync {
    /// Upsert keyed by `(user_id, flow_type)`. Must be idempotent.
    async fn save(&self, session: &OnboardingSession) -> Result<(), ProgressStoreError>;

    /// Most recently saved session, or `None` for a fresh start.
    async fn load(
        &self,
        user_id: &UserId,
        flow_type: FlowType,
    ) -> Result<Option<OnboardingSession>, ProgressStoreError>;

    /// Removes a finished or abandoned session. Missing keys are not an error.
    async fn clear(&self, user_id: &UserId, flow_type: FlowType)
        -> Result<(), ProgressStoreError>;
}
