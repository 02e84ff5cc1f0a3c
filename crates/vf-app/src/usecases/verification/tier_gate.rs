//! Verification tier gate.
//!
//! Folds a user's documents into level statuses and keeps the latest standing
//! per user for benefit checks. Recomputes are serialized; each one reads a
//! single consistent snapshot from the repository.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, info_span, Instrument};
use vf_core::ids::UserId;
use vf_core::ports::DocumentRepositoryPort;
use vf_core::verification::{DocumentError, TierCatalog, TierStanding, VerificationLevel};

pub struct TierGate {
    catalog: TierCatalog,
    documents: Arc<dyn DocumentRepositoryPort>,
    standings: RwLock<HashMap<UserId, TierStanding>>,
    recompute_lock: Mutex<()>,
}

impl TierGate {
    pub fn new(catalog: TierCatalog, documents: Arc<dyn DocumentRepositoryPort>) -> Self {
        Self {
            catalog,
            documents,
            standings: RwLock::new(HashMap::new()),
            recompute_lock: Mutex::new(()),
        }
    }

    /// Gate over the default Basic → Verified → Trusted catalogue.
    pub fn from_ports(documents: Arc<dyn DocumentRepositoryPort>) -> Self {
        Self::new(TierCatalog::marketplace_default(), documents)
    }

    pub fn catalog(&self) -> &TierCatalog {
        &self.catalog
    }

    /// Re-folds every level of `user_id` from a fresh snapshot and logs
    /// each level whose status changed.
    pub async fn recompute(&self, user_id: &UserId) -> Result<TierStanding, DocumentError> {
        let _recompute_guard = self.recompute_lock.lock().await;

        let span = info_span!("usecase.tier_gate.recompute", user_id = %user_id);
        async {
            let snapshot = self.documents.snapshot_for_owner(user_id).await?;
            let standing = self.catalog.fold(&snapshot);
            debug!(documents = snapshot.len(), "documents folded");

            let previous = self.standing(user_id).await;
            for transition in standing.transitions_from(&previous) {
                info!(
                    level = transition.level,
                    from = %transition.from,
                    to = %transition.to,
                    "verification level transition"
                );
            }

            self.standings
                .write()
                .await
                .insert(user_id.clone(), standing.clone());
            Ok(standing)
        }
        .instrument(span)
        .await
    }

    /// Last computed standing, or the standing of a user without documents.
    pub async fn standing(&self, user_id: &UserId) -> TierStanding {
        self.standings
            .read()
            .await
            .get(user_id)
            .cloned()
            .unwrap_or_else(|| self.catalog.pending_standing())
    }

    pub async fn levels(&self, user_id: &UserId) -> Vec<VerificationLevel> {
        self.standing(user_id).await.levels().to_vec()
    }

    /// Highest level completed together with every level below it.
    pub async fn current_level(&self, user_id: &UserId) -> Option<u32> {
        self.standing(user_id).await.current_level()
    }

    pub async fn unlocked_benefits(&self, user_id: &UserId) -> BTreeSet<String> {
        self.standing(user_id).await.unlocked_benefits()
    }

    pub async fn is_unlocked(&self, user_id: &UserId, benefit: &str) -> bool {
        self.unlocked_benefits(user_id).await.contains(benefit)
    }
}
