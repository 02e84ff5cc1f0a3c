//! In-memory document repository.
//!
//! Documents live in upload order behind one `RwLock`. Owner snapshots are
//! taken under a single read guard and mutations run under the write guard,
//! so a tier recompute never observes a half-applied review.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use vf_core::ids::{DocumentId, UserId};
use vf_core::ports::{DocumentMutation, DocumentRepositoryPort};
use vf_core::verification::{Document, DocumentError, DocumentStatus};

#[derive(Default)]
struct Inner {
    order: Vec<DocumentId>,
    documents: HashMap<DocumentId, Document>,
}

impl Inner {
    fn in_order(&self) -> impl Iterator<Item = &Document> {
        self.order.iter().filter_map(|id| self.documents.get(id))
    }
}

#[derive(Default)]
pub struct InMemoryDocumentRepository {
    inner: RwLock<Inner>,
}

impl InMemoryDocumentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentRepositoryPort for InMemoryDocumentRepository {
    async fn insert(&self, document: Document) -> Result<(), DocumentError> {
        let mut inner = self.inner.write().await;
        let id = document.id().clone();
        if inner.documents.insert(id.clone(), document).is_none() {
            inner.order.push(id);
        }
        Ok(())
    }

    async fn get(&self, id: &DocumentId) -> Result<Option<Document>, DocumentError> {
        Ok(self.inner.read().await.documents.get(id).cloned())
    }

    async fn apply(
        &self,
        id: &DocumentId,
        mutation: DocumentMutation,
    ) -> Result<Document, DocumentError> {
        let mut inner = self.inner.write().await;
        let stored = inner
            .documents
            .get_mut(id)
            .ok_or_else(|| DocumentError::NotFound(id.clone()))?;

        let mut updated = stored.clone();
        mutation(&mut updated)?;
        *stored = updated.clone();
        Ok(updated)
    }

    async fn snapshot_for_owner(&self, owner: &UserId) -> Result<Vec<Document>, DocumentError> {
        let inner = self.inner.read().await;
        Ok(inner
            .in_order()
            .filter(|doc| doc.owner_id() == owner)
            .cloned()
            .collect())
    }

    async fn list_by_status(&self, status: DocumentStatus) -> Result<Vec<Document>, DocumentError> {
        let inner = self.inner.read().await;
        Ok(inner
            .in_order()
            .filter(|doc| doc.status() == status)
            .cloned()
            .collect())
    }
}
