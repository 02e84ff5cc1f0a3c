use async_trait::async_trait;

use crate::ids::{DocumentId, UserId};
use crate::verification::{Document, DocumentError, DocumentStatus};

/// Atomic read-modify-write applied by [`DocumentRepositoryPort::apply`].
pub type DocumentMutation = Box<dyn FnOnce(&mut Document) -> Result<(), DocumentError> + Send>;

#[async_trait]
pub trait DocumentRepositoryPort: Send + Sync {
    async fn insert(&self, document: Document) -> Result<(), DocumentError>;

    async fn get(&self, id: &DocumentId) -> Result<Option<Document>, DocumentError>;

    /// Applies `mutation` to the stored document while holding exclusive access,
    /// returning the updated document. Nothing is written if the mutation fails.
    async fn apply(
        &self,
        id: &DocumentId,
        mutation: DocumentMutation,
    ) -> Result<Document, DocumentError>;

    /// All documents of `owner` in upload order, read as one consistent snapshot.
    async fn snapshot_for_owner(&self, owner: &UserId) -> Result<Vec<Document>, DocumentError>;

    async fn list_by_status(&self, status: DocumentStatus) -> Result<Vec<Document>, DocumentError>;
}
