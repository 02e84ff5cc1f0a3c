//! Document review queue.
//!
//! Accepts uploads, moves them into review and records reviewer decisions.
//! Every transition is followed by a tier recompute for the document owner.

use std::sync::Arc;

use tracing::{info, info_span, warn, Instrument};
use vf_core::ids::{DocumentId, ReviewerId, UserId};
use vf_core::ports::{ClockPort, DocumentMutation, DocumentRepositoryPort};
use vf_core::verification::{
    Document, DocumentError, DocumentStatus, DocumentUpload, ReviewAction, UploadPolicy,
};

use super::TierGate;

pub struct DocumentReviewQueue {
    documents: Arc<dyn DocumentRepositoryPort>,
    tier_gate: Arc<TierGate>,
    policy: UploadPolicy,
    clock: Arc<dyn ClockPort>,
}

impl DocumentReviewQueue {
    pub fn new(
        documents: Arc<dyn DocumentRepositoryPort>,
        tier_gate: Arc<TierGate>,
        policy: UploadPolicy,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            documents,
            tier_gate,
            policy,
            clock,
        }
    }

    pub fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    /// Checks the upload, records it and places it under review.
    pub async fn submit(&self, upload: DocumentUpload) -> Result<Document, DocumentError> {
        let span = info_span!(
            "usecase.review_queue.submit",
            owner_id = %upload.owner_id,
            document_type = %upload.document_type,
            level = upload.level_required
        );
        async {
            self.policy.check(&upload)?;
            self.tier_gate
                .catalog()
                .accepts(upload.document_type, upload.level_required)?;

            let document = Document::uploaded(upload, self.clock.now());
            let id = document.id().clone();
            let owner = document.owner_id().clone();
            self.documents.insert(document).await?;

            let document = self
                .documents
                .apply(&id, Box::new(|doc: &mut Document| doc.enqueue()))
                .await?;
            info!(document_id = %id, "document queued for review");

            self.refresh_tier(&owner).await;
            Ok(document)
        }
        .instrument(span)
        .await
    }

    pub async fn approve(
        &self,
        id: &DocumentId,
        reviewer: ReviewerId,
    ) -> Result<Document, DocumentError> {
        require_reviewer(&reviewer)?;
        let now = self.clock.now();
        self.review(id, ReviewAction::Approve, reviewer.clone(), move |doc| {
            doc.approve(reviewer, now)
        })
        .await
    }

    /// Rejects a document under review, or revokes an approved one.
    pub async fn reject(
        &self,
        id: &DocumentId,
        reviewer: ReviewerId,
        notes: &str,
    ) -> Result<Document, DocumentError> {
        require_reviewer(&reviewer)?;
        let notes = require_notes(notes)?;
        let now = self.clock.now();
        self.review(id, ReviewAction::Reject, reviewer.clone(), move |doc| {
            doc.reject(reviewer, notes, now)
        })
        .await
    }

    pub async fn request_info(
        &self,
        id: &DocumentId,
        reviewer: ReviewerId,
        notes: &str,
    ) -> Result<Document, DocumentError> {
        require_reviewer(&reviewer)?;
        let notes = require_notes(notes)?;
        let now = self.clock.now();
        self.review(id, ReviewAction::RequestInfo, reviewer.clone(), move |doc| {
            doc.request_info(reviewer, notes, now)
        })
        .await
    }

    pub async fn get(&self, id: &DocumentId) -> Result<Option<Document>, DocumentError> {
        self.documents.get(id).await
    }

    /// Documents awaiting a reviewer, oldest upload first.
    pub async fn pending(&self) -> Result<Vec<Document>, DocumentError> {
        self.documents.list_by_status(DocumentStatus::UnderReview).await
    }

    pub async fn pending_for(&self, owner: &UserId) -> Result<Vec<Document>, DocumentError> {
        Ok(self
            .documents
            .snapshot_for_owner(owner)
            .await?
            .into_iter()
            .filter(|doc| doc.status() == DocumentStatus::UnderReview)
            .collect())
    }

    /// Every document of `owner` in upload order.
    pub async fn documents(&self, owner: &UserId) -> Result<Vec<Document>, DocumentError> {
        self.documents.snapshot_for_owner(owner).await
    }

    async fn review<F>(
        &self,
        id: &DocumentId,
        action: ReviewAction,
        reviewer: ReviewerId,
        decide: F,
    ) -> Result<Document, DocumentError>
    where
        F: FnOnce(&mut Document) -> Result<(), DocumentError> + Send + 'static,
    {
        let span = info_span!(
            "usecase.review_queue.review",
            document_id = %id,
            action = %action,
            reviewer = %reviewer
        );
        async {
            let mutation: DocumentMutation = Box::new(move |doc: &mut Document| {
                if doc.owner_id().as_str() == reviewer.as_str() {
                    return Err(DocumentError::SelfReview);
                }
                decide(doc)
            });
            let document = self.documents.apply(id, mutation).await?;
            info!(status = %document.status(), "document reviewed");

            self.refresh_tier(document.owner_id()).await;
            Ok(document)
        }
        .instrument(span)
        .await
    }

    /// The review itself is already recorded, so a failed recompute is only
    /// logged; the next transition or an explicit recompute catches up.
    async fn refresh_tier(&self, owner: &UserId) {
        if let Err(err) = self.tier_gate.recompute(owner).await {
            warn!(owner_id = %owner, error = %err, "tier recompute failed");
        }
    }
}

fn require_reviewer(reviewer: &ReviewerId) -> Result<(), DocumentError> {
    if reviewer.as_str().trim().is_empty() {
        return Err(DocumentError::MissingReviewer);
    }
    Ok(())
}

fn require_notes(notes: &str) -> Result<String, DocumentError> {
    let notes = notes.trim();
    if notes.is_empty() {
        return Err(DocumentError::MissingNotes);
    }
    Ok(notes.to_string())
}
