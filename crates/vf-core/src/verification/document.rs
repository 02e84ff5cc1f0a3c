use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::DocumentError;
use crate::ids::{DocumentId, ReviewerId, UserId};

/// Kind of compliance document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    GovernmentId,
    ProofOfAddress,
    TaxCertificate,
    BusinessLicense,
    BankStatement,
}

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::GovernmentId => "government_id",
            DocumentType::ProofOfAddress => "proof_of_address",
            DocumentType::TaxCertificate => "tax_certificate",
            DocumentType::BusinessLicense => "business_license",
            DocumentType::BankStatement => "bank_statement",
        }
    }
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Review lifecycle of one document instance.
///
/// ```text
/// uploaded → under-review → approved → rejected (revocation)
///                         → rejected
///                         → info-requested
/// ```
/// `rejected` and `info-requested` are terminal: a corrected document is a new instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentStatus {
    Uploaded,
    UnderReview,
    Approved,
    Rejected,
    InfoRequested,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Uploaded => "uploaded",
            DocumentStatus::UnderReview => "under-review",
            DocumentStatus::Approved => "approved",
            DocumentStatus::Rejected => "rejected",
            DocumentStatus::InfoRequested => "info-requested",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, DocumentStatus::Rejected | DocumentStatus::InfoRequested)
    }
}

impl std::fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewAction {
    Enqueue,
    Approve,
    Reject,
    RequestInfo,
}

impl std::fmt::Display for ReviewAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ReviewAction::Enqueue => "enqueue",
            ReviewAction::Approve => "approve",
            ReviewAction::Reject => "reject",
            ReviewAction::RequestInfo => "request info on",
        })
    }
}

/// File metadata captured at upload. The bytes themselves live elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentFile {
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: u64,
}

/// An upload request, checked against the upload policy before a
/// [`Document`] is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentUpload {
    pub owner_id: UserId,
    pub document_type: DocumentType,
    pub level_required: u32,
    pub file: DocumentFile,
}

/// A compliance document instance. Never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    id: DocumentId,
    #[serde(rename = "type")]
    document_type: DocumentType,
    owner_id: UserId,
    level_required: u32,
    status: DocumentStatus,
    reviewer: Option<ReviewerId>,
    reviewed_at: Option<DateTime<Utc>>,
    notes: Option<String>,
    uploaded_at: DateTime<Utc>,
    file: DocumentFile,
}

impl Document {
    /// Creates a freshly uploaded document.
    pub fn uploaded(upload: DocumentUpload, now: DateTime<Utc>) -> Self {
        Self {
            id: DocumentId::new(),
            document_type: upload.document_type,
            owner_id: upload.owner_id,
            level_required: upload.level_required,
            status: DocumentStatus::Uploaded,
            reviewer: None,
            reviewed_at: None,
            notes: None,
            uploaded_at: now,
            file: upload.file,
        }
    }

    pub fn id(&self) -> &DocumentId {
        &self.id
    }

    pub fn document_type(&self) -> DocumentType {
        self.document_type
    }

    pub fn owner_id(&self) -> &UserId {
        &self.owner_id
    }

    pub fn level_required(&self) -> u32 {
        self.level_required
    }

    pub fn status(&self) -> DocumentStatus {
        self.status
    }

    pub fn reviewer(&self) -> Option<&ReviewerId> {
        self.reviewer.as_ref()
    }

    pub fn reviewed_at(&self) -> Option<DateTime<Utc>> {
        self.reviewed_at
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn uploaded_at(&self) -> DateTime<Utc> {
        self.uploaded_at
    }

    pub fn file(&self) -> &DocumentFile {
        &self.file
    }

    pub fn is_approved(&self) -> bool {
        self.status == DocumentStatus::Approved
    }

    pub fn enqueue(&mut self) -> Result<(), DocumentError> {
        match self.status {
            DocumentStatus::Uploaded => {
                self.status = DocumentStatus::UnderReview;
                Ok(())
            }
            from => Err(DocumentError::InvalidTransition {
                from,
                action: ReviewAction::Enqueue,
            }),
        }
    }

    pub fn approve(&mut self, reviewer: ReviewerId, now: DateTime<Utc>) -> Result<(), DocumentError> {
        match self.status {
            DocumentStatus::UnderReview => {
                self.record_review(DocumentStatus::Approved, reviewer, None, now);
                Ok(())
            }
            from => Err(DocumentError::InvalidTransition {
                from,
                action: ReviewAction::Approve,
            }),
        }
    }

    /// Rejects a document under review, or revokes a previously approved one.
    pub fn reject(
        &mut self,
        reviewer: ReviewerId,
        notes: String,
        now: DateTime<Utc>,
    ) -> Result<(), DocumentError> {
        match self.status {
            DocumentStatus::UnderReview | DocumentStatus::Approved => {
                self.record_review(DocumentStatus::Rejected, reviewer, Some(notes), now);
                Ok(())
            }
            from => Err(DocumentError::InvalidTransition {
                from,
                action: ReviewAction::Reject,
            }),
        }
    }

    pub fn request_info(
        &mut self,
        reviewer: ReviewerId,
        notes: String,
        now: DateTime<Utc>,
    ) -> Result<(), DocumentError> {
        match self.status {
            DocumentStatus::UnderReview => {
                self.record_review(DocumentStatus::InfoRequested, reviewer, Some(notes), now);
                Ok(())
            }
            from => Err(DocumentError::InvalidTransition {
                from,
                action: ReviewAction::RequestInfo,
            }),
        }
    }

    fn record_review(
        &mut self,
        status: DocumentStatus,
        reviewer: ReviewerId,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) {
        self.status = status;
        self.reviewer = Some(reviewer);
        self.reviewed_at = Some(now);
        self.notes = notes;
    }
}
