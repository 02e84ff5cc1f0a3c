use thiserror::Error;

use super::{DocumentStatus, DocumentType, ReviewAction};
use crate::ids::DocumentId;

/// Typed outcomes of document intake and review.
///
/// Reviewer rejections are not errors: they are recorded on the document.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DocumentError {
    #[error("uploaded file is empty")]
    EmptyFile,

    #[error("unsupported document format: {content_type}")]
    UnsupportedFormat { content_type: String },

    #[error("document too large: {size_bytes} bytes (max {max_bytes})")]
    TooLarge { size_bytes: u64, max_bytes: u64 },

    #[error("unknown verification level: {0}")]
    UnknownLevel(u32),

    #[error("{document_type} is not required for level {level}")]
    NotRequiredForLevel {
        document_type: DocumentType,
        level: u32,
    },

    #[error("document not found: {0}")]
    NotFound(DocumentId),

    #[error("cannot {action} a document that is {from}")]
    InvalidTransition {
        from: DocumentStatus,
        action: ReviewAction,
    },

    #[error("reviewers cannot review their own documents")]
    SelfReview,

    #[error("review requires a reviewer")]
    MissingReviewer,

    #[error("review notes are required")]
    MissingNotes,

    #[error("document repository failed: {0}")]
    Repository(String),
}
