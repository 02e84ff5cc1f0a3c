//! Compliance documents and verification tiers.

mod document;
mod error;
mod level;
pub mod tier;
mod upload;

pub use document::{
    Document, DocumentFile, DocumentStatus, DocumentType, DocumentUpload, ReviewAction,
};
pub use error::DocumentError;
pub use level::{LevelStatus, VerificationLevel};
pub use tier::{LevelTransition, TierCatalog, TierStanding};
pub use upload::UploadPolicy;
