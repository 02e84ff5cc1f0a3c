use serde::{Deserialize, Serialize};

use super::{DocumentError, DocumentUpload};

/// Format and size limits checked before a document enters the review queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadPolicy {
    pub max_bytes: u64,
    pub allowed_content_types: Vec<String>,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_bytes: 10 * 1024 * 1024,
            allowed_content_types: vec![
                "application/pdf".to_string(),
                "image/jpeg".to_string(),
                "image/png".to_string(),
            ],
        }
    }
}

impl UploadPolicy {
    pub fn check(&self, upload: &DocumentUpload) -> Result<(), DocumentError> {
        let file = &upload.file;
        if file.size_bytes == 0 {
            return Err(DocumentError::EmptyFile);
        }
        let content_type = file.content_type.trim();
        if !self
            .allowed_content_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(content_type))
        {
            return Err(DocumentError::UnsupportedFormat {
                content_type: file.content_type.clone(),
            });
        }
        if file.size_bytes > self.max_bytes {
            return Err(DocumentError::TooLarge {
                size_bytes: file.size_bytes,
                max_bytes: self.max_bytes,
            });
        }
        Ok(())
    }
}
