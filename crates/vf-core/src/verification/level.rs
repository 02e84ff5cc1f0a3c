use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::DocumentType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LevelStatus {
    Pending,
    InProgress,
    Completed,
}

impl LevelStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LevelStatus::Pending => "pending",
            LevelStatus::InProgress => "in-progress",
            LevelStatus::Completed => "completed",
        }
    }
}

impl std::fmt::Display for LevelStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named stage of the progressive trust model.
///
/// Benefits are only available while `status` is [`LevelStatus::Completed`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationLevel {
    pub level: u32,
    pub name: String,
    pub required_document_types: BTreeSet<DocumentType>,
    pub status: LevelStatus,
    pub benefits: BTreeSet<String>,
}

impl VerificationLevel {
    pub fn new(
        level: u32,
        name: impl Into<String>,
        required_document_types: impl IntoIterator<Item = DocumentType>,
        benefits: impl IntoIterator<Item = &'static str>,
    ) -> Self {
        Self {
            level,
            name: name.into(),
            required_document_types: required_document_types.into_iter().collect(),
            status: LevelStatus::Pending,
            benefits: benefits.into_iter().map(str::to_string).collect(),
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == LevelStatus::Completed
    }

    pub fn requires(&self, document_type: DocumentType) -> bool {
        self.required_document_types.contains(&document_type)
    }

    /// Benefits currently usable, empty unless completed.
    pub fn available_benefits(&self) -> impl Iterator<Item = &str> {
        self.benefits
            .iter()
            .filter(move |_| self.is_completed())
            .map(String::as_str)
    }
}
