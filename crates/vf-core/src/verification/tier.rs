//! Tier folding.
//!
//! Levels are folded from a snapshot of a user's documents, in ascending level
//! order, with no partial credit:
//!
//! - `completed`   every required type has an approved document for the level
//! - `in-progress` at least one relevant document exists
//! - `pending`     nothing relevant uploaded yet
//!
//! Relevant means `level_required == level` and the type is required by the level.
//! A level that requires no documents is completed from the start.

use std::collections::BTreeSet;

use serde::Serialize;

use super::{Document, DocumentError, DocumentType, LevelStatus, VerificationLevel};

/// Ordered set of verification levels a marketplace offers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierCatalog {
    levels: Vec<VerificationLevel>,
}

impl TierCatalog {
    pub fn new(mut levels: Vec<VerificationLevel>) -> Self {
        levels.sort_by_key(|level| level.level);
        levels.dedup_by_key(|level| level.level);
        for level in &mut levels {
            level.status = LevelStatus::Pending;
        }
        Self { levels }
    }

    /// Basic → Verified → Trusted.
    pub fn marketplace_default() -> Self {
        Self::new(vec![
            VerificationLevel::new(
                1,
                "Basic",
                [DocumentType::GovernmentId],
                ["list_products", "receive_payments"],
            ),
            VerificationLevel::new(
                2,
                "Verified",
                [DocumentType::ProofOfAddress, DocumentType::TaxCertificate],
                ["higher_payout_limits", "verified_badge"],
            ),
            VerificationLevel::new(
                3,
                "Trusted",
                [DocumentType::BusinessLicense, DocumentType::BankStatement],
                ["bulk_listings", "priority_support"],
            ),
        ])
    }

    pub fn levels(&self) -> &[VerificationLevel] {
        &self.levels
    }

    pub fn level(&self, level: u32) -> Option<&VerificationLevel> {
        self.levels.iter().find(|candidate| candidate.level == level)
    }

    /// Checks that a document of `document_type` can count toward `level`.
    pub fn accepts(&self, document_type: DocumentType, level: u32) -> Result<(), DocumentError> {
        let definition = self.level(level).ok_or(DocumentError::UnknownLevel(level))?;
        if !definition.requires(document_type) {
            return Err(DocumentError::NotRequiredForLevel {
                document_type,
                level,
            });
        }
        Ok(())
    }

    /// Folds a consistent document snapshot into level statuses.
    pub fn fold(&self, documents: &[Document]) -> TierStanding {
        let levels = self
            .levels
            .iter()
            .map(|definition| {
                let mut level = definition.clone();
                level.status = fold_level(definition, documents);
                level
            })
            .collect();
        TierStanding { levels }
    }

    /// Standing of a user who has not uploaded anything yet.
    pub fn pending_standing(&self) -> TierStanding {
        self.fold(&[])
    }
}

impl Default for TierCatalog {
    fn default() -> Self {
        Self::marketplace_default()
    }
}

fn fold_level(level: &VerificationLevel, documents: &[Document]) -> LevelStatus {
    if level.required_document_types.is_empty() {
        return LevelStatus::Completed;
    }

    let relevant: Vec<&Document> = documents
        .iter()
        .filter(|doc| doc.level_required() == level.level && level.requires(doc.document_type()))
        .collect();

    if relevant.is_empty() {
        return LevelStatus::Pending;
    }

    let all_approved = level.required_document_types.iter().all(|required| {
        relevant
            .iter()
            .any(|doc| doc.document_type() == *required && doc.is_approved())
    });

    if all_approved {
        LevelStatus::Completed
    } else {
        LevelStatus::InProgress
    }
}

/// Status change of one level between two folds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LevelTransition {
    pub level: u32,
    pub from: LevelStatus,
    pub to: LevelStatus,
}

/// Folded verification state of one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TierStanding {
    levels: Vec<VerificationLevel>,
}

impl TierStanding {
    pub fn levels(&self) -> &[VerificationLevel] {
        &self.levels
    }

    pub fn level(&self, level: u32) -> Option<&VerificationLevel> {
        self.levels.iter().find(|candidate| candidate.level == level)
    }

    pub fn status_of(&self, level: u32) -> Option<LevelStatus> {
        self.level(level).map(|level| level.status)
    }

    /// Highest level reached with every lower level also completed.
    pub fn current_level(&self) -> Option<u32> {
        self.levels
            .iter()
            .take_while(|level| level.is_completed())
            .last()
            .map(|level| level.level)
    }

    /// Union of benefits of all completed levels.
    pub fn unlocked_benefits(&self) -> BTreeSet<String> {
        self.levels
            .iter()
            .flat_map(|level| level.available_benefits())
            .map(str::to_string)
            .collect()
    }

    pub fn transitions_from(&self, previous: &TierStanding) -> Vec<LevelTransition> {
        self.levels
            .iter()
            .filter_map(|level| {
                let from = previous.status_of(level.level).unwrap_or(LevelStatus::Pending);
                (from != level.status).then(|| LevelTransition {
                    level: level.level,
                    from,
                    to: level.status,
                })
            })
            .collect()
    }
}
