//! ID type wrappers for type safety.

mod id_macro;

use id_macro::impl_id;
use serde::{Deserialize, Serialize};

/// Account owner identifier. Sessions, documents and tier state are partitioned by it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

/// Compliance document identifier (uuid v4).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

/// Identity of the human reviewer acting on a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReviewerId(String);

impl_id!(UserId, DocumentId, ReviewerId);
