use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Store-assigned identifier of a location, machine or collection.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh random identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A record kept in one of the document-store collections.
///
/// Each record kind has a draft form (the record without its identifier) that
/// callers hand to the store; the store assigns the id.
pub trait Record: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    type Draft: Send + 'static;

    /// Name of the record collection (`locations`, `machines`, `collections`).
    const COLLECTION: &'static str;

    fn id(&self) -> &RecordId;

    fn from_draft(id: RecordId, draft: Self::Draft) -> Self;

    /// Ordering of records inside a published snapshot.
    fn snapshot_order(a: &Self, b: &Self) -> Ordering {
        a.id().cmp(b.id())
    }
}
