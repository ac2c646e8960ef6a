use super::money::{Money, TokenCount, TokenPrice};
use super::record::{Record, RecordId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// One settlement of a machine: tokens collected and the resulting cash split.
///
/// The applied price is frozen at settlement time. Collections are never
/// updated, only deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: RecordId,
    #[serde(flatten)]
    pub draft: CollectionDraft,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionDraft {
    pub machine_id: RecordId,
    /// Location of the machine at settlement time.
    pub location_id: RecordId,
    #[serde(rename = "date")]
    pub collected_at: DateTime<Utc>,
    pub token_count: TokenCount,
    #[serde(rename = "totalAmount")]
    pub total: Money,
    #[serde(rename = "myShare")]
    pub operator_share: Money,
    #[serde(rename = "localShare")]
    pub owner_share: Money,
    #[serde(rename = "appliedTokenPrice")]
    pub applied_price: TokenPrice,
}

impl Collection {
    pub fn machine_id(&self) -> &RecordId {
        &self.draft.machine_id
    }

    pub fn location_id(&self) -> &RecordId {
        &self.draft.location_id
    }

    pub fn collected_at(&self) -> DateTime<Utc> {
        self.draft.collected_at
    }

    pub fn operator_share(&self) -> Money {
        self.draft.operator_share
    }
}

impl Record for Collection {
    type Draft = CollectionDraft;
    const COLLECTION: &'static str = "collections";

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn from_draft(id: RecordId, draft: CollectionDraft) -> Self {
        Self { id, draft }
    }

    /// Newest first.
    fn snapshot_order(a: &Self, b: &Self) -> Ordering {
        b.draft
            .collected_at
            .cmp(&a.draft.collected_at)
            .then_with(|| a.id.cmp(&b.id))
    }
}
