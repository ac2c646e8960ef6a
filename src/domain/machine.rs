use super::category::MachineCategory;
use super::money::{TokenPrice, deserialize_override};
use super::record::{Record, RecordId};
use crate::error::LedgerError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A rentable arcade unit placed at a location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Machine {
    pub id: RecordId,
    pub name: String,
    #[serde(rename = "type")]
    pub category: MachineCategory,
    pub location_id: RecordId,
    /// Machine-specific price, overriding every other tier.
    #[serde(
        default,
        deserialize_with = "deserialize_override",
        skip_serializing_if = "Option::is_none"
    )]
    pub token_price: Option<TokenPrice>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewMachine {
    pub name: Option<String>,
    pub category: MachineCategory,
    pub location_id: RecordId,
    pub token_price: Option<TokenPrice>,
}

impl NewMachine {
    pub fn new(category: MachineCategory, location_id: impl Into<RecordId>) -> Self {
        Self {
            name: None,
            category,
            location_id: location_id.into(),
            token_price: None,
        }
    }

    pub fn with_price(mut self, price: TokenPrice) -> Self {
        self.token_price = Some(price);
        self
    }

    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.location_id.is_blank() {
            return Err(LedgerError::Validation(
                "a machine must be placed at a location".to_string(),
            ));
        }
        Ok(())
    }
}

impl Record for Machine {
    type Draft = NewMachine;
    const COLLECTION: &'static str = "machines";

    fn id(&self) -> &RecordId {
        &self.id
    }

    /// Unnamed machines take their category label as display name.
    fn from_draft(id: RecordId, draft: NewMachine) -> Self {
        let name = draft
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| draft.category.label().to_string());
        Self {
            id,
            name,
            category: draft.category,
            location_id: draft.location_id,
            token_price: draft.token_price,
        }
    }

    fn snapshot_order(a: &Self, b: &Self) -> Ordering {
        a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id))
    }
}
