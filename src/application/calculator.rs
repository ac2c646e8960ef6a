use crate::config::LedgerConfig;
use crate::domain::collection::CollectionDraft;
use crate::domain::location::Location;
use crate::domain::machine::Machine;
use crate::domain::money::{Money, TokenCount};
use crate::domain::pricing::resolve_price;
use crate::domain::record::RecordId;
use crate::error::{LedgerError, Result};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::debug;

/// Raw token counts typed by the operator, keyed by machine id.
pub type TokenInputs = HashMap<RecordId, String>;

/// The computed, not yet persisted, settlement of one location.
#[derive(Debug, Clone, PartialEq)]
pub struct SettlementBatch {
    pub location_id: RecordId,
    pub collections: Vec<CollectionDraft>,
    pub total_amount: Money,
    pub total_operator_share: Money,
    pub total_owner_share: Money,
    pub total_tokens: u64,
}

/// Computes the collection drafts for every machine at `location_id` with a
/// positive token count in `inputs`.
///
/// Entries that are blank, non-numeric or not positive are skipped. Drafts
/// follow the order of `machines`. Fails with [`LedgerError::EmptyBatch`] when
/// no machine qualifies, and with [`LedgerError::Validation`] when a total
/// does not fit in a decimal.
pub fn calculate_batch(
    location_id: &RecordId,
    machines: &[Machine],
    locations: &[Location],
    inputs: &TokenInputs,
    config: &LedgerConfig,
    now: DateTime<Utc>,
) -> Result<SettlementBatch> {
    let location = locations.iter().find(|l| &l.id == location_id);

    let mut batch = SettlementBatch {
        location_id: location_id.clone(),
        collections: Vec::new(),
        total_amount: Money::ZERO,
        total_operator_share: Money::ZERO,
        total_owner_share: Money::ZERO,
        total_tokens: 0,
    };

    for machine in machines.iter().filter(|m| &m.location_id == location_id) {
        let Some(raw) = inputs.get(&machine.id) else {
            continue;
        };
        let Some(count) = TokenCount::parse(raw) else {
            debug!(machine = %machine.id, input = %raw, "ignoring token entry");
            continue;
        };

        let resolved = resolve_price(machine, location, config.default_token_price);
        let total = resolved.price.total_for(count)?;
        let split = config.revenue_split.get(machine.category);
        let (operator_share, owner_share) = split.apply(total);

        debug!(
            machine = %machine.id,
            tokens = count.value(),
            price = %resolved.price,
            source = %resolved.source,
            %total,
            "settled machine"
        );

        batch.total_amount += total;
        batch.total_operator_share += operator_share;
        batch.total_owner_share += owner_share;
        batch.total_tokens += u64::from(count.value());
        batch.collections.push(CollectionDraft {
            machine_id: machine.id.clone(),
            location_id: location_id.clone(),
            collected_at: now,
            token_count: count,
            total,
            operator_share,
            owner_share,
            applied_price: resolved.price,
        });
    }

    if batch.collections.is_empty() {
        return Err(LedgerError::EmptyBatch);
    }
    Ok(batch)
}
