#![allow(dead_code)]

use arcade_ledger::domain::category::MachineCategory;
use arcade_ledger::domain::collection::{Collection, CollectionDraft};
use arcade_ledger::domain::location::{Location, NewLocation};
use arcade_ledger::domain::machine::{Machine, NewMachine};
use arcade_ledger::domain::money::{TokenCount, TokenPrice};
use arcade_ledger::domain::record::{Record, RecordId};
use arcade_ledger::domain::split::SplitTable;
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use rust_decimal::Decimal;

pub fn location(id: &str, name: &str) -> Location {
    Location::from_draft(
        RecordId::new(id),
        NewLocation::new(name, "Mitre 400", "Haedo"),
    )
}

pub fn machine(id: &str, category: MachineCategory, location_id: &str) -> Machine {
    Machine::from_draft(RecordId::new(id), NewMachine::new(category, location_id))
}

/// Builds `rows` collections spread over the `days` before `now`, split with
/// the default table. Machine ids not in `machines` are drawn too, so some
/// records reference a deleted machine.
pub fn random_history<R: Rng>(
    rng: &mut R,
    machines: &[Machine],
    now: DateTime<Utc>,
    days: i64,
    rows: usize,
) -> Vec<Collection> {
    let splits = SplitTable::default();
    (0..rows)
        .map(|i| {
            let (machine_id, category) = match machines.get(rng.gen_range(0..=machines.len())) {
                Some(m) => (m.id.clone(), m.category),
                None => (RecordId::new("retired"), MachineCategory::default()),
            };
            let price = TokenPrice::new(Decimal::from(rng.gen_range(100..=900_i64))).unwrap();
            let token_count = TokenCount::new(rng.gen_range(1..=60)).unwrap();
            let total = price.total_for(token_count).unwrap();
            let (operator_share, owner_share) = splits.get(category).apply(total);
            let collected_at = now - Duration::minutes(rng.gen_range(0..days * 24 * 60));

            Collection::from_draft(
                RecordId::new(format!("c{}", i)),
                CollectionDraft {
                    machine_id,
                    location_id: RecordId::new("1"),
                    collected_at,
                    token_count,
                    total,
                    operator_share,
                    owner_share,
                    applied_price: price,
                },
            )
        })
        .collect()
}
