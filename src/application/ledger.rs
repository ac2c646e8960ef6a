use crate::application::calculator::{SettlementBatch, TokenInputs, calculate_batch};
use crate::application::stats::{DashboardStats, LifetimeSummary, aggregate, summarize};
use crate::config::LedgerConfig;
use crate::domain::category::MachineCategory;
use crate::domain::collection::Collection;
use crate::domain::location::{Location, LocationPatch, NewLocation};
use crate::domain::machine::{Machine, NewMachine};
use crate::domain::money::TokenPrice;
use crate::domain::ports::{CollectionStoreBox, LocationStoreBox, MachineStoreBox, Snapshot, Snapshots};
use crate::domain::pricing::{ResolvedPrice, resolve_price};
use crate::domain::record::RecordId;
use crate::error::{LedgerError, Result};
use chrono::{DateTime, TimeZone, Utc};
use futures::future::join_all;
use std::collections::BTreeSet;
use tracing::{error, info, warn};

/// Shown in place of a location or machine that no longer exists.
pub const MISSING_PLACEHOLDER: &str = "(eliminado)";

/// One row of the collection history, with references resolved for display.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub collection: Collection,
    pub location_name: String,
    pub machine_name: String,
    pub category: MachineCategory,
}

/// One row of the machine listing: the machine, where it is, and what it
/// costs now.
#[derive(Debug, Clone, PartialEq)]
pub struct MachineEntry {
    pub machine: Machine,
    pub location_name: String,
    pub price: ResolvedPrice,
    /// Price the machine would fall back to without its own override.
    pub inherited: TokenPrice,
}

/// Criteria for listing locations. Unset fields match every location.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationFilter {
    /// Case-insensitive text matched against name, city and address.
    pub term: String,
    /// Exact city, ignoring case and surrounding spaces.
    pub city: Option<String>,
    /// Keeps locations hosting at least one machine of this category.
    pub category: Option<MachineCategory>,
    pub include_inactive: bool,
}

/// The entry point for managing locations, machines and settlements.
///
/// `Ledger` owns the three store adapters and keeps a subscription to each.
/// Every read works on the latest published snapshot; writes go straight to
/// the stores and become visible once the store publishes the next snapshot.
pub struct Ledger {
    config: LedgerConfig,
    location_store: LocationStoreBox,
    machine_store: MachineStoreBox,
    collection_store: CollectionStoreBox,
    locations: Snapshots<Location>,
    machines: Snapshots<Machine>,
    collections: Snapshots<Collection>,
}

impl Ledger {
    /// Creates a new `Ledger` and subscribes to every store.
    ///
    /// # Arguments
    ///
    /// * `config` - Default price and revenue split table.
    /// * `location_store` - The store for client locations.
    /// * `machine_store` - The store for the machine catalog.
    /// * `collection_store` - The store for settlement history.
    pub fn new(
        config: LedgerConfig,
        location_store: LocationStoreBox,
        machine_store: MachineStoreBox,
        collection_store: CollectionStoreBox,
    ) -> Self {
        let locations = location_store.subscribe();
        let machines = machine_store.subscribe();
        let collections = collection_store.subscribe();
        Self {
            config,
            location_store,
            machine_store,
            collection_store,
            locations,
            machines,
            collections,
        }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn locations(&self) -> Snapshot<Location> {
        self.locations.borrow().clone()
    }

    pub fn machines(&self) -> Snapshot<Machine> {
        self.machines.borrow().clone()
    }

    pub fn collections(&self) -> Snapshot<Collection> {
        self.collections.borrow().clone()
    }

    pub fn location(&self, id: &RecordId) -> Option<Location> {
        self.locations.borrow().iter().find(|l| &l.id == id).cloned()
    }

    pub fn machine(&self, id: &RecordId) -> Option<Machine> {
        self.machines.borrow().iter().find(|m| &m.id == id).cloned()
    }

    // -- Locations --

    pub async fn add_location(&self, location: NewLocation) -> Result<RecordId> {
        location.validate()?;
        let name = location.name.clone();
        let id = self.location_store.create(location).await?;
        info!(location = %id, %name, "location added");
        Ok(id)
    }

    pub async fn update_location(&self, id: &RecordId, patch: LocationPatch) -> Result<()> {
        let current = self.location(id).ok_or_else(|| LedgerError::NotFound {
            kind: "location",
            id: id.clone(),
        })?;
        patch.apply_to(&current)?;
        self.location_store.update(id, patch).await?;
        info!(location = %id, "location updated");
        Ok(())
    }

    /// Removes a location from future selection. Its machines and
    /// collections stay and resolve to a placeholder.
    pub async fn delete_location(&self, id: &RecordId) -> Result<()> {
        self.location_store.delete(id).await?;
        info!(location = %id, "location deleted");
        Ok(())
    }

    /// Locations that can receive new settlements, by name.
    pub fn active_locations(&self) -> Vec<Location> {
        self.locations
            .borrow()
            .iter()
            .filter(|l| l.is_active())
            .cloned()
            .collect()
    }

    /// Distinct non-blank cities, sorted.
    pub fn cities(&self) -> Vec<String> {
        self.locations
            .borrow()
            .iter()
            .map(|l| l.city().trim())
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn find_locations(&self, filter: &LocationFilter) -> Vec<Location> {
        let machines = self.machines();
        let city = filter.city.as_deref().map(|c| c.trim().to_lowercase());
        self.locations
            .borrow()
            .iter()
            .filter(|l| filter.include_inactive || l.is_active())
            .filter(|l| l.matches(&filter.term))
            .filter(|l| {
                city.as_deref()
                    .is_none_or(|c| l.city().trim().to_lowercase() == c)
            })
            .filter(|l| {
                filter.category.is_none_or(|category| {
                    machines
                        .iter()
                        .any(|m| m.location_id == l.id && m.category == category)
                })
            })
            .cloned()
            .collect()
    }

    // -- Machines --

    pub async fn add_machine(&self, machine: NewMachine) -> Result<RecordId> {
        machine.validate()?;
        if self.location(&machine.location_id).is_none() {
            warn!(location = %machine.location_id, "machine placed at an unknown location");
        }
        let category = machine.category;
        let id = self.machine_store.create(machine).await?;
        info!(machine = %id, %category, "machine added");
        Ok(id)
    }

    pub async fn delete_machine(&self, id: &RecordId) -> Result<()> {
        self.machine_store.delete(id).await?;
        info!(machine = %id, "machine deleted");
        Ok(())
    }

    pub fn machines_at(&self, location_id: &RecordId) -> Vec<Machine> {
        self.machines
            .borrow()
            .iter()
            .filter(|m| &m.location_id == location_id)
            .cloned()
            .collect()
    }

    /// Current price of a machine, for display. Not what past collections used.
    pub fn price_for(&self, machine_id: &RecordId) -> Option<ResolvedPrice> {
        let machine = self.machine(machine_id)?;
        let location = self.location(&machine.location_id);
        Some(resolve_price(
            &machine,
            location.as_ref(),
            self.config.default_token_price,
        ))
    }

    /// Price a machine would inherit without its own override.
    pub fn inherited_price(&self, machine: &Machine) -> TokenPrice {
        self.location(&machine.location_id)
            .and_then(|l| l.price_for(machine.category))
            .unwrap_or(self.config.default_token_price)
    }

    /// Machines with their resolved prices, optionally limited to one location.
    pub fn machine_listing(&self, location_id: Option<&RecordId>) -> Vec<MachineEntry> {
        let locations = self.locations();
        self.machines
            .borrow()
            .iter()
            .filter(|m| location_id.is_none_or(|id| &m.location_id == id))
            .map(|m| {
                let location = locations.iter().find(|l| l.id == m.location_id);
                let price = resolve_price(m, location, self.config.default_token_price);
                MachineEntry {
                    machine: m.clone(),
                    location_name: location
                        .map(|l| l.name().to_string())
                        .unwrap_or_else(|| MISSING_PLACEHOLDER.to_string()),
                    price,
                    inherited: self.inherited_price(m),
                }
            })
            .collect()
    }

    // -- Settlements --

    pub fn calculate(
        &self,
        location_id: &RecordId,
        inputs: &TokenInputs,
        now: DateTime<Utc>,
    ) -> Result<SettlementBatch> {
        calculate_batch(
            location_id,
            &self.machines(),
            &self.locations(),
            inputs,
            &self.config,
            now,
        )
    }

    /// Persists every draft of `batch`.
    ///
    /// All writes are issued together. If any of them fails the whole
    /// settlement is reported as failed through
    /// [`LedgerError::PartialSettlement`], which lists the records that were
    /// written anyway.
    pub async fn settle(&self, batch: &SettlementBatch) -> Result<Vec<RecordId>> {
        if batch.collections.is_empty() {
            return Err(LedgerError::EmptyBatch);
        }

        let writes = batch
            .collections
            .iter()
            .map(|draft| self.collection_store.create(draft.clone()));
        let results = join_all(writes).await;

        let mut written = Vec::with_capacity(results.len());
        let mut failures = Vec::new();
        for result in results {
            match result {
                Ok(id) => written.push(id),
                Err(e) => failures.push(e),
            }
        }

        if let Some(first) = failures.into_iter().next().map(Box::new) {
            let failed = batch.collections.len() - written.len();
            error!(
                location = %batch.location_id,
                written = written.len(),
                failed,
                error = %first,
                "settlement partially saved"
            );
            return Err(LedgerError::PartialSettlement {
                written,
                failed,
                source: first,
            });
        }

        info!(
            location = %batch.location_id,
            records = written.len(),
            operator_share = %batch.total_operator_share,
            "settlement saved"
        );
        Ok(written)
    }

    /// Voids a collection.
    pub async fn delete_collection(&self, id: &RecordId) -> Result<()> {
        if id.is_blank() {
            return Err(LedgerError::Validation("invalid collection id".to_string()));
        }
        self.collection_store.delete(id).await?;
        info!(collection = %id, "collection voided");
        Ok(())
    }

    /// Collection history, newest first, optionally limited to one location.
    pub fn history(&self, location_id: Option<&RecordId>) -> Vec<HistoryEntry> {
        let locations = self.locations();
        let machines = self.machines();
        self.collections
            .borrow()
            .iter()
            .filter(|c| location_id.is_none_or(|id| c.location_id() == id))
            .map(|c| {
                let machine = machines.iter().find(|m| &m.id == c.machine_id());
                let location = locations.iter().find(|l| &l.id == c.location_id());
                HistoryEntry {
                    collection: c.clone(),
                    location_name: location
                        .map(|l| l.name().to_string())
                        .unwrap_or_else(|| MISSING_PLACEHOLDER.to_string()),
                    machine_name: machine
                        .map(|m| m.name.clone())
                        .unwrap_or_else(|| MISSING_PLACEHOLDER.to_string()),
                    category: machine.map(|m| m.category).unwrap_or_default(),
                }
            })
            .collect()
    }

    pub fn dashboard<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> DashboardStats {
        aggregate(&self.collections(), &self.machines(), now)
    }

    pub fn summary(&self) -> LifetimeSummary {
        summarize(&self.collections())
    }
}
