use crate::domain::location::{Location, LocationPatch};
use crate::domain::ports::{LocationStore, RecordStore, Snapshot, Snapshots};
use crate::domain::record::{Record, RecordId};
use crate::error::{LedgerError, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::{RwLock, watch};
use tracing::debug;

/// A thread-safe in-memory record collection.
///
/// Records live in an `Arc<RwLock<BTreeMap<RecordId, R>>>`; every write
/// publishes the full sorted set to subscribers through a `watch` channel.
/// `Clone` shares the underlying collection.
#[derive(Clone)]
pub struct InMemoryRecordStore<R: Record> {
    records: Arc<RwLock<BTreeMap<RecordId, R>>>,
    feed: Arc<watch::Sender<Snapshot<R>>>,
}

impl<R: Record> Default for InMemoryRecordStore<R> {
    fn default() -> Self {
        Self::with_records(Vec::new())
    }
}

impl<R: Record> InMemoryRecordStore<R> {
    /// Creates a new, empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-loaded with existing records, keeping their ids.
    pub fn with_records(records: Vec<R>) -> Self {
        let records: BTreeMap<RecordId, R> =
            records.into_iter().map(|r| (r.id().clone(), r)).collect();
        let (feed, _) = watch::channel(sorted_snapshot(&records));
        Self {
            records: Arc::new(RwLock::new(records)),
            feed: Arc::new(feed),
        }
    }

    fn publish(&self, records: &BTreeMap<RecordId, R>) {
        self.feed.send_replace(sorted_snapshot(records));
    }
}

fn sorted_snapshot<R: Record>(records: &BTreeMap<RecordId, R>) -> Snapshot<R> {
    let mut all: Vec<R> = records.values().cloned().collect();
    all.sort_by(R::snapshot_order);
    Arc::new(all)
}

#[async_trait]
impl<R: Record> RecordStore<R> for InMemoryRecordStore<R> {
    fn subscribe(&self) -> Snapshots<R> {
        self.feed.subscribe()
    }

    async fn create(&self, draft: R::Draft) -> Result<RecordId> {
        let id = RecordId::generate();
        let mut records = self.records.write().await;
        records.insert(id.clone(), R::from_draft(id.clone(), draft));
        self.publish(&records);
        debug!(collection = R::COLLECTION, record = %id, "record created");
        Ok(id)
    }

    async fn delete(&self, id: &RecordId) -> Result<()> {
        let mut records = self.records.write().await;
        if records.remove(id).is_some() {
            self.publish(&records);
            debug!(collection = R::COLLECTION, record = %id, "record deleted");
        }
        Ok(())
    }
}

#[async_trait]
impl LocationStore for InMemoryRecordStore<Location> {
    async fn update(&self, id: &RecordId, patch: LocationPatch) -> Result<()> {
        let mut records = self.records.write().await;
        let current = records.get(id).ok_or_else(|| LedgerError::NotFound {
            kind: "location",
            id: id.clone(),
        })?;
        let updated = patch.apply_to(current)?;
        records.insert(id.clone(), updated);
        self.publish(&records);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::category::MachineCategory;
    use crate::domain::location::NewLocation;
    use crate::domain::machine::{Machine, NewMachine};

    #[tokio::test]
    async fn test_create_publishes_snapshot() {
        let store = InMemoryRecordStore::<Machine>::new();
        let mut feed = store.subscribe();
        assert!(feed.borrow().is_empty());

        let id = store
            .create(NewMachine::new(MachineCategory::Pinball, "1"))
            .await
            .unwrap();

        assert!(feed.has_changed().unwrap());
        let snapshot = feed.borrow_and_update().clone();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id, id);
        assert_eq!(snapshot[0].name, "Pinball");
    }

    #[tokio::test]
    async fn test_delete_and_missing_delete() {
        let store = InMemoryRecordStore::<Machine>::new();
        let id = store
            .create(NewMachine::new(MachineCategory::Metegol, "1"))
            .await
            .unwrap();
        store.delete(&id).await.unwrap();
        assert!(store.subscribe().borrow().is_empty());

        // Deleting an unknown id is a no-op, like the hosted store.
        store.delete(&RecordId::new("missing")).await.unwrap();
    }

    #[tokio::test]
    async fn test_locations_sorted_by_name() {
        let store = InMemoryRecordStore::<Location>::new();
        for name in ["Kiosco El Pepe", "Canchas La 10", "Club Social"] {
            store
                .create(NewLocation::new(name, "addr", "city"))
                .await
                .unwrap();
        }
        let names: Vec<String> = store
            .subscribe()
            .borrow()
            .iter()
            .map(|l| l.name().to_string())
            .collect();
        assert_eq!(names, vec!["Canchas La 10", "Club Social", "Kiosco El Pepe"]);
    }

    #[tokio::test]
    async fn test_update_location() {
        let store = InMemoryRecordStore::<Location>::new();
        let id = store
            .create(NewLocation::new("Club Social", "Mitre 400", "Haedo"))
            .await
            .unwrap();

        store.update(&id, LocationPatch::deactivate()).await.unwrap();
        assert!(!store.subscribe().borrow()[0].is_active());

        let missing = store
            .update(&RecordId::new("nope"), LocationPatch::deactivate())
            .await;
        assert!(matches!(missing, Err(LedgerError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_seeded_store_keeps_ids() {
        let seeded = Machine::from_draft(
            RecordId::new("m1"),
            NewMachine::new(MachineCategory::Metegol, "1"),
        );
        let store = InMemoryRecordStore::with_records(vec![seeded.clone()]);
        assert_eq!(store.subscribe().borrow()[0], seeded);
    }
}
