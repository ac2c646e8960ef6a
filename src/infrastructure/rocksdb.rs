use crate::domain::collection::Collection;
use crate::domain::location::{Location, LocationPatch};
use crate::domain::machine::Machine;
use crate::domain::ports::{LocationStore, RecordStore, Snapshot, Snapshots};
use crate::domain::record::{Record, RecordId};
use crate::error::{LedgerError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options};
use std::marker::PhantomData;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::{Mutex, watch};
use tracing::debug;

/// A persistent store implementation using RocksDB.
///
/// Each record kind lives in its own column family (`locations`, `machines`,
/// `collections`), keyed by record id with JSON values. Typed handles are
/// obtained through [`RocksDBStore::locations`], [`RocksDBStore::machines`]
/// and [`RocksDBStore::collections`].
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the three column families exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let families = [Location::COLLECTION, Machine::COLLECTION, Collection::COLLECTION]
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()));

        let db = DB::open_cf_descriptors(&opts, path, families)?;

        Ok(Self { db: Arc::new(db) })
    }

    pub fn locations(&self) -> Result<RocksDBCollection<Location>> {
        RocksDBCollection::open(self.db.clone())
    }

    pub fn machines(&self) -> Result<RocksDBCollection<Machine>> {
        RocksDBCollection::open(self.db.clone())
    }

    pub fn collections(&self) -> Result<RocksDBCollection<Collection>> {
        RocksDBCollection::open(self.db.clone())
    }
}

/// One column family of a [`RocksDBStore`], typed by record kind.
///
/// Writes are serialised through a mutex so each published snapshot reflects
/// exactly the writes before it.
pub struct RocksDBCollection<R: Record> {
    db: Arc<DB>,
    feed: watch::Sender<Snapshot<R>>,
    write_lock: Mutex<()>,
    _record: PhantomData<R>,
}

impl<R: Record> RocksDBCollection<R> {
    fn open(db: Arc<DB>) -> Result<Self> {
        let initial = load_all::<R>(&db)?;
        let (feed, _) = watch::channel(initial);
        Ok(Self {
            db,
            feed,
            write_lock: Mutex::new(()),
            _record: PhantomData,
        })
    }

    fn publish(&self) -> Result<()> {
        let snapshot = load_all::<R>(&self.db)?;
        self.feed.send_replace(snapshot);
        Ok(())
    }

    fn get(&self, id: &RecordId) -> Result<Option<R>> {
        let cf = column_family::<R>(&self.db)?;
        match self.db.get_cf(cf, id.as_str().as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn put(&self, record: &R) -> Result<()> {
        let cf = column_family::<R>(&self.db)?;
        let value = serde_json::to_vec(record)?;
        self.db.put_cf(cf, record.id().as_str().as_bytes(), value)?;
        Ok(())
    }
}

fn column_family<R: Record>(db: &DB) -> Result<&ColumnFamily> {
    db.cf_handle(R::COLLECTION).ok_or_else(|| {
        LedgerError::Persistence(format!("{} column family not found", R::COLLECTION))
    })
}

fn load_all<R: Record>(db: &DB) -> Result<Snapshot<R>> {
    let cf = column_family::<R>(db)?;
    let mut records = Vec::new();
    for item in db.iterator_cf(cf, IteratorMode::Start) {
        let (_key, value) = item?;
        let record: R = serde_json::from_slice(&value)?;
        records.push(record);
    }
    records.sort_by(R::snapshot_order);
    Ok(Arc::new(records))
}

#[async_trait]
impl<R: Record> RecordStore<R> for RocksDBCollection<R> {
    fn subscribe(&self) -> Snapshots<R> {
        self.feed.subscribe()
    }

    async fn create(&self, draft: R::Draft) -> Result<RecordId> {
        let _guard = self.write_lock.lock().await;
        let id = RecordId::generate();
        self.put(&R::from_draft(id.clone(), draft))?;
        self.publish()?;
        debug!(collection = R::COLLECTION, record = %id, "record persisted");
        Ok(id)
    }

    async fn delete(&self, id: &RecordId) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let cf = column_family::<R>(&self.db)?;
        self.db.delete_cf(cf, id.as_str().as_bytes())?;
        self.publish()
    }
}

#[async_trait]
impl LocationStore for RocksDBCollection<Location> {
    async fn update(&self, id: &RecordId, patch: LocationPatch) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let current = self.get(id)?.ok_or_else(|| LedgerError::NotFound {
            kind: "location",
            id: id.clone(),
        })?;
        self.put(&patch.apply_to(&current)?)?;
        self.publish()
    }
}
