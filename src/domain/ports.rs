use super::collection::Collection;
use super::location::{Location, LocationPatch};
use super::machine::Machine;
use super::record::{Record, RecordId};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::watch;

/// Full current contents of a record collection.
pub type Snapshot<R> = Arc<Vec<R>>;

/// Live feed of snapshots. Every write publishes a complete replacement;
/// dropping the receiver unsubscribes.
pub type Snapshots<R> = watch::Receiver<Snapshot<R>>;

#[async_trait]
pub trait RecordStore<R: Record>: Send + Sync {
    /// Subscribes to the collection. The receiver starts with the current set.
    fn subscribe(&self) -> Snapshots<R>;
    async fn create(&self, draft: R::Draft) -> Result<RecordId>;
    async fn delete(&self, id: &RecordId) -> Result<()>;
}

#[async_trait]
pub trait LocationStore: RecordStore<Location> {
    async fn update(&self, id: &RecordId, patch: LocationPatch) -> Result<()>;
}

pub trait MachineStore: RecordStore<Machine> {}

pub trait CollectionStore: RecordStore<Collection> {}

impl<T: RecordStore<Machine>> MachineStore for T {}

impl<T: RecordStore<Collection>> CollectionStore for T {}

pub type LocationStoreBox = Box<dyn LocationStore>;
pub type MachineStoreBox = Box<dyn MachineStore>;
pub type CollectionStoreBox = Box<dyn CollectionStore>;
