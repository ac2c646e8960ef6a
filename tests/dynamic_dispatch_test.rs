use arcade_ledger::domain::category::MachineCategory;
use arcade_ledger::domain::location::{LocationPatch, NewLocation};
use arcade_ledger::domain::machine::NewMachine;
use arcade_ledger::domain::ports::{LocationStore, LocationStoreBox, MachineStoreBox, RecordStore};
use arcade_ledger::infrastructure::in_memory::InMemoryRecordStore;

#[tokio::test]
async fn test_stores_as_trait_objects() {
    let location_store: LocationStoreBox = Box::new(InMemoryRecordStore::new());
    let machine_store: MachineStoreBox = Box::new(InMemoryRecordStore::new());

    let mut locations = location_store.subscribe();
    let mut machines = machine_store.subscribe();

    // Verify Send + Sync by spawning tasks
    let ls_handle = tokio::spawn(async move {
        let id = location_store
            .create(NewLocation::new("Club Social", "Mitre 400", "Haedo"))
            .await
            .unwrap();
        location_store
            .update(&id, LocationPatch::deactivate())
            .await
            .unwrap();
        id
    });

    let ms_handle = tokio::spawn(async move {
        machine_store
            .create(NewMachine::new(MachineCategory::Volante, "1"))
            .await
            .unwrap()
    });

    let location_id = ls_handle.await.unwrap();
    let machine_id = ms_handle.await.unwrap();

    let snapshot = locations.borrow_and_update().clone();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].id, location_id);
    assert!(!snapshot[0].is_active());

    let snapshot = machines.borrow_and_update().clone();
    assert_eq!(snapshot[0].id, machine_id);
    assert_eq!(snapshot[0].name, "Juego de Volante");
}

#[tokio::test]
async fn test_dropped_subscription_does_not_block_writes() {
    let store: MachineStoreBox = Box::new(InMemoryRecordStore::new());
    drop(store.subscribe());

    store
        .create(NewMachine::new(MachineCategory::Pinball, "1"))
        .await
        .unwrap();
    assert_eq!(store.subscribe().borrow().len(), 1);
}
