//! Failure handling tests
//!
//! Each failure stays contained to its device or bridge domain and shows up
//! in the result log.

use std::sync::Arc;

use kuwaiba_bdsyncd::BridgeDomainSyncProvider;
use kuwaiba_inventory::{classes, InMemoryInventory};
use kuwaiba_sync_common::{ExecResult, SyncError, SyncProvider, SyncResultType};
use kuwaiba_sync_test::{
    fixtures::{inventory_fixtures, output_fixtures},
    group_of, DataSourceBuilder, FailingActivityLog, FaultyInventory, InventoryVerifier,
    ResultLogVerifier, ScriptedRunner,
};

const HOST: &str = "192.0.2.1";
const SHOW_BRIDGE_DOMAIN: &str = "show bridge-domain";

/// Scenario: the store refuses VFIs; bridge domain 100 stops at its VFI,
/// bridge domain 200 is still synchronized
#[tokio::test]
async fn test_inventory_error_aborts_only_its_bridge_domain() {
    let memory = Arc::new(InMemoryInventory::new());
    let device = inventory_fixtures::asr920(&memory, "ASR920-1").await;
    let store = Arc::new(FaultyInventory::new(memory.clone()).rejecting_class(classes::VFI));
    let runner = Arc::new(ScriptedRunner::new().respond(
        HOST,
        SHOW_BRIDGE_DOMAIN,
        output_fixtures::ASR920_FULL,
    ));
    let provider = BridgeDomainSyncProvider::new(store, memory.clone(), runner);
    let group = group_of([DataSourceBuilder::for_device("ds-1", &device).build()]);

    let results = provider.automated_sync(&group).await;
    let log = ResultLogVerifier::new(&results);

    log.assert_count(SyncResultType::Error, 1).unwrap();
    log.assert_mentions(SyncResultType::Error, "Synchronize bridge domain 100")
        .unwrap();
    // bridge domain 200 with its service instance on Gi0/0/2
    log.assert_mentions(SyncResultType::Success, "Bridge domain 200 created")
        .unwrap();

    let gi2 = inventory_fixtures::port_of(&memory, &device, "GigabitEthernet0/0/2").await;
    InventoryVerifier::new(&memory)
        .assert_special_children(&gi2, classes::SERVICE_INSTANCE, 1)
        .await
        .unwrap();
}

/// Scenario: relationships are refused; objects created before the failure stay
#[tokio::test]
async fn test_no_rollback_of_created_objects() {
    let memory = Arc::new(InMemoryInventory::new());
    let device = inventory_fixtures::seed_router(&memory, "ASR920-1", &[]).await;
    let store = Arc::new(FaultyInventory::new(memory.clone()).rejecting_relationships());
    let runner = Arc::new(ScriptedRunner::new().respond(
        HOST,
        SHOW_BRIDGE_DOMAIN,
        output_fixtures::ASR920_SINGLE_VFI,
    ));
    let provider = BridgeDomainSyncProvider::new(store, memory.clone(), runner);
    let group = group_of([DataSourceBuilder::for_device("ds-1", &device).build()]);

    let results = provider.automated_sync(&group).await;

    let log = ResultLogVerifier::new(&results);
    log.assert_count(SyncResultType::Success, 2).unwrap();
    log.assert_count(SyncResultType::Error, 1).unwrap();
    InventoryVerifier::new(&memory)
        .assert_special_children(&device, classes::BRIDGE_DOMAIN, 1)
        .await
        .unwrap();
}

/// Scenario: activity log writes fail; the sync itself is unaffected
#[tokio::test]
async fn test_activity_log_failure_is_ignored() {
    let store = Arc::new(InMemoryInventory::new());
    let device = inventory_fixtures::seed_router(&store, "ASR920-1", &[]).await;
    let runner = Arc::new(ScriptedRunner::new().respond(
        HOST,
        SHOW_BRIDGE_DOMAIN,
        output_fixtures::ASR920_SINGLE_VFI,
    ));
    let provider =
        BridgeDomainSyncProvider::new(store.clone(), Arc::new(FailingActivityLog), runner);
    let group = group_of([DataSourceBuilder::for_device("ds-1", &device).build()]);

    let results = provider.automated_sync(&group).await;

    ResultLogVerifier::new(&results)
        .assert_only(SyncResultType::Success)
        .unwrap();
    assert!(store.activity_log().await.is_empty());
}

/// Scenario: one unreachable device between two reachable ones
#[tokio::test]
async fn test_unreachable_device_does_not_stop_the_group() {
    let store = Arc::new(InMemoryInventory::new());
    let first = inventory_fixtures::seed_router(&store, "ASR920-1", &[]).await;
    let second = inventory_fixtures::seed_router(&store, "ASR920-2", &[]).await;
    let third = inventory_fixtures::seed_router(&store, "ASR920-3", &[]).await;
    let runner = Arc::new(
        ScriptedRunner::new()
            .respond("192.0.2.1", SHOW_BRIDGE_DOMAIN, output_fixtures::ASR920_SINGLE_VFI)
            .respond("192.0.2.3", SHOW_BRIDGE_DOMAIN, output_fixtures::ASR920_SINGLE_VFI),
    );
    let provider = BridgeDomainSyncProvider::new(store.clone(), store.clone(), runner.clone());
    let group = group_of([
        DataSourceBuilder::for_device("ds-1", &first).with_host("192.0.2.1").build(),
        DataSourceBuilder::for_device("ds-2", &second).with_host("192.0.2.2").build(),
        DataSourceBuilder::for_device("ds-3", &third).with_host("192.0.2.3").build(),
    ]);

    let response = provider.mapped_poll(&group).await;
    assert_eq!(response.polled().len(), 2);
    let errors: Vec<_> = response.errors_for("ds-2").collect();
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], SyncError::ConnectionFailed { .. }));

    let results = provider.sync(&response).await;
    let log = ResultLogVerifier::new(&results);
    assert_eq!(log.for_data_source("ds-1").len(), 3);
    assert_eq!(log.for_data_source("ds-3").len(), 3);
    assert_eq!(runner.call_count(), 3);
    // VFI100 is shared: created once, related to both bridge domains
    assert_eq!(
        store
            .relationship_count(kuwaiba_bdsyncd::RELATIONSHIP_BRIDGE_DOMAIN_VFI)
            .await,
        2
    );
}

/// Scenario: the device rejects the command
#[tokio::test]
async fn test_ios_error_banner_is_parse_error() {
    let store = Arc::new(InMemoryInventory::new());
    let device = inventory_fixtures::seed_router(&store, "ASR920-1", &[]).await;
    let runner = Arc::new(ScriptedRunner::new().respond_with(
        HOST,
        SHOW_BRIDGE_DOMAIN,
        ExecResult::ok(output_fixtures::IOS_INVALID_INPUT),
    ));
    let provider = BridgeDomainSyncProvider::new(store.clone(), store.clone(), runner);
    let group = group_of([DataSourceBuilder::for_device("ds-1", &device).build()]);

    let response = provider.mapped_poll(&group).await;

    assert!(matches!(response.errors()[0].1, SyncError::Parse { .. }));
    assert_eq!(store.object_count().await, 2);
}

/// Scenario: snapshot saved after a run and reloaded sees only existing objects
#[tokio::test]
async fn test_snapshot_round_trip_keeps_sync_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("inventory.json");

    let store = Arc::new(InMemoryInventory::new());
    let device = inventory_fixtures::asr920(&store, "ASR920-1").await;
    let runner = Arc::new(ScriptedRunner::new().respond(
        HOST,
        SHOW_BRIDGE_DOMAIN,
        output_fixtures::ASR920_FULL,
    ));
    let group = group_of([DataSourceBuilder::for_device("ds-1", &device).build()]);
    BridgeDomainSyncProvider::new(store.clone(), store.clone(), runner.clone())
        .automated_sync(&group)
        .await;
    store.save(&path).await.unwrap();

    let reloaded = Arc::new(InMemoryInventory::load(&path).await.unwrap());
    let results = BridgeDomainSyncProvider::new(reloaded.clone(), reloaded.clone(), runner)
        .automated_sync(&group)
        .await;

    ResultLogVerifier::new(&results)
        .assert_only(SyncResultType::Information)
        .unwrap();
    assert_eq!(reloaded.object_count().await, store.object_count().await);
    assert_eq!(reloaded.activity_log().await.len(), 2);

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert!(raw["objects"].is_array());
}
