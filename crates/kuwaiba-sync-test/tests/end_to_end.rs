//! End-to-end bridge domain synchronization tests
//!
//! Drives the provider through poll and sync against the in-memory
//! inventory with a scripted SSH runner.

use pretty_assertions::assert_eq;
use std::sync::Arc;

use kuwaiba_bdsyncd::{
    normalize_port_name, BridgeDomainSyncProvider, RELATIONSHIP_BRIDGE_DOMAIN_INTERFACE,
    RELATIONSHIP_BRIDGE_DOMAIN_VFI,
};
use kuwaiba_inventory::{classes, InMemoryInventory, InventoryStore};
use kuwaiba_sync_common::{parameters, SyncProvider, SyncResultType};
use kuwaiba_sync_test::{
    fixtures::{inventory_fixtures, output_fixtures},
    group_of, DataSourceBuilder, InventoryVerifier, ResultLogVerifier, ScriptedRunner,
};

const HOST: &str = "192.0.2.1";
const SHOW_BRIDGE_DOMAIN: &str = "show bridge-domain";
const SHOW_SECTION: &str = "show running-config | section bridge-domain";

fn provider(store: &Arc<InMemoryInventory>, runner: &Arc<ScriptedRunner>) -> BridgeDomainSyncProvider {
    BridgeDomainSyncProvider::new(store.clone(), store.clone(), runner.clone())
}

/// Scenario:
/// 1. Empty inventory apart from device ASR920-1
/// 2. Device reports bridge domain BD100 with VFI VFI100
/// 3. First run creates BD, VFI and their relationship
/// 4. Second run only reports existing objects
#[tokio::test]
async fn test_asr920_single_vfi_is_idempotent() {
    let store = Arc::new(InMemoryInventory::new());
    let device = inventory_fixtures::seed_router(&store, "ASR920-1", &[]).await;
    let runner = Arc::new(ScriptedRunner::new().respond(
        HOST,
        SHOW_BRIDGE_DOMAIN,
        output_fixtures::ASR920_SINGLE_VFI,
    ));
    let provider = provider(&store, &runner);
    let group = group_of([DataSourceBuilder::for_device("ds-1", &device).build()]);

    let first = provider.automated_sync(&group).await;
    let log = ResultLogVerifier::new(&first);
    assert_eq!(first.len(), 3);
    log.assert_only(SyncResultType::Success).unwrap();
    log.assert_mentions(SyncResultType::Success, "BD100").unwrap();
    log.assert_mentions(SyncResultType::Success, "VFI100").unwrap();

    let objects_after_first = store.object_count().await;

    let second = provider.automated_sync(&group).await;
    assert_eq!(second.len(), 3);
    ResultLogVerifier::new(&second)
        .assert_only(SyncResultType::Information)
        .unwrap();

    let inventory = InventoryVerifier::new(&store);
    inventory.assert_object_count(objects_after_first).await.unwrap();
    let domains = inventory
        .assert_special_children(&device, classes::BRIDGE_DOMAIN, 1)
        .await
        .unwrap();
    inventory
        .assert_related(&domains[0], RELATIONSHIP_BRIDGE_DOMAIN_VFI, &["VFI100"])
        .await
        .unwrap();
    assert_eq!(runner.call_count(), 2);
}

/// Scenario: every member kind from both output formats lands where it belongs
#[tokio::test]
async fn test_full_outputs_for_both_formats() {
    let store = Arc::new(InMemoryInventory::new());
    let asr920 = inventory_fixtures::asr920(&store, "ASR920-1").await;
    let asr1002 = inventory_fixtures::asr920(&store, "ASR1002-1").await;
    let runner = Arc::new(
        ScriptedRunner::new()
            .respond(HOST, SHOW_BRIDGE_DOMAIN, output_fixtures::ASR920_FULL)
            .respond("192.0.2.2", SHOW_SECTION, output_fixtures::ASR1002_SECTION),
    );
    let provider = provider(&store, &runner);
    let group = group_of([
        DataSourceBuilder::for_device("ds-920", &asr920).build(),
        DataSourceBuilder::for_device("ds-1002", &asr1002)
            .with_host("192.0.2.2")
            .build(),
    ]);

    let results = provider.automated_sync(&group).await;
    let log = ResultLogVerifier::new(&results);
    log.assert_count(SyncResultType::Error, 0).unwrap();

    let inventory = InventoryVerifier::new(&store);
    inventory
        .assert_special_children(&asr920, classes::BRIDGE_DOMAIN, 2)
        .await
        .unwrap();
    let bdis = inventory
        .assert_special_children(&asr920, classes::BRIDGE_DOMAIN_INTERFACE, 1)
        .await
        .unwrap();
    inventory
        .assert_related(&bdis[0], RELATIONSHIP_BRIDGE_DOMAIN_INTERFACE, &["100"])
        .await
        .unwrap();

    // "Gi0/0/2" in the output resolves to GigabitEthernet0/0/2
    let gi2 = inventory_fixtures::port_of(&store, &asr920, "GigabitEthernet0/0/2").await;
    let instances = inventory
        .assert_special_children(&gi2, classes::SERVICE_INSTANCE, 1)
        .await
        .unwrap();
    inventory
        .assert_related(&instances[0], RELATIONSHIP_BRIDGE_DOMAIN_INTERFACE, &["200"])
        .await
        .unwrap();

    let asr1002_gi2 = inventory_fixtures::port_of(&store, &asr1002, "GigabitEthernet0/0/2").await;
    let subinterfaces = inventory
        .assert_special_children(&asr1002_gi2, classes::VIRTUAL_PORT, 1)
        .await
        .unwrap();
    assert_eq!(subinterfaces[0].name, "310");

    assert_eq!(
        store.get_objects_of_class_light(classes::VFI).await.unwrap().len(),
        2
    );
    assert_eq!(results.iter().filter(|r| r.data_source_id() == "ds-1002").count(), 7);
}

/// Scenario:
/// 1. Service instance 10 on Gi0/0/1 is in bridge domain A
/// 2. Device now reports it in bridge domain B
/// 3. Exactly one relationship remains, to B, and the move is reported
#[tokio::test]
async fn test_relationship_exclusivity() {
    let store = Arc::new(InMemoryInventory::new());
    let device = inventory_fixtures::asr920(&store, "ASR920-1").await;
    let runner = Arc::new(ScriptedRunner::new().respond(
        HOST,
        SHOW_BRIDGE_DOMAIN,
        output_fixtures::asr920_service_instance_in("A"),
    ));
    let provider = provider(&store, &runner);
    let group = group_of([DataSourceBuilder::for_device("ds-1", &device).build()]);

    provider.automated_sync(&group).await;
    runner.set(
        HOST,
        SHOW_BRIDGE_DOMAIN,
        kuwaiba_sync_common::ExecResult::ok(output_fixtures::asr920_service_instance_in("B")),
    );
    let results = provider.automated_sync(&group).await;

    ResultLogVerifier::new(&results)
        .assert_mentions(SyncResultType::Success, "moved from bridge domain A to bridge domain B")
        .unwrap();

    let port = inventory_fixtures::port_of(&store, &device, "GigabitEthernet0/0/1").await;
    let inventory = InventoryVerifier::new(&store);
    let instances = inventory
        .assert_special_children(&port, classes::SERVICE_INSTANCE, 1)
        .await
        .unwrap();
    inventory
        .assert_related(&instances[0], RELATIONSHIP_BRIDGE_DOMAIN_INTERFACE, &["B"])
        .await
        .unwrap();
    assert_eq!(
        store
            .relationship_count(RELATIONSHIP_BRIDGE_DOMAIN_INTERFACE)
            .await,
        1
    );
}

/// Scenario: device model without a parser yields one error, no SSH session
#[tokio::test]
async fn test_unsupported_model() {
    let store = Arc::new(InMemoryInventory::new());
    let device = inventory_fixtures::seed_router(&store, "MX480-1", &[]).await;
    let runner = Arc::new(ScriptedRunner::new());
    let provider = provider(&store, &runner);
    let group = group_of([DataSourceBuilder::for_device("ds-1", &device).build()]);

    let response = provider.mapped_poll(&group).await;
    assert!(response.entities_for("ds-1").is_none());
    assert_eq!(response.errors_for("ds-1").count(), 1);

    let results = provider.automated_sync(&group).await;
    assert_eq!(results.len(), 1);
    ResultLogVerifier::new(&results)
        .assert_mentions(SyncResultType::Error, "MX480")
        .unwrap();
    assert_eq!(runner.call_count(), 0);
}

/// Scenario: each required parameter missing in turn stops before connecting
#[tokio::test]
async fn test_missing_parameters() {
    let store = Arc::new(InMemoryInventory::new());
    let device = inventory_fixtures::seed_router(&store, "ASR920-1", &[]).await;
    let runner = Arc::new(ScriptedRunner::new());
    let provider = provider(&store, &runner);

    for parameter in parameters::REQUIRED {
        let group = group_of([DataSourceBuilder::for_device("ds-1", &device)
            .without(parameter)
            .build()]);
        let response = provider.mapped_poll(&group).await;

        assert_eq!(response.errors().len(), 1, "parameter {}", parameter);
        assert!(response.errors()[0].1.is_invalid_argument());
        assert!(response.errors()[0].1.to_string().contains(parameter));
    }
    assert_eq!(runner.call_count(), 0);
}

#[test]
fn test_port_name_equivalence() {
    assert_eq!(
        normalize_port_name("GigabitEthernet0/0/1"),
        normalize_port_name("gi0/0/1")
    );
    assert_eq!(normalize_port_name("Te0/1/0"), normalize_port_name("TenGigabitEthernet 0/1/0"));
    assert_ne!(normalize_port_name("Gi0/0/1"), normalize_port_name("Te0/0/1"));
}
