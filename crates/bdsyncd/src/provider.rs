//! Bridge domain sync provider

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use kuwaiba_inventory::{ActivityLog, ActivityLogEntry, ActivityLogEntryType, InventoryStore};
use kuwaiba_sync_common::{
    CommandRunner, PollResponse, SyncProvider, SyncResult, SyncResultType, SynchronizationGroup,
};

use crate::parser::ParserRegistry;
use crate::poller::DevicePoller;
use crate::reconciler::reconcile;
use crate::tables::{DEFAULT_SYNC_USER, PROVIDER_ID, PROVIDER_NAME};
use crate::types::BridgeDomain;

/// Polls Cisco devices for bridge domains and reconciles them into the
/// inventory
pub struct BridgeDomainSyncProvider {
    poller: DevicePoller,
    store: Arc<dyn InventoryStore>,
    activity_log: Arc<dyn ActivityLog>,
    user: String,
}

impl BridgeDomainSyncProvider {
    pub fn new(
        store: Arc<dyn InventoryStore>,
        activity_log: Arc<dyn ActivityLog>,
        runner: Arc<dyn CommandRunner>,
    ) -> Self {
        Self::with_registry(store, activity_log, runner, ParserRegistry::with_default_models())
    }

    pub fn with_registry(
        store: Arc<dyn InventoryStore>,
        activity_log: Arc<dyn ActivityLog>,
        runner: Arc<dyn CommandRunner>,
        registry: ParserRegistry,
    ) -> Self {
        Self {
            poller: DevicePoller::with_registry(store.clone(), runner, registry),
            store,
            activity_log,
            user: DEFAULT_SYNC_USER.to_string(),
        }
    }

    /// User recorded in the activity log
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    async fn log_activity(&self, configuration_name: &str, results: &[SyncResult]) {
        let count = |t: SyncResultType| results.iter().filter(|r| r.result_type() == t).count();
        let notes = format!(
            "{} synchronized {}: {} created or updated, {} unchanged, {} errors",
            PROVIDER_NAME,
            configuration_name,
            count(SyncResultType::Success),
            count(SyncResultType::Information),
            count(SyncResultType::Error),
        );
        let entry = ActivityLogEntry::new(&self.user, ActivityLogEntryType::ExternalApp, notes);
        if let Err(e) = self.activity_log.create_general_activity_log_entry(entry).await {
            warn!(configuration = configuration_name, error = %e, "Failed to write activity log entry");
        }
    }
}

#[async_trait]
impl SyncProvider for BridgeDomainSyncProvider {
    type Entity = BridgeDomain;

    fn id(&self) -> &str {
        PROVIDER_ID
    }

    fn display_name(&self) -> &str {
        PROVIDER_NAME
    }

    #[instrument(skip(self, group), fields(group = %group.name))]
    async fn mapped_poll(&self, group: &SynchronizationGroup) -> PollResponse<BridgeDomain> {
        let mut response = PollResponse::new();
        for configuration in &group.configurations {
            match self.poller.poll(configuration).await {
                Ok(domains) => response.add_entities(configuration.clone(), domains),
                Err(e) => {
                    error!(configuration = %configuration.name, error = %e, "Poll failed");
                    response.add_error(&configuration.id, e);
                }
            }
        }
        info!(
            polled = response.polled().len(),
            failed = response.errors().len(),
            "Poll finished"
        );
        response
    }

    async fn sync(&self, response: &PollResponse<BridgeDomain>) -> Vec<SyncResult> {
        let mut results = Vec::new();
        for polled in response.polled() {
            let configuration = &polled.configuration;
            let configuration_results = match self.poller.resolve_device(configuration).await {
                Ok(device) => {
                    reconcile(
                        self.store.as_ref(),
                        &configuration.id,
                        &device,
                        &polled.entities,
                    )
                    .await
                }
                Err(e) => vec![SyncResult::error(
                    configuration.id.as_str(),
                    "Resolve device",
                    e.to_string(),
                )],
            };
            self.log_activity(&configuration.name, &configuration_results)
                .await;
            results.extend(configuration_results);
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kuwaiba_inventory::{attributes, classes, BusinessObjectLight, InMemoryInventory};
    use kuwaiba_sync_common::{
        parameters, DataSourceConfiguration, ExecResult, Result, SshTarget,
    };
    use std::sync::Mutex;

    const ASR920_OUTPUT: &str = "\
Bridge-domain 100 (2 ports in all)
State: UP                    Mac learning: Enabled
    vfi VFI100 neighbor 10.0.0.2 100
";

    struct FixedRunner {
        output: String,
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl CommandRunner for FixedRunner {
        async fn run(&self, _target: &SshTarget, command: &str) -> Result<ExecResult> {
            self.calls.lock().unwrap().push(command.to_string());
            Ok(ExecResult::ok(self.output.clone()))
        }
    }

    fn configuration(device: &BusinessObjectLight) -> DataSourceConfiguration {
        DataSourceConfiguration::new("ds-1", "asr920-1 ssh")
            .with_parameter(parameters::DEVICE_ID, &device.id)
            .with_parameter(parameters::DEVICE_CLASS, &device.class_name)
            .with_parameter(parameters::IP_ADDRESS, "10.0.0.1")
            .with_parameter(parameters::PORT, "22")
            .with_parameter(parameters::USER, "admin")
            .with_parameter(parameters::PASSWORD, "secret")
    }

    async fn setup(device_name: &str) -> (Arc<InMemoryInventory>, Arc<FixedRunner>, BusinessObjectLight) {
        let store = Arc::new(InMemoryInventory::new());
        let device = store
            .create_object(classes::ROUTER, None, &attributes! { "name" => device_name })
            .await
            .unwrap();
        let runner = Arc::new(FixedRunner {
            output: ASR920_OUTPUT.to_string(),
            calls: Mutex::new(Vec::new()),
        });
        (store, runner, device)
    }

    #[tokio::test]
    async fn test_automated_sync_writes_activity_log() {
        let (store, runner, device) = setup("ASR920-1").await;
        let provider = BridgeDomainSyncProvider::new(store.clone(), store.clone(), runner.clone());
        let group = SynchronizationGroup::new("g1", "PE routers").with_configuration(configuration(&device));

        let results = provider.automated_sync(&group).await;

        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| r.result_type() == SyncResultType::Success));
        assert_eq!(runner.calls.lock().unwrap().as_slice(), ["show bridge-domain"]);

        let log = store.activity_log().await;
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].entry_type, ActivityLogEntryType::ExternalApp);
        assert_eq!(log[0].user, DEFAULT_SYNC_USER);
        assert!(log[0].notes.contains("3 created or updated"));
    }

    #[tokio::test]
    async fn test_unsupported_model_never_connects() {
        let (store, runner, device) = setup("MX480-1").await;
        let provider = BridgeDomainSyncProvider::new(store.clone(), store.clone(), runner.clone());
        let group = SynchronizationGroup::new("g1", "PE routers").with_configuration(configuration(&device));

        let response = provider.mapped_poll(&group).await;

        assert!(response.polled().is_empty());
        assert_eq!(response.errors().len(), 1);
        assert!(response.errors()[0].1.is_invalid_argument());
        assert!(runner.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_one_failing_configuration_does_not_stop_the_group() {
        let (store, runner, device) = setup("ASR920-1").await;
        let provider = BridgeDomainSyncProvider::new(store.clone(), store.clone(), runner.clone())
            .with_user("noc");
        let broken = DataSourceConfiguration::new("ds-0", "broken");
        let group = SynchronizationGroup::new("g1", "PE routers")
            .with_configuration(broken)
            .with_configuration(configuration(&device));

        let results = provider.automated_sync(&group).await;

        assert_eq!(results[0].result_type(), SyncResultType::Error);
        assert_eq!(results[0].data_source_id(), "ds-0");
        assert_eq!(results.len(), 4);
        assert_eq!(store.activity_log().await[0].user, "noc");
    }
}
