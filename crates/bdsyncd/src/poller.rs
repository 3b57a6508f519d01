//! Device poller - fetches and parses bridge domain configuration

use std::sync::Arc;
use tracing::{debug, info, instrument};

use kuwaiba_inventory::{BusinessObjectLight, InventoryStore};
use kuwaiba_sync_common::{
    parameters, remote, CommandRunner, DataSourceConfiguration, Result, SshTarget,
};

use crate::parser::ParserRegistry;
use crate::types::BridgeDomain;

/// Polls one device per call
///
/// Checks run cheapest first and all of them before the SSH session is
/// opened: required parameters, device lookup, model support.
#[derive(Clone)]
pub struct DevicePoller {
    store: Arc<dyn InventoryStore>,
    runner: Arc<dyn CommandRunner>,
    registry: ParserRegistry,
}

impl DevicePoller {
    /// Create a poller using the default model registry
    pub fn new(store: Arc<dyn InventoryStore>, runner: Arc<dyn CommandRunner>) -> Self {
        Self::with_registry(store, runner, ParserRegistry::with_default_models())
    }

    /// Create a poller with a custom model registry
    pub fn with_registry(
        store: Arc<dyn InventoryStore>,
        runner: Arc<dyn CommandRunner>,
        registry: ParserRegistry,
    ) -> Self {
        Self {
            store,
            runner,
            registry,
        }
    }

    /// Resolve the device a configuration points to
    pub async fn resolve_device(
        &self,
        configuration: &DataSourceConfiguration,
    ) -> Result<BusinessObjectLight> {
        let device_class = configuration.require(parameters::DEVICE_CLASS)?;
        let device_id = configuration.require(parameters::DEVICE_ID)?;
        Ok(self.store.get_object_light(device_class, device_id).await?)
    }

    /// Poll a device and parse its bridge domains
    #[instrument(skip(self, configuration), fields(configuration = %configuration.name))]
    pub async fn poll(&self, configuration: &DataSourceConfiguration) -> Result<Vec<BridgeDomain>> {
        configuration.require_all(&parameters::REQUIRED)?;
        let port = configuration.require_port(parameters::PORT)?;

        let device = self.resolve_device(configuration).await?;
        let (model, parser) = self.registry.for_device(&device.name)?;
        debug!(device = %device, model = %model, "Resolved device model");

        let target = SshTarget::new(
            configuration.require(parameters::IP_ADDRESS)?,
            port,
            configuration.require(parameters::USER)?,
            configuration.require(parameters::PASSWORD)?,
        );
        let output = remote::exec_or_fail(self.runner.as_ref(), &target, parser.command()).await?;
        let domains = parser.parse(&output)?;

        info!(
            device = %device,
            bridge_domains = domains.len(),
            "Polled bridge domains"
        );
        Ok(domains)
    }
}
