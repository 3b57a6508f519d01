//! Test fixtures for bridge domain synchronization
//!
//! Provides reusable device outputs, data source configurations and
//! inventory layouts.

use std::collections::BTreeMap;

use kuwaiba_inventory::{
    attributes, classes, BusinessObjectLight, InMemoryInventory, InventoryStore,
};
use kuwaiba_sync_common::{parameters, DataSourceConfiguration, SynchronizationGroup};

/// Builder for a device data source configuration
#[derive(Debug, Clone)]
pub struct DataSourceBuilder {
    id: String,
    name: String,
    parameters: BTreeMap<String, String>,
}

impl DataSourceBuilder {
    /// Configuration with every required parameter pointing at `device`
    pub fn for_device(id: impl Into<String>, device: &BusinessObjectLight) -> Self {
        Self {
            id: id.into(),
            name: format!("{} over SSH", device.name),
            parameters: BTreeMap::new(),
        }
        .with_parameter(parameters::DEVICE_ID, &device.id)
        .with_parameter(parameters::DEVICE_CLASS, &device.class_name)
        .with_parameter(parameters::IP_ADDRESS, "192.0.2.1")
        .with_parameter(parameters::PORT, "22")
        .with_parameter(parameters::USER, "admin")
        .with_parameter(parameters::PASSWORD, "cisco")
    }

    /// Set or replace a parameter
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    /// Drop a parameter
    pub fn without(mut self, key: &str) -> Self {
        self.parameters.remove(key);
        self
    }

    /// Set the host the runner sees
    pub fn with_host(self, host: impl Into<String>) -> Self {
        self.with_parameter(parameters::IP_ADDRESS, host)
    }

    pub fn build(self) -> DataSourceConfiguration {
        let mut configuration = DataSourceConfiguration::new(self.id, self.name);
        configuration.parameters = self.parameters;
        configuration
    }
}

/// Group holding the given configurations, in order
pub fn group_of<I>(configurations: I) -> SynchronizationGroup
where
    I: IntoIterator<Item = DataSourceConfiguration>,
{
    configurations
        .into_iter()
        .fold(SynchronizationGroup::new("test-group", "Test group"), |g, c| {
            g.with_configuration(c)
        })
}

/// Inventory layouts
pub mod inventory_fixtures {
    use super::*;

    /// Create a router named `name` with one line card holding `ports`
    pub async fn seed_router(
        store: &InMemoryInventory,
        name: &str,
        ports: &[&str],
    ) -> BusinessObjectLight {
        let router = store
            .create_object(classes::ROUTER, None, &attributes! { "name" => name })
            .await
            .expect("Failed to create router");
        let card = store
            .create_object("IOModule", Some(&router.key()), &attributes! { "name" => "0/0" })
            .await
            .expect("Failed to create line card");
        for port in ports {
            store
                .create_object(
                    classes::ELECTRICAL_PORT,
                    Some(&card.key()),
                    &attributes! { "name" => *port },
                )
                .await
                .expect("Failed to create port");
        }
        router
    }

    /// ASR 920 with two gigabit ports
    pub async fn asr920(store: &InMemoryInventory, name: &str) -> BusinessObjectLight {
        seed_router(store, name, &["GigabitEthernet0/0/1", "GigabitEthernet0/0/2"]).await
    }

    /// Physical port of `device` by exact name
    pub async fn port_of(
        store: &InMemoryInventory,
        device: &BusinessObjectLight,
        name: &str,
    ) -> BusinessObjectLight {
        store
            .get_children_of_class_light_recursive(
                &device.class_name,
                &device.id,
                classes::GENERIC_PHYSICAL_PORT,
            )
            .await
            .expect("Failed to list ports")
            .into_iter()
            .find(|p| p.name == name)
            .unwrap_or_else(|| panic!("Port {} not found in {}", name, device))
    }
}

/// Sample device outputs
pub mod output_fixtures {
    /// `show bridge-domain` with one bridge domain and one VFI
    pub const ASR920_SINGLE_VFI: &str = "\
Bridge-domain BD100 (1 ports in all)
State: UP                    Mac learning: Enabled
Aging-Timer: 300 second(s)
    vfi VFI100 neighbor 10.0.0.2 100
   AED MAC address    Policy  Tag       Age  Pseudoport
";

    /// `show bridge-domain` with every member kind
    pub const ASR920_FULL: &str = "\
Bridge-domain 100 (3 ports in all)
State: UP                    Mac learning: Enabled
Aging-Timer: 300 second(s)
    BDI100 (up)
    GigabitEthernet0/0/1 service instance 100
    vfi VFI100 neighbor 10.1.1.1 100
   AED MAC address    Policy  Tag       Age  Pseudoport
   0   000c.2934.5d20 forward dynamic   296  GigabitEthernet0/0/1.EFP100

Bridge-domain 200 (1 ports in all)
State: UP                    Mac learning: Enabled
Aging-Timer: 300 second(s)
    Gi0/0/2 service instance 200
";

    /// `show running-config | section bridge-domain` of an ASR 1002
    pub const ASR1002_SECTION: &str = "\
bridge-domain 300
 member GigabitEthernet0/0/1 service-instance 300
 member GigabitEthernet0/0/2.310
 member vfi VFI300
!
";

    /// Service instance 10 of Gi0/0/1 under bridge domain `name`
    pub fn asr920_service_instance_in(name: &str) -> String {
        format!(
            "Bridge-domain {} (1 ports in all)\nState: UP                    Mac learning: Enabled\n    GigabitEthernet0/0/1 service instance 10\n",
            name
        )
    }

    /// IOS rejecting the command
    pub const IOS_INVALID_INPUT: &str = "\
show bridge-domain
     ^
% Invalid input detected at '^' marker.
";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_sets_required_parameters() {
        let device = BusinessObjectLight::new(classes::ROUTER, "42", "ASR920-1");
        let configuration = DataSourceBuilder::for_device("ds-1", &device).build();

        assert!(configuration.require_all(&parameters::REQUIRED).is_ok());
        assert_eq!(configuration.name, "ASR920-1 over SSH");
        assert_eq!(configuration.get_parameter(parameters::DEVICE_ID), Some("42"));
    }

    #[test]
    fn test_builder_without_parameter() {
        let device = BusinessObjectLight::new(classes::ROUTER, "42", "ASR920-1");
        let configuration = DataSourceBuilder::for_device("ds-1", &device)
            .without(parameters::USER)
            .build();
        assert!(configuration.require_all(&parameters::REQUIRED).is_err());
    }

    #[test]
    fn test_group_keeps_order() {
        let device = BusinessObjectLight::new(classes::ROUTER, "42", "ASR920-1");
        let group = group_of([
            DataSourceBuilder::for_device("b", &device).build(),
            DataSourceBuilder::for_device("a", &device).build(),
        ]);
        let ids: Vec<_> = group.configurations.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }
}
