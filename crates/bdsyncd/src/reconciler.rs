//! Reconciler - brings the inventory in line with parsed bridge domains
//!
//! Single pass, create-if-missing, relate-if-absent. Existing objects are
//! loaded once per run and every object created during the run is added to
//! the local cache, so later lookups in the same run see it. Every decision
//! produces exactly one [`SyncResult`].
//!
//! Nothing is rolled back: objects created before a failure stay.

use std::collections::HashMap;
use tracing::{debug, info, instrument, warn};

use kuwaiba_inventory::{
    attributes, BusinessObjectLight, InventoryStore, ObjectKey, ATTRIBUTE_NAME,
};
use kuwaiba_sync_common::{Result, SyncResult};

use crate::port_name::normalize_port_name;
use crate::tables::{
    BRIDGE_DOMAIN, BRIDGE_DOMAIN_INTERFACE, GENERIC_PHYSICAL_PORT,
    RELATIONSHIP_BRIDGE_DOMAIN_INTERFACE, RELATIONSHIP_BRIDGE_DOMAIN_VFI, VFI,
};
use crate::types::{BridgeDomain, InterfaceKind, NetworkInterface};

/// Reconcile the bridge domains of one device
///
/// Never fails: a failure while loading the existing objects ends the run
/// for this device with a single ERROR result, and a failure inside a bridge
/// domain skips the rest of that bridge domain's interfaces.
pub async fn reconcile(
    store: &dyn InventoryStore,
    data_source_id: &str,
    device: &BusinessObjectLight,
    domains: &[BridgeDomain],
) -> Vec<SyncResult> {
    let mut run = match Reconciler::load(store, data_source_id, device).await {
        Ok(run) => run,
        Err(e) => {
            warn!(device = %device, error = %e, "Could not load existing inventory objects");
            return vec![SyncResult::error(
                data_source_id,
                format!("Load existing objects of {}", device),
                e.to_string(),
            )];
        }
    };

    for domain in domains {
        if let Err(e) = run.sync_bridge_domain(domain).await {
            warn!(device = %device, bridge_domain = %domain.name, error = %e, "Bridge domain sync aborted");
            run.results.push(SyncResult::error(
                data_source_id,
                format!("Synchronize bridge domain {}", domain.name),
                e.to_string(),
            ));
        }
    }

    info!(device = %device, results = run.results.len(), "Reconciliation finished");
    run.results
}

struct Reconciler<'a> {
    store: &'a dyn InventoryStore,
    data_source_id: &'a str,
    device: &'a BusinessObjectLight,
    bridge_domains: Vec<BusinessObjectLight>,
    vfis: Vec<BusinessObjectLight>,
    ports: Vec<BusinessObjectLight>,
    /// (anchor id, class) -> special children; BDIs are loaded up front,
    /// port children on first use
    special_children: HashMap<(String, &'static str), Vec<BusinessObjectLight>>,
    /// logical interface -> first bridge domain listing it in this run
    claimed: HashMap<(&'static str, String, String), String>,
    results: Vec<SyncResult>,
}

impl<'a> Reconciler<'a> {
    #[instrument(skip(store, device), fields(device = %device))]
    async fn load(
        store: &'a dyn InventoryStore,
        data_source_id: &'a str,
        device: &'a BusinessObjectLight,
    ) -> Result<Reconciler<'a>> {
        let bridge_domains = store
            .get_special_children_of_class_light(&device.class_name, &device.id, BRIDGE_DOMAIN)
            .await?;
        let bdis = store
            .get_special_children_of_class_light(
                &device.class_name,
                &device.id,
                BRIDGE_DOMAIN_INTERFACE,
            )
            .await?;
        // VFIs are headless: the same VFI spans every PE of the VPLS
        let vfis = store.get_objects_of_class_light(VFI).await?;
        let ports = store
            .get_children_of_class_light_recursive(
                &device.class_name,
                &device.id,
                GENERIC_PHYSICAL_PORT,
            )
            .await?;

        debug!(
            bridge_domains = bridge_domains.len(),
            bdis = bdis.len(),
            vfis = vfis.len(),
            ports = ports.len(),
            "Loaded existing objects"
        );

        Ok(Self {
            store,
            data_source_id,
            device,
            bridge_domains,
            vfis,
            ports,
            special_children: HashMap::from([(
                (device.id.clone(), BRIDGE_DOMAIN_INTERFACE),
                bdis,
            )]),
            claimed: HashMap::new(),
            results: Vec::new(),
        })
    }

    fn information(&mut self, action: impl Into<String>, result: impl Into<String>) {
        self.results
            .push(SyncResult::information(self.data_source_id, action, result));
    }

    fn success(&mut self, action: impl Into<String>, result: impl Into<String>) {
        self.results
            .push(SyncResult::success(self.data_source_id, action, result));
    }

    fn warning(&mut self, action: impl Into<String>, result: impl Into<String>) {
        self.results
            .push(SyncResult::warning(self.data_source_id, action, result));
    }

    fn error(&mut self, action: impl Into<String>, result: impl Into<String>) {
        self.results
            .push(SyncResult::error(self.data_source_id, action, result));
    }

    async fn sync_bridge_domain(&mut self, domain: &BridgeDomain) -> Result<()> {
        let bridge_domain = self.ensure_bridge_domain(&domain.name).await?;
        for interface in &domain.interfaces {
            match interface.kind {
                InterfaceKind::Vfi => self.sync_vfi(&bridge_domain, interface).await?,
                InterfaceKind::Bdi
                | InterfaceKind::ServiceInstance
                | InterfaceKind::GenericSubinterface => {
                    self.sync_logical_interface(&bridge_domain, interface).await?
                }
            }
        }
        Ok(())
    }

    async fn ensure_bridge_domain(&mut self, name: &str) -> Result<BusinessObjectLight> {
        if let Some(existing) = find_by_name(&self.bridge_domains, name) {
            self.information(
                "Check bridge domain",
                format!("Bridge domain {} already exists in {}", name, self.device),
            );
            return Ok(existing);
        }

        let created = self
            .store
            .create_special_object(BRIDGE_DOMAIN, &self.device.key(), &attributes! { ATTRIBUTE_NAME => name })
            .await?;
        self.bridge_domains.push(created.clone());
        self.success(
            "Create bridge domain",
            format!("Bridge domain {} created in {}", name, self.device),
        );
        Ok(created)
    }

    async fn sync_vfi(
        &mut self,
        bridge_domain: &BusinessObjectLight,
        interface: &NetworkInterface,
    ) -> Result<()> {
        let vfi = match find_by_name(&self.vfis, &interface.name) {
            Some(existing) => {
                self.information("Check VFI", format!("VFI {} already exists", interface.name));
                existing
            }
            None => {
                let created = self
                    .store
                    .create_headless_object(VFI, &attributes! { ATTRIBUTE_NAME => &interface.name })
                    .await?;
                self.vfis.push(created.clone());
                self.success("Create VFI", format!("VFI {} created", interface.name));
                created
            }
        };

        let related = self
            .store
            .get_special_attribute(
                &bridge_domain.class_name,
                &bridge_domain.id,
                RELATIONSHIP_BRIDGE_DOMAIN_VFI,
            )
            .await?;
        if related.iter().any(|r| r.same_object(&vfi)) {
            self.information(
                "Relate VFI to bridge domain",
                format!("VFI {} is already related to bridge domain {}", vfi.name, bridge_domain.name),
            );
        } else {
            self.store
                .create_special_relationship(
                    &bridge_domain.key(),
                    &vfi.key(),
                    RELATIONSHIP_BRIDGE_DOMAIN_VFI,
                )
                .await?;
            self.success(
                "Relate VFI to bridge domain",
                format!("VFI {} related to bridge domain {}", vfi.name, bridge_domain.name),
            );
        }
        Ok(())
    }

    async fn sync_logical_interface(
        &mut self,
        bridge_domain: &BusinessObjectLight,
        interface: &NetworkInterface,
    ) -> Result<()> {
        // an interface belongs to one bridge domain; relating it to each
        // listing in turn would move it back and forth on every run
        let member = (
            interface.kind.as_str(),
            normalize_port_name(interface.port.as_deref().unwrap_or_default()),
            interface.name.clone(),
        );
        match self.claimed.get(&member) {
            Some(owner) if *owner != bridge_domain.name => {
                let owner = owner.clone();
                warn!(interface = %interface, first = %owner, duplicate = %bridge_domain.name, "Interface listed in two bridge domains");
                self.warning(
                    format!("Relate {} to bridge domain", interface.kind.as_str()),
                    format!(
                        "{} is also listed under bridge domain {}, kept in bridge domain {}",
                        interface, bridge_domain.name, owner
                    ),
                );
                return Ok(());
            }
            Some(_) => {}
            None => {
                self.claimed.insert(member, bridge_domain.name.clone());
            }
        }

        let class_name = interface.kind.class_name();
        let anchor = if interface.kind.is_port_anchored() {
            let port_name = interface.port.as_deref().unwrap_or_default();
            match self.find_port(port_name) {
                Some(port) => port,
                None => {
                    self.error(
                        format!("Locate port of {}", interface),
                        format!("Port {} could not be found in {}", port_name, self.device),
                    );
                    return Ok(());
                }
            }
        } else {
            self.device.clone()
        };

        let object = self.ensure_child(&anchor, class_name, interface).await?;
        self.relate_exclusively(bridge_domain, &object, interface).await
    }

    fn find_port(&self, name: &str) -> Option<BusinessObjectLight> {
        let wanted = normalize_port_name(name);
        if wanted.is_empty() {
            return None;
        }
        self.ports
            .iter()
            .find(|p| normalize_port_name(&p.name) == wanted)
            .cloned()
    }

    /// Special children of `anchor` of one class, loaded on first use
    async fn special_children(
        &mut self,
        anchor: &BusinessObjectLight,
        class_name: &'static str,
    ) -> Result<&mut Vec<BusinessObjectLight>> {
        let key = (anchor.id.clone(), class_name);
        if !self.special_children.contains_key(&key) {
            let loaded = self
                .store
                .get_special_children_of_class_light(&anchor.class_name, &anchor.id, class_name)
                .await?;
            self.special_children.insert(key.clone(), loaded);
        }
        Ok(self.special_children.entry(key).or_default())
    }

    async fn ensure_child(
        &mut self,
        anchor: &BusinessObjectLight,
        class_name: &'static str,
        interface: &NetworkInterface,
    ) -> Result<BusinessObjectLight> {
        let found = find_by_name(self.special_children(anchor, class_name).await?, &interface.name);
        if let Some(found) = found {
            self.information(
                format!("Check {}", interface.kind.as_str()),
                format!("{} already exists in {}", interface, anchor),
            );
            return Ok(found);
        }

        let created = self
            .store
            .create_special_object(
                class_name,
                &anchor.key(),
                &attributes! { ATTRIBUTE_NAME => &interface.name },
            )
            .await?;
        self.special_children(anchor, class_name)
            .await?
            .push(created.clone());
        self.success(
            format!("Create {}", interface.kind.as_str()),
            format!("{} created in {}", interface, anchor),
        );
        Ok(created)
    }

    async fn relate_exclusively(
        &mut self,
        bridge_domain: &BusinessObjectLight,
        object: &BusinessObjectLight,
        interface: &NetworkInterface,
    ) -> Result<()> {
        let action = format!("Relate {} to bridge domain", interface.kind.as_str());
        let related = self
            .store
            .get_special_attribute(
                &object.class_name,
                &object.id,
                RELATIONSHIP_BRIDGE_DOMAIN_INTERFACE,
            )
            .await?;

        if related.len() == 1 && related[0].same_object(bridge_domain) {
            self.information(
                action,
                format!("{} is already related to bridge domain {}", interface, bridge_domain.name),
            );
            return Ok(());
        }

        let key: ObjectKey = object.key();
        if related.is_empty() {
            self.store
                .create_special_relationship(&key, &bridge_domain.key(), RELATIONSHIP_BRIDGE_DOMAIN_INTERFACE)
                .await?;
            self.success(
                action,
                format!("{} related to bridge domain {}", interface, bridge_domain.name),
            );
            return Ok(());
        }

        // not transactional: a failure after the release leaves the
        // interface without a bridge domain until the next run
        let previous = related
            .iter()
            .map(|r| r.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        self.store
            .release_relationships(&key, &[RELATIONSHIP_BRIDGE_DOMAIN_INTERFACE])
            .await?;
        self.store
            .create_special_relationship(&key, &bridge_domain.key(), RELATIONSHIP_BRIDGE_DOMAIN_INTERFACE)
            .await?;
        self.success(
            action,
            format!(
                "{} moved from bridge domain {} to bridge domain {}",
                interface, previous, bridge_domain.name
            ),
        );
        Ok(())
    }
}

fn find_by_name(objects: &[BusinessObjectLight], name: &str) -> Option<BusinessObjectLight> {
    objects.iter().find(|o| o.name == name).cloned()
}
