//! Type definitions for bdsyncd

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::tables::{BRIDGE_DOMAIN_INTERFACE, SERVICE_INSTANCE, VFI, VIRTUAL_PORT};

/// Kind of a bridge domain member interface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InterfaceKind {
    /// Virtual forwarding instance
    Vfi,
    /// Bridge domain interface (routed)
    Bdi,
    /// Ethernet service instance on a physical port
    ServiceInstance,
    /// Dot1q sub-interface of a physical port
    GenericSubinterface,
}

impl InterfaceKind {
    /// Convert to string
    pub fn as_str(&self) -> &'static str {
        match self {
            InterfaceKind::Vfi => "VFI",
            InterfaceKind::Bdi => "BDI",
            InterfaceKind::ServiceInstance => "service instance",
            InterfaceKind::GenericSubinterface => "sub-interface",
        }
    }

    /// Inventory class used to persist this kind
    pub fn class_name(&self) -> &'static str {
        match self {
            InterfaceKind::Vfi => VFI,
            InterfaceKind::Bdi => BRIDGE_DOMAIN_INTERFACE,
            InterfaceKind::ServiceInstance => SERVICE_INSTANCE,
            InterfaceKind::GenericSubinterface => VIRTUAL_PORT,
        }
    }

    /// True if the interface hangs from a physical port
    pub fn is_port_anchored(&self) -> bool {
        matches!(
            self,
            InterfaceKind::ServiceInstance | InterfaceKind::GenericSubinterface
        )
    }
}

/// Member interface of a bridge domain, as parsed from the device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkInterface {
    /// Name the inventory object gets
    pub name: String,
    /// Interface kind
    pub kind: InterfaceKind,
    /// Physical port as named by the device, for port-anchored kinds
    pub port: Option<String>,
}

impl NetworkInterface {
    /// VFI member
    pub fn vfi(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: InterfaceKind::Vfi,
            port: None,
        }
    }

    /// BDI member
    pub fn bdi(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: InterfaceKind::Bdi,
            port: None,
        }
    }

    /// Service instance `id` on `port`
    pub fn service_instance(port: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: id.into(),
            kind: InterfaceKind::ServiceInstance,
            port: Some(port.into()),
        }
    }

    /// Sub-interface `unit` of `port`
    pub fn subinterface(port: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            name: unit.into(),
            kind: InterfaceKind::GenericSubinterface,
            port: Some(port.into()),
        }
    }
}

impl fmt::Display for NetworkInterface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.port {
            Some(port) => write!(f, "{} {} on {}", self.kind.as_str(), self.name, port),
            None => write!(f, "{} {}", self.kind.as_str(), self.name),
        }
    }
}

/// Bridge domain as parsed from the device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeDomain {
    /// Bridge domain name
    pub name: String,
    /// Member interfaces, in device order
    pub interfaces: Vec<NetworkInterface>,
}

impl BridgeDomain {
    /// Create an empty bridge domain
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            interfaces: Vec::new(),
        }
    }

    /// Add a member, ignoring exact duplicates
    pub fn add_interface(&mut self, interface: NetworkInterface) {
        if !self.interfaces.contains(&interface) {
            self.interfaces.push(interface);
        }
    }

    /// Builder variant of [`add_interface`](Self::add_interface)
    pub fn with_interface(mut self, interface: NetworkInterface) -> Self {
        self.add_interface(interface);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interface_kind_class_names() {
        assert_eq!(InterfaceKind::Vfi.class_name(), "VFI");
        assert_eq!(InterfaceKind::Bdi.class_name(), "BridgeDomainInterface");
        assert_eq!(InterfaceKind::ServiceInstance.class_name(), "ServiceInstance");
        assert_eq!(InterfaceKind::GenericSubinterface.class_name(), "VirtualPort");
    }

    #[test]
    fn test_port_anchored_kinds() {
        assert!(InterfaceKind::ServiceInstance.is_port_anchored());
        assert!(InterfaceKind::GenericSubinterface.is_port_anchored());
        assert!(!InterfaceKind::Bdi.is_port_anchored());
        assert!(!InterfaceKind::Vfi.is_port_anchored());
    }

    #[test]
    fn test_interface_display() {
        let si = NetworkInterface::service_instance("GigabitEthernet0/0/1", "100");
        assert_eq!(si.to_string(), "service instance 100 on GigabitEthernet0/0/1");
        assert_eq!(NetworkInterface::vfi("VFI100").to_string(), "VFI VFI100");
    }

    #[test]
    fn test_bridge_domain_ignores_duplicate_members() {
        let bd = BridgeDomain::new("100")
            .with_interface(NetworkInterface::bdi("BDI100"))
            .with_interface(NetworkInterface::bdi("BDI100"));
        assert_eq!(bd.interfaces.len(), 1);
    }
}
