//! Inventory model types shared by stores and sync providers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Attribute holding the display name of every inventory object.
pub const ATTRIBUTE_NAME: &str = "name";

/// Attribute bag used when creating objects.
pub type Attributes = BTreeMap<String, String>;

/// Builds an [`Attributes`] map from key-value pairs.
#[macro_export]
macro_rules! attributes {
    ($($key:expr => $value:expr),* $(,)?) => {{
        let mut attrs = $crate::Attributes::new();
        $(attrs.insert($key.to_string(), $value.to_string());)*
        attrs
    }};
}

/// Class names the sync providers work with.
pub mod classes {
    /// Root of the class hierarchy.
    pub const INVENTORY_OBJECT: &str = "InventoryObject";

    /// Abstract superclass of every port.
    pub const GENERIC_PORT: &str = "GenericPort";

    /// Abstract superclass of physical ports.
    pub const GENERIC_PHYSICAL_PORT: &str = "GenericPhysicalPort";

    /// Copper port.
    pub const ELECTRICAL_PORT: &str = "ElectricalPort";

    /// Fiber port.
    pub const OPTICAL_PORT: &str = "OpticalPort";

    /// Abstract superclass of logical ports.
    pub const GENERIC_LOGICAL_PORT: &str = "GenericLogicalPort";

    /// Logical sub-interface of a physical port.
    pub const VIRTUAL_PORT: &str = "VirtualPort";

    /// Ethernet service instance (EFP) of a physical port.
    pub const SERVICE_INSTANCE: &str = "ServiceInstance";

    /// Layer-2 bridge domain of a device.
    pub const BRIDGE_DOMAIN: &str = "BridgeDomain";

    /// Routed interface bound to a bridge domain.
    pub const BRIDGE_DOMAIN_INTERFACE: &str = "BridgeDomainInterface";

    /// Virtual forwarding instance.
    pub const VFI: &str = "VFI";

    /// Abstract superclass of network devices.
    pub const GENERIC_COMMUNICATIONS_ELEMENT: &str = "GenericCommunicationsElement";

    /// Router.
    pub const ROUTER: &str = "Router";

    /// Switch.
    pub const SWITCH: &str = "Switch";
}

/// Class name + id pair addressing a persisted object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectKey {
    pub class_name: String,
    pub id: String,
}

impl ObjectKey {
    pub fn new(class_name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            id: id.into(),
        }
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.class_name, self.id)
    }
}

/// Lightweight reference to a persisted business object.
///
/// Instances are only ever produced by an [`InventoryStore`](crate::InventoryStore);
/// callers treat the returned reference as authoritative.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BusinessObjectLight {
    pub class_name: String,
    pub id: String,
    pub name: String,
}

impl BusinessObjectLight {
    pub fn new(
        class_name: impl Into<String>,
        id: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            class_name: class_name.into(),
            id: id.into(),
            name: name.into(),
        }
    }

    /// Returns the class name + id pair of this object.
    pub fn key(&self) -> ObjectKey {
        ObjectKey::new(&self.class_name, &self.id)
    }

    /// True if both references point to the same persisted object.
    pub fn same_object(&self, other: &BusinessObjectLight) -> bool {
        self.class_name == other.class_name && self.id == other.id
    }
}

impl fmt::Display for BusinessObjectLight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.name, self.class_name)
    }
}

/// Kind of general activity log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLogEntryType {
    CreateInventoryObject,
    UpdateInventoryObject,
    CreateRelationship,
    ReleaseRelationship,
    ExternalApp,
}

/// Entry of the general activity log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityLogEntry {
    pub user: String,
    pub entry_type: ActivityLogEntryType,
    pub notes: String,
    pub timestamp: DateTime<Utc>,
}

impl ActivityLogEntry {
    /// Creates an entry stamped with the current time.
    pub fn new(
        user: impl Into<String>,
        entry_type: ActivityLogEntryType,
        notes: impl Into<String>,
    ) -> Self {
        Self {
            user: user.into(),
            entry_type,
            notes: notes.into(),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_business_object_display() {
        let obj = BusinessObjectLight::new("Router", "1", "ASR920-1");
        assert_eq!(obj.to_string(), "ASR920-1 [Router]");
    }

    #[test]
    fn test_same_object_ignores_name() {
        let a = BusinessObjectLight::new("VFI", "7", "VFI100");
        let b = BusinessObjectLight::new("VFI", "7", "renamed");
        let c = BusinessObjectLight::new("VFI", "8", "VFI100");
        assert!(a.same_object(&b));
        assert!(!a.same_object(&c));
    }

    #[test]
    fn test_attributes_macro() {
        let attrs = attributes! { "name" => "BD100", "description" => "core" };
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs.get(ATTRIBUTE_NAME).map(String::as_str), Some("BD100"));
    }

    #[test]
    fn test_object_key_display() {
        assert_eq!(ObjectKey::new("BridgeDomain", "9").to_string(), "BridgeDomain:9");
    }
}
