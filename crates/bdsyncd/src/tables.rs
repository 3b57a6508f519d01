//! Inventory names used by the bridge domain sync provider

pub use kuwaiba_inventory::classes::{
    BRIDGE_DOMAIN, BRIDGE_DOMAIN_INTERFACE, GENERIC_PHYSICAL_PORT, SERVICE_INSTANCE, VFI,
    VIRTUAL_PORT,
};

/// Special relationship between a bridge domain and its VFIs
pub const RELATIONSHIP_BRIDGE_DOMAIN_VFI: &str = "networkingBridgeDomainVfi";

/// Special relationship between a logical interface and its bridge domain
pub const RELATIONSHIP_BRIDGE_DOMAIN_INTERFACE: &str = "networkingBridgeDomainInterface";

/// Provider identifier
pub const PROVIDER_ID: &str = "BridgeDomainSyncProvider";

/// Provider display name
pub const PROVIDER_NAME: &str = "Bridge Domain Sync Provider";

/// User recorded in activity log entries
pub const DEFAULT_SYNC_USER: &str = "sync";
