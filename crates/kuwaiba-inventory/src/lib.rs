//! Inventory persistence abstractions for Kuwaiba sync providers.
//!
//! Sync providers never talk to a concrete persistence engine. They receive
//! collaborators implementing the traits in this crate:
//!
//! - [`InventoryStore`]: object and special-relationship store, addressed by
//!   class name + id
//! - [`ActivityLog`]: fire-and-forget audit trail
//! - [`BusinessObjectLight`]: lightweight reference to a persisted object
//!
//! [`InMemoryInventory`] implements both traits on top of a JSON snapshot and
//! is used by the CLI and the test suites.
//!
//! # Example
//!
//! ```ignore
//! use kuwaiba_inventory::{InMemoryInventory, InventoryStore, attributes};
//!
//! let store = InMemoryInventory::new();
//! let router = store
//!     .create_object("Router", None, &attributes! { "name" => "ASR920-1" })
//!     .await?;
//! let ports = store
//!     .get_children_of_class_light_recursive(&router.class_name, &router.id, "GenericPhysicalPort")
//!     .await?;
//! ```

pub mod error;
pub mod memory;
pub mod model;
pub mod store;

pub use error::{InventoryError, InventoryResult};
pub use memory::{InMemoryInventory, InventorySnapshot, Placement, SpecialRelationship, StoredObject};
pub use model::{
    classes, ActivityLogEntry, ActivityLogEntryType, Attributes, BusinessObjectLight, ObjectKey,
    ATTRIBUTE_NAME,
};
pub use store::{ActivityLog, InventoryStore};
