//! Collaborator traits consumed by sync providers.

use async_trait::async_trait;

use crate::error::InventoryResult;
use crate::model::{ActivityLogEntry, Attributes, BusinessObjectLight, ObjectKey};

/// Object + special-relationship store.
///
/// Objects live either in the containment tree (regular children), under a
/// special parent (special children), or outside of any tree (headless).
/// Special relationships are named, undirected links between two objects.
///
/// Class filters match the class itself and all of its subclasses.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Fetches a single object.
    async fn get_object_light(
        &self,
        class_name: &str,
        id: &str,
    ) -> InventoryResult<BusinessObjectLight>;

    /// Returns every object of `class_filter` below the given parent in the
    /// containment tree, at any depth.
    async fn get_children_of_class_light_recursive(
        &self,
        parent_class: &str,
        parent_id: &str,
        class_filter: &str,
    ) -> InventoryResult<Vec<BusinessObjectLight>>;

    /// Returns the direct special children of `class_filter` of the parent.
    async fn get_special_children_of_class_light(
        &self,
        parent_class: &str,
        parent_id: &str,
        class_filter: &str,
    ) -> InventoryResult<Vec<BusinessObjectLight>>;

    /// Returns the objects on the other end of every special relationship
    /// named `attribute_name` attached to the object.
    async fn get_special_attribute(
        &self,
        class_name: &str,
        id: &str,
        attribute_name: &str,
    ) -> InventoryResult<Vec<BusinessObjectLight>>;

    /// Every object of `class_name` (and subclasses), wherever it lives.
    async fn get_objects_of_class_light(
        &self,
        class_name: &str,
    ) -> InventoryResult<Vec<BusinessObjectLight>>;

    /// Creates a regular object. `parent` = `None` places it at the root of
    /// the containment tree.
    async fn create_object(
        &self,
        class_name: &str,
        parent: Option<&ObjectKey>,
        attributes: &Attributes,
    ) -> InventoryResult<BusinessObjectLight>;

    /// Creates a special child of `parent`.
    async fn create_special_object(
        &self,
        class_name: &str,
        parent: &ObjectKey,
        attributes: &Attributes,
    ) -> InventoryResult<BusinessObjectLight>;

    /// Creates an object with no parent at all.
    async fn create_headless_object(
        &self,
        class_name: &str,
        attributes: &Attributes,
    ) -> InventoryResult<BusinessObjectLight>;

    /// Relates two objects through a named special relationship.
    async fn create_special_relationship(
        &self,
        a: &ObjectKey,
        b: &ObjectKey,
        name: &str,
    ) -> InventoryResult<()>;

    /// Releases every special relationship of the object whose name is in
    /// `names`.
    async fn release_relationships(
        &self,
        object: &ObjectKey,
        names: &[&str],
    ) -> InventoryResult<()>;
}

/// Audit trail collaborator.
#[async_trait]
pub trait ActivityLog: Send + Sync {
    async fn create_general_activity_log_entry(
        &self,
        entry: ActivityLogEntry,
    ) -> InventoryResult<()>;
}
