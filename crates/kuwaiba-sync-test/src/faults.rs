//! Fault injection around the inventory collaborators

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;

use kuwaiba_inventory::{
    ActivityLog, ActivityLogEntry, Attributes, BusinessObjectLight, InMemoryInventory,
    InventoryError, InventoryResult, InventoryStore, ObjectKey,
};

/// Store that rejects selected writes and forwards everything else
pub struct FaultyInventory {
    inner: Arc<InMemoryInventory>,
    rejected_classes: HashSet<String>,
    reject_relationships: bool,
}

impl FaultyInventory {
    pub fn new(inner: Arc<InMemoryInventory>) -> Self {
        Self {
            inner,
            rejected_classes: HashSet::new(),
            reject_relationships: false,
        }
    }

    /// Reject creation of objects of `class_name`
    pub fn rejecting_class(mut self, class_name: &str) -> Self {
        self.rejected_classes.insert(class_name.to_string());
        self
    }

    /// Reject every new special relationship
    pub fn rejecting_relationships(mut self) -> Self {
        self.reject_relationships = true;
        self
    }

    fn check_class(&self, class_name: &str) -> InventoryResult<()> {
        if self.rejected_classes.contains(class_name) {
            return Err(InventoryError::business_rule(format!(
                "creation of {} objects is not allowed",
                class_name
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl InventoryStore for FaultyInventory {
    async fn get_object_light(&self, class_name: &str, id: &str) -> InventoryResult<BusinessObjectLight> {
        self.inner.get_object_light(class_name, id).await
    }

    async fn get_children_of_class_light_recursive(
        &self,
        parent_class: &str,
        parent_id: &str,
        class_filter: &str,
    ) -> InventoryResult<Vec<BusinessObjectLight>> {
        self.inner
            .get_children_of_class_light_recursive(parent_class, parent_id, class_filter)
            .await
    }

    async fn get_special_children_of_class_light(
        &self,
        parent_class: &str,
        parent_id: &str,
        class_filter: &str,
    ) -> InventoryResult<Vec<BusinessObjectLight>> {
        self.inner
            .get_special_children_of_class_light(parent_class, parent_id, class_filter)
            .await
    }

    async fn get_special_attribute(
        &self,
        class_name: &str,
        id: &str,
        attribute_name: &str,
    ) -> InventoryResult<Vec<BusinessObjectLight>> {
        self.inner
            .get_special_attribute(class_name, id, attribute_name)
            .await
    }

    async fn get_objects_of_class_light(
        &self,
        class_name: &str,
    ) -> InventoryResult<Vec<BusinessObjectLight>> {
        self.inner.get_objects_of_class_light(class_name).await
    }

    async fn create_object(
        &self,
        class_name: &str,
        parent: Option<&ObjectKey>,
        attributes: &Attributes,
    ) -> InventoryResult<BusinessObjectLight> {
        self.check_class(class_name)?;
        self.inner.create_object(class_name, parent, attributes).await
    }

    async fn create_special_object(
        &self,
        class_name: &str,
        parent: &ObjectKey,
        attributes: &Attributes,
    ) -> InventoryResult<BusinessObjectLight> {
        self.check_class(class_name)?;
        self.inner
            .create_special_object(class_name, parent, attributes)
            .await
    }

    async fn create_headless_object(
        &self,
        class_name: &str,
        attributes: &Attributes,
    ) -> InventoryResult<BusinessObjectLight> {
        self.check_class(class_name)?;
        self.inner.create_headless_object(class_name, attributes).await
    }

    async fn create_special_relationship(
        &self,
        a: &ObjectKey,
        b: &ObjectKey,
        name: &str,
    ) -> InventoryResult<()> {
        if self.reject_relationships {
            return Err(InventoryError::business_rule(format!(
                "relationship {} between {} and {} is not allowed",
                name, a, b
            )));
        }
        self.inner.create_special_relationship(a, b, name).await
    }

    async fn release_relationships(&self, object: &ObjectKey, names: &[&str]) -> InventoryResult<()> {
        self.inner.release_relationships(object, names).await
    }
}

/// Activity log whose writes always fail
#[derive(Debug, Default)]
pub struct FailingActivityLog;

#[async_trait]
impl ActivityLog for FailingActivityLog {
    async fn create_general_activity_log_entry(&self, _entry: ActivityLogEntry) -> InventoryResult<()> {
        Err(InventoryError::invalid_argument("activity log is read-only"))
    }
}
