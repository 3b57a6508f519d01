//! In-memory inventory backend with JSON snapshot persistence.
//!
//! Used by the sync CLI (load snapshot, sync, save snapshot) and by the test
//! suites as the persistence collaborator.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::path::Path;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{InventoryError, InventoryResult};
use crate::model::{
    classes, ActivityLogEntry, Attributes, BusinessObjectLight, ObjectKey, ATTRIBUTE_NAME,
};
use crate::store::{ActivityLog, InventoryStore};

/// Where an object hangs in the inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "parent", rename_all = "snake_case")]
pub enum Placement {
    /// Top level of the containment tree.
    Root,
    /// Regular child of another object.
    Child(ObjectKey),
    /// Special child of another object.
    Special(ObjectKey),
    /// Outside of any tree.
    Headless,
}

/// Object as kept by the in-memory store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredObject {
    pub class_name: String,
    pub id: String,
    pub placement: Placement,
    #[serde(default)]
    pub attributes: Attributes,
}

impl StoredObject {
    fn key(&self) -> ObjectKey {
        ObjectKey::new(&self.class_name, &self.id)
    }

    fn light(&self) -> BusinessObjectLight {
        let name = self
            .attributes
            .get(ATTRIBUTE_NAME)
            .cloned()
            .unwrap_or_default();
        BusinessObjectLight::new(&self.class_name, &self.id, name)
    }
}

/// Named special relationship between two objects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialRelationship {
    pub name: String,
    pub a: ObjectKey,
    pub b: ObjectKey,
}

impl SpecialRelationship {
    fn touches(&self, key: &ObjectKey) -> bool {
        &self.a == key || &self.b == key
    }

    fn other_end(&self, key: &ObjectKey) -> Option<&ObjectKey> {
        if &self.a == key {
            Some(&self.b)
        } else if &self.b == key {
            Some(&self.a)
        } else {
            None
        }
    }

    fn links(&self, name: &str, x: &ObjectKey, y: &ObjectKey) -> bool {
        self.name == name && ((&self.a == x && &self.b == y) || (&self.a == y && &self.b == x))
    }
}

/// Serializable content of an [`InMemoryInventory`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InventorySnapshot {
    /// subclass -> superclass
    #[serde(default)]
    pub class_hierarchy: BTreeMap<String, String>,
    #[serde(default)]
    pub objects: Vec<StoredObject>,
    #[serde(default)]
    pub relationships: Vec<SpecialRelationship>,
    #[serde(default)]
    pub activity_log: Vec<ActivityLogEntry>,
}

#[derive(Debug, Default)]
struct InventoryState {
    hierarchy: BTreeMap<String, String>,
    objects: Vec<StoredObject>,
    index: HashMap<ObjectKey, usize>,
    relationships: Vec<SpecialRelationship>,
    activity_log: Vec<ActivityLogEntry>,
}

impl InventoryState {
    fn is_subclass_of(&self, class_name: &str, filter: &str) -> bool {
        let mut current = class_name;
        // bounded walk, a malformed snapshot may contain a cycle
        for _ in 0..=self.hierarchy.len() {
            if current == filter {
                return true;
            }
            match self.hierarchy.get(current) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
        false
    }

    fn get(&self, key: &ObjectKey) -> Option<&StoredObject> {
        self.index.get(key).and_then(|&i| self.objects.get(i))
    }

    fn require(&self, class_name: &str, id: &str) -> InventoryResult<&StoredObject> {
        self.get(&ObjectKey::new(class_name, id))
            .ok_or_else(|| InventoryError::not_found(class_name, id))
    }

    fn insert(
        &mut self,
        class_name: &str,
        placement: Placement,
        attributes: &Attributes,
    ) -> InventoryResult<BusinessObjectLight> {
        if class_name.trim().is_empty() {
            return Err(InventoryError::invalid_argument("class name cannot be empty"));
        }
        let has_name = attributes
            .get(ATTRIBUTE_NAME)
            .is_some_and(|n| !n.trim().is_empty());
        if !has_name {
            return Err(InventoryError::invalid_argument(format!(
                "a {} needs a non-empty name",
                class_name
            )));
        }
        match &placement {
            Placement::Child(parent) | Placement::Special(parent) => {
                self.require(&parent.class_name, &parent.id)?;
            }
            Placement::Root | Placement::Headless => {}
        }

        let object = StoredObject {
            class_name: class_name.to_string(),
            id: uuid::Uuid::new_v4().to_string(),
            placement,
            attributes: attributes.clone(),
        };
        let light = object.light();
        self.index.insert(object.key(), self.objects.len());
        self.objects.push(object);
        debug!(object = %light, id = %light.id, "Created inventory object");
        Ok(light)
    }

    fn of_class<'a>(
        &'a self,
        class_filter: &'a str,
    ) -> impl Iterator<Item = &'a StoredObject> + 'a {
        self.objects
            .iter()
            .filter(move |o| self.is_subclass_of(&o.class_name, class_filter))
    }
}

/// Inventory store kept entirely in memory.
#[derive(Debug)]
pub struct InMemoryInventory {
    state: RwLock<InventoryState>,
}

impl InMemoryInventory {
    /// Creates an empty store with the default port and device hierarchy.
    pub fn new() -> Self {
        Self::from_snapshot(InventorySnapshot {
            class_hierarchy: default_class_hierarchy(),
            ..InventorySnapshot::default()
        })
    }

    /// Builds a store from a snapshot. Missing hierarchy entries are filled
    /// in from the default hierarchy.
    pub fn from_snapshot(snapshot: InventorySnapshot) -> Self {
        let mut hierarchy = default_class_hierarchy();
        hierarchy.extend(snapshot.class_hierarchy);
        let index = snapshot
            .objects
            .iter()
            .enumerate()
            .map(|(i, o)| (o.key(), i))
            .collect();
        Self {
            state: RwLock::new(InventoryState {
                hierarchy,
                objects: snapshot.objects,
                index,
                relationships: snapshot.relationships,
                activity_log: snapshot.activity_log,
            }),
        }
    }

    /// Returns a copy of the current content.
    pub async fn snapshot(&self) -> InventorySnapshot {
        let state = self.state.read().await;
        InventorySnapshot {
            class_hierarchy: state.hierarchy.clone(),
            objects: state.objects.clone(),
            relationships: state.relationships.clone(),
            activity_log: state.activity_log.clone(),
        }
    }

    /// Loads a JSON snapshot from disk.
    pub async fn load(path: impl AsRef<Path>) -> InventoryResult<Self> {
        let path = path.as_ref();
        let content =
            tokio::fs::read_to_string(path)
                .await
                .map_err(|e| InventoryError::SnapshotIo {
                    path: path.display().to_string(),
                    source: e,
                })?;
        let snapshot: InventorySnapshot = serde_json::from_str(&content)?;
        Ok(Self::from_snapshot(snapshot))
    }

    /// Writes the current content to disk as pretty JSON.
    pub async fn save(&self, path: impl AsRef<Path>) -> InventoryResult<()> {
        let path = path.as_ref();
        let content = serde_json::to_string_pretty(&self.snapshot().await)?;
        tokio::fs::write(path, content)
            .await
            .map_err(|e| InventoryError::SnapshotIo {
                path: path.display().to_string(),
                source: e,
            })
    }

    /// Declares `subclass` as a direct subclass of `superclass`.
    pub async fn register_subclass(&self, subclass: &str, superclass: &str) {
        self.state
            .write()
            .await
            .hierarchy
            .insert(subclass.to_string(), superclass.to_string());
    }

    /// Number of stored objects.
    pub async fn object_count(&self) -> usize {
        self.state.read().await.objects.len()
    }

    /// Number of special relationships with the given name.
    pub async fn relationship_count(&self, name: &str) -> usize {
        self.state
            .read()
            .await
            .relationships
            .iter()
            .filter(|r| r.name == name)
            .count()
    }

    /// Entries written through [`ActivityLog`].
    pub async fn activity_log(&self) -> Vec<ActivityLogEntry> {
        self.state.read().await.activity_log.clone()
    }
}

impl Default for InMemoryInventory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InventoryStore for InMemoryInventory {
    async fn get_object_light(
        &self,
        class_name: &str,
        id: &str,
    ) -> InventoryResult<BusinessObjectLight> {
        let state = self.state.read().await;
        state.require(class_name, id).map(StoredObject::light)
    }

    async fn get_children_of_class_light_recursive(
        &self,
        parent_class: &str,
        parent_id: &str,
        class_filter: &str,
    ) -> InventoryResult<Vec<BusinessObjectLight>> {
        let state = self.state.read().await;
        state.require(parent_class, parent_id)?;

        let mut found = Vec::new();
        let mut pending = VecDeque::from([ObjectKey::new(parent_class, parent_id)]);
        while let Some(current) = pending.pop_front() {
            for child in state
                .objects
                .iter()
                .filter(|o| matches!(&o.placement, Placement::Child(p) if *p == current))
            {
                if state.is_subclass_of(&child.class_name, class_filter) {
                    found.push(child.light());
                }
                pending.push_back(child.key());
            }
        }
        Ok(found)
    }

    async fn get_special_children_of_class_light(
        &self,
        parent_class: &str,
        parent_id: &str,
        class_filter: &str,
    ) -> InventoryResult<Vec<BusinessObjectLight>> {
        let state = self.state.read().await;
        let parent = state.require(parent_class, parent_id)?.key();
        Ok(state
            .of_class(class_filter)
            .filter(|o| matches!(&o.placement, Placement::Special(p) if *p == parent))
            .map(StoredObject::light)
            .collect())
    }

    async fn get_special_attribute(
        &self,
        class_name: &str,
        id: &str,
        attribute_name: &str,
    ) -> InventoryResult<Vec<BusinessObjectLight>> {
        let state = self.state.read().await;
        let key = state.require(class_name, id)?.key();
        Ok(state
            .relationships
            .iter()
            .filter(|r| r.name == attribute_name)
            .filter_map(|r| r.other_end(&key))
            .filter_map(|other| state.get(other))
            .map(StoredObject::light)
            .collect())
    }

    async fn get_objects_of_class_light(
        &self,
        class_name: &str,
    ) -> InventoryResult<Vec<BusinessObjectLight>> {
        let state = self.state.read().await;
        Ok(state.of_class(class_name).map(StoredObject::light).collect())
    }

    async fn create_object(
        &self,
        class_name: &str,
        parent: Option<&ObjectKey>,
        attributes: &Attributes,
    ) -> InventoryResult<BusinessObjectLight> {
        let placement = match parent {
            Some(p) => Placement::Child(p.clone()),
            None => Placement::Root,
        };
        self.state
            .write()
            .await
            .insert(class_name, placement, attributes)
    }

    async fn create_special_object(
        &self,
        class_name: &str,
        parent: &ObjectKey,
        attributes: &Attributes,
    ) -> InventoryResult<BusinessObjectLight> {
        self.state
            .write()
            .await
            .insert(class_name, Placement::Special(parent.clone()), attributes)
    }

    async fn create_headless_object(
        &self,
        class_name: &str,
        attributes: &Attributes,
    ) -> InventoryResult<BusinessObjectLight> {
        self.state
            .write()
            .await
            .insert(class_name, Placement::Headless, attributes)
    }

    async fn create_special_relationship(
        &self,
        a: &ObjectKey,
        b: &ObjectKey,
        name: &str,
    ) -> InventoryResult<()> {
        let mut state = self.state.write().await;
        state.require(&a.class_name, &a.id)?;
        state.require(&b.class_name, &b.id)?;
        if a == b {
            return Err(InventoryError::business_rule(format!(
                "an object cannot be related to itself through {}",
                name
            )));
        }
        if state.relationships.iter().any(|r| r.links(name, a, b)) {
            return Err(InventoryError::business_rule(format!(
                "{} and {} are already related through {}",
                a, b, name
            )));
        }
        state.relationships.push(SpecialRelationship {
            name: name.to_string(),
            a: a.clone(),
            b: b.clone(),
        });
        debug!(a = %a, b = %b, relationship = name, "Created special relationship");
        Ok(())
    }

    async fn release_relationships(
        &self,
        object: &ObjectKey,
        names: &[&str],
    ) -> InventoryResult<()> {
        let mut state = self.state.write().await;
        state.require(&object.class_name, &object.id)?;
        let before = state.relationships.len();
        state
            .relationships
            .retain(|r| !(r.touches(object) && names.contains(&r.name.as_str())));
        debug!(
            object = %object,
            released = before - state.relationships.len(),
            "Released special relationships"
        );
        Ok(())
    }
}

#[async_trait]
impl ActivityLog for InMemoryInventory {
    async fn create_general_activity_log_entry(
        &self,
        entry: ActivityLogEntry,
    ) -> InventoryResult<()> {
        self.state.write().await.activity_log.push(entry);
        Ok(())
    }
}

fn default_class_hierarchy() -> BTreeMap<String, String> {
    [
        (classes::GENERIC_PORT, classes::INVENTORY_OBJECT),
        (classes::GENERIC_PHYSICAL_PORT, classes::GENERIC_PORT),
        (classes::ELECTRICAL_PORT, classes::GENERIC_PHYSICAL_PORT),
        (classes::OPTICAL_PORT, classes::GENERIC_PHYSICAL_PORT),
        (classes::GENERIC_LOGICAL_PORT, classes::GENERIC_PORT),
        (classes::VIRTUAL_PORT, classes::GENERIC_LOGICAL_PORT),
        (classes::SERVICE_INSTANCE, classes::GENERIC_LOGICAL_PORT),
        (classes::BRIDGE_DOMAIN_INTERFACE, classes::GENERIC_LOGICAL_PORT),
        (classes::BRIDGE_DOMAIN, classes::INVENTORY_OBJECT),
        (classes::VFI, classes::INVENTORY_OBJECT),
        (classes::GENERIC_COMMUNICATIONS_ELEMENT, classes::INVENTORY_OBJECT),
        (classes::ROUTER, classes::GENERIC_COMMUNICATIONS_ELEMENT),
        (classes::SWITCH, classes::GENERIC_COMMUNICATIONS_ELEMENT),
    ]
    .into_iter()
    .map(|(sub, sup)| (sub.to_string(), sup.to_string()))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes;
    use crate::model::ActivityLogEntryType;
    use pretty_assertions::assert_eq;

    async fn router_with_ports(store: &InMemoryInventory) -> BusinessObjectLight {
        let router = store
            .create_object(classes::ROUTER, None, &attributes! { "name" => "ASR920-1" })
            .await
            .unwrap();
        let card = store
            .create_object("Slot", Some(&router.key()), &attributes! { "name" => "0/0" })
            .await
            .unwrap();
        for port in ["GigabitEthernet0/0/1", "GigabitEthernet0/0/2"] {
            store
                .create_object(
                    classes::ELECTRICAL_PORT,
                    Some(&card.key()),
                    &attributes! { "name" => port },
                )
                .await
                .unwrap();
        }
        router
    }

    #[tokio::test]
    async fn test_recursive_children_follow_subclasses() {
        let store = InMemoryInventory::new();
        let router = router_with_ports(&store).await;

        let ports = store
            .get_children_of_class_light_recursive(
                &router.class_name,
                &router.id,
                classes::GENERIC_PHYSICAL_PORT,
            )
            .await
            .unwrap();
        let names: Vec<_> = ports.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["GigabitEthernet0/0/1", "GigabitEthernet0/0/2"]);
    }

    #[tokio::test]
    async fn test_special_children_are_not_regular_children() {
        let store = InMemoryInventory::new();
        let router = router_with_ports(&store).await;
        store
            .create_special_object(
                classes::BRIDGE_DOMAIN,
                &router.key(),
                &attributes! { "name" => "BD100" },
            )
            .await
            .unwrap();

        let special = store
            .get_special_children_of_class_light(
                &router.class_name,
                &router.id,
                classes::BRIDGE_DOMAIN,
            )
            .await
            .unwrap();
        assert_eq!(special.len(), 1);
        assert_eq!(special[0].name, "BD100");

        let regular = store
            .get_children_of_class_light_recursive(
                &router.class_name,
                &router.id,
                classes::BRIDGE_DOMAIN,
            )
            .await
            .unwrap();
        assert!(regular.is_empty());
    }

    #[tokio::test]
    async fn test_create_requires_name_and_parent() {
        let store = InMemoryInventory::new();
        let err = store
            .create_headless_object(classes::VFI, &Attributes::new())
            .await
            .unwrap_err();
        assert!(matches!(err, InventoryError::InvalidArgument(_)));

        let missing = ObjectKey::new(classes::ROUTER, "nope");
        let err = store
            .create_special_object(classes::BRIDGE_DOMAIN, &missing, &attributes! { "name" => "BD1" })
            .await
            .unwrap_err();
        assert!(matches!(err, InventoryError::ObjectNotFound { .. }));
    }

    #[tokio::test]
    async fn test_special_relationship_lifecycle() {
        let store = InMemoryInventory::new();
        let bd = store
            .create_headless_object(classes::BRIDGE_DOMAIN, &attributes! { "name" => "BD100" })
            .await
            .unwrap();
        let vfi = store
            .create_headless_object(classes::VFI, &attributes! { "name" => "VFI100" })
            .await
            .unwrap();

        store
            .create_special_relationship(&bd.key(), &vfi.key(), "rel")
            .await
            .unwrap();
        let err = store
            .create_special_relationship(&vfi.key(), &bd.key(), "rel")
            .await
            .unwrap_err();
        assert!(matches!(err, InventoryError::BusinessRule(_)));

        let related = store
            .get_special_attribute(&vfi.class_name, &vfi.id, "rel")
            .await
            .unwrap();
        assert_eq!(related, vec![bd.clone()]);

        store.release_relationships(&vfi.key(), &["rel"]).await.unwrap();
        assert_eq!(store.relationship_count("rel").await, 0);
    }

    #[tokio::test]
    async fn test_objects_of_class_include_headless() {
        let store = InMemoryInventory::new();
        store
            .create_headless_object(classes::VFI, &attributes! { "name" => "VFI1" })
            .await
            .unwrap();
        store
            .create_object(classes::VFI, None, &attributes! { "name" => "VFI2" })
            .await
            .unwrap();
        let vfis = store.get_objects_of_class_light(classes::VFI).await.unwrap();
        assert_eq!(vfis.len(), 2);
    }

    #[tokio::test]
    async fn test_snapshot_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inventory.json");

        let store = InMemoryInventory::new();
        let router = router_with_ports(&store).await;
        store
            .create_general_activity_log_entry(ActivityLogEntry::new(
                "sync",
                ActivityLogEntryType::ExternalApp,
                "test",
            ))
            .await
            .unwrap();
        store.save(&path).await.unwrap();

        let loaded = InMemoryInventory::load(&path).await.unwrap();
        assert_eq!(loaded.object_count().await, 4);
        assert_eq!(loaded.activity_log().await.len(), 1);
        let again = loaded
            .get_object_light(&router.class_name, &router.id)
            .await
            .unwrap();
        assert_eq!(again, router);
    }

    #[tokio::test]
    async fn test_registered_subclass_matches_filter() {
        let store = InMemoryInventory::new();
        store
            .register_subclass("SFPPort", classes::OPTICAL_PORT)
            .await;
        store
            .create_object("SFPPort", None, &attributes! { "name" => "Te0/0/24" })
            .await
            .unwrap();
        let ports = store
            .get_objects_of_class_light(classes::GENERIC_PHYSICAL_PORT)
            .await
            .unwrap();
        assert_eq!(ports.len(), 1);
    }
}
