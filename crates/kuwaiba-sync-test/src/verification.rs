//! Verification helpers for sync runs
//!
//! Provides assertion helpers over the result log and the inventory state

use thiserror::Error;

use kuwaiba_inventory::{BusinessObjectLight, InMemoryInventory, InventoryError, InventoryStore};
use kuwaiba_sync_common::{SyncResult, SyncResultType};

/// Verification error types
#[derive(Error, Debug)]
pub enum VerificationError {
    #[error("Inventory error: {0}")]
    Inventory(#[from] InventoryError),

    #[error("Expected {expected} {result_type} results, found {actual}: {log}")]
    ResultCountMismatch {
        result_type: SyncResultType,
        expected: usize,
        actual: usize,
        log: String,
    },

    #[error("Expected only {expected} results, found: {unexpected}")]
    UnexpectedResult {
        expected: SyncResultType,
        unexpected: String,
    },

    #[error("No {result_type} result mentions '{fragment}': {log}")]
    ResultNotFound {
        result_type: SyncResultType,
        fragment: String,
        log: String,
    },

    #[error("Expected {expected} objects of class {class_name} under {parent}, found {actual}")]
    ObjectCountMismatch {
        parent: String,
        class_name: String,
        expected: usize,
        actual: usize,
    },

    #[error("Expected {expected} objects in the inventory, found {actual}")]
    InventorySizeMismatch { expected: usize, actual: usize },

    #[error("Expected {object} to be related through {relationship} to {expected:?}, found {actual:?}")]
    RelationshipMismatch {
        object: String,
        relationship: String,
        expected: Vec<String>,
        actual: Vec<String>,
    },
}

/// Result type for verification operations
pub type VerifyResult<T> = Result<T, VerificationError>;

/// Result log verification helper
pub struct ResultLogVerifier<'a> {
    results: &'a [SyncResult],
}

impl<'a> ResultLogVerifier<'a> {
    /// Create a new result log verifier
    pub fn new(results: &'a [SyncResult]) -> Self {
        Self { results }
    }

    fn log(&self) -> String {
        self.results
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" | ")
    }

    /// Number of results of a type
    pub fn count(&self, result_type: SyncResultType) -> usize {
        self.results
            .iter()
            .filter(|r| r.result_type() == result_type)
            .count()
    }

    /// Verify the number of results of a type
    pub fn assert_count(&self, result_type: SyncResultType, expected: usize) -> VerifyResult<()> {
        let actual = self.count(result_type);
        if actual != expected {
            return Err(VerificationError::ResultCountMismatch {
                result_type,
                expected,
                actual,
                log: self.log(),
            });
        }
        Ok(())
    }

    /// Verify that every result has the given type
    pub fn assert_only(&self, expected: SyncResultType) -> VerifyResult<()> {
        match self.results.iter().find(|r| r.result_type() != expected) {
            Some(unexpected) => Err(VerificationError::UnexpectedResult {
                expected,
                unexpected: unexpected.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Verify that a result of the given type mentions `fragment`
    pub fn assert_mentions(&self, result_type: SyncResultType, fragment: &str) -> VerifyResult<()> {
        let found = self.results.iter().any(|r| {
            r.result_type() == result_type
                && (r.result().contains(fragment) || r.action_description().contains(fragment))
        });
        if !found {
            return Err(VerificationError::ResultNotFound {
                result_type,
                fragment: fragment.to_string(),
                log: self.log(),
            });
        }
        Ok(())
    }

    /// Results produced for one data source
    pub fn for_data_source(&self, data_source_id: &str) -> Vec<&'a SyncResult> {
        self.results
            .iter()
            .filter(|r| r.data_source_id() == data_source_id)
            .collect()
    }
}

/// Inventory state verification helper
pub struct InventoryVerifier<'a> {
    store: &'a InMemoryInventory,
}

impl<'a> InventoryVerifier<'a> {
    /// Create a new inventory verifier
    pub fn new(store: &'a InMemoryInventory) -> Self {
        Self { store }
    }

    /// Verify the total number of objects
    pub async fn assert_object_count(&self, expected: usize) -> VerifyResult<()> {
        let actual = self.store.object_count().await;
        if actual != expected {
            return Err(VerificationError::InventorySizeMismatch { expected, actual });
        }
        Ok(())
    }

    /// Verify the special children of one class under `parent`, returning them
    pub async fn assert_special_children(
        &self,
        parent: &BusinessObjectLight,
        class_name: &str,
        expected: usize,
    ) -> VerifyResult<Vec<BusinessObjectLight>> {
        let children = self
            .store
            .get_special_children_of_class_light(&parent.class_name, &parent.id, class_name)
            .await?;
        if children.len() != expected {
            return Err(VerificationError::ObjectCountMismatch {
                parent: parent.to_string(),
                class_name: class_name.to_string(),
                expected,
                actual: children.len(),
            });
        }
        Ok(children)
    }

    /// Verify the names of the objects related to `object` through `relationship`
    pub async fn assert_related(
        &self,
        object: &BusinessObjectLight,
        relationship: &str,
        expected: &[&str],
    ) -> VerifyResult<()> {
        let mut actual: Vec<String> = self
            .store
            .get_special_attribute(&object.class_name, &object.id, relationship)
            .await?
            .into_iter()
            .map(|o| o.name)
            .collect();
        actual.sort();
        let mut expected: Vec<String> = expected.iter().map(|s| s.to_string()).collect();
        expected.sort();

        if actual != expected {
            return Err(VerificationError::RelationshipMismatch {
                object: object.to_string(),
                relationship: relationship.to_string(),
                expected,
                actual,
            });
        }
        Ok(())
    }
}
