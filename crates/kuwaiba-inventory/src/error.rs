//! Error types for inventory operations.

use thiserror::Error;

/// Result type alias for inventory operations.
pub type InventoryResult<T> = Result<T, InventoryError>;

/// Errors raised by an inventory store.
#[derive(Debug, Error)]
pub enum InventoryError {
    /// The referenced object does not exist.
    #[error("Object {class_name} with id {id} could not be found")]
    ObjectNotFound {
        /// Class of the missing object.
        class_name: String,
        /// Id of the missing object.
        id: String,
    },

    /// The request itself is malformed (empty class, missing name, ...).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The request is well formed but violates a model rule.
    #[error("Business rule violation: {0}")]
    BusinessRule(String),

    /// Snapshot could not be read or written.
    #[error("Snapshot I/O failed for {path}: {source}")]
    SnapshotIo {
        /// Path of the snapshot file.
        path: String,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Snapshot content is not valid JSON for the expected schema.
    #[error("Snapshot format error: {0}")]
    SnapshotFormat(#[from] serde_json::Error),
}

impl InventoryError {
    /// Creates an object-not-found error.
    pub fn not_found(class_name: impl Into<String>, id: impl Into<String>) -> Self {
        Self::ObjectNotFound {
            class_name: class_name.into(),
            id: id.into(),
        }
    }

    /// Creates an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Creates a business rule error.
    pub fn business_rule(message: impl Into<String>) -> Self {
        Self::BusinessRule(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = InventoryError::not_found("Router", "42");
        assert_eq!(err.to_string(), "Object Router with id 42 could not be found");
    }

    #[test]
    fn test_business_rule_display() {
        let err = InventoryError::business_rule("duplicate relationship");
        assert_eq!(
            err.to_string(),
            "Business rule violation: duplicate relationship"
        );
    }
}
