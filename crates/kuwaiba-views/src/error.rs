//! Error types for view persistence.

use thiserror::Error;

/// Errors raised while decoding or editing a view.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ViewError {
    /// The document is not well-formed XML.
    #[error("Malformed view document: {0}")]
    Xml(String),

    /// The document has no `<view>` root element.
    #[error("Document has no view element")]
    MissingRoot,

    /// The version attribute names a format this crate cannot read.
    #[error("Unsupported view format version '{0}'")]
    UnsupportedVersion(String),

    /// A required attribute is absent.
    #[error("Element <{element}> is missing attribute '{attribute}'")]
    MissingAttribute { element: String, attribute: String },

    /// An attribute value could not be interpreted.
    #[error("Invalid value '{value}' for attribute '{attribute}' of <{element}>")]
    InvalidAttribute {
        element: String,
        attribute: String,
        value: String,
    },

    /// A node element carries no object id.
    #[error("Node of class {0} has no object id")]
    MissingNodeId(String),

    /// A position has a NaN or infinite coordinate.
    #[error("Position ({x}, {y}) is not a finite point")]
    NonFinitePoint { x: String, y: String },

    /// An index does not address a node of the graph.
    #[error("No node at index {0}")]
    InvalidNode(usize),
}

impl ViewError {
    pub fn missing_attribute(element: &str, attribute: &str) -> Self {
        Self::MissingAttribute {
            element: element.to_string(),
            attribute: attribute.to_string(),
        }
    }

    pub fn invalid_attribute(element: &str, attribute: &str, value: impl Into<String>) -> Self {
        Self::InvalidAttribute {
            element: element.to_string(),
            attribute: attribute.to_string(),
            value: value.into(),
        }
    }
}

impl ViewError {
    pub fn non_finite_point(x: f64, y: f64) -> Self {
        Self::NonFinitePoint {
            x: x.to_string(),
            y: y.to_string(),
        }
    }
}

/// Result type for view operations.
pub type ViewResult<T> = std::result::Result<T, ViewError>;
