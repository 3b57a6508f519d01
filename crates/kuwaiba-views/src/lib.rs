//! Object views for Kuwaiba.
//!
//! A view is the saved 2D layout of a set of inventory objects (nodes) and
//! the connections between them (edges). [`ViewGraph`] holds it as a plain
//! arena graph; the [`xml`] module reads and writes the persisted format.
//!
//! ```ignore
//! use kuwaiba_views::{xml, Point, ViewGraph};
//! use kuwaiba_inventory::ObjectKey;
//!
//! let mut view = ViewGraph::with_class("City");
//! let a = view.add_node(ObjectKey::new("Router", "1"), Point::new(10.0, 20.0))?;
//! let b = view.add_node(ObjectKey::new("Router", "2"), Point::new(90.0, 20.0))?;
//! view.add_edge(ObjectKey::new("WireContainer", "7"), a, b, Vec::new())?;
//! let saved = xml::to_xml(&view);
//! ```

pub mod error;
pub mod graph;
pub mod xml;

pub use error::{ViewError, ViewResult};
pub use graph::{EdgeIndex, NodeIndex, Point, ViewEdge, ViewGraph, ViewNode};
pub use xml::{from_xml, to_xml, SUPPORTED_VERSIONS, VIEW_VERSION};
