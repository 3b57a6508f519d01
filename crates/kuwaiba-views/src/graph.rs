//! Arena graph backing an object view.
//!
//! Nodes and edges live in two vectors and reference each other by index.
//! Nothing is ever removed, so an index stays valid for the life of the graph.

use serde::{Deserialize, Serialize};
use std::fmt;

use kuwaiba_inventory::ObjectKey;

use crate::error::{ViewError, ViewResult};

/// Position of a node in [`ViewGraph::nodes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeIndex(pub usize);

/// Position of an edge in [`ViewGraph::edges`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeIndex(pub usize);

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// 2D coordinate in scene units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    fn check(self) -> ViewResult<Self> {
        if self.is_finite() {
            Ok(self)
        } else {
            Err(ViewError::non_finite_point(self.x, self.y))
        }
    }
}

/// Inventory object drawn at a position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewNode {
    pub object: ObjectKey,
    pub position: Point,
}

/// Connection object drawn between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewEdge {
    pub object: ObjectKey,
    pub a: NodeIndex,
    pub b: NodeIndex,
    /// Bend points, in drawing order from `a` to `b`.
    pub control_points: Vec<Point>,
}

/// Layout of an object view.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewGraph {
    /// Class of the object the view belongs to, if any.
    pub class_name: Option<String>,
    nodes: Vec<ViewNode>,
    edges: Vec<ViewEdge>,
}

impl ViewGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_class(class_name: impl Into<String>) -> Self {
        Self {
            class_name: Some(class_name.into()),
            ..Self::default()
        }
    }

    /// Places an object in the view. An object already present is moved
    /// instead of duplicated. Positions must be finite, the XML format
    /// cannot carry anything else.
    pub fn add_node(&mut self, object: ObjectKey, position: Point) -> ViewResult<NodeIndex> {
        let position = position.check()?;
        if let Some(index) = self.find_node(&object) {
            self.nodes[index.0].position = position;
            return Ok(index);
        }
        self.nodes.push(ViewNode { object, position });
        Ok(NodeIndex(self.nodes.len() - 1))
    }

    /// Connects two nodes of the view.
    pub fn add_edge(
        &mut self,
        object: ObjectKey,
        a: NodeIndex,
        b: NodeIndex,
        control_points: Vec<Point>,
    ) -> ViewResult<EdgeIndex> {
        for end in [a, b] {
            if end.0 >= self.nodes.len() {
                return Err(ViewError::InvalidNode(end.0));
            }
        }
        for point in &control_points {
            point.check()?;
        }
        self.edges.push(ViewEdge {
            object,
            a,
            b,
            control_points,
        });
        Ok(EdgeIndex(self.edges.len() - 1))
    }

    pub fn find_node(&self, object: &ObjectKey) -> Option<NodeIndex> {
        self.nodes
            .iter()
            .position(|n| &n.object == object)
            .map(NodeIndex)
    }

    /// First node showing an object with this id, whatever its class.
    pub fn find_node_by_id(&self, id: &str) -> Option<NodeIndex> {
        self.nodes
            .iter()
            .position(|n| n.object.id == id)
            .map(NodeIndex)
    }

    pub fn node(&self, index: NodeIndex) -> Option<&ViewNode> {
        self.nodes.get(index.0)
    }

    pub fn edge(&self, index: EdgeIndex) -> Option<&ViewEdge> {
        self.edges.get(index.0)
    }

    pub fn nodes(&self) -> &[ViewNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[ViewEdge] {
        &self.edges
    }

    /// Edges with `node` on either end.
    pub fn edges_of(&self, node: NodeIndex) -> impl Iterator<Item = (EdgeIndex, &ViewEdge)> + '_ {
        self.edges
            .iter()
            .enumerate()
            .filter(move |(_, e)| e.a == node || e.b == node)
            .map(|(i, e)| (EdgeIndex(i), e))
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
