//! XML persistence of object views.
//!
//! ```xml
//! <view version="1.2">
//!   <class>City</class>
//!   <nodes>
//!     <node x="120" y="80" class="Router">42</node>
//!   </nodes>
//!   <edges>
//!     <edge id="7" class="WireContainer" aside="42" bside="43">
//!       <controlpoint x="150" y="80"/>
//!     </edge>
//!   </edges>
//! </view>
//! ```
//!
//! `aside`/`bside` hold the object ids of the end nodes. Documents of every
//! version in [`SUPPORTED_VERSIONS`] are read; [`to_xml`] always writes
//! [`VIEW_VERSION`].

use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use std::collections::HashMap;
use tracing::{debug, warn};

use kuwaiba_inventory::ObjectKey;

use crate::error::{ViewError, ViewResult};
use crate::graph::{Point, ViewGraph};

/// Format version written by [`to_xml`].
pub const VIEW_VERSION: &str = "1.2";

/// Format versions accepted by [`from_xml`].
pub const SUPPORTED_VERSIONS: [&str; 3] = ["1.0", "1.1", "1.2"];

const VIEW: &str = "view";
const CLASS: &str = "class";
const NODE: &str = "node";
const EDGE: &str = "edge";
const CONTROL_POINT: &str = "controlpoint";

/// Serializes a view.
pub fn to_xml(graph: &ViewGraph) -> String {
    let mut xml = String::new();
    xml.push_str(&format!("<{} version=\"{}\">", VIEW, VIEW_VERSION));
    if let Some(class_name) = &graph.class_name {
        xml.push_str(&format!("<class>{}</class>", escape(class_name.as_str())));
    }

    xml.push_str("<nodes>");
    for node in graph.nodes() {
        xml.push_str(&format!(
            "<node x=\"{}\" y=\"{}\" class=\"{}\">{}</node>",
            node.position.x,
            node.position.y,
            escape(node.object.class_name.as_str()),
            escape(node.object.id.as_str())
        ));
    }
    xml.push_str("</nodes>");

    xml.push_str("<edges>");
    for edge in graph.edges() {
        // endpoints were validated on insertion
        let (Some(a), Some(b)) = (graph.node(edge.a), graph.node(edge.b)) else {
            continue;
        };
        xml.push_str(&format!(
            "<edge id=\"{}\" class=\"{}\" aside=\"{}\" bside=\"{}\">",
            escape(edge.object.id.as_str()),
            escape(edge.object.class_name.as_str()),
            escape(a.object.id.as_str()),
            escape(b.object.id.as_str())
        ));
        for point in &edge.control_points {
            xml.push_str(&format!("<controlpoint x=\"{}\" y=\"{}\"/>", point.x, point.y));
        }
        xml.push_str("</edge>");
    }
    xml.push_str("</edges>");

    xml.push_str("</view>");
    xml
}

struct PendingNode {
    class_name: String,
    position: Point,
    id: Option<String>,
}

struct PendingEdge {
    object: ObjectKey,
    aside: String,
    bside: String,
    control_points: Vec<Point>,
}

/// Deserializes a view.
///
/// Edges whose end nodes are not part of the document are dropped with a
/// warning; everything else that does not match the format is an error.
pub fn from_xml(xml: &str) -> ViewResult<ViewGraph> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut version: Option<String> = None;
    let mut class_name: Option<String> = None;
    let mut in_class = false;
    let mut nodes: Vec<(ObjectKey, Point)> = Vec::new();
    let mut edges: Vec<PendingEdge> = Vec::new();
    let mut node: Option<PendingNode> = None;
    let mut edge: Option<PendingEdge> = None;

    let mut buf = Vec::new();
    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| ViewError::Xml(e.to_string()))?;
        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let empty = matches!(event, Event::Empty(_));
                let local = String::from_utf8_lossy(e.local_name().into_inner()).to_string();

                if version.is_none() {
                    if local != VIEW {
                        return Err(ViewError::MissingRoot);
                    }
                    version = Some(check_version(e)?);
                } else {
                    match local.as_str() {
                        CLASS => in_class = !empty,
                        NODE => {
                            let attrs = attributes(e)?;
                            let pending = PendingNode {
                                class_name: required(&attrs, NODE, "class")?,
                                position: point(&attrs, NODE)?,
                                id: None,
                            };
                            if empty {
                                return Err(ViewError::MissingNodeId(pending.class_name));
                            }
                            node = Some(pending);
                        }
                        EDGE => {
                            let attrs = attributes(e)?;
                            let pending = PendingEdge {
                                object: ObjectKey::new(
                                    required(&attrs, EDGE, "class")?,
                                    required(&attrs, EDGE, "id")?,
                                ),
                                aside: required(&attrs, EDGE, "aside")?,
                                bside: required(&attrs, EDGE, "bside")?,
                                control_points: Vec::new(),
                            };
                            if empty {
                                edges.push(pending);
                            } else {
                                edge = Some(pending);
                            }
                        }
                        CONTROL_POINT => {
                            if let Some(pending) = edge.as_mut() {
                                pending.control_points.push(point(&attributes(e)?, CONTROL_POINT)?);
                            }
                        }
                        _ => {}
                    }
                }
            }
            Event::Text(ref e) => {
                let text = e
                    .unescape()
                    .map_err(|err| ViewError::Xml(err.to_string()))?
                    .to_string();
                if in_class {
                    class_name = Some(text);
                } else if let Some(pending) = node.as_mut() {
                    pending.id = Some(text);
                }
            }
            Event::End(ref e) => {
                let local = String::from_utf8_lossy(e.local_name().into_inner()).to_string();
                match local.as_str() {
                    CLASS => in_class = false,
                    NODE => {
                        if let Some(pending) = node.take() {
                            let id = pending
                                .id
                                .ok_or_else(|| ViewError::MissingNodeId(pending.class_name.clone()))?;
                            nodes.push((ObjectKey::new(pending.class_name, id), pending.position));
                        }
                    }
                    EDGE => {
                        if let Some(pending) = edge.take() {
                            edges.push(pending);
                        }
                    }
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    let Some(version) = version else {
        return Err(ViewError::MissingRoot);
    };

    let mut graph = ViewGraph::new();
    graph.class_name = class_name;
    for (object, position) in nodes {
        graph.add_node(object, position)?;
    }
    for pending in edges {
        let (Some(a), Some(b)) = (
            graph.find_node_by_id(&pending.aside),
            graph.find_node_by_id(&pending.bside),
        ) else {
            warn!(
                edge = %pending.object,
                aside = %pending.aside,
                bside = %pending.bside,
                "Dropping edge with an endpoint missing from the view"
            );
            continue;
        };
        graph.add_edge(pending.object, a, b, pending.control_points)?;
    }

    debug!(
        version = %version,
        nodes = graph.nodes().len(),
        edges = graph.edges().len(),
        "Decoded view"
    );
    Ok(graph)
}

fn check_version(e: &BytesStart) -> ViewResult<String> {
    let version = required(&attributes(e)?, VIEW, "version")?;
    if !SUPPORTED_VERSIONS.contains(&version.as_str()) {
        return Err(ViewError::UnsupportedVersion(version));
    }
    Ok(version)
}

fn attributes(e: &BytesStart) -> ViewResult<HashMap<String, String>> {
    let mut attrs = HashMap::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| ViewError::Xml(err.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.local_name().into_inner()).to_string();
        let value = attr
            .unescape_value()
            .map_err(|err| ViewError::Xml(err.to_string()))?
            .to_string();
        attrs.insert(key, value);
    }
    Ok(attrs)
}

fn required(attrs: &HashMap<String, String>, element: &str, name: &str) -> ViewResult<String> {
    attrs
        .get(name)
        .cloned()
        .ok_or_else(|| ViewError::missing_attribute(element, name))
}

fn point(attrs: &HashMap<String, String>, element: &str) -> ViewResult<Point> {
    let coordinate = |name: &str| -> ViewResult<f64> {
        let raw = required(attrs, element, name)?;
        match raw.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(value),
            _ => Err(ViewError::invalid_attribute(element, name, raw)),
        }
    };
    Ok(Point::new(coordinate("x")?, coordinate("y")?))
}
