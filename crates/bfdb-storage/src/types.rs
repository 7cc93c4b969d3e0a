//! Data types exchanged between the GraphQL layer and its collaborators.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A node as seen by the GraphQL layer.
///
/// `props` holds the node's own properties; `id` and `type_name` are kept
/// outside of it so that traversal never has to parse the property bag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
    /// The node ID.
    pub id: String,
    /// The GraphQL type name of the node (e.g., "BfPerson").
    pub type_name: String,
    /// The node's properties.
    #[serde(default)]
    pub props: Map<String, Value>,
}

impl NodeRecord {
    /// Creates a node with no properties.
    #[must_use]
    pub fn new(type_name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            type_name: type_name.into(),
            props: Map::new(),
        }
    }

    /// Sets a property.
    #[must_use]
    pub fn with_prop(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.props.insert(key.into(), value.into());
        self
    }

    /// Returns the value a GraphQL field of the given name should read.
    ///
    /// `id` is served from the record itself, everything else from `props`.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<Value> {
        if name == "id" {
            return Some(Value::String(self.id.clone()));
        }
        self.props.get(name).cloned()
    }

    /// Returns the `"Type/id"` key used for logging and storage keys.
    #[must_use]
    pub fn key(&self) -> String {
        format!("{}/{}", self.type_name, self.id)
    }
}

/// Traversal direction of a relation.
///
/// `Out` follows edges whose source is the current node; `In` follows edges
/// pointing at the current node ("nodes that point to me").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    /// Edges leaving the node.
    #[default]
    Out,
    /// Edges arriving at the node.
    In,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Out => write!(f, "OUT"),
            Self::In => write!(f, "IN"),
        }
    }
}

/// Relay-style pagination arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionArgs {
    /// Return the first `n` nodes after `after`.
    pub first: Option<u32>,
    /// Cursor to start after.
    pub after: Option<String>,
    /// Return the last `n` nodes before `before`.
    pub last: Option<u32>,
    /// Cursor to end before.
    pub before: Option<String>,
}

impl ConnectionArgs {
    /// Creates empty pagination arguments (the whole connection).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `first`.
    #[must_use]
    pub fn with_first(mut self, first: u32) -> Self {
        self.first = Some(first);
        self
    }

    /// Sets `after`.
    #[must_use]
    pub fn with_after(mut self, after: impl Into<String>) -> Self {
        self.after = Some(after.into());
        self
    }

    /// Sets `last`.
    #[must_use]
    pub fn with_last(mut self, last: u32) -> Self {
        self.last = Some(last);
        self
    }

    /// Sets `before`.
    #[must_use]
    pub fn with_before(mut self, before: impl Into<String>) -> Self {
        self.before = Some(before.into());
        self
    }
}

/// One edge of a connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Opaque cursor for this edge.
    pub cursor: String,
    /// The node at the end of the edge.
    pub node: NodeRecord,
}

/// Pagination state of a connection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// More edges exist after `end_cursor`.
    pub has_next_page: bool,
    /// More edges exist before `start_cursor`.
    pub has_previous_page: bool,
    /// Cursor of the first returned edge.
    pub start_cursor: Option<String>,
    /// Cursor of the last returned edge.
    pub end_cursor: Option<String>,
}

/// A page of related nodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    /// The returned edges, in traversal order.
    pub edges: Vec<Edge>,
    /// Pagination state.
    pub page_info: PageInfo,
    /// Total number of related nodes, if the backend knows it.
    pub total_count: Option<u32>,
}

impl Connection {
    /// Creates an empty connection.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns the number of edges in this page.
    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Returns true if this page has no edges.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_node_record_field_lookup() {
        let node = NodeRecord::new("BfPerson", "p1").with_prop("name", "Ada");

        assert_eq!(node.field("id"), Some(json!("p1")));
        assert_eq!(node.field("name"), Some(json!("Ada")));
        assert_eq!(node.field("missing"), None);
        assert_eq!(node.key(), "BfPerson/p1");
    }

    #[test]
    fn test_node_record_deserializes_without_props() {
        let node: NodeRecord =
            serde_json::from_value(json!({"id": "a1", "typeName": "BfAccount"})).unwrap();
        assert_eq!(node.type_name, "BfAccount");
        assert!(node.props.is_empty());
    }

    #[test]
    fn test_direction_display_and_default() {
        assert_eq!(Direction::default(), Direction::Out);
        assert_eq!(Direction::Out.to_string(), "OUT");
        assert_eq!(Direction::In.to_string(), "IN");
        assert_eq!(serde_json::to_value(Direction::In).unwrap(), json!("IN"));
    }

    #[test]
    fn test_connection_args_builder() {
        let args = ConnectionArgs::new().with_first(10).with_after("c1");
        assert_eq!(args.first, Some(10));
        assert_eq!(args.after.as_deref(), Some("c1"));
        assert!(args.last.is_none());
        assert!(Connection::empty().is_empty());
    }
}
