use std::sync::Arc;

use async_trait::async_trait;
use bfdb_storage::{
    Connection, ConnectionArgs, Direction, Edge, NodeGraph, NodeRecord, NodeStore, PageInfo,
    StorageError,
};
use dashmap::DashMap;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, trace};

use crate::cursor;

/// Node key, `"Type/id"`.
pub type NodeKey = String;

fn make_key(type_name: &str, id: &str) -> NodeKey {
    format!("{type_name}/{id}")
}

#[derive(Debug, Clone)]
struct EdgeRecord {
    source: NodeKey,
    target: NodeKey,
}

/// In-memory node graph.
///
/// Nodes live in a `DashMap` keyed by `"Type/id"`; edges are kept in
/// insertion order, which is also the order traversal returns them in.
#[derive(Debug, Default)]
pub struct InMemoryGraph {
    nodes: Arc<DashMap<NodeKey, NodeRecord>>,
    edges: Arc<RwLock<Vec<EdgeRecord>>>,
}

impl InMemoryGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts (or replaces) a node and returns it.
    pub fn insert(&self, node: NodeRecord) -> NodeRecord {
        self.nodes
            .insert(make_key(&node.type_name, &node.id), node.clone());
        node
    }

    /// Adds an edge from `source` to `target`.
    pub async fn connect(&self, source: &NodeRecord, target: &NodeRecord) {
        trace!(source = %source.key(), target = %target.key(), "Adding edge");
        self.edges.write().await.push(EdgeRecord {
            source: source.key(),
            target: target.key(),
        });
    }

    /// Returns the number of stored nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Collects the nodes of `target_type` adjacent to `source`, in edge order.
    async fn related(
        &self,
        source: &NodeRecord,
        target_type: &str,
        direction: Direction,
    ) -> Vec<NodeRecord> {
        let source_key = source.key();
        let edges = self.edges.read().await;

        edges
            .iter()
            .filter_map(|edge| match direction {
                Direction::Out if edge.source == source_key => Some(&edge.target),
                Direction::In if edge.target == source_key => Some(&edge.source),
                _ => None,
            })
            .filter_map(|key| self.nodes.get(key).map(|n| n.value().clone()))
            .filter(|node| node.type_name == target_type)
            .collect()
    }
}

/// Cuts one page out of `nodes` following Relay's cursor rules.
fn paginate(nodes: Vec<NodeRecord>, args: &ConnectionArgs) -> Result<Connection, StorageError> {
    let total = nodes.len();
    let mut lo = 0;
    let mut hi = total;

    if let Some(after) = &args.after {
        let offset = cursor::decode(after).ok_or_else(|| StorageError::invalid_cursor(after))?;
        lo = offset.saturating_add(1).min(total);
    }
    if let Some(before) = &args.before {
        let offset = cursor::decode(before).ok_or_else(|| StorageError::invalid_cursor(before))?;
        hi = offset.min(total);
    }
    hi = hi.max(lo);
    if let Some(first) = args.first {
        hi = hi.min(lo.saturating_add(first as usize));
    }
    if let Some(last) = args.last {
        lo = lo.max(hi.saturating_sub(last as usize));
    }

    let edges: Vec<Edge> = nodes
        .into_iter()
        .enumerate()
        .skip(lo)
        .take(hi - lo)
        .map(|(offset, node)| Edge {
            cursor: cursor::encode(offset),
            node,
        })
        .collect();

    let page_info = PageInfo {
        has_next_page: hi < total,
        has_previous_page: lo > 0,
        start_cursor: edges.first().map(|e| e.cursor.clone()),
        end_cursor: edges.last().map(|e| e.cursor.clone()),
    };

    Ok(Connection {
        edges,
        page_info,
        total_count: u32::try_from(total).ok(),
    })
}

#[async_trait]
impl NodeGraph for InMemoryGraph {
    async fn find_one(
        &self,
        source: &NodeRecord,
        target_type: &str,
        direction: Direction,
    ) -> Result<Option<NodeRecord>, StorageError> {
        let found = self
            .related(source, target_type, direction)
            .await
            .into_iter()
            .next();
        debug!(
            source = %source.key(),
            target_type = %target_type,
            direction = %direction,
            found = found.is_some(),
            "find_one"
        );
        Ok(found)
    }

    async fn find_many(
        &self,
        source: &NodeRecord,
        target_type: &str,
        direction: Direction,
        args: &ConnectionArgs,
    ) -> Result<Connection, StorageError> {
        let nodes = self.related(source, target_type, direction).await;
        let connection = paginate(nodes, args)?;
        debug!(
            source = %source.key(),
            target_type = %target_type,
            direction = %direction,
            returned = connection.len(),
            "find_many"
        );
        Ok(connection)
    }
}

#[async_trait]
impl NodeStore for InMemoryGraph {
    async fn load(&self, type_name: &str, id: &str) -> Result<Option<NodeRecord>, StorageError> {
        Ok(self
            .nodes
            .get(&make_key(type_name, id))
            .map(|n| n.value().clone()))
    }

    async fn update(
        &self,
        type_name: &str,
        id: &str,
        params: &Value,
    ) -> Result<NodeRecord, StorageError> {
        let Value::Object(patch) = params else {
            return Err(StorageError::invalid_params("params must be a JSON object"));
        };

        let mut entry = self
            .nodes
            .get_mut(&make_key(type_name, id))
            .ok_or_else(|| StorageError::not_found(type_name, id))?;

        for (key, value) in patch {
            // id is the storage key, never a property
            if key == "id" {
                continue;
            }
            entry.props.insert(key.clone(), value.clone());
        }

        debug!(type_name = %type_name, id = %id, "Node updated");
        Ok(entry.value().clone())
    }

    async fn delete(&self, type_name: &str, id: &str) -> Result<bool, StorageError> {
        let key = make_key(type_name, id);
        if self.nodes.remove(&key).is_none() {
            return Ok(false);
        }
        self.edges
            .write()
            .await
            .retain(|edge| edge.source != key && edge.target != key);
        debug!(type_name = %type_name, id = %id, "Node deleted");
        Ok(true)
    }
}
