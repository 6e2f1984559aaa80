// SPDX-License-Identifier: MIT OR Apache-2.0
//! Connection (edge) definitions for the canvas.

use crate::node::NodeId;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a connection
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(pub String);

impl ConnectionId {
    /// Create a new random connection ID
    pub fn new() -> Self {
        Self(format!("connection_{}", Uuid::new_v4().simple()))
    }

    /// Get the ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for ConnectionId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A directional connection from one node's right connector to another
/// node's left connector
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Connection {
    /// Unique connection ID
    pub id: ConnectionId,
    /// Source node ID
    pub source_node_id: NodeId,
    /// Target node ID
    pub target_node_id: NodeId,
}

impl Connection {
    /// Create a new connection with a random ID
    pub fn new(source_node_id: NodeId, target_node_id: NodeId) -> Self {
        Self {
            id: ConnectionId::new(),
            source_node_id,
            target_node_id,
        }
    }

    /// Set the ID
    pub fn with_id(mut self, id: impl Into<ConnectionId>) -> Self {
        self.id = id.into();
        self
    }

    /// Check if this connection involves a specific node
    pub fn involves_node(&self, node_id: &NodeId) -> bool {
        self.source_node_id == *node_id || self.target_node_id == *node_id
    }

    /// Check if this connection runs from `source` to `target`
    pub fn links(&self, source: &NodeId, target: &NodeId) -> bool {
        self.source_node_id == *source && self.target_node_id == *target
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_links_is_directional() {
        let a = NodeId::from("a");
        let b = NodeId::from("b");
        let connection = Connection::new(a.clone(), b.clone());
        assert!(connection.links(&a, &b));
        assert!(!connection.links(&b, &a));
        assert!(connection.involves_node(&b));
        assert!(!connection.involves_node(&NodeId::from("c")));
        assert!(connection.id.as_str().starts_with("connection_"));
    }
}
