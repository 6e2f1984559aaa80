// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scene store holding the canvas nodes and connections.
//!
//! Both lists are immutable shared slices. Every mutation builds a new
//! slice, so an observer holding an older [`Rc`] can detect a change with
//! [`Rc::ptr_eq`].

use crate::connection::{Connection, ConnectionId};
use crate::geometry;
use crate::interaction::HitTarget;
use crate::node::{ConnectorSide, Node, NodeId};
use egui::Pos2;
use std::rc::Rc;

/// Nodes and connections of a canvas
#[derive(Debug, Clone)]
pub struct Scene {
    nodes: Rc<[Node]>,
    connections: Rc<[Connection]>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Create an empty scene
    pub fn new() -> Self {
        Self {
            nodes: Rc::from(Vec::new()),
            connections: Rc::from(Vec::new()),
        }
    }

    /// Get all nodes, in drawing order
    pub fn nodes(&self) -> &Rc<[Node]> {
        &self.nodes
    }

    /// Get all connections
    pub fn connections(&self) -> &Rc<[Connection]> {
        &self.connections
    }

    /// Get a node by ID
    pub fn node(&self, node_id: &NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == *node_id)
    }

    /// Get a connection by ID
    pub fn connection(&self, connection_id: &ConnectionId) -> Option<&Connection> {
        self.connections.iter().find(|c| c.id == *connection_id)
    }

    /// Check if a connection from `source` to `target` exists
    pub fn connection_exists(&self, source: &NodeId, target: &NodeId) -> bool {
        self.connections.iter().any(|c| c.links(source, target))
    }

    /// Get connections involving a node
    pub fn connections_for_node<'a>(
        &'a self,
        node_id: &'a NodeId,
    ) -> impl Iterator<Item = &'a Connection> + 'a {
        self.connections
            .iter()
            .filter(move |c| c.involves_node(node_id))
    }

    /// Add a node. A node with the same ID is replaced in place.
    pub fn add_node(&mut self, node: Node) {
        self.upsert_node(node);
    }

    /// Replace the node with the same ID, or append it.
    ///
    /// Returns `true` if an existing node was replaced.
    pub fn upsert_node(&mut self, node: Node) -> bool {
        let mut nodes = self.nodes.to_vec();
        let replaced = match nodes.iter_mut().find(|n| n.id == node.id) {
            Some(existing) => {
                *existing = node;
                true
            }
            None => {
                nodes.push(node);
                false
            }
        };
        self.nodes = nodes.into();
        replaced
    }

    /// Replace the whole node list
    pub fn replace_nodes(&mut self, nodes: Vec<Node>) {
        self.nodes = nodes.into();
    }

    /// Replace the whole connection list
    pub fn replace_connections(&mut self, connections: Vec<Connection>) {
        self.connections = connections.into();
    }

    /// Move a node so its top-left corner is at `position`.
    ///
    /// Returns the moved node, or `None` if no such node exists.
    pub fn move_node(&mut self, node_id: &NodeId, position: Pos2) -> Option<Node> {
        let index = self.nodes.iter().position(|n| n.id == *node_id)?;
        let mut nodes = self.nodes.to_vec();
        nodes[index].position = position;
        let moved = nodes[index].clone();
        self.nodes = nodes.into();
        Some(moved)
    }

    /// Connect `source`'s right connector to `target`'s left connector.
    ///
    /// The connection and both adjacency entries are added together.
    pub fn connect(
        &mut self,
        source: &NodeId,
        target: &NodeId,
    ) -> Result<Connection, ConnectionError> {
        if self.node(source).is_none() {
            return Err(ConnectionError::NodeNotFound(source.clone()));
        }
        if self.node(target).is_none() {
            return Err(ConnectionError::NodeNotFound(target.clone()));
        }
        if source == target {
            return Err(ConnectionError::SelfConnection(source.clone()));
        }
        // Only the ordered pair is unique, the reverse direction is allowed
        if self.connection_exists(source, target) {
            return Err(ConnectionError::Duplicate {
                source_node: source.clone(),
                target_node: target.clone(),
            });
        }

        let connection = Connection::new(source.clone(), target.clone());

        let mut nodes = self.nodes.to_vec();
        for node in &mut nodes {
            if node.id == *source && !node.connected_to.contains(target) {
                node.connected_to.push(target.clone());
            }
            if node.id == *target && !node.connected_from.contains(source) {
                node.connected_from.push(source.clone());
            }
        }

        let mut connections = self.connections.to_vec();
        connections.push(connection.clone());

        self.nodes = nodes.into();
        self.connections = connections.into();
        Ok(connection)
    }

    /// Remove a connection and its adjacency entries.
    ///
    /// Nodes that are neither source nor target are left untouched.
    pub fn disconnect(&mut self, connection_id: &ConnectionId) -> Option<Connection> {
        let index = self.connections.iter().position(|c| c.id == *connection_id)?;
        let mut connections = self.connections.to_vec();
        let removed = connections.remove(index);

        let mut nodes = self.nodes.to_vec();
        for node in &mut nodes {
            if node.id == removed.source_node_id {
                node.connected_to.retain(|id| *id != removed.target_node_id);
            }
            if node.id == removed.target_node_id {
                node.connected_from.retain(|id| *id != removed.source_node_id);
            }
        }

        self.nodes = nodes.into();
        self.connections = connections.into();
        Some(removed)
    }

    /// Remove a node together with every connection involving it.
    ///
    /// Returns the node and the removed connections.
    pub fn remove_node(&mut self, node_id: &NodeId) -> Option<(Node, Vec<Connection>)> {
        let index = self.nodes.iter().position(|n| n.id == *node_id)?;

        let removed_connections: Vec<Connection> =
            self.connections_for_node(node_id).cloned().collect();
        let kept: Vec<Connection> = self
            .connections
            .iter()
            .filter(|c| !c.involves_node(node_id))
            .cloned()
            .collect();

        let mut nodes = self.nodes.to_vec();
        let removed = nodes.remove(index);
        for node in &mut nodes {
            node.connected_to.retain(|id| id != node_id);
            node.connected_from.retain(|id| id != node_id);
        }

        self.nodes = nodes.into();
        self.connections = kept.into();
        Some((removed, removed_connections))
    }

    /// Curve of a connection, from the source's right connector to the
    /// target's left connector
    pub fn connection_curve(&self, connection: &Connection) -> Option<geometry::ConnectionCurve> {
        let source = self.node(&connection.source_node_id)?;
        let target = self.node(&connection.target_node_id)?;
        Some(geometry::ConnectionCurve::between(
            source.connector(ConnectorSide::Right),
            target.connector(ConnectorSide::Left),
        ))
    }

    /// Find what lies under a world position.
    ///
    /// Connectors win over node bodies, and node bodies over connection
    /// delete handles. Among nodes the last drawn (topmost) wins.
    pub fn hit_test(&self, world: Pos2, connector_radius: f32, delete_radius: f32) -> HitTarget {
        for node in self.nodes.iter().rev() {
            for side in [ConnectorSide::Right, ConnectorSide::Left] {
                if node.connector(side).distance(world) <= connector_radius {
                    return HitTarget::Connector {
                        node: node.id.clone(),
                        side,
                    };
                }
            }
        }

        if let Some(node) = self.nodes.iter().rev().find(|n| n.rect().contains(world)) {
            return HitTarget::NodeBody(node.id.clone());
        }

        self.connections
            .iter()
            .rev()
            .find(|connection| {
                self.connection_curve(connection)
                    .is_some_and(|curve| curve.midpoint().distance(world) <= delete_radius)
            })
            .map_or(HitTarget::Canvas, |c| HitTarget::DeleteHandle(c.id.clone()))
    }
}

/// Error when creating a connection
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectionError {
    /// Node not found
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    /// Source and target are the same node
    #[error("Cannot connect node {0} to itself")]
    SelfConnection(NodeId),

    /// The ordered pair is already connected
    #[error("Connection from {source_node} to {target_node} already exists")]
    Duplicate {
        /// Source node
        source_node: NodeId,
        /// Target node
        target_node: NodeId,
    },
}
