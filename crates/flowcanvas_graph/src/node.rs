// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node definitions for the canvas.

use crate::geometry::{self, ConnectorPoints};
use egui::{Pos2, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a node.
///
/// Opaque to the canvas; hosts may use any string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    /// Create a new random node ID
    pub fn new() -> Self {
        Self(format!("node_{}", Uuid::new_v4().simple()))
    }

    /// Get the ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which connector of a node.
///
/// Connections always leave from a right connector and arrive at a left one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectorSide {
    /// Accept-only target connector
    Left,
    /// Source connector, starts connection drags
    Right,
}

/// A node on the canvas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique node ID
    pub id: NodeId,
    /// Top-left corner in world space
    pub position: Pos2,
    /// Width and height
    pub size: Vec2,
    /// Nodes this node points to
    #[serde(default)]
    pub connected_to: Vec<NodeId>,
    /// Nodes pointing to this node
    #[serde(default)]
    pub connected_from: Vec<NodeId>,
    /// Display label
    #[serde(default)]
    pub label: String,
    /// Status code, interpreted by the rendering layer
    #[serde(default)]
    pub status: Option<String>,
    /// Icon code, interpreted by the rendering layer
    #[serde(default)]
    pub icon_code: Option<String>,
    /// Palette item code the node was created from
    #[serde(default)]
    pub node_code: Option<String>,
    /// Sequence position used by [`crate::ordering`]
    #[serde(default)]
    pub order: Option<u32>,
    /// Free-form data attached by the host
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

impl Node {
    /// Create a new node with a random ID
    pub fn new(label: impl Into<String>, position: Pos2, size: Vec2) -> Self {
        Self {
            id: NodeId::new(),
            position,
            size: size.max(Vec2::ZERO),
            connected_to: Vec::new(),
            connected_from: Vec::new(),
            label: label.into(),
            status: None,
            icon_code: None,
            node_code: None,
            order: None,
            metadata: None,
        }
    }

    /// Set the ID
    pub fn with_id(mut self, id: impl Into<NodeId>) -> Self {
        self.id = id.into();
        self
    }

    /// Set the position
    pub fn with_position(mut self, x: f32, y: f32) -> Self {
        self.position = Pos2::new(x, y);
        self
    }

    /// Set the size, negative extents are clamped to zero
    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.size = Vec2::new(width, height).max(Vec2::ZERO);
        self
    }

    /// Set the status
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Set the order
    pub fn with_order(mut self, order: u32) -> Self {
        self.order = Some(order);
        self
    }

    /// Bounding rectangle in world space
    pub fn rect(&self) -> Rect {
        Rect::from_min_size(self.position, self.size)
    }

    /// Both connector points, derived from the current position and size
    pub fn connectors(&self) -> ConnectorPoints {
        geometry::connector_points(self.position, self.size)
    }

    /// Get one connector point
    pub fn connector(&self, side: ConnectorSide) -> Pos2 {
        let points = self.connectors();
        match side {
            ConnectorSide::Left => points.left,
            ConnectorSide::Right => points.right,
        }
    }

    /// Check if this node points to `other`
    pub fn is_connected_to(&self, other: &NodeId) -> bool {
        self.connected_to.contains(other)
    }

    /// Check if `other` points to this node
    pub fn is_connected_from(&self, other: &NodeId) -> bool {
        self.connected_from.contains(other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_ids_are_unique() {
        let a = NodeId::new();
        let b = NodeId::new();
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("node_"));
    }

    #[test]
    fn test_connectors_follow_position_and_size() {
        let mut node = Node::new("A", Pos2::new(100.0, 50.0), Vec2::new(200.0, 100.0));
        let points = node.connectors();
        assert_eq!(points.left, Pos2::new(100.0, 100.0));
        assert_eq!(points.right, Pos2::new(300.0, 100.0));

        node.position = Pos2::new(-20.0, 10.0);
        node.size = Vec2::new(40.0, 30.0);
        assert_eq!(node.connector(ConnectorSide::Left), Pos2::new(-20.0, 25.0));
        assert_eq!(node.connector(ConnectorSide::Right), Pos2::new(20.0, 25.0));
    }

    #[test]
    fn test_negative_size_is_clamped() {
        let node = Node::new("A", Pos2::ZERO, Vec2::new(-5.0, 10.0));
        assert_eq!(node.size, Vec2::new(0.0, 10.0));
        let node = node.with_size(3.0, -1.0);
        assert_eq!(node.size, Vec2::new(3.0, 0.0));
    }

    #[test]
    fn test_node_deserializes_with_defaults() {
        let node: Node = serde_json::from_str(
            r#"{"id":"n1","position":{"x":1.0,"y":2.0},"size":{"x":10.0,"y":20.0}}"#,
        )
        .unwrap();
        assert_eq!(node.id, NodeId::from("n1"));
        assert!(node.connected_to.is_empty());
        assert!(node.label.is_empty());
        assert_eq!(node.connectors().left, Pos2::new(1.0, 12.0));
    }
}
