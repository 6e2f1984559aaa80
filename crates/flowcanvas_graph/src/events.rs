// SPDX-License-Identifier: MIT OR Apache-2.0
//! Canvas topics and their payloads.

use crate::config::ZoomConfig;
use crate::connection::Connection;
use crate::node::{Node, NodeId};
use crate::transform::ViewTransform;
use flowcanvas_events::{EventBus, Topic};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A node was created by a palette drop
pub const NODE_ADDED: Topic<Node> = Topic::new("node:added");
/// A node drag finished
pub const NODE_UPDATED: Topic<Node> = Topic::new("node:updated");
/// Replace one node by ID (host to canvas)
pub const NODE_REPLACED: Topic<Node> = Topic::new("node:replaced");
/// A node and its connections were removed
pub const NODE_REMOVED: Topic<Node> = Topic::new("node:removed");
/// Replace the whole node list (host to canvas)
pub const NODES_REPLACED: Topic<Vec<Node>> = Topic::new("nodes:replaced");

/// A connection was created by a connection drag
pub const CONNECTION_CREATED: Topic<Connection> = Topic::new("connection:created");
/// A connection was deleted
pub const CONNECTION_DELETED: Topic<Connection> = Topic::new("connection:deleted");
/// Replace the whole connection list (host to canvas)
pub const CONNECTIONS_REPLACED: Topic<Vec<Connection>> = Topic::new("connections:replaced");

/// Current zoom level, sent after any zoom or pan
pub const ZOOM_CHANGED: Topic<f32> = Topic::new("zoom:changed");
/// Request an anchored zoom
pub const ZOOM_WITH_POINT: Topic<ZoomWithPoint> = Topic::new("zoom:with-point");
/// Request a view reset
pub const ZOOM_RESET: Topic<()> = Topic::new("zoom:reset");
/// Replace the zoom configuration
pub const ZOOM_CONFIG_UPDATED: Topic<ZoomConfig> = Topic::new("zoom:config-updated");
/// The view transform changed (pan or zoom)
pub const VIEW_CHANGED: Topic<ViewTransform> = Topic::new("view:changed");

/// Ask the canvas for a node
pub const GET_NODE_BY_ID_REQUEST: Topic<NodeLookupRequest> = Topic::new("node:get-by-id:request");
/// Answer to [`GET_NODE_BY_ID_REQUEST`]
pub const GET_NODE_BY_ID_RESPONSE: Topic<NodeLookupResponse> =
    Topic::new("node:get-by-id:response");

/// Anchored zoom request: zoom to `zoom` keeping screen point `(x, y)` fixed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomWithPoint {
    /// Target level, clamped by the receiver
    pub zoom: f32,
    /// Anchor x (screen)
    pub x: f32,
    /// Anchor y (screen)
    pub y: f32,
}

/// Correlates a lookup request with its response
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub String);

impl RequestId {
    /// Create a new random request ID
    pub fn new() -> Self {
        Self(format!("req_{}", Uuid::new_v4().simple()))
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Payload of [`GET_NODE_BY_ID_REQUEST`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeLookupRequest {
    /// Node to look up
    pub id: NodeId,
    /// Echoed back in the response
    pub request_id: RequestId,
}

/// Payload of [`GET_NODE_BY_ID_RESPONSE`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeLookupResponse {
    /// The node, if it exists
    pub node: Option<Node>,
    /// ID of the request being answered
    pub request_id: RequestId,
}

/// Enable latest-value replay for the bulk replace topics, so a host can
/// publish its data before the canvas subscribes.
pub fn install_replay_buffers(bus: &EventBus) {
    bus.enable_buffering(&NODES_REPLACED, 1);
    bus.enable_buffering(&CONNECTIONS_REPLACED, 1);
}
