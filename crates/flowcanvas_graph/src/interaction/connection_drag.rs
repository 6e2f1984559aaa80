// SPDX-License-Identifier: MIT OR Apache-2.0
//! Connection drag gesture.

use super::HitTarget;
use crate::connection::Connection;
use crate::geometry::ConnectionCurve;
use crate::node::{ConnectorSide, NodeId};
use crate::scene::Scene;
use egui::Pos2;
use serde::{Deserialize, Serialize};

/// Temporary curve drawn while a connection is being dragged
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConnectionPreview {
    /// Origin's right connector (world)
    pub start: Pos2,
    /// Pointer position (world)
    pub end: Pos2,
}

impl ConnectionPreview {
    /// Curve of the preview
    pub fn curve(&self) -> ConnectionCurve {
        ConnectionCurve::between(self.start, self.end)
    }

    /// SVG path of the preview
    pub fn path(&self) -> String {
        self.curve().to_svg_path()
    }
}

/// Connection drag state
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ConnectionDrag {
    /// No drag
    #[default]
    Idle,
    /// Dragging from a right connector
    Pending {
        /// Node the connection starts from
        origin: NodeId,
        /// Curve to draw
        preview: ConnectionPreview,
    },
}

impl ConnectionDrag {
    /// Start a drag if `target` is a right connector of a node in `scene`.
    ///
    /// Left connectors only accept connections and never start one.
    pub fn begin(scene: &Scene, target: &HitTarget) -> Self {
        let HitTarget::Connector {
            node,
            side: ConnectorSide::Right,
        } = target
        else {
            return Self::Idle;
        };
        let Some(origin) = scene.node(node) else {
            return Self::Idle;
        };

        let start = origin.connector(ConnectorSide::Right);
        Self::Pending {
            origin: origin.id.clone(),
            preview: ConnectionPreview { start, end: start },
        }
    }

    /// Check if a drag is in progress
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }

    /// Current preview, if dragging
    pub fn preview(&self) -> Option<&ConnectionPreview> {
        match self {
            Self::Idle => None,
            Self::Pending { preview, .. } => Some(preview),
        }
    }

    /// Move the loose end of the preview
    pub fn update(&mut self, pointer_world: Pos2) {
        if let Self::Pending { preview, .. } = self {
            preview.end = pointer_world;
        }
    }

    /// Finish the drag over `target`.
    ///
    /// Creates a connection in `scene` when `target` is the left connector of
    /// another node not yet connected from the origin. Always returns to Idle.
    pub fn release(&mut self, scene: &mut Scene, target: &HitTarget) -> Option<Connection> {
        let Self::Pending { origin, .. } = std::mem::take(self) else {
            return None;
        };
        let HitTarget::Connector {
            node,
            side: ConnectorSide::Left,
        } = target
        else {
            tracing::debug!(%origin, ?target, "Connection released off a left connector");
            return None;
        };

        match scene.connect(&origin, node) {
            Ok(connection) => Some(connection),
            Err(err) => {
                tracing::debug!(%err, "Connection drag ignored");
                None
            }
        }
    }

    /// Abandon the drag
    pub fn cancel(&mut self) {
        *self = Self::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;
    use egui::Vec2;

    fn scene() -> Scene {
        let mut scene = Scene::new();
        let size = Vec2::new(150.0, 75.0);
        scene.add_node(Node::new("A", Pos2::new(100.0, 50.0), size).with_id("a"));
        scene.add_node(Node::new("B", Pos2::new(400.0, 50.0), size).with_id("b"));
        scene
    }

    fn connector(node: &str, side: ConnectorSide) -> HitTarget {
        HitTarget::Connector {
            node: NodeId::from(node),
            side,
        }
    }

    #[test]
    fn test_only_right_connector_starts() {
        let scene = scene();
        assert_eq!(
            ConnectionDrag::begin(&scene, &connector("a", ConnectorSide::Left)),
            ConnectionDrag::Idle
        );
        assert_eq!(
            ConnectionDrag::begin(&scene, &HitTarget::NodeBody(NodeId::from("a"))),
            ConnectionDrag::Idle
        );
        assert_eq!(
            ConnectionDrag::begin(&scene, &connector("ghost", ConnectorSide::Right)),
            ConnectionDrag::Idle
        );

        let drag = ConnectionDrag::begin(&scene, &connector("a", ConnectorSide::Right));
        let preview = drag.preview().unwrap();
        assert_eq!(preview.start, Pos2::new(250.0, 87.5));
        assert_eq!(preview.end, preview.start);
    }

    #[test]
    fn test_release_on_left_connector_connects() {
        let mut scene = scene();
        let mut drag = ConnectionDrag::begin(&scene, &connector("a", ConnectorSide::Right));
        drag.update(Pos2::new(390.0, 80.0));
        assert_eq!(drag.preview().unwrap().end, Pos2::new(390.0, 80.0));

        let connection = drag
            .release(&mut scene, &connector("b", ConnectorSide::Left))
            .unwrap();
        assert_eq!(connection.source_node_id, NodeId::from("a"));
        assert_eq!(connection.target_node_id, NodeId::from("b"));
        assert!(!drag.is_pending());
    }

    #[test]
    fn test_invalid_releases_create_nothing() {
        let mut scene = scene();
        for target in [
            HitTarget::Canvas,
            HitTarget::NodeBody(NodeId::from("b")),
            connector("b", ConnectorSide::Right),
            connector("a", ConnectorSide::Left),
        ] {
            let mut drag = ConnectionDrag::begin(&scene, &connector("a", ConnectorSide::Right));
            assert!(drag.release(&mut scene, &target).is_none());
            assert_eq!(drag, ConnectionDrag::Idle);
        }
        assert!(scene.connections().is_empty());
    }

    #[test]
    fn test_release_without_drag_is_noop() {
        let mut scene = scene();
        let mut drag = ConnectionDrag::Idle;
        assert!(drag
            .release(&mut scene, &connector("b", ConnectorSide::Left))
            .is_none());
        assert!(scene.connections().is_empty());
    }
}
