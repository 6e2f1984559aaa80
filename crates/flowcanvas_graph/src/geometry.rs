// SPDX-License-Identifier: MIT OR Apache-2.0
//! Connector, connection and layout geometry. Pure functions, no state.

use crate::node::Node;
use crate::transform::ViewTransform;
use egui::{Pos2, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Horizontal control-point pull as a fraction of the horizontal distance
const CURVE_PULL: f32 = 0.5;

/// Margin kept between aligned nodes and the viewport edge
pub const ALIGNMENT_MARGIN: f32 = 50.0;

/// Left and right connector points of a node
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConnectorPoints {
    /// Middle of the left edge
    pub left: Pos2,
    /// Middle of the right edge
    pub right: Pos2,
}

/// Connector points for a box at `position` with `size`
pub fn connector_points(position: Pos2, size: Vec2) -> ConnectorPoints {
    let mid_y = position.y + size.y / 2.0;
    ConnectorPoints {
        left: Pos2::new(position.x, mid_y),
        right: Pos2::new(position.x + size.x, mid_y),
    }
}

/// Cubic Bezier used to draw a connection.
///
/// Control points pull horizontally out of both endpoints, so the curve
/// leaves a right connector to the right and enters a left connector
/// from the left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConnectionCurve {
    /// Start point
    pub start: Pos2,
    /// First control point
    pub control1: Pos2,
    /// Second control point
    pub control2: Pos2,
    /// End point
    pub end: Pos2,
}

impl ConnectionCurve {
    /// Build the curve between two points
    pub fn between(start: Pos2, end: Pos2) -> Self {
        let pull = (end.x - start.x).abs() * CURVE_PULL;
        Self {
            start,
            control1: Pos2::new(start.x + pull, start.y),
            control2: Pos2::new(end.x - pull, end.y),
            end,
        }
    }

    /// Evaluate the curve at parameter `t` in `[0, 1]`
    pub fn point_at(&self, t: f32) -> Pos2 {
        let mt = 1.0 - t;
        let a = mt * mt * mt;
        let b = 3.0 * mt * mt * t;
        let c = 3.0 * mt * t * t;
        let d = t * t * t;
        Pos2::new(
            a * self.start.x + b * self.control1.x + c * self.control2.x + d * self.end.x,
            a * self.start.y + b * self.control1.y + c * self.control2.y + d * self.end.y,
        )
    }

    /// Approximate midpoint (the point at `t = 0.5`)
    pub fn midpoint(&self) -> Pos2 {
        self.point_at(0.5)
    }

    /// SVG path data for the curve
    pub fn to_svg_path(&self) -> String {
        format!(
            "M {} {} C {} {}, {} {}, {} {}",
            self.start.x,
            self.start.y,
            self.control1.x,
            self.control1.y,
            self.control2.x,
            self.control2.y,
            self.end.x,
            self.end.y,
        )
    }
}

/// SVG path data for a connection between two points
pub fn connection_path(start: Pos2, end: Pos2) -> String {
    ConnectionCurve::between(start, end).to_svg_path()
}

/// Approximate midpoint of the connection path between two points
pub fn path_midpoint(start: Pos2, end: Pos2) -> Pos2 {
    ConnectionCurve::between(start, end).midpoint()
}

/// Axis-aligned bounding box of a set of nodes, `None` if empty
pub fn bounding_box<'a>(nodes: impl IntoIterator<Item = &'a Node>) -> Option<Rect> {
    nodes
        .into_iter()
        .map(Node::rect)
        .reduce(|acc, rect| acc.union(rect))
}

/// Center of the bounding box of a set of nodes, the origin if empty
pub fn nodes_center<'a>(nodes: impl IntoIterator<Item = &'a Node>) -> Pos2 {
    bounding_box(nodes).map_or(Pos2::ZERO, |rect| rect.center())
}

/// Horizontal placement of a node group inside the viewport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NodeAlignment {
    /// Against the left edge, with a margin
    Left,
    /// Centered
    #[default]
    Center,
    /// Against the right edge, with a margin
    Right,
}

/// X offset that moves a node group into the requested alignment
pub fn alignment_offset(nodes: &[Node], alignment: NodeAlignment, viewport_width: f32) -> f32 {
    let Some(bounds) = bounding_box(nodes) else {
        return 0.0;
    };

    match alignment {
        NodeAlignment::Left => -bounds.min.x + ALIGNMENT_MARGIN,
        NodeAlignment::Right => viewport_width - bounds.max.x - ALIGNMENT_MARGIN,
        NodeAlignment::Center => viewport_width / 2.0 - bounds.center().x,
    }
}

/// [`alignment_offset`] expressed in world units under the current view
pub fn alignment_offset_with_transform(
    nodes: &[Node],
    alignment: NodeAlignment,
    viewport_width: f32,
    view: &ViewTransform,
) -> f32 {
    (alignment_offset(nodes, alignment, viewport_width) - view.pan_offset.x) / view.zoom_level
}
