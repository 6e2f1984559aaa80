// SPDX-License-Identifier: MIT OR Apache-2.0
//! Zoom level arithmetic.

use crate::config::ZoomConfig;
use crate::geometry;
use crate::node::Node;
use crate::transform::ViewTransform;
use egui::Vec2;

/// Direction of a button zoom
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomDirection {
    /// Larger level
    In,
    /// Smaller level
    Out,
}

/// Level after one zoom step from `level`, clamped
pub fn step_target(level: f32, direction: ZoomDirection, config: &ZoomConfig) -> f32 {
    let target = match direction {
        ZoomDirection::In => level + config.zoom_step,
        ZoomDirection::Out => level - config.zoom_step,
    };
    config.clamp(target)
}

/// Level after a wheel zoom of `delta_y`. Scrolling up zooms in.
///
/// Not clamped; the anchored zoom clamps.
pub fn wheel_zoom_target(level: f32, delta_y: f32, sensitivity: f32, config: &ZoomConfig) -> f32 {
    level - delta_y * sensitivity * config.zoom_step
}

/// View that centres the nodes' bounding box in `viewport` at the initial
/// zoom. Without nodes the world origin is centred.
pub fn reset_view(nodes: &[Node], viewport: Vec2, config: &ZoomConfig) -> ViewTransform {
    ViewTransform::centered_on(geometry::nodes_center(nodes), viewport, config.initial_zoom)
}
