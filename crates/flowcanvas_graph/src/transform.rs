// SPDX-License-Identifier: MIT OR Apache-2.0
//! Screen/world coordinate transform.
//!
//! All conversions between pointer coordinates and node coordinates go
//! through [`to_world`] and [`to_screen`].

use crate::config::ZoomConfig;
use egui::{Pos2, Vec2};
use serde::{Deserialize, Serialize};

/// Current zoom and pan of the canvas.
///
/// `world = (screen - pan_offset) / zoom_level`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    /// Scale factor, always positive
    pub zoom_level: f32,
    /// Screen-space translation
    pub pan_offset: Vec2,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            zoom_level: 1.0,
            pan_offset: Vec2::ZERO,
        }
    }
}

impl ViewTransform {
    /// Create a transform
    pub fn new(zoom_level: f32, pan_offset: Vec2) -> Self {
        Self {
            zoom_level,
            pan_offset,
        }
    }

    /// Transform that puts `world_center` in the middle of a viewport
    pub fn centered_on(world_center: Pos2, viewport: Vec2, zoom_level: f32) -> Self {
        Self {
            zoom_level,
            pan_offset: Vec2::new(
                viewport.x / 2.0 - world_center.x * zoom_level,
                viewport.y / 2.0 - world_center.y * zoom_level,
            ),
        }
    }

    /// Convert a screen position to world space
    pub fn to_world(&self, screen: Pos2) -> Pos2 {
        Pos2::new(
            (screen.x - self.pan_offset.x) / self.zoom_level,
            (screen.y - self.pan_offset.y) / self.zoom_level,
        )
    }

    /// Convert a world position to screen space
    pub fn to_screen(&self, world: Pos2) -> Pos2 {
        Pos2::new(
            world.x * self.zoom_level + self.pan_offset.x,
            world.y * self.zoom_level + self.pan_offset.y,
        )
    }

    /// Translate the view by a screen-space delta
    pub fn pan_by(&mut self, delta: Vec2) {
        self.pan_offset += delta;
    }

    /// Zoom to `target` (clamped to the configured range) keeping the world
    /// point under `anchor` fixed on screen. Returns the new level.
    pub fn zoom_around(&mut self, target: f32, anchor: Pos2, config: &ZoomConfig) -> f32 {
        let target = if target.is_finite() {
            target
        } else {
            self.zoom_level
        };
        // Must use the pre-zoom transform
        let world_anchor = self.to_world(anchor);
        self.zoom_level = config.clamp(target);
        self.pan_offset = Vec2::new(
            anchor.x - world_anchor.x * self.zoom_level,
            anchor.y - world_anchor.y * self.zoom_level,
        );
        self.zoom_level
    }
}

/// Convert a screen position to world space under `view`
pub fn to_world(screen: Pos2, view: &ViewTransform) -> Pos2 {
    view.to_world(screen)
}

/// Convert a world position to screen space under `view`
pub fn to_screen(world: Pos2, view: &ViewTransform) -> Pos2 {
    view.to_screen(world)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn assert_close(a: Pos2, b: Pos2) {
        assert!(
            (a.x - b.x).abs() < 1e-3 && (a.y - b.y).abs() < 1e-3,
            "{a:?} != {b:?}"
        );
    }

    #[test]
    fn test_conversions_are_inverse() {
        let view = ViewTransform::new(1.5, Vec2::new(40.0, -25.0));
        let screen = Pos2::new(310.0, 95.0);
        let world = to_world(screen, &view);
        assert_close(world, Pos2::new(180.0, 80.0));
        assert_close(to_screen(world, &view), screen);
    }

    proptest! {
        #[test]
        fn test_anchored_zoom_keeps_anchor_fixed(
            zoom in 0.1f32..2.0,
            pan_x in -1000.0f32..1000.0,
            pan_y in -1000.0f32..1000.0,
            anchor_x in -2000.0f32..2000.0,
            anchor_y in -2000.0f32..2000.0,
            target in 0.0f32..5.0,
        ) {
            let config = ZoomConfig::default();
            let anchor = Pos2::new(anchor_x, anchor_y);
            let mut view = ViewTransform::new(zoom, Vec2::new(pan_x, pan_y));
            let before = view.to_world(anchor);

            let level = view.zoom_around(target, anchor, &config);
            let after = view.to_world(anchor);

            prop_assert!((config.min_zoom..=config.max_zoom).contains(&level));
            let tolerance = 1e-2 * before.x.abs().max(before.y.abs()).max(1.0);
            prop_assert!((after.x - before.x).abs() <= tolerance, "{after:?} != {before:?}");
            prop_assert!((after.y - before.y).abs() <= tolerance, "{after:?} != {before:?}");
        }
    }

    #[test]
    fn test_zoom_is_clamped() {
        let config = ZoomConfig::default();
        let mut view = ViewTransform::default();
        assert_eq!(view.zoom_around(10.0, Pos2::ZERO, &config), config.max_zoom);
        assert_eq!(view.zoom_around(0.0, Pos2::ZERO, &config), config.min_zoom);
        assert_eq!(
            view.zoom_around(f32::NAN, Pos2::ZERO, &config),
            config.min_zoom
        );
    }

    #[test]
    fn test_centered_on_puts_center_mid_viewport() {
        let viewport = Vec2::new(800.0, 600.0);
        let view = ViewTransform::centered_on(Pos2::new(150.0, 75.0), viewport, 2.0);
        assert_close(
            view.to_screen(Pos2::new(150.0, 75.0)),
            Pos2::new(400.0, 300.0),
        );
        assert_eq!(view.pan_offset, Vec2::new(100.0, 150.0));
    }
}
