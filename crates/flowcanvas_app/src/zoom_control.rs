// SPDX-License-Identifier: MIT OR Apache-2.0
//! Zoom buttons and level readout.
//!
//! The control never changes the view itself. It asks the canvas through
//! the bus and mirrors the level the canvas reports back.

use flowcanvas_events::{EventBus, ScopedSubscription};
use flowcanvas_graph::events::{
    ZoomWithPoint, ZOOM_CHANGED, ZOOM_CONFIG_UPDATED, ZOOM_RESET, ZOOM_WITH_POINT,
};
use flowcanvas_graph::ZoomConfig;
use std::cell::Cell;
use std::rc::Rc;

/// Zoom in/out/reset control
#[derive(Debug)]
pub struct ZoomControl {
    bus: EventBus,
    config: ZoomConfig,
    level: Rc<Cell<f32>>,
    _level_updates: ScopedSubscription,
}

impl ZoomControl {
    /// Attach the control to `bus` and push its configuration to the canvas
    pub fn mount(bus: &EventBus, config: ZoomConfig) -> Self {
        let level = Rc::new(Cell::new(config.initial_zoom));
        let sink = Rc::clone(&level);
        let level_updates = bus
            .subscribe(&ZOOM_CHANGED, move |zoom: &f32| {
                sink.set(*zoom);
                Ok(())
            })
            .into_scoped();

        bus.emit(&ZOOM_CONFIG_UPDATED, config);

        Self {
            bus: bus.clone(),
            config,
            level,
            _level_updates: level_updates,
        }
    }

    /// Last level reported by the canvas
    pub fn level(&self) -> f32 {
        self.level.get()
    }

    /// Level as a rounded percentage
    pub fn percentage(&self) -> u32 {
        (self.level() * 100.0).round().max(0.0) as u32
    }

    /// Check if zooming in would change anything
    pub fn can_zoom_in(&self) -> bool {
        self.level() < self.config.max_zoom
    }

    /// Check if zooming out would change anything
    pub fn can_zoom_out(&self) -> bool {
        self.level() > self.config.min_zoom
    }

    /// Zoom in one step
    pub fn zoom_in(&self) {
        self.request(self.level() + self.config.zoom_step);
    }

    /// Zoom out one step
    pub fn zoom_out(&self) {
        self.request(self.level() - self.config.zoom_step);
    }

    /// Ask the canvas to reset its view
    pub fn reset(&self) {
        self.bus.emit(&ZOOM_RESET, ());
    }

    fn request(&self, level: f32) {
        let zoom = self.config.clamp(level);
        tracing::debug!(zoom, "Zoom requested");
        let request = ZoomWithPoint {
            zoom,
            x: 0.0,
            y: 0.0,
        };
        self.bus.emit(&ZOOM_WITH_POINT, request);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowcanvas_graph::{CanvasConfig, CanvasEngine};
    use std::cell::RefCell;

    #[test]
    fn test_buttons_drive_engine() {
        let bus = EventBus::new();
        let engine = CanvasEngine::new(bus.clone(), CanvasConfig::default()).unwrap();
        let control = ZoomControl::mount(&bus, ZoomConfig::default());
        assert_eq!(control.percentage(), 100);

        control.zoom_in();
        assert_eq!(engine.zoom_level(), 1.25);
        assert_eq!(control.level(), 1.25);
        for _ in 0..5 {
            control.zoom_in();
        }
        assert_eq!(control.level(), 2.0);
        assert!(!control.can_zoom_in());
        assert!(control.can_zoom_out());

        control.reset();
        assert_eq!(control.percentage(), 100);
    }

    #[test]
    fn test_mount_pushes_config() {
        let bus = EventBus::new();
        let engine = CanvasEngine::new(bus.clone(), CanvasConfig::default()).unwrap();
        engine.zoom_to(1.7, egui::Pos2::ZERO);

        let config = ZoomConfig::new(0.5, 1.5, 0.5, 0.5).unwrap();
        let control = ZoomControl::mount(&bus, config);
        assert_eq!(engine.zoom_config(), config);
        assert_eq!(control.level(), 0.5);
        assert!(!control.can_zoom_out());

        control.zoom_out();
        assert_eq!(engine.zoom_level(), 0.5);
    }

    #[test]
    fn test_requests_are_clamped() {
        let bus = EventBus::new();
        let requests = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&requests);
        let _sub = bus.subscribe(&ZOOM_WITH_POINT, move |request: &ZoomWithPoint| {
            sink.borrow_mut().push(request.zoom);
            Ok(())
        });

        let control = ZoomControl::mount(&bus, ZoomConfig::default());
        control.zoom_out();
        control.zoom_in();
        // Nobody answers, so the level stays put
        assert_eq!(*requests.borrow(), vec![0.75, 1.25]);
        assert_eq!(control.level(), 1.0);
    }
}
