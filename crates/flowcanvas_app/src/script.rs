// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scripted canvas sessions.
//!
//! A script is a RON list of input steps replayed against a
//! [`CanvasEngine`], standing in for a live pointer.

use crate::settings::SettingsError;
use crate::zoom_control::ZoomControl;
use egui::{Modifiers, PointerButton, Pos2, Vec2};
use flowcanvas_graph::events::NODES_REPLACED;
use flowcanvas_graph::{
    CanvasEngine, Connection, ConnectorSide, DropPayload, Node, NodeId, WheelEvent,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

fn primary() -> PointerButton {
    PointerButton::Primary
}

/// One scripted input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScriptStep {
    /// Report the viewport size
    Viewport {
        /// Width in pixels
        width: f32,
        /// Height in pixels
        height: f32,
    },
    /// Publish a full node list on the bus
    ReplaceNodes(Vec<Node>),
    /// Drop a palette item at a screen position
    Drop {
        /// Item label
        label: String,
        /// Item code
        #[serde(default)]
        code: Option<String>,
        /// Item data JSON
        #[serde(default)]
        item_data: Option<String>,
        /// Screen x
        x: f32,
        /// Screen y
        y: f32,
    },
    /// Press a pointer button
    PointerDown {
        /// Screen x
        x: f32,
        /// Screen y
        y: f32,
        /// Button, primary by default
        #[serde(default = "primary")]
        button: PointerButton,
        /// Hold shift
        #[serde(default)]
        shift: bool,
    },
    /// Move the pointer
    PointerMove {
        /// Screen x
        x: f32,
        /// Screen y
        y: f32,
    },
    /// Release the pointer
    PointerUp {
        /// Screen x
        x: f32,
        /// Screen y
        y: f32,
    },
    /// Leave the canvas
    PointerLeave,
    /// Scroll
    Wheel {
        /// Screen x
        x: f32,
        /// Screen y
        y: f32,
        /// Horizontal delta
        #[serde(default)]
        dx: f32,
        /// Vertical delta
        dy: f32,
        /// Hold ctrl (zoom)
        #[serde(default)]
        ctrl: bool,
    },
    /// Drag a connection between two nodes, found by label
    Connect {
        /// Source node label
        from: String,
        /// Target node label
        to: String,
    },
    /// Delete the connection between two nodes, found by label
    Disconnect {
        /// Source node label
        from: String,
        /// Target node label
        to: String,
    },
    /// Press the zoom-in button
    ZoomIn,
    /// Press the zoom-out button
    ZoomOut,
    /// Press the reset button
    ResetZoom,
}

/// A list of steps
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Script {
    /// Steps in order
    pub steps: Vec<ScriptStep>,
}

impl Script {
    /// Parse a script from RON text
    pub fn parse(content: &str) -> Result<Self, SettingsError> {
        Ok(ron::from_str(content)?)
    }

    /// Load a script file
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }
}

/// Replays scripts against an engine and its zoom control
#[derive(Debug)]
pub struct ScriptRunner<'a> {
    engine: &'a CanvasEngine,
    zoom: &'a ZoomControl,
}

impl<'a> ScriptRunner<'a> {
    /// Create a runner
    pub fn new(engine: &'a CanvasEngine, zoom: &'a ZoomControl) -> Self {
        Self { engine, zoom }
    }

    /// Run every step. Steps naming unknown nodes are skipped.
    ///
    /// Returns the number of steps applied.
    pub fn run(&self, script: &Script) -> usize {
        let mut applied = 0;
        for (index, step) in script.steps.iter().enumerate() {
            if self.apply(step) {
                applied += 1;
            } else {
                tracing::warn!(step = index, ?step, "Script step skipped");
            }
        }
        applied
    }

    fn apply(&self, step: &ScriptStep) -> bool {
        let engine = self.engine;
        match step {
            ScriptStep::Viewport { width, height } => {
                engine.set_viewport(Vec2::new(*width, *height));
            }
            ScriptStep::ReplaceNodes(nodes) => {
                engine.bus().emit(&NODES_REPLACED, nodes.clone());
            }
            ScriptStep::Drop {
                label,
                code,
                item_data,
                x,
                y,
            } => {
                let payload = DropPayload {
                    label: label.clone(),
                    node_code: code.clone(),
                    icon_code: None,
                    item_data: item_data.clone(),
                };
                return engine.drop_item(&payload, Pos2::new(*x, *y)).is_some();
            }
            ScriptStep::PointerDown {
                x,
                y,
                button,
                shift,
            } => {
                let modifiers = if *shift {
                    Modifiers::SHIFT
                } else {
                    Modifiers::NONE
                };
                let event = engine
                    .pointer_at(Pos2::new(*x, *y))
                    .with_button(*button)
                    .with_modifiers(modifiers);
                engine.pointer_down(&event);
            }
            ScriptStep::PointerMove { x, y } => engine.pointer_move(Pos2::new(*x, *y)),
            ScriptStep::PointerUp { x, y } => {
                engine.pointer_up(&engine.pointer_at(Pos2::new(*x, *y)));
            }
            ScriptStep::PointerLeave => engine.pointer_leave(),
            ScriptStep::Wheel { x, y, dx, dy, ctrl } => {
                let modifiers = if *ctrl {
                    Modifiers::CTRL
                } else {
                    Modifiers::NONE
                };
                let event = WheelEvent::new(Pos2::new(*x, *y), Vec2::new(*dx, *dy), modifiers);
                engine.wheel(&event);
            }
            ScriptStep::Connect { from, to } => {
                let (Some(from), Some(to)) = (self.find(from), self.find(to)) else {
                    return false;
                };
                let before = engine.connections().len();
                self.drag_connection(&from, &to);
                return engine.connections().len() > before;
            }
            ScriptStep::Disconnect { from, to } => {
                let (Some(from), Some(to)) = (self.find(from), self.find(to)) else {
                    return false;
                };
                let connections = engine.connections();
                let Some(connection) = connections.iter().find(|c| c.links(&from, &to)) else {
                    return false;
                };
                return engine.delete_connection(&connection.id).is_some();
            }
            ScriptStep::ZoomIn => self.zoom.zoom_in(),
            ScriptStep::ZoomOut => self.zoom.zoom_out(),
            ScriptStep::ResetZoom => self.zoom.reset(),
        }
        true
    }

    fn find(&self, label: &str) -> Option<NodeId> {
        self.engine
            .nodes()
            .iter()
            .find(|n| n.label == label)
            .map(|n| n.id.clone())
    }

    fn drag_connection(&self, from: &NodeId, to: &NodeId) {
        let engine = self.engine;
        let (Some(start), Some(end)) = (
            engine.connector_on_screen(from, ConnectorSide::Right),
            engine.connector_on_screen(to, ConnectorSide::Left),
        ) else {
            return;
        };
        engine.pointer_down(&engine.pointer_at(start));
        engine.pointer_move(end);
        engine.pointer_up(&engine.pointer_at(end));
    }
}

/// Final state of a session, printed by the binary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    /// Zoom level
    pub zoom_level: f32,
    /// Pan offset
    pub pan_offset: Vec2,
    /// Nodes in drawing order
    pub nodes: Vec<Node>,
    /// Connections
    pub connections: Vec<Connection>,
}

impl SessionSummary {
    /// Capture the engine's current state
    pub fn capture(engine: &CanvasEngine) -> Self {
        let view = engine.view();
        Self {
            zoom_level: view.zoom_level,
            pan_offset: view.pan_offset,
            nodes: engine.nodes().to_vec(),
            connections: engine.connections().to_vec(),
        }
    }

    /// Render as pretty RON
    pub fn to_ron(&self) -> Result<String, SettingsError> {
        let config = ron::ser::PrettyConfig::default().struct_names(true);
        Ok(ron::ser::to_string_pretty(self, config)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowcanvas_events::EventBus;
    use flowcanvas_graph::{events, CanvasConfig};

    const DEMO: &str = include_str!("../scripts/demo.ron");

    fn session() -> (CanvasEngine, ZoomControl) {
        let bus = EventBus::new();
        let engine = CanvasEngine::new(bus.clone(), CanvasConfig::default()).unwrap();
        let zoom = ZoomControl::mount(&bus, engine.zoom_config());
        (engine, zoom)
    }

    #[test]
    fn test_demo_script_runs() {
        let script = Script::parse(DEMO).unwrap();
        let (engine, zoom) = session();
        let applied = ScriptRunner::new(&engine, &zoom).run(&script);

        assert_eq!(applied, script.steps.len());
        assert_eq!(engine.nodes().len(), 3);
        assert_eq!(engine.connections().len(), 2);
        assert!(!engine.is_dragging_node());
        assert!(!engine.is_connecting());
        assert!(!engine.is_panning());
        let summary = SessionSummary::capture(&engine).to_ron().unwrap();
        assert!(summary.contains("connections"));
    }

    #[test]
    fn test_drop_drag_and_connect() {
        let script = Script::parse(
            r#"(steps: [
                Drop(label: "Start", x: 200.0, y: 200.0),
                Drop(label: "End", code: Some("end"), x: 600.0, y: 200.0),
                PointerDown(x: 200.0, y: 200.0),
                PointerMove(x: 220.0, y: 260.0),
                PointerUp(x: 220.0, y: 260.0),
                Connect(from: "Start", to: "End"),
                Connect(from: "Start", to: "End"),
            ])"#,
        )
        .unwrap();
        let (engine, zoom) = session();
        let applied = ScriptRunner::new(&engine, &zoom).run(&script);

        // Second connect is a duplicate
        assert_eq!(applied, 6);
        let start = engine
            .nodes()
            .iter()
            .find(|n| n.label == "Start")
            .cloned()
            .unwrap();
        assert_eq!(start.position, Pos2::new(145.0, 222.5));
        assert_eq!(engine.connections().len(), 1);
    }

    #[test]
    fn test_unknown_labels_are_skipped() {
        let script = Script::parse(
            r#"(steps: [
                Connect(from: "a", to: "b"),
                Disconnect(from: "a", to: "b"),
                ZoomIn,
            ])"#,
        )
        .unwrap();
        let (engine, zoom) = session();
        assert_eq!(ScriptRunner::new(&engine, &zoom).run(&script), 1);
        assert_eq!(engine.zoom_level(), 1.25);
    }

    #[test]
    fn test_replace_nodes_step_goes_through_bus() {
        let bus = EventBus::new();
        let seen = std::rc::Rc::new(std::cell::Cell::new(0));
        let sink = std::rc::Rc::clone(&seen);
        let _sub = bus.subscribe(&events::NODES_REPLACED, move |nodes: &Vec<Node>| {
            sink.set(nodes.len());
            Ok(())
        });
        let engine = CanvasEngine::new(bus.clone(), CanvasConfig::default()).unwrap();
        let zoom = ZoomControl::mount(&bus, engine.zoom_config());

        let node = Node::new("A", Pos2::ZERO, Vec2::new(10.0, 10.0));
        let script = Script {
            steps: vec![ScriptStep::ReplaceNodes(vec![node])],
        };
        ScriptRunner::new(&engine, &zoom).run(&script);
        assert_eq!(seen.get(), 1);
        assert_eq!(engine.nodes().len(), 1);
    }
}
