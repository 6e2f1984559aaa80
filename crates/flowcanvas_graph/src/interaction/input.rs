// SPDX-License-Identifier: MIT OR Apache-2.0
//! Pointer and wheel input.

use crate::connection::ConnectionId;
use crate::node::{ConnectorSide, NodeId};
use egui::{Pos2, Vec2};

pub use egui::{Modifiers, PointerButton};

/// What a pointer sample landed on
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum HitTarget {
    /// Empty canvas
    #[default]
    Canvas,
    /// A node's body
    NodeBody(NodeId),
    /// One of a node's connectors
    Connector {
        /// Node owning the connector
        node: NodeId,
        /// Which connector
        side: ConnectorSide,
    },
    /// The delete affordance of a connection
    DeleteHandle(ConnectionId),
}

/// A pointer press or release
#[derive(Debug, Clone, PartialEq)]
pub struct PointerEvent {
    /// Screen position
    pub position: Pos2,
    /// Button involved
    pub button: PointerButton,
    /// Keyboard modifiers held
    pub modifiers: Modifiers,
    /// What the pointer is over
    pub target: HitTarget,
}

impl PointerEvent {
    /// Primary-button event over empty canvas
    pub fn new(position: Pos2) -> Self {
        Self {
            position,
            button: PointerButton::Primary,
            modifiers: Modifiers::NONE,
            target: HitTarget::Canvas,
        }
    }

    /// Set the button
    pub fn with_button(mut self, button: PointerButton) -> Self {
        self.button = button;
        self
    }

    /// Set the modifiers
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Set the target
    pub fn on(mut self, target: HitTarget) -> Self {
        self.target = target;
        self
    }
}

/// A scroll wheel or trackpad scroll
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelEvent {
    /// Screen position of the pointer
    pub position: Pos2,
    /// Scroll delta, positive y scrolls down
    pub delta: Vec2,
    /// Keyboard modifiers held
    pub modifiers: Modifiers,
}

impl WheelEvent {
    /// Create a wheel event
    pub fn new(position: Pos2, delta: Vec2, modifiers: Modifiers) -> Self {
        Self {
            position,
            delta,
            modifiers,
        }
    }

    /// Ctrl or Cmd turns the wheel into zoom
    pub fn is_zoom(&self) -> bool {
        self.modifiers.ctrl || self.modifiers.command || self.modifiers.mac_cmd
    }
}
