// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node drag gesture.

use crate::node::{Node, NodeId};
use egui::{Pos2, Vec2};

/// Node drag state
#[derive(Debug, Clone, Default, PartialEq)]
pub enum NodeDrag {
    /// No drag
    #[default]
    Idle,
    /// A node follows the pointer
    Dragging {
        /// Node being dragged
        node_id: NodeId,
        /// Pointer position relative to the node's top-left corner
        offset: Vec2,
    },
}

impl NodeDrag {
    /// Start dragging `node`, grabbed at `pointer_world`
    pub fn begin(node: &Node, pointer_world: Pos2) -> Self {
        Self::Dragging {
            node_id: node.id.clone(),
            offset: pointer_world - node.position,
        }
    }

    /// Check if a drag is in progress
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Dragging { .. })
    }

    /// Where the dragged node goes for a pointer at `pointer_world`
    pub fn target_position(&self, pointer_world: Pos2) -> Option<(&NodeId, Pos2)> {
        match self {
            Self::Idle => None,
            Self::Dragging { node_id, offset } => Some((node_id, pointer_world - *offset)),
        }
    }

    /// End the drag, returning the dragged node's ID
    pub fn finish(&mut self) -> Option<NodeId> {
        match std::mem::take(self) {
            Self::Idle => None,
            Self::Dragging { node_id, .. } => Some(node_id),
        }
    }
}
