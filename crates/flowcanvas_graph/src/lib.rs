// SPDX-License-Identifier: MIT OR Apache-2.0
//! Diagram canvas model and interaction engine for `FlowCanvas`.
//!
//! This crate provides everything behind the drawing surface:
//! - Nodes with left/right connectors and directional connections
//! - Connector and Bezier connection geometry
//! - Screen/world view transform with anchor-preserving zoom
//! - Pointer-driven state machines (node drag, connection drag, pan)
//! - Canvas topics on the event bus and an async node lookup
//!
//! ## Architecture
//!
//! [`CanvasEngine`] owns the session state and turns pointer input into
//! state changes. Every change is announced on a
//! [`flowcanvas_events::EventBus`]; external components only talk to the
//! engine through pointer input or by emitting the topics it listens to.

pub mod config;
pub mod connection;
pub mod events;
pub mod geometry;
pub mod interaction;
pub mod lookup;
pub mod node;
pub mod ordering;
pub mod palette;
pub mod scene;
pub mod transform;

pub use config::{CanvasConfig, ConfigError, PanModifier, ZoomConfig};
pub use connection::{Connection, ConnectionId};
pub use geometry::{ConnectionCurve, ConnectorPoints, NodeAlignment};
pub use interaction::{
    CanvasEngine, ConnectionPreview, HitTarget, Modifiers, PointerButton, PointerEvent, WheelEvent,
};
pub use lookup::{get_node_by_id, LookupError};
pub use node::{ConnectorSide, Node, NodeId};
pub use palette::{DefaultNodeFactory, DropPayload, NodeFactory};
pub use scene::{ConnectionError, Scene};
pub use transform::ViewTransform;
