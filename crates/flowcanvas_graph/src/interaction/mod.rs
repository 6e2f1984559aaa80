// SPDX-License-Identifier: MIT OR Apache-2.0
//! Pointer-driven interaction with the canvas.
//!
//! Each gesture is a small state machine ([`NodeDrag`], [`ConnectionDrag`],
//! [`PanDrag`]) working on world coordinates. [`CanvasEngine`] feeds them
//! converted pointer samples and announces the results on the event bus.

mod connection_drag;
mod engine;
mod input;
mod node_drag;
mod pan;
pub mod zoom;

pub use connection_drag::{ConnectionDrag, ConnectionPreview};
pub use engine::{CanvasEngine, DEFAULT_VIEWPORT};
pub use input::{HitTarget, Modifiers, PointerButton, PointerEvent, WheelEvent};
pub use node_drag::NodeDrag;
pub use pan::PanDrag;
pub use zoom::ZoomDirection;
