// SPDX-License-Identifier: MIT OR Apache-2.0
//! Event bus for `FlowCanvas`.
//!
//! This crate decouples the drawing surface from the components around it
//! (toolbars, zoom controls, the host application):
//! - Topic-keyed listener registry with typed payloads
//! - Synchronous, re-entrant emission over listener snapshots
//! - Per-listener fault isolation
//! - Optional bounded replay buffers per topic
//!
//! ## Architecture
//!
//! The bus is a cheap-to-clone handle over single-threaded shared state.
//! It is constructed once by the host and passed to every component that
//! needs it; there is no process-wide instance.

pub mod bus;
pub mod error;
pub mod subscription;
pub mod topic;

pub use bus::{EventBus, ListenerId, WeakEventBus};
pub use error::{ListenerError, ListenerResult};
pub use subscription::{ScopedSubscription, Subscription};
pub use topic::{Topic, TopicKey};
