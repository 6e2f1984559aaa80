// SPDX-License-Identifier: MIT OR Apache-2.0
//! Listener fault types.

/// Result returned by every bus listener
pub type ListenerResult = Result<(), ListenerError>;

/// Fault raised by a listener while handling an event.
///
/// Faults are caught by the bus, logged with the topic name and never
/// reach the emitter or the remaining listeners.
#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    /// The emitted payload is not the type the listener was registered for
    #[error("payload type mismatch, listener expects {expected}")]
    PayloadMismatch {
        /// Type name the listener expects
        expected: &'static str,
    },

    /// The listener refused the event
    #[error("event rejected: {0}")]
    Rejected(String),

    /// The listener panicked
    #[error("listener panicked: {0}")]
    Panicked(String),
}

impl ListenerError {
    /// Create a rejection with a message
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected(message.into())
    }
}
