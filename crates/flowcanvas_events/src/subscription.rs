// SPDX-License-Identifier: MIT OR Apache-2.0
//! Subscription handles returned by [`EventBus::subscribe`](crate::EventBus::subscribe).

use crate::bus::{ListenerId, WeakEventBus};

/// Handle to a registered listener.
///
/// Dropping a `Subscription` leaves the listener registered; call
/// [`Subscription::unsubscribe`] or convert it with
/// [`Subscription::into_scoped`] to tie the listener to a scope.
#[derive(Debug, Clone)]
pub struct Subscription {
    bus: WeakEventBus,
    topic: String,
    id: ListenerId,
}

impl Subscription {
    pub(crate) fn new(bus: WeakEventBus, topic: String, id: ListenerId) -> Self {
        Self { bus, topic, id }
    }

    /// Get the listener ID
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Get the topic name
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Remove the listener from the bus. Safe to call more than once.
    pub fn unsubscribe(&self) {
        if let Some(bus) = self.bus.upgrade() {
            bus.unsubscribe(self.topic.as_str(), self.id);
        }
    }

    /// Turn this handle into a guard that unsubscribes when dropped
    pub fn into_scoped(self) -> ScopedSubscription {
        ScopedSubscription(self)
    }
}

/// Subscription that unsubscribes its listener on drop
#[derive(Debug)]
pub struct ScopedSubscription(Subscription);

impl Drop for ScopedSubscription {
    fn drop(&mut self) {
        self.0.unsubscribe();
    }
}
