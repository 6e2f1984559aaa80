// SPDX-License-Identifier: MIT OR Apache-2.0
//! Topic-keyed listener registry with replay buffers.

use crate::error::{ListenerError, ListenerResult};
use crate::subscription::Subscription;
use crate::topic::{Topic, TopicKey};
use indexmap::IndexMap;
use std::any::{type_name, Any};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::{Rc, Weak};

/// Unique identifier for a registered listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

type ErasedListener = Rc<dyn Fn(&dyn Any) -> ListenerResult>;

struct ListenerEntry {
    id: ListenerId,
    callback: ErasedListener,
}

type Payload = Box<dyn Any>;

/// Bounded FIFO of payloads emitted while a topic had no listener.
///
/// Evicted payloads are handed back to the caller so they can be dropped
/// once the bus state is no longer borrowed.
struct ReplayBuffer {
    max_size: usize,
    payloads: VecDeque<Payload>,
}

impl ReplayBuffer {
    fn new(max_size: usize) -> Self {
        Self {
            max_size: max_size.max(1),
            payloads: VecDeque::new(),
        }
    }

    fn push(&mut self, payload: Payload) -> Vec<Payload> {
        self.payloads.push_back(payload);
        self.trim()
    }

    fn resize(&mut self, max_size: usize) -> Vec<Payload> {
        self.max_size = max_size.max(1);
        self.trim()
    }

    fn trim(&mut self) -> Vec<Payload> {
        let excess = self.payloads.len().saturating_sub(self.max_size);
        self.payloads.drain(..excess).collect()
    }
}

#[derive(Default)]
struct BusState {
    listeners: IndexMap<String, Vec<ListenerEntry>>,
    buffers: IndexMap<String, ReplayBuffer>,
    next_listener_id: u64,
}

impl BusState {
    fn allocate_id(&mut self) -> ListenerId {
        self.next_listener_id += 1;
        ListenerId(self.next_listener_id)
    }
}

/// Publish/subscribe event bus.
///
/// Cloning an `EventBus` yields another handle to the same registry.
/// Emission is synchronous: every listener has run by the time
/// [`EventBus::emit`] returns. Listeners may subscribe, unsubscribe and
/// emit from inside a callback; such changes apply to later emissions only.
#[derive(Clone, Default)]
pub struct EventBus {
    state: Rc<RefCell<BusState>>,
}

/// Non-owning handle to an [`EventBus`].
///
/// Listeners that need to emit capture this instead of the bus itself, so
/// the registry does not keep itself alive.
#[derive(Clone, Default)]
pub struct WeakEventBus {
    state: Weak<RefCell<BusState>>,
}

impl WeakEventBus {
    /// Get the bus back if it is still alive
    pub fn upgrade(&self) -> Option<EventBus> {
        self.state.upgrade().map(|state| EventBus { state })
    }
}

impl fmt::Debug for WeakEventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakEventBus")
            .field("alive", &(self.state.strong_count() > 0))
            .finish()
    }
}

impl EventBus {
    /// Create a new empty bus
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a non-owning handle to this bus
    pub fn downgrade(&self) -> WeakEventBus {
        WeakEventBus {
            state: Rc::downgrade(&self.state),
        }
    }

    /// Register a listener for `topic`.
    ///
    /// If this is the topic's first listener and payloads were buffered
    /// while nobody was listening, they are delivered to `listener` in
    /// emission order before this returns, and the buffer is emptied.
    pub fn subscribe<T, F>(&self, topic: &Topic<T>, listener: F) -> Subscription
    where
        T: 'static,
        F: Fn(&T) -> ListenerResult + 'static,
    {
        let callback: ErasedListener = Rc::new(move |payload: &dyn Any| {
            match payload.downcast_ref::<T>() {
                Some(payload) => listener(payload),
                None => Err(ListenerError::PayloadMismatch {
                    expected: type_name::<T>(),
                }),
            }
        });

        let (id, backlog) = {
            let mut guard = self.state.borrow_mut();
            let state = &mut *guard;
            let id = state.allocate_id();
            let listeners = state.listeners.entry(topic.name().to_owned()).or_default();
            listeners.push(ListenerEntry {
                id,
                callback: Rc::clone(&callback),
            });

            let backlog: Vec<Payload> = if listeners.len() == 1 {
                state
                    .buffers
                    .get_mut(topic.name())
                    .map(|buffer| buffer.payloads.drain(..).collect())
                    .unwrap_or_default()
            } else {
                Vec::new()
            };
            (id, backlog)
        };

        if !backlog.is_empty() {
            tracing::debug!(
                topic = topic.name(),
                count = backlog.len(),
                "Replaying buffered events"
            );
            for payload in &backlog {
                deliver(topic.name(), &callback, &**payload);
            }
        }

        Subscription::new(self.downgrade(), topic.name().to_owned(), id)
    }

    /// Remove a listener. Unknown topics and IDs are ignored.
    ///
    /// When the last listener of a topic goes away the topic entry is
    /// dropped; its replay buffer, if any, is kept.
    pub fn unsubscribe<K: TopicKey + ?Sized>(&self, topic: &K, id: ListenerId) {
        let removed = {
            let mut state = self.state.borrow_mut();
            let key = topic.key();
            let Some(listeners) = state.listeners.get_mut(key) else {
                return;
            };
            let removed = listeners
                .iter()
                .position(|entry| entry.id == id)
                .map(|index| listeners.remove(index));
            if listeners.is_empty() {
                state.listeners.shift_remove(key);
            }
            removed
        };
        // Dropped outside the borrow: closures may own guards that touch the bus
        drop(removed);
    }

    /// Deliver `payload` to every listener of `topic`.
    ///
    /// Listeners run in registration order against a snapshot taken before
    /// the first call. A failing or panicking listener is logged and skipped.
    /// With no listener, the payload is buffered if buffering is enabled for
    /// the topic and dropped otherwise.
    pub fn emit<T: 'static>(&self, topic: &Topic<T>, payload: T) {
        let snapshot: Vec<ErasedListener> = self
            .state
            .borrow()
            .listeners
            .get(topic.name())
            .map(|listeners| {
                listeners
                    .iter()
                    .map(|entry| Rc::clone(&entry.callback))
                    .collect()
            })
            .unwrap_or_default();

        if snapshot.is_empty() {
            self.buffer_or_drop(topic.name(), Box::new(payload));
            return;
        }
        for callback in &snapshot {
            deliver(topic.name(), callback, &payload);
        }
    }

    fn buffer_or_drop(&self, topic: &str, payload: Payload) {
        let discarded = {
            let mut state = self.state.borrow_mut();
            match state.buffers.get_mut(topic) {
                Some(buffer) => {
                    let evicted = buffer.push(payload);
                    tracing::trace!(
                        topic,
                        buffered = buffer.payloads.len(),
                        "No listeners, event buffered"
                    );
                    evicted
                }
                None => {
                    tracing::trace!(topic, "No listeners, event dropped");
                    vec![payload]
                }
            }
        };
        // Dropped outside the borrow: payloads may own guards that touch the bus
        drop(discarded);
    }

    /// Buffer payloads emitted on `topic` while it has no listener.
    ///
    /// With `max_size == 1` only the latest payload is kept. Larger sizes
    /// keep the most recent `max_size` payloads in emission order. Zero is
    /// treated as one. Calling this again on a buffering topic keeps its
    /// payloads and applies the new size.
    pub fn enable_buffering<K: TopicKey + ?Sized>(&self, topic: &K, max_size: usize) {
        let evicted = {
            let mut state = self.state.borrow_mut();
            match state.buffers.get_mut(topic.key()) {
                Some(buffer) => buffer.resize(max_size),
                None => {
                    state
                        .buffers
                        .insert(topic.key().to_owned(), ReplayBuffer::new(max_size));
                    Vec::new()
                }
            }
        };
        drop(evicted);
        tracing::debug!(topic = topic.key(), max_size, "Buffering enabled");
    }

    /// Stop buffering `topic` and discard anything buffered
    pub fn disable_buffering<K: TopicKey + ?Sized>(&self, topic: &K) {
        let removed = self.state.borrow_mut().buffers.shift_remove(topic.key());
        drop(removed);
    }

    /// Discard buffered payloads for `topic`; buffering stays enabled
    pub fn clear_buffer<K: TopicKey + ?Sized>(&self, topic: &K) {
        let drained: Vec<Payload> = self
            .state
            .borrow_mut()
            .buffers
            .get_mut(topic.key())
            .map(|buffer| buffer.payloads.drain(..).collect())
            .unwrap_or_default();
        drop(drained);
    }

    /// Discard buffered payloads for every topic
    pub fn clear_all_buffers(&self) {
        let drained: Vec<Payload> = self
            .state
            .borrow_mut()
            .buffers
            .values_mut()
            .flat_map(|buffer| buffer.payloads.drain(..))
            .collect();
        drop(drained);
    }

    /// Remove every listener of `topic`; buffers are untouched
    pub fn clear<K: TopicKey + ?Sized>(&self, topic: &K) {
        let removed = self.state.borrow_mut().listeners.shift_remove(topic.key());
        drop(removed);
    }

    /// Remove every listener of every topic; buffers are untouched
    pub fn clear_all(&self) {
        let removed = std::mem::take(&mut self.state.borrow_mut().listeners);
        drop(removed);
    }

    /// Check if a topic has any listeners
    pub fn has_listeners<K: TopicKey + ?Sized>(&self, topic: &K) -> bool {
        self.listener_count(topic) > 0
    }

    /// Get the number of listeners registered for a topic
    pub fn listener_count<K: TopicKey + ?Sized>(&self, topic: &K) -> usize {
        self.state
            .borrow()
            .listeners
            .get(topic.key())
            .map_or(0, Vec::len)
    }

    /// Check if buffering is enabled for a topic
    pub fn is_buffering<K: TopicKey + ?Sized>(&self, topic: &K) -> bool {
        self.state.borrow().buffers.contains_key(topic.key())
    }

    /// Get the number of payloads waiting in a topic's replay buffer
    pub fn buffered_count<K: TopicKey + ?Sized>(&self, topic: &K) -> usize {
        self.state
            .borrow()
            .buffers
            .get(topic.key())
            .map_or(0, |buffer| buffer.payloads.len())
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.state.try_borrow() {
            Ok(state) => f
                .debug_struct("EventBus")
                .field("topics", &state.listeners.keys().collect::<Vec<_>>())
                .field("buffered_topics", &state.buffers.keys().collect::<Vec<_>>())
                .finish(),
            Err(_) => f.write_str("EventBus { <busy> }"),
        }
    }
}

/// Run one listener, containing any fault it raises
fn deliver(topic: &str, callback: &ErasedListener, payload: &dyn Any) {
    let outcome = match panic::catch_unwind(AssertUnwindSafe(|| callback(payload))) {
        Ok(result) => result,
        Err(panic) => Err(ListenerError::Panicked(panic_message(panic.as_ref()))),
    };

    if let Err(error) = outcome {
        tracing::error!(topic, %error, "Error in event listener");
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_owned()
    }
}
