// SPDX-License-Identifier: MIT OR Apache-2.0
//! Typed topic keys.

use std::fmt;
use std::marker::PhantomData;

/// A named channel carrying payloads of type `T`.
///
/// Topics are usually declared as constants next to the payload types:
///
/// ```
/// use flowcanvas_events::Topic;
///
/// const SCORE_CHANGED: Topic<u32> = Topic::new("score:changed");
/// assert_eq!(SCORE_CHANGED.name(), "score:changed");
/// ```
pub struct Topic<T> {
    name: &'static str,
    _payload: PhantomData<fn(&T)>,
}

impl<T> Topic<T> {
    /// Create a topic with the given name
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _payload: PhantomData,
        }
    }

    /// Get the topic name
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> Clone for Topic<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Topic<T> {}

impl<T> fmt::Debug for Topic<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Topic").field(&self.name).finish()
    }
}

impl<T> fmt::Display for Topic<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Anything that names a topic.
///
/// Operations that do not touch payloads (unsubscribe, introspection,
/// buffer management) accept typed topics and plain names alike.
pub trait TopicKey {
    /// The topic name used as registry key
    fn key(&self) -> &str;
}

impl<T> TopicKey for Topic<T> {
    fn key(&self) -> &str {
        self.name
    }
}

impl TopicKey for str {
    fn key(&self) -> &str {
        self
    }
}

impl TopicKey for String {
    fn key(&self) -> &str {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_key_matches_name() {
        const PING: Topic<()> = Topic::new("ping");
        assert_eq!(PING.key(), "ping");
        assert_eq!("ping".key(), PING.key());
        assert_eq!(String::from("ping").key(), "ping");
        assert_eq!(PING.to_string(), "ping");
    }
}
