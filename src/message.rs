//! # Message: immutable payload plus mutable delivery metadata.
//!
//! A [`Message`] carries an opaque payload, string application properties
//! used by correlation filtering, and a delivery count the broker bumps on
//! every redelivery attempt.
//!
//! ## Rules
//! - The delivery count is **monotonic**: it only moves through
//!   [`Message::mark_redelivery`], which saturates instead of wrapping.
//! - The sequence id identifies the message in traces/events; it carries no
//!   ordering semantics inside this crate.
//! - Cloning is cheap: the payload is a ref-counted [`Bytes`] and clones
//!   share it (topic fan-out and dead-letter copies rely on this).

use std::collections::HashMap;

use bytes::Bytes;

/// A broker message as seen by the subscription dispatch path.
#[derive(Clone, Debug)]
pub struct Message {
    /// Sequence identifier, assigned at enqueue time. Used for tracing only.
    seq: u64,
    /// Application-level key/value properties, matched by correlation filters.
    properties: HashMap<String, String>,
    /// Opaque payload. Never inspected by dispatch.
    payload: Bytes,
    /// Number of delivery attempts the broker has made for this message.
    delivery_count: u32,
}

impl Message {
    /// Creates a message with the given sequence id and payload.
    ///
    /// The delivery count starts at zero; properties start empty.
    pub fn new(seq: u64, payload: Bytes) -> Self {
        Self {
            seq,
            properties: HashMap::new(),
            payload,
            delivery_count: 0,
        }
    }

    /// Adds an application property (builder style).
    ///
    /// ## Example
    /// ```
    /// use bytes::Bytes;
    /// use subflow::Message;
    ///
    /// let msg = Message::new(7, Bytes::from_static(b"hi"))
    ///     .with_property("tenant", "acme");
    /// assert_eq!(msg.property("tenant"), Some("acme"));
    /// ```
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// Returns the sequence identifier.
    #[inline]
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Returns the payload.
    #[inline]
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Looks up an application property by name.
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(String::as_str)
    }

    /// Returns the number of delivery attempts made so far.
    #[inline]
    pub fn delivery_count(&self) -> u32 {
        self.delivery_count
    }

    /// Records one more redelivery attempt.
    ///
    /// Called by the engine immediately before handing the message back to
    /// the queue for re-enqueue. Saturates at `u32::MAX`.
    pub fn mark_redelivery(&mut self) {
        self.delivery_count = self.delivery_count.saturating_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_message_starts_undelivered() {
        let msg = Message::new(1, Bytes::new());
        assert_eq!(msg.delivery_count(), 0);
        assert_eq!(msg.seq(), 1);
    }

    #[test]
    fn test_property_lookup() {
        let msg = Message::new(2, Bytes::new())
            .with_property("color", "red")
            .with_property("size", "xl");
        assert_eq!(msg.property("color"), Some("red"));
        assert_eq!(msg.property("size"), Some("xl"));
        assert_eq!(msg.property("missing"), None);
    }

    #[test]
    fn test_mark_redelivery_is_monotonic() {
        let mut msg = Message::new(3, Bytes::new());
        for expected in 1..=5u32 {
            msg.mark_redelivery();
            assert_eq!(msg.delivery_count(), expected);
        }
    }

    #[test]
    fn test_mark_redelivery_saturates() {
        let mut msg = Message::new(4, Bytes::new());
        for _ in 0..3 {
            msg.delivery_count = u32::MAX;
            msg.mark_redelivery();
            assert_eq!(msg.delivery_count(), u32::MAX);
        }
    }

    #[test]
    fn test_clone_shares_payload() {
        let msg = Message::new(5, Bytes::from_static(b"payload"));
        let copy = msg.clone();
        assert_eq!(copy.payload(), msg.payload());
        assert_eq!(copy.seq(), msg.seq());
    }
}
