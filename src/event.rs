//! Session events
//!
//! An [`Event`] is one logical action recorded against a frame of the
//! session: a player joining, a pointer going down, a timestamp marker.
//! Events are plain value data; the store filters them but never
//! interprets their payloads, with the single exception of the time
//! marker carried by [`EventCode::Timestamp`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Codes identifying what kind of action an [`Event`] carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum EventCode {
    /// A player joined the session
    Join = 0,
    /// A player left the session
    Leave = 1,
    /// An absolute or session-relative time marker
    Timestamp = 2,
    /// Player profile information
    PlayerInfo = 3,
    /// An application-defined message
    Message = 32,
    /// Pointer pressed
    PointDown = 33,
    /// Pointer moved while pressed
    PointMove = 34,
    /// Pointer released
    PointUp = 35,
    /// An application-defined operation
    Operation = 64,
}

/// Delivery flags attached to an event
///
/// The low bits carry the sender's priority. The transient bit marks an
/// event as meaningful only at the moment of delivery; transient events
/// are dropped before a tick is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct EventFlags(pub u8);

impl EventFlags {
    /// Bits carrying the sender priority
    pub const PRIORITY_MASK: u8 = 0b0011;
    /// Marks an event as transient (delivered, never persisted)
    pub const TRANSIENT: u8 = 0b1000;

    /// Create flags from raw bits
    pub fn new(bits: u8) -> Self {
        Self(bits)
    }

    /// The sender priority encoded in the low bits
    pub fn priority(self) -> u8 {
        self.0 & Self::PRIORITY_MASK
    }

    /// Whether the transient bit is set
    pub fn is_transient(self) -> bool {
        self.0 & Self::TRANSIENT != 0
    }
}

/// One logical action recorded in the session log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// What kind of action this is
    pub code: EventCode,
    /// Priority and transience flags
    pub flags: EventFlags,
    /// Identifier of the player that produced the event, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    /// Code-specific payload values, in wire order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub payload: Vec<Value>,
}

impl Event {
    /// Create an event with no payload
    pub fn new(code: EventCode, flags: EventFlags, origin: impl Into<String>) -> Self {
        Self {
            code,
            flags,
            origin: Some(origin.into()),
            payload: Vec::new(),
        }
    }

    /// Attach payload values
    pub fn with_payload(mut self, payload: Vec<Value>) -> Self {
        self.payload = payload;
        self
    }

    /// Create a timestamp marker event
    pub fn timestamp_marker(flags: EventFlags, origin: impl Into<String>, time: f64) -> Self {
        Self::new(EventCode::Timestamp, flags, origin).with_payload(vec![time.into()])
    }

    /// The time marker carried by a timestamp event
    ///
    /// Returns `None` for every other event code, and for a timestamp
    /// event whose payload is malformed.
    pub fn timestamp(&self) -> Option<f64> {
        if self.code != EventCode::Timestamp {
            return None;
        }
        self.payload.first().and_then(Value::as_f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_priority_and_transience() {
        assert_eq!(EventFlags::new(0b0010).priority(), 2);
        assert!(!EventFlags::new(0b0010).is_transient());
        assert!(EventFlags::new(0b1000).is_transient());
        assert!(EventFlags::new(0b1111).is_transient());
        assert_eq!(EventFlags::new(0b1111).priority(), 3);
        assert!(!EventFlags::default().is_transient());
    }

    #[test]
    fn test_timestamp_extraction() {
        let marker = Event::timestamp_marker(EventFlags::default(), "player-1", 1_671_895_000.0);
        assert_eq!(marker.timestamp(), Some(1_671_895_000.0));

        let message = Event::new(EventCode::Message, EventFlags::default(), "player-1")
            .with_payload(vec!["hello".into()]);
        assert_eq!(message.timestamp(), None);

        // Timestamp code with a non-numeric payload carries no marker
        let malformed = Event::new(EventCode::Timestamp, EventFlags::default(), "player-1")
            .with_payload(vec!["not-a-number".into()]);
        assert_eq!(malformed.timestamp(), None);
    }
}
