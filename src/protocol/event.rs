//! Event model for Nostr notes
//!
//! An event is immutable once received. The crawler only inspects its id and
//! its tags; everything else is carried through to disk untouched.

use crate::ProtocolError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A 32-byte event identifier in its lowercase hex form
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventId(String);

impl EventId {
    /// Builds an id from its raw 32-byte representation
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ProtocolError> {
        if bytes.len() != 32 {
            return Err(ProtocolError::InvalidIdLength(bytes.len()));
        }
        Ok(Self(hex::encode(bytes)))
    }

    /// Returns the raw 32 bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        // Construction guarantees valid hex
        hex::decode(&self.0).unwrap_or_default()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A structured annotation on an event, e.g. `["e", <id>, <relay>, "reply"]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tag(pub Vec<String>);

impl Tag {
    /// Creates a tag from its string elements
    pub fn new<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(parts.into_iter().map(Into::into).collect())
    }

    /// Returns the tag name (first element)
    pub fn name(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    /// Returns the tag value (second element)
    pub fn value(&self) -> Option<&str> {
        self.0.get(1).map(String::as_str)
    }

    /// Returns the relay hint carried by this tag
    ///
    /// Only `e` and `p` tags with a third element carry a hint. Every other tag
    /// yields an empty string; callers decide what to do with empties.
    pub fn relay_hint(&self) -> &str {
        match (self.name(), self.0.get(2)) {
            (Some("e") | Some("p"), Some(relay)) => relay.as_str(),
            _ => "",
        }
    }
}

/// A signed Nostr event
///
/// Field order matches the canonical JSON encoding written to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub pubkey: String,
    pub created_at: u64,
    pub kind: u32,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub content: String,
    pub sig: String,
}

impl Event {
    /// Serializes the event in its canonical compact JSON form
    pub fn to_canonical_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}
