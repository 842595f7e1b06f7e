//! NIP-01 messages exchanged with a relay
//!
//! Client and relay messages are JSON arrays whose first element names the
//! message type. Only the types the crawler sends or reacts to are modelled;
//! anything else parses as [`RelayMessage::Other`].

use crate::protocol::{Event, Filter};
use crate::ProtocolError;
use serde_json::{json, Value};

/// A message sent from the crawler to a relay
#[derive(Debug, Clone, PartialEq)]
pub enum ClientMessage {
    /// Opens a subscription
    Req { subscription_id: String, filter: Filter },

    /// Closes a subscription
    Close { subscription_id: String },
}

impl ClientMessage {
    pub fn to_json(&self) -> Result<String, ProtocolError> {
        let value = match self {
            Self::Req {
                subscription_id,
                filter,
            } => json!(["REQ", subscription_id, filter]),
            Self::Close { subscription_id } => json!(["CLOSE", subscription_id]),
        };
        Ok(serde_json::to_string(&value)?)
    }

    /// Parses a client message (relay side of the exchange)
    pub fn from_json(text: &str) -> Result<Self, ProtocolError> {
        let parts = as_array(text)?;
        match message_type(&parts)? {
            "REQ" => {
                let subscription_id = string_at(&parts, 1)?;
                let filter_value = parts
                    .get(2)
                    .cloned()
                    .ok_or_else(|| ProtocolError::InvalidMessage("REQ without filter".into()))?;
                let filter = serde_json::from_value(filter_value)?;
                Ok(Self::Req {
                    subscription_id,
                    filter,
                })
            }
            "CLOSE" => Ok(Self::Close {
                subscription_id: string_at(&parts, 1)?,
            }),
            other => Err(ProtocolError::InvalidMessage(format!(
                "unknown client message type '{}'",
                other
            ))),
        }
    }
}

/// A message received from a relay
#[derive(Debug, Clone, PartialEq)]
pub enum RelayMessage {
    Event {
        subscription_id: String,
        event: Box<Event>,
    },

    /// End of stored events for a subscription
    Eose { subscription_id: String },

    /// The relay refused or terminated a subscription
    Closed {
        subscription_id: String,
        message: String,
    },

    Notice(String),

    /// Any message type the crawler does not act on (OK, AUTH, COUNT, ...)
    Other(String),
}

impl RelayMessage {
    pub fn from_json(text: &str) -> Result<Self, ProtocolError> {
        let parts = as_array(text)?;
        match message_type(&parts)? {
            "EVENT" => {
                let subscription_id = string_at(&parts, 1)?;
                let event_value = parts
                    .get(2)
                    .cloned()
                    .ok_or_else(|| ProtocolError::InvalidMessage("EVENT without body".into()))?;
                let event: Event = serde_json::from_value(event_value)?;
                Ok(Self::Event {
                    subscription_id,
                    event: Box::new(event),
                })
            }
            "EOSE" => Ok(Self::Eose {
                subscription_id: string_at(&parts, 1)?,
            }),
            "CLOSED" => Ok(Self::Closed {
                subscription_id: string_at(&parts, 1)?,
                message: string_at(&parts, 2).unwrap_or_default(),
            }),
            "NOTICE" => Ok(Self::Notice(string_at(&parts, 1).unwrap_or_default())),
            other => Ok(Self::Other(other.to_string())),
        }
    }

    pub fn to_json(&self) -> Result<String, ProtocolError> {
        let value = match self {
            Self::Event {
                subscription_id,
                event,
            } => json!(["EVENT", subscription_id, event]),
            Self::Eose { subscription_id } => json!(["EOSE", subscription_id]),
            Self::Closed {
                subscription_id,
                message,
            } => json!(["CLOSED", subscription_id, message]),
            Self::Notice(message) => json!(["NOTICE", message]),
            Self::Other(kind) => json!([kind]),
        };
        Ok(serde_json::to_string(&value)?)
    }
}

fn as_array(text: &str) -> Result<Vec<Value>, ProtocolError> {
    match serde_json::from_str::<Value>(text)? {
        Value::Array(parts) => Ok(parts),
        _ => Err(ProtocolError::InvalidMessage(format!(
            "expected JSON array, got '{}'",
            text
        ))),
    }
}

fn message_type(parts: &[Value]) -> Result<&str, ProtocolError> {
    parts
        .first()
        .and_then(Value::as_str)
        .ok_or_else(|| ProtocolError::InvalidMessage("missing message type".into()))
}

fn string_at(parts: &[Value], index: usize) -> Result<String, ProtocolError> {
    parts
        .get(index)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ProtocolError::InvalidMessage(format!("missing string at index {}", index)))
}
