//! NIP-19 identifier decoding
//!
//! The root of a thread is given in its public bech32 form. Two encodings are
//! accepted:
//!
//! - `note1…`: the bare 32-byte event id
//! - `nevent1…`: a TLV list holding the id (type 0) and optional relay
//!   URLs (type 1) where the event can be found
//!
//! Any other prefix is rejected. Decoding happens once, before any relay is
//! contacted, so every failure here is fatal for the crawl.

use crate::protocol::EventId;
use crate::ProtocolError;
use bech32::{Bech32, Hrp};

const NOTE_HRP: Hrp = Hrp::parse_unchecked("note");

const TLV_SPECIAL: u8 = 0;
const TLV_RELAY: u8 = 1;

/// A decoded root identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootPointer {
    /// The event id in hex form
    pub id: EventId,

    /// Relay hints embedded in the identifier (`nevent` only), trimmed
    pub relays: Vec<String>,
}

/// Decodes a `note1…` or `nevent1…` identifier
///
/// # Arguments
///
/// * `input` - The bech32 identifier; surrounding whitespace is ignored
///
/// # Returns
///
/// * `Ok(RootPointer)` - The event id plus any relay hints
/// * `Err(ProtocolError)` - Bad checksum, unknown prefix, or malformed payload
///
/// # Example
///
/// ```
/// use dumpthread::protocol::{decode_root_id, encode_note, EventId};
///
/// let id = EventId::from_bytes(&[0x11; 32]).unwrap();
/// let pointer = decode_root_id(&encode_note(&id)).unwrap();
/// assert_eq!(pointer.id, id);
/// ```
pub fn decode_root_id(input: &str) -> Result<RootPointer, ProtocolError> {
    let input = input.trim();
    let (hrp, data) = bech32::decode(input).map_err(|e| ProtocolError::Bech32 {
        input: input.to_string(),
        message: e.to_string(),
    })?;

    match hrp.to_lowercase().as_str() {
        "note" => Ok(RootPointer {
            id: EventId::from_bytes(&data)?,
            relays: Vec::new(),
        }),
        "nevent" => decode_nevent(input, &data),
        other => Err(ProtocolError::UnsupportedPrefix(other.to_string())),
    }
}

/// Encodes an event id as `note1…`
pub fn encode_note(id: &EventId) -> String {
    // Encoding 32 bytes under a fixed valid HRP cannot fail
    bech32::encode::<Bech32>(NOTE_HRP, &id.to_bytes()).unwrap_or_default()
}

fn decode_nevent(input: &str, data: &[u8]) -> Result<RootPointer, ProtocolError> {
    let mut id = None;
    let mut relays = Vec::new();
    let mut rest = data;

    while !rest.is_empty() {
        if rest.len() < 2 {
            return Err(ProtocolError::MalformedTlv(input.to_string()));
        }
        let (kind, len) = (rest[0], rest[1] as usize);
        let value = rest
            .get(2..2 + len)
            .ok_or_else(|| ProtocolError::MalformedTlv(input.to_string()))?;

        match kind {
            TLV_SPECIAL => id = Some(EventId::from_bytes(value)?),
            TLV_RELAY => {
                let relay = String::from_utf8_lossy(value).trim().to_string();
                if !relay.is_empty() {
                    relays.push(relay);
                }
            }
            // author, kind and future types are irrelevant to the crawl
            _ => {}
        }

        rest = &rest[2 + len..];
    }

    let id = id.ok_or_else(|| ProtocolError::MissingEventId(input.to_string()))?;
    Ok(RootPointer { id, relays })
}
