//! Nostr protocol module for dumpthread
//!
//! This module provides the small slice of the Nostr protocol the crawler needs:
//! the event model and its tags, subscription filters, NIP-01 relay messages and
//! NIP-19 identifier decoding.

mod event;
mod filter;
mod message;
mod nip19;

// Re-export main types
pub use event::{Event, EventId, Tag};
pub use filter::Filter;
pub use message::{ClientMessage, RelayMessage};
pub use nip19::{decode_root_id, encode_note, RootPointer};
