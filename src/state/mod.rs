//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `RelayOutcome`: The terminal result of visiting one relay (fetched, unreachable, timed out, ...)

mod relay_state;

// Re-export main types
pub use relay_state::RelayOutcome;
