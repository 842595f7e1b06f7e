/// Relay outcome definitions for tracking crawl progress
///
/// Every relay the crawler dispatches ends up in exactly one of these states.
use crate::relay::RelayError;
use std::fmt;

/// Represents the result of visiting one relay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelayOutcome {
    // ===== Success =====
    /// Both thread queries completed
    Fetched,

    // ===== Per-relay errors =====
    /// The connection could not be established (bad address, refused, TLS, DNS)
    Unreachable,

    /// The query budget expired before the relay answered
    TimedOut,

    /// The relay refused the subscription or broke the protocol mid-query
    Failed,

    // ===== Special =====
    /// The crawl was cancelled while this relay was in flight
    Cancelled,
}

impl RelayOutcome {
    /// Classifies a relay error
    pub fn from_error(error: &RelayError) -> Self {
        match error {
            RelayError::InvalidAddress { .. } | RelayError::Connect { .. } => Self::Unreachable,
            RelayError::Timeout { .. } => Self::TimedOut,
            RelayError::Transport { .. }
            | RelayError::SubscriptionClosed { .. }
            | RelayError::ConnectionClosed { .. }
            | RelayError::Protocol(_) => Self::Failed,
        }
    }

    /// Returns true if this is a per-relay error
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Unreachable | Self::TimedOut | Self::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fetched => "fetched",
            Self::Unreachable => "unreachable",
            Self::TimedOut => "timed_out",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for RelayOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
