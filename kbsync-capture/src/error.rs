//! Error types for the capture layer.

use kbsync_types::{HostId, Tick};
use thiserror::Error;

/// Result type for capture operations.
pub type CaptureResult<T> = Result<T, CaptureError>;

/// Errors that can occur while turning a notification into events.
///
/// None of these escape `CaptureSession::on_notification`; they are logged
/// and counted there.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// A host id or address could not be resolved to a name or record.
    #[error("unresolved reference: {0}")]
    UnresolvedReference(String),

    /// The notification is not turned into a single event.
    #[error("{0} does not synthesize directly")]
    NotDirect(&'static str),

    /// The tick source returned a value that does not follow the last one.
    #[error("tick regression: issued {issued} after {last}")]
    TickRegression { last: Tick, issued: Tick },

    /// The transport rejected the event.
    #[error("transport error: {0}")]
    Transport(String),

    /// Channel closed.
    #[error("channel closed")]
    ChannelClosed,

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// IO error (wire codec).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CaptureError {
    /// Shorthand for an unresolvable host id.
    pub(crate) fn unresolved(what: &str, id: HostId) -> Self {
        CaptureError::UnresolvedReference(format!("{what} {id}"))
    }
}

/// Errors raised by a `TypeParser`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeParseError {
    /// The descriptor ended in the middle of a token.
    #[error("descriptor truncated at byte {offset}")]
    Truncated { offset: usize },

    /// An ordinal reference does not name any local type.
    #[error("unknown ordinal reference {ordinal} at byte {offset}")]
    UnknownOrdinal { ordinal: u32, offset: usize },

    /// An encoded ordinal does not fit in 32 bits.
    #[error("ordinal overflow at byte {offset}")]
    Overflow { offset: usize },
}
