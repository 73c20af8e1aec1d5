//! Core type definitions for kbsync.
//!
//! This crate defines the plain data shared by the capture pipeline, the
//! transport and every receiving client:
//! - Addresses, host ids, type ordinals, ticks and snapshot identifiers
//! - Canonical event payloads (the unit of replication)
//! - Serialized type descriptors and local type declarations
//! - Decompiler per-function user state
//!
//! Behaviour (classification, diffing, sequencing) lives in
//! `kbsync-capture`, not here.

pub mod decompiler;
mod event;
mod ids;
mod type_desc;

pub use event::{
    EventKind, EventPayload, MemberRepr, OperandFormat, SegmentInfo, SegmentRegisterRange,
    SequencedEvent, TypeTarget,
};
pub use ids::{Address, HostId, Ordinal, SnapshotId, Tick};
pub use type_desc::{
    hex_bytes, DeclarationSnapshot, ParsedType, SerializedType, TypeDeclaration, TypeToken,
};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid UUID: {0}")]
    InvalidUuid(#[from] uuid::Error),
}

impl SequencedEvent {
    /// Serializes the event to its JSON wire form.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parses an event from its JSON wire form.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
