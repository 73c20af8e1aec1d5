//! Change capture and event synthesis for kbsync.
//!
//! Turns the host database's raw mutation notifications into a minimal,
//! canonical, ordered stream of replayable events.
//!
//! # Architecture
//!
//! Each notification flows through five stages:
//!
//! - **Classifier**: picks the path (direct synthesis, type library diff,
//!   decompiler diff, UI action tracking) or suppresses the notification
//! - **Snapshot cache**: remembers the last state of everything that can
//!   only be diffed (local types by ordinal, decompiler state by function)
//! - **Synthesizer**: reads host state and builds payloads, resolving host
//!   ids to names
//! - **Emission gate**: discards events while auto-analysis runs
//! - **Tick sequencer**: stamps strictly increasing ticks and hands events
//!   to the transport
//!
//! `CaptureSession` wires them together.
//!
//! # Example
//!
//! ```
//! use kbsync_capture::transport::mock::RecordingTransport;
//! use kbsync_capture::{CaptureConfig, CaptureSession, Snapshot};
//!
//! let transport = RecordingTransport::new();
//! let snapshot = Snapshot::new("firmware", "bootloader.bin", "initial");
//! let session = CaptureSession::new(
//!     CaptureConfig::default(),
//!     snapshot,
//!     Box::new(transport.clone()),
//! )
//! .unwrap();
//!
//! assert_eq!(session.current_tick().value(), 0);
//! assert!(transport.is_empty());
//! ```

pub mod cache;
pub mod classifier;
pub mod codec;
mod config;
pub mod decompiler;
mod error;
pub mod gate;
pub mod hierarchy;
pub mod host;
mod notification;
mod pipeline;
pub mod sequencer;
pub mod synthesizer;
pub mod transport;
pub mod type_diff;
pub mod type_parser;

pub use cache::{CachedEntity, CachedValue, EntityKey, EntitySnapshotCache, FunctionSyncEntry};
pub use classifier::{Classification, NotificationClassifier, PendingAction, SuppressReason};
pub use config::{CaptureConfig, ACTION_MAKE_CODE, ACTION_MAKE_UNKNOWN};
pub use error::{CaptureError, CaptureResult, TypeParseError};
pub use gate::EmissionGate;
pub use hierarchy::{Binary, Project, Snapshot, TickSource};
pub use host::{AutoAnalysisState, EntityKind, HostDatabase, ItemState};
pub use notification::Notification;
pub use pipeline::{CaptureSession, DispatchReport};
pub use sequencer::TickSequencer;
pub use synthesizer::EventSynthesizer;
pub use transport::{ChannelTransport, EventTransport};
pub use type_diff::TypeChange;
pub use type_parser::{OrdinalRefParser, TypeParser};
