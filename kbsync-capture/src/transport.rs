//! Outbound transport abstraction.
//!
//! The pipeline only hands sequenced events over. Delivery, sessions and
//! retries belong to the transport; `send` must not block.

use crate::error::{CaptureError, CaptureResult};
use kbsync_types::SequencedEvent;
use tokio::sync::mpsc;

/// Accepts sequenced events for delivery to the relay.
pub trait EventTransport: Send {
    /// Fire-and-forget. Events are delivered in the order they were sent.
    fn send(&self, event: SequencedEvent) -> CaptureResult<()>;
}

/// Transport backed by an unbounded tokio channel. The receiving half is
/// drained by whatever task talks to the relay.
#[derive(Debug, Clone)]
pub struct ChannelTransport {
    tx: mpsc::UnboundedSender<SequencedEvent>,
}

impl ChannelTransport {
    /// Creates a transport and the receiver its events arrive on.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<SequencedEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Whether the receiving half was dropped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl EventTransport for ChannelTransport {
    fn send(&self, event: SequencedEvent) -> CaptureResult<()> {
        self.tx.send(event).map_err(|_| CaptureError::ChannelClosed)
    }
}

/// A recording transport for testing.
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    /// Records every event it is given. Clones share the same record, so a
    /// test can keep one handle while the session owns another.
    #[derive(Debug, Clone, Default)]
    pub struct RecordingTransport {
        sent: Arc<Mutex<Vec<SequencedEvent>>>,
        failing: Arc<AtomicBool>,
    }

    impl RecordingTransport {
        /// Creates an empty recording transport.
        pub fn new() -> Self {
            Self::default()
        }

        /// Makes subsequent sends fail (or succeed again).
        pub fn set_failing(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }

        /// All events sent so far, in order.
        pub fn events(&self) -> Vec<SequencedEvent> {
            self.sent.lock().unwrap_or_else(|e| e.into_inner()).clone()
        }

        /// Removes and returns all events sent so far.
        pub fn take(&self) -> Vec<SequencedEvent> {
            std::mem::take(&mut *self.sent.lock().unwrap_or_else(|e| e.into_inner()))
        }

        pub fn len(&self) -> usize {
            self.sent.lock().unwrap_or_else(|e| e.into_inner()).len()
        }

        pub fn is_empty(&self) -> bool {
            self.len() == 0
        }
    }

    impl EventTransport for RecordingTransport {
        fn send(&self, event: SequencedEvent) -> CaptureResult<()> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(CaptureError::Transport("relay unreachable".into()));
            }
            self.sent.lock().unwrap_or_else(|e| e.into_inner()).push(event);
            Ok(())
        }
    }
}
