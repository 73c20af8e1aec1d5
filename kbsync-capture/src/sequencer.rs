//! Tick sequencing.

use crate::error::{CaptureError, CaptureResult};
use crate::hierarchy::TickSource;
use crate::transport::EventTransport;
use kbsync_types::{EventPayload, SequencedEvent, Tick};
use tracing::debug;

/// Stamps events with strictly increasing ticks and hands them to the
/// transport in the order they were stamped.
#[derive(Debug, Default)]
pub struct TickSequencer {
    last_issued: Tick,
}

impl TickSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last tick this sequencer stamped.
    pub fn last_issued(&self) -> Tick {
        self.last_issued
    }

    /// Advances `source` and stamps `payload` with the new tick.
    ///
    /// A source that does not move past the last stamped tick is rejected
    /// and the payload is not stamped.
    pub fn stamp(
        &mut self,
        source: &mut dyn TickSource,
        payload: EventPayload,
    ) -> CaptureResult<SequencedEvent> {
        let issued = source.advance_tick();
        if issued <= self.last_issued {
            return Err(CaptureError::TickRegression { last: self.last_issued, issued });
        }
        self.last_issued = issued;
        Ok(SequencedEvent::new(source.snapshot_id(), issued, payload))
    }

    /// Stamps `payload` and sends it. Returns the tick it was stamped with.
    ///
    /// A transport failure still consumes the tick.
    pub fn emit(
        &mut self,
        source: &mut dyn TickSource,
        transport: &dyn EventTransport,
        payload: EventPayload,
    ) -> CaptureResult<Tick> {
        let event = self.stamp(source, payload)?;
        let tick = event.tick;
        debug!("Emitting {} at tick {}", event.kind(), tick);
        transport.send(event)?;
        Ok(tick)
    }
}
