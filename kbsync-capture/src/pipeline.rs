//! The capture session: one notification in, zero or more sequenced events
//! out.

use crate::cache::EntitySnapshotCache;
use crate::classifier::{Classification, NotificationClassifier};
use crate::config::CaptureConfig;
use crate::decompiler::diff_function_state;
use crate::error::CaptureResult;
use crate::gate::EmissionGate;
use crate::hierarchy::{Snapshot, TickSource};
use crate::host::HostDatabase;
use crate::notification::Notification;
use crate::sequencer::TickSequencer;
use crate::synthesizer::EventSynthesizer;
use crate::transport::EventTransport;
use crate::type_diff::{diff_local_types, prime_type_cache, TypeChange};
use crate::type_parser::{OrdinalRefParser, TypeParser};
use kbsync_types::{EventPayload, SequencedEvent, Tick};
use tracing::{debug, info, warn};

/// What became of one notification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Events handed to the transport.
    pub emitted: usize,
    /// Notifications or events withheld on purpose (classification or gate).
    pub suppressed: usize,
    /// Unsupported notifications and events with unresolvable references.
    pub dropped: usize,
    /// Events lost to sequencing or transport errors.
    pub failed: usize,
}

impl DispatchReport {
    /// Returns true if nothing was emitted, withheld or lost.
    pub fn is_empty(&self) -> bool {
        *self == DispatchReport::default()
    }
}

impl From<TypeChange> for EventPayload {
    fn from(change: TypeChange) -> Self {
        match change {
            TypeChange::New(declaration) => EventPayload::LocalTypeCreated {
                declaration: declaration.declaration,
            },
            TypeChange::Modified { previous, current, .. } => {
                EventPayload::LocalTypeModified { previous, current }
            }
            TypeChange::Deleted { previous, .. } => EventPayload::LocalTypeDeleted { previous },
        }
    }
}

/// Capture state of one client for one snapshot.
///
/// All methods take `&mut self` and run to completion on the caller's
/// thread. A host that delivers notifications from several threads wraps
/// the session in a single mutex.
pub struct CaptureSession {
    config: CaptureConfig,
    cache: EntitySnapshotCache,
    classifier: NotificationClassifier,
    gate: EmissionGate,
    sequencer: TickSequencer,
    snapshot: Snapshot,
    parser: Box<dyn TypeParser>,
    transport: Box<dyn EventTransport>,
}

impl CaptureSession {
    /// Creates a session with the built-in type parser.
    pub fn new(
        config: CaptureConfig,
        snapshot: Snapshot,
        transport: Box<dyn EventTransport>,
    ) -> CaptureResult<Self> {
        Self::with_parser(config, snapshot, transport, Box::new(OrdinalRefParser))
    }

    /// Creates a session with a host-specific type parser.
    pub fn with_parser(
        config: CaptureConfig,
        snapshot: Snapshot,
        transport: Box<dyn EventTransport>,
        parser: Box<dyn TypeParser>,
    ) -> CaptureResult<Self> {
        config.validate()?;
        info!("Capture session started for snapshot {} at tick {}", snapshot.id, snapshot.tick);
        Ok(Self {
            classifier: NotificationClassifier::new(&config),
            gate: EmissionGate::new(config.suppress_during_auto_analysis),
            sequencer: TickSequencer::new(),
            cache: EntitySnapshotCache::new(),
            config,
            snapshot,
            parser,
            transport,
        })
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    pub fn cache(&self) -> &EntitySnapshotCache {
        &self.cache
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Last tick issued or observed.
    pub fn current_tick(&self) -> Tick {
        self.snapshot.current_tick()
    }

    /// Snapshots the host's type library into the cache without emitting.
    pub fn prime(&mut self, host: &dyn HostDatabase) -> usize {
        prime_type_cache(host, self.parser.as_ref(), &mut self.cache)
    }

    /// Handles one host notification.
    ///
    /// Never fails: every problem is logged and counted in the report.
    pub fn on_notification(&mut self, host: &dyn HostDatabase, notification: Notification) -> DispatchReport {
        let mut report = DispatchReport::default();
        debug!("Notification {}", notification.name());

        let payloads = match self.classifier.classify(&notification, host) {
            Classification::Direct => {
                match EventSynthesizer::new(host, self.parser.as_ref()).synthesize(&notification) {
                    Ok(payload) => vec![payload],
                    Err(e) => {
                        warn!("Dropping {}: {}", notification.name(), e);
                        report.dropped += 1;
                        return report;
                    }
                }
            }
            Classification::TypeLibraryDiff => diff_local_types(
                host,
                self.parser.as_ref(),
                &mut self.cache,
                self.config.emit_confirmed_type_deletions,
            )
            .into_iter()
            .map(EventPayload::from)
            .collect(),
            Classification::FunctionPrinted(ea) => {
                match diff_function_state(host, self.parser.as_ref(), &mut self.cache, ea) {
                    Ok(payloads) => payloads,
                    Err(e) => {
                        warn!("Dropping decompiler state at {}: {}", ea, e);
                        report.dropped += 1;
                        return report;
                    }
                }
            }
            Classification::ActionPending => Vec::new(),
            Classification::ActionCompleted(action) => action.into_payload().into_iter().collect(),
            Classification::Suppressed(reason) => {
                debug!("Suppressed {}: {}", notification.name(), reason);
                report.suppressed += 1;
                return report;
            }
            Classification::Unsupported => {
                debug!("Unsupported notification {}", notification.name());
                report.dropped += 1;
                return report;
            }
        };

        let state = host.auto_analysis_state();
        for payload in payloads {
            if !self.gate.should_emit(&payload, state) {
                report.suppressed += 1;
                continue;
            }
            let kind = payload.kind();
            match self.sequencer.emit(&mut self.snapshot, self.transport.as_ref(), payload) {
                Ok(_) => report.emitted += 1,
                Err(e) => {
                    warn!("Failed to emit {}: {}", kind, e);
                    report.failed += 1;
                }
            }
        }
        report
    }

    /// Records an event received from the relay, after it has been applied
    /// to `host`.
    ///
    /// The tick counter moves past the event's tick. For cache-diffed kinds
    /// (local types and decompiler sub-state) the cache is refreshed so the
    /// local echo of the change is not sent back. Direct kinds keep no cached
    /// state: the host must mute its notifications while applying them, or
    /// their echo is emitted again. Events of another snapshot are ignored.
    pub fn absorb_remote(&mut self, host: &dyn HostDatabase, event: &SequencedEvent) -> bool {
        if event.snapshot != self.snapshot.id {
            warn!("Ignoring event for snapshot {} in session {}", event.snapshot, self.snapshot.id);
            return false;
        }
        self.snapshot.observe_remote(event.tick);

        match &event.payload {
            EventPayload::UserLabelsChanged { function, labels } => {
                self.cache.function_entry_mut(*function).labels = labels.clone();
            }
            EventPayload::UserCommentsChanged { function, comments } => {
                self.cache.function_entry_mut(*function).comments = comments.clone();
            }
            EventPayload::UserItemFlagsChanged { function, flags } => {
                self.cache.function_entry_mut(*function).item_flags = flags.clone();
            }
            EventPayload::UserLvarSettingsChanged { function, settings } => {
                self.cache.function_entry_mut(*function).lvar_settings = settings.clone();
            }
            EventPayload::UserNumberFormatsChanged { function, formats } => {
                self.cache.function_entry_mut(*function).number_formats = formats.clone();
            }
            EventPayload::LocalTypeCreated { .. }
            | EventPayload::LocalTypeModified { .. }
            | EventPayload::LocalTypeDeleted { .. } => {
                self.prime(host);
            }
            _ => {}
        }
        debug!("Absorbed remote {} at tick {}", event.kind(), event.tick);
        true
    }
}
