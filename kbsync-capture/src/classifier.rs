//! Notification classification.
//!
//! Decides, for every raw notification, which path produces its events.
//! Classification reads host state but never builds payloads; that is the
//! synthesizer's job.

use crate::config::{CaptureConfig, ACTION_MAKE_CODE, ACTION_MAKE_UNKNOWN};
use crate::host::{HostDatabase, HostOperandFormat, ItemState};
use crate::notification::Notification;
use kbsync_types::{Address, EventPayload};
use std::fmt;
use tracing::debug;

/// Why a notification produced no event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuppressReason {
    /// A structure, member or enumeration rename, already reported by its
    /// dedicated notification.
    SpecificRename,
    /// The operand has no representation worth replicating.
    PlainOperand,
    /// Decompiler synchronization is disabled.
    DecompilerDisabled,
    /// A UI action nobody tracks.
    UntrackedAction,
    /// An action finished without a matching start.
    NoPendingAction,
    /// A tracked action finished without changing the item.
    ActionHadNoEffect,
}

impl fmt::Display for SuppressReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            SuppressReason::SpecificRename => "covered by a specific rename",
            SuppressReason::PlainOperand => "plain operand",
            SuppressReason::DecompilerDisabled => "decompiler sync disabled",
            SuppressReason::UntrackedAction => "untracked action",
            SuppressReason::NoPendingAction => "no pending action",
            SuppressReason::ActionHadNoEffect => "action had no effect",
        };
        f.write_str(reason)
    }
}

/// A tracked UI action waiting for its outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAction {
    pub name: String,
    pub ea: Address,
}

impl PendingAction {
    /// The event describing the action's outcome.
    pub fn into_payload(self) -> Option<EventPayload> {
        match self.name.as_str() {
            ACTION_MAKE_CODE => Some(EventPayload::CodeDefined { ea: self.ea }),
            ACTION_MAKE_UNKNOWN => Some(EventPayload::Undefined { ea: self.ea }),
            _ => None,
        }
    }

    fn took_effect(&self, host: &dyn HostDatabase) -> bool {
        let state = host.item_state(self.ea);
        match self.name.as_str() {
            ACTION_MAKE_CODE => state == ItemState::Code,
            ACTION_MAKE_UNKNOWN => state == ItemState::Unknown,
            _ => false,
        }
    }
}

/// The path a notification takes through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Exactly one event, synthesized from the notification and host state.
    Direct,
    /// Diff the whole local type library against the cache.
    TypeLibraryDiff,
    /// Diff the decompiler user state of the function containing the address.
    FunctionPrinted(Address),
    /// A tracked action started; nothing to emit yet.
    ActionPending,
    /// A tracked action finished and changed the item.
    ActionCompleted(PendingAction),
    Suppressed(SuppressReason),
    /// Kinds the pipeline does not replicate.
    Unsupported,
}

/// Classifies notifications. Holds the stack of tracked UI actions, so it
/// lives as long as the session.
#[derive(Debug)]
pub struct NotificationClassifier {
    config: CaptureConfig,
    pending: Vec<PendingAction>,
}

impl NotificationClassifier {
    pub fn new(config: &CaptureConfig) -> Self {
        Self {
            config: config.clone(),
            pending: Vec::new(),
        }
    }

    /// Number of started actions still waiting for their outcome.
    pub fn pending_actions(&self) -> usize {
        self.pending.len()
    }

    pub fn classify(&mut self, notification: &Notification, host: &dyn HostDatabase) -> Classification {
        use Notification as N;
        match notification {
            N::LocalTypesChanged => Classification::TypeLibraryDiff,

            N::OperandTypeChanged { ea, operand } => {
                if host.operand_format(*ea, *operand) == HostOperandFormat::Other {
                    Classification::Suppressed(SuppressReason::PlainOperand)
                } else {
                    Classification::Direct
                }
            }

            N::Renamed { ea, .. } => {
                if host.entity_kind(*ea).has_specific_rename() {
                    Classification::Suppressed(SuppressReason::SpecificRename)
                } else {
                    Classification::Direct
                }
            }

            N::FunctionPrinted { ea } => {
                if self.config.sync_decompiler {
                    Classification::FunctionPrinted(*ea)
                } else {
                    Classification::Suppressed(SuppressReason::DecompilerDisabled)
                }
            }

            N::ActionStarting { name, ea } => {
                if self.config.tracks_action(name) {
                    self.pending.push(PendingAction { name: name.clone(), ea: *ea });
                    Classification::ActionPending
                } else {
                    Classification::Suppressed(SuppressReason::UntrackedAction)
                }
            }

            N::ActionFinished => match self.pending.pop() {
                None => Classification::Suppressed(SuppressReason::NoPendingAction),
                Some(action) if action.took_effect(host) => Classification::ActionCompleted(action),
                Some(action) => {
                    debug!("Action {} at {} left the item unchanged", action.name, action.ea);
                    Classification::Suppressed(SuppressReason::ActionHadNoEffect)
                }
            },

            N::OperandTypeInfoChanged { .. }
            | N::StructAlignChanged { .. }
            | N::AllSegmentsMoved
            | N::SegmentRegisterDeleted { .. }
            | N::FunctionNoReturnChanged { .. }
            | N::CalleeAddressChanged { .. }
            | N::ItemColorChanged { .. }
            | N::AutoAnalysisEmpty => Classification::Unsupported,

            _ => Classification::Direct,
        }
    }
}
