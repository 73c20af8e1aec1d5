//! Emission gate.

use crate::host::AutoAnalysisState;
use kbsync_types::EventPayload;
use tracing::debug;

/// Decides whether a synthesized event may leave the client.
///
/// While the host's auto-analysis runs, the database churns with changes
/// every client derives on its own; those are discarded, not buffered.
#[derive(Debug, Clone, Copy)]
pub struct EmissionGate {
    suppress_during_auto_analysis: bool,
}

impl EmissionGate {
    pub fn new(suppress_during_auto_analysis: bool) -> Self {
        Self { suppress_during_auto_analysis }
    }

    pub fn should_emit(&self, payload: &EventPayload, state: AutoAnalysisState) -> bool {
        if self.suppress_during_auto_analysis && state == AutoAnalysisState::Running {
            debug!("Auto-analysis running, discarding {}", payload.kind());
            return false;
        }
        true
    }
}

impl Default for EmissionGate {
    fn default() -> Self {
        Self::new(true)
    }
}
