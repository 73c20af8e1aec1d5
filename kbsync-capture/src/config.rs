//! Capture configuration.

use crate::error::{CaptureError, CaptureResult};
use serde::Deserialize;

/// UI action that turns bytes into code.
pub const ACTION_MAKE_CODE: &str = "MakeCode";
/// UI action that undefines an item.
pub const ACTION_MAKE_UNKNOWN: &str = "MakeUnknown";

/// Configuration for the capture pipeline.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Drop events while the host's auto-analysis is running.
    pub suppress_during_auto_analysis: bool,
    /// Diff decompiler user state when a function is printed.
    pub sync_decompiler: bool,
    /// Emit `LocalTypeDeleted` once a delete candidate stays unresolved
    /// for a second batch. Off by default: a re-delivered signal would then
    /// report a deletion the first signal already observed.
    pub emit_confirmed_type_deletions: bool,
    /// UI actions whose outcome is checked and propagated.
    pub tracked_actions: Vec<String>,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            suppress_during_auto_analysis: true,
            sync_decompiler: true,
            emit_confirmed_type_deletions: false,
            tracked_actions: vec![ACTION_MAKE_CODE.to_string(), ACTION_MAKE_UNKNOWN.to_string()],
        }
    }
}

impl CaptureConfig {
    /// Loads a configuration from JSON. Missing keys keep their defaults.
    pub fn from_json_str(json: &str) -> CaptureResult<Self> {
        let config: CaptureConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects actions the pipeline does not know how to confirm.
    pub fn validate(&self) -> CaptureResult<()> {
        for action in &self.tracked_actions {
            if action != ACTION_MAKE_CODE && action != ACTION_MAKE_UNKNOWN {
                return Err(CaptureError::Config(format!("unsupported tracked action: {action}")));
            }
        }
        Ok(())
    }

    /// Returns true if `action` should be tracked.
    pub fn tracks_action(&self, action: &str) -> bool {
        self.tracked_actions.iter().any(|a| a == action)
    }
}
