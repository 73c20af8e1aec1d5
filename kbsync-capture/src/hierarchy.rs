//! Project, binary and snapshot records.
//!
//! Databases are grouped into projects and binaries; a snapshot is one
//! revision of a database and owns the tick counter that orders its events.

use chrono::{DateTime, Utc};
use kbsync_types::{SnapshotId, Tick};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Issues the ticks of one snapshot.
pub trait TickSource: Send {
    /// The snapshot whose order these ticks define.
    fn snapshot_id(&self) -> SnapshotId;

    /// Last tick issued or observed.
    fn current_tick(&self) -> Tick;

    /// Advances and returns the new tick.
    fn advance_tick(&mut self) -> Tick;
}

/// A research topic grouping several binaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    pub date: DateTime<Utc>,
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), date: Utc::now() }
    }
}

/// One input file, possibly analysed in several snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binary {
    pub project_name: String,
    pub name: String,
    /// Hex digest of the input file.
    pub hash: String,
    /// Path of the input file.
    pub file: String,
    /// Input file format as reported by the host.
    pub file_type: String,
    pub date: DateTime<Utc>,
}

/// A revision of a database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub id: SnapshotId,
    pub project_name: String,
    pub binary: String,
    pub name: String,
    pub date: DateTime<Utc>,
    /// Last tick issued or observed in this snapshot.
    #[serde(default)]
    pub tick: Tick,
}

impl Snapshot {
    /// Creates a snapshot that has not recorded any event.
    pub fn new(project_name: impl Into<String>, binary: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: SnapshotId::new(),
            project_name: project_name.into(),
            binary: binary.into(),
            name: name.into(),
            date: Utc::now(),
            tick: Tick::ZERO,
        }
    }

    /// Lifts the counter to `tick` if it is ahead, so the next local tick
    /// follows every event already seen. Returns true if the counter moved.
    pub fn observe_remote(&mut self, tick: Tick) -> bool {
        if tick > self.tick {
            debug!("Snapshot {} counter lifted from {} to {}", self.id, self.tick, tick);
            self.tick = tick;
            true
        } else {
            false
        }
    }
}

impl TickSource for Snapshot {
    fn snapshot_id(&self) -> SnapshotId {
        self.id
    }

    fn current_tick(&self) -> Tick {
        self.tick
    }

    fn advance_tick(&mut self) -> Tick {
        self.tick = self.tick.next();
        self.tick
    }
}
