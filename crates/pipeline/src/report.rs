//! Run identifiers and per-run timing reports

use std::fmt;
use std::time::Duration;

use serde::Serialize;
use uuid::Uuid;

/// Unique identifier for one pipeline run
///
/// A RunId is a wrapper around a UUID v4. It tags the log lines of a run
/// and the [`RunReport`] it produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RunId(Uuid);

impl RunId {
    /// Create a new random RunId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the raw bytes of this RunId
    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Time spent in one stage action
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageTiming {
    /// Stage name
    pub name: String,
    /// Wall time of the action
    pub elapsed: Duration,
}

/// What a completed run executed, in order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Identifier of the run
    pub run_id: RunId,
    /// One entry per executed stage, root first
    pub stages: Vec<StageTiming>,
    /// Wall time of the whole run
    pub elapsed: Duration,
}

impl RunReport {
    /// Names of the executed stages, in execution order
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name.as_str()).collect()
    }
}
