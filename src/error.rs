//! Session error types

use thiserror::Error;

use crate::sim::{ScheduledAction, SpawnKind};

/// Failures surfaced by the session controller
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    /// A spawn position was requested from an empty spawn set
    #[error("no {0} spawn points available")]
    EmptySpawnSet(SpawnKind),
    /// A delayed action was scheduled while the same action was still pending
    #[error("{0:?} is already scheduled")]
    SchedulingConflict(ScheduledAction),
    /// The maze has not been built yet (call `prepare_level` first)
    #[error("level has not been prepared")]
    LevelNotPrepared,
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
    #[error("invalid maze layout: {0}")]
    InvalidLayout(String),
    #[error("failed to read settings from {path}: {message}")]
    SettingsIo { path: String, message: String },
}

pub type SessionResult<T> = Result<T, SessionError>;
