//! Error types for availability-engine operations.

use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    /// A busy interval whose end does not lie strictly after its start.
    /// Rejected outright so negative durations can never enter the math.
    #[error("Invalid busy interval: end {end} is not after start {start}")]
    InvalidInterval {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    /// A zero-minute slot duration would produce an infinite grid.
    #[error("Invalid slot duration: {0} minutes")]
    InvalidDuration(u32),

    /// The slot duration is wider than the whole day window, so the grid
    /// would be empty.
    #[error("Slot duration of {minutes} minutes exceeds the {window_minutes}-minute day window")]
    DurationExceedsWindow { minutes: u32, window_minutes: u32 },

    /// A slot label that is neither "All Day" nor a valid "HH:MM" time.
    #[error("Invalid slot label: {0}")]
    InvalidSlotLabel(String),

    #[error("Invalid time zone: {0}")]
    InvalidTimeZone(String),

    /// A civil datetime that cannot be resolved in the event's zone even
    /// after shifting across a DST gap.
    #[error("Unresolvable local time: {0}")]
    LocalTime(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
