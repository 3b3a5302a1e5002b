//! Busy intervals and the canonical overlap primitives.
//!
//! Every classifier in the crate funnels through [`BusyInterval::overlaps`],
//! so half-open boundary semantics are decided in exactly one place: an
//! interval ending at a window's start, or starting at its end, does not
//! touch the window.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// A half-open `[start, end)` span during which a participant is busy.
///
/// Produced by the calendar-fetch collaborator (provider free/busy queries)
/// or by manual input; immutable once constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusyInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl BusyInterval {
    /// Construct a validated interval.
    ///
    /// # Errors
    /// Returns [`EngineError::InvalidInterval`] when `end <= start`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if end <= start {
            return Err(EngineError::InvalidInterval { start, end });
        }
        Ok(Self { start, end })
    }

    /// Whether this interval intersects the half-open window `[window_start,
    /// window_end)`.
    pub fn overlaps(&self, window_start: DateTime<Utc>, window_end: DateTime<Utc>) -> bool {
        self.start < window_end && self.end > window_start
    }

    /// Minutes of this interval that fall inside the window; 0 when disjoint.
    pub fn clamped_minutes(&self, window_start: DateTime<Utc>, window_end: DateTime<Utc>) -> i64 {
        let start = self.start.max(window_start);
        let end = self.end.min(window_end);
        if end > start {
            (end - start).num_minutes()
        } else {
            0
        }
    }
}

/// Guard for interval lists that arrived through deserialization rather than
/// [`BusyInterval::new`].
///
/// # Errors
/// Returns [`EngineError::InvalidInterval`] for the first malformed entry.
pub fn validate_intervals(intervals: &[BusyInterval]) -> Result<()> {
    for interval in intervals {
        if interval.end <= interval.start {
            return Err(EngineError::InvalidInterval {
                start: interval.start,
                end: interval.end,
            });
        }
    }
    Ok(())
}

/// Merge overlapping or touching intervals into a sorted, non-overlapping
/// list.
///
/// Busy blocks from a single participant routinely overlap (two calendars,
/// double-booked meetings); summing their durations without merging first
/// double-counts minutes. Every duration summation in the crate runs on the
/// merged form.
pub fn merge_intervals(intervals: &[BusyInterval]) -> Vec<BusyInterval> {
    let mut sorted: Vec<BusyInterval> = intervals.to_vec();
    if sorted.is_empty() {
        return sorted;
    }

    // Sort by start time (then by end time for stability).
    sorted.sort_by_key(|i| (i.start, i.end));

    let mut merged: Vec<BusyInterval> = Vec::new();
    for interval in sorted {
        if let Some(last) = merged.last_mut() {
            if interval.start <= last.end {
                // Overlapping or adjacent -- extend the current block.
                last.end = last.end.max(interval.end);
                continue;
            }
        }
        merged.push(interval);
    }

    merged
}
