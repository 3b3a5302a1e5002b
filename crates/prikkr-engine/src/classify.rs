//! Per-participant slot classification.
//!
//! Timed slots are binary: any busy overlap makes the slot busy. The
//! all-day pseudo-slot is ternary, graded by how much of the day window the
//! participant's merged busy intervals cover. Both paths, and the segment
//! partitioner used for gradient rendering, go through the one overlap
//! primitive in [`crate::interval`].

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::grid::{slot_window, DayWindow, SlotDuration, SlotLabel};
use crate::interval::{merge_intervals, BusyInterval};

/// A day at or above this free ratio counts as fully free. Calendar feeds
/// round to whole minutes, so anything this close to 1.0 is noise.
pub const FREE_RATIO_FULL: f64 = 0.999;

/// A day at or above this free ratio counts as mostly free ("Partial").
pub const FREE_RATIO_PARTIAL: f64 = 0.8;

/// Classification of one slot for one participant.
///
/// `Partial` only ever applies to the all-day pseudo-slot. Ordered from
/// free to busy; adding busy intervals can only move a classification
/// rightward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SlotStatus {
    Free,
    Partial,
    Busy,
}

/// A fraction of a slot's span with a uniform status, for rendering
/// partial-busy gradients. `from` and `to` are in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlotSegment {
    pub from: f64,
    pub to: f64,
    pub status: SlotStatus,
}

/// Classify a timed slot: busy iff any busy interval overlaps the half-open
/// slot window.
pub fn classify_slot(
    slot_start: DateTime<Utc>,
    slot_end: DateTime<Utc>,
    busy: &[BusyInterval],
) -> SlotStatus {
    if busy.iter().any(|b| b.overlaps(slot_start, slot_end)) {
        SlotStatus::Busy
    } else {
        SlotStatus::Free
    }
}

/// Classify a whole day by free ratio over the day window.
///
/// Busy intervals are merged before summing so overlapping blocks never
/// double-count minutes. A ratio of at least [`FREE_RATIO_FULL`] is `Free`,
/// at least [`FREE_RATIO_PARTIAL`] is `Partial`, anything lower is `Busy`.
///
/// # Errors
/// Returns [`crate::error::EngineError::LocalTime`] when the day window
/// cannot be resolved in the zone.
pub fn classify_day(
    date: NaiveDate,
    busy: &[BusyInterval],
    window: DayWindow,
    tz: Tz,
) -> Result<SlotStatus> {
    let (day_start, day_end) =
        slot_window(date, SlotLabel::AllDay, SlotDuration::Daily, window, tz)?;
    let total_minutes = (day_end - day_start).num_minutes();
    if total_minutes <= 0 {
        return Ok(SlotStatus::Free);
    }

    let busy_minutes: i64 = merge_intervals(busy)
        .iter()
        .map(|b| b.clamped_minutes(day_start, day_end))
        .sum();

    let free_ratio = 1.0 - busy_minutes as f64 / total_minutes as f64;
    Ok(if free_ratio >= FREE_RATIO_FULL {
        SlotStatus::Free
    } else if free_ratio >= FREE_RATIO_PARTIAL {
        SlotStatus::Partial
    } else {
        SlotStatus::Busy
    })
}

/// Partition a slot's span into alternating free/busy fractions, in
/// ascending order.
///
/// Busy intervals are merged first, so segments never overlap and statuses
/// strictly alternate. An empty busy list yields a single free segment
/// covering the whole slot; a degenerate window yields nothing.
pub fn slot_busy_segments(
    slot_start: DateTime<Utc>,
    slot_end: DateTime<Utc>,
    busy: &[BusyInterval],
) -> Vec<SlotSegment> {
    if slot_end <= slot_start {
        return Vec::new();
    }
    let total_seconds = (slot_end - slot_start).num_seconds() as f64;

    let mut segments = Vec::new();
    let mut cursor = 0.0;

    for block in merge_intervals(busy) {
        if !block.overlaps(slot_start, slot_end) {
            continue;
        }
        let from = (block.start.max(slot_start) - slot_start).num_seconds() as f64 / total_seconds;
        let to = (block.end.min(slot_end) - slot_start).num_seconds() as f64 / total_seconds;
        if from > cursor {
            segments.push(SlotSegment {
                from: cursor,
                to: from,
                status: SlotStatus::Free,
            });
        }
        segments.push(SlotSegment {
            from,
            to,
            status: SlotStatus::Busy,
        });
        cursor = to;
    }

    if cursor < 1.0 {
        segments.push(SlotSegment {
            from: cursor,
            to: 1.0,
            status: SlotStatus::Free,
        });
    }

    segments
}
