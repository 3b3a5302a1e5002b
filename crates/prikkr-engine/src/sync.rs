//! Building selections from calendar busy data.
//!
//! This is the sync half of the RSVP flow: given a participant's busy
//! intervals and the event configuration, compute which slots they are
//! free for on every date in the range. The result feeds
//! [`crate::response::apply_auto_sync`] on refresh and seeds the RSVP form
//! on first visit.

use std::collections::BTreeSet;

use crate::classify::{classify_day, classify_slot, SlotStatus};
use crate::error::Result;
use crate::grid::{generate_slots, slot_window, EventMeta, SlotLabel};
use crate::interval::{validate_intervals, BusyInterval};
use crate::response::Selections;

/// Compute the slots a participant is free for on every date in the range.
///
/// Timed slots are included when fully free. The all-day pseudo-slot is
/// included when the day is free or mostly free -- a participant whose only
/// availability is partial days still ends up with a non-empty selections
/// map, and so still counts as engaged in aggregation. Dates with no free
/// slots keep an (empty) entry, mirroring the stored shape.
///
/// # Errors
/// Rejects malformed busy intervals and invalid grid configuration; see
/// [`generate_slots`].
pub fn build_selections(busy: &[BusyInterval], meta: &EventMeta) -> Result<Selections> {
    validate_intervals(busy)?;

    let slots = generate_slots(meta.slot_duration, meta.extended_hours)?;
    let window = meta.day_window();

    let mut selections = Selections::new();
    for date in meta.range.days() {
        let mut free = BTreeSet::new();
        for &label in &slots {
            let available = match label {
                SlotLabel::AllDay => {
                    classify_day(date, busy, window, meta.time_zone)? != SlotStatus::Busy
                }
                SlotLabel::At(_) => {
                    let (start, end) =
                        slot_window(date, label, meta.slot_duration, window, meta.time_zone)?;
                    classify_slot(start, end, busy) == SlotStatus::Free
                }
            };
            if available {
                free.insert(label);
            }
        }
        selections.insert(date, free);
    }

    Ok(selections)
}
