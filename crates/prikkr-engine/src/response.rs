//! Participant responses and roster maintenance.
//!
//! A response records which slots one participant is available for, keyed
//! by email. Responses come in two modes: `Sync` rows are rebuilt from
//! calendar data on every refresh, `Custom` rows were manually curated and
//! are frozen against automatic recomputation.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::grid::SlotLabel;

/// Per-date available slots. BTree ordering keeps every iteration over a
/// response deterministic.
pub type Selections = BTreeMap<NaiveDate, BTreeSet<SlotLabel>>;

/// How a response was produced, and whether auto-resync may overwrite it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseMode {
    /// Built from the participant's calendar; rebuilt on refresh.
    #[default]
    Sync,
    /// Manually curated; never overwritten by automatic recomputation.
    Custom,
}

/// One participant's answer for an event.
///
/// Round-trips the stored JSON shape. Legacy rows predate `mode` and
/// `updatedAt`; they deserialize as `Sync` at the Unix epoch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantResponse {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub selections: Selections,
    #[serde(default)]
    pub mode: ResponseMode,
    #[serde(default = "epoch", rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

fn epoch() -> DateTime<Utc> {
    DateTime::UNIX_EPOCH
}

impl ParticipantResponse {
    /// Whether the participant marked at least one slot available anywhere
    /// in the range. Only engaged responses count toward the aggregate
    /// denominator.
    pub fn has_any_selection(&self) -> bool {
        self.selections.values().any(|slots| !slots.is_empty())
    }
}

/// Insert or replace a response, last-write-wins keyed by case-insensitive
/// email.
///
/// A matching row keeps its canonical stored email casing; everything else
/// is taken from the incoming response.
pub fn upsert_response(responses: &mut Vec<ParticipantResponse>, incoming: ParticipantResponse) {
    match responses
        .iter_mut()
        .find(|r| r.email.eq_ignore_ascii_case(&incoming.email))
    {
        Some(existing) => {
            existing.name = incoming.name;
            existing.selections = incoming.selections;
            existing.mode = incoming.mode;
            existing.updated_at = incoming.updated_at;
        }
        None => responses.push(incoming),
    }
}

/// The calendar-resync write path: upsert a freshly computed `Sync` row
/// unless the participant's existing row is `Custom`.
///
/// Returns whether the roster was written. A `Custom` row is left exactly
/// as it was, including its timestamp.
pub fn apply_auto_sync(
    responses: &mut Vec<ParticipantResponse>,
    name: &str,
    email: &str,
    selections: Selections,
    now: DateTime<Utc>,
) -> bool {
    if let Some(existing) = responses
        .iter_mut()
        .find(|r| r.email.eq_ignore_ascii_case(email))
    {
        if existing.mode == ResponseMode::Custom {
            return false;
        }
        existing.name = name.to_string();
        existing.selections = selections;
        existing.mode = ResponseMode::Sync;
        existing.updated_at = now;
        return true;
    }

    responses.push(ParticipantResponse {
        name: name.to_string(),
        email: email.to_string(),
        selections,
        mode: ResponseMode::Sync,
        updated_at: now,
    });
    true
}
