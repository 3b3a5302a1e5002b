//! Cross-participant aggregation: heat-map, ranking, best dates.
//!
//! Combines every participant's selections into per-slot counts and
//! percentages, with an explicit total order on the ranked output so that
//! identical input always produces byte-identical results.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::grid::SlotLabel;
use crate::response::ParticipantResponse;

/// Per-date, per-slot count of available participants.
pub type Heatmap = BTreeMap<NaiveDate, BTreeMap<SlotLabel, u32>>;

/// One heat-map cell, flattened for ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedSlot {
    pub date: NaiveDate,
    pub label: SlotLabel,
    pub percent: u8,
}

/// The aggregated availability picture for an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aggregate {
    pub heatmap: Heatmap,
    /// Participants with at least one non-empty selection. Percentages are
    /// relative to engaged participants, not all invitees.
    pub total: u32,
    /// All heat-map cells, percent descending, ties broken by date then
    /// slot ascending.
    pub ranked: Vec<RankedSlot>,
}

/// A date surfaced by [`top_dates`]: its best percentage and the slot(s)
/// achieving it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateHighlight {
    pub date: NaiveDate,
    pub percent: u8,
    pub labels: Vec<SlotLabel>,
}

/// Aggregate all responses into a heat-map and a deterministically ranked
/// slot list.
///
/// Empty input is not an error: `total` is 0, every percentage is 0, and
/// the ranked list is empty.
pub fn aggregate(responses: &[ParticipantResponse]) -> Aggregate {
    let total = responses
        .iter()
        .filter(|r| r.has_any_selection())
        .count() as u32;

    let mut heatmap = Heatmap::new();
    for response in responses {
        for (date, labels) in &response.selections {
            for &label in labels {
                *heatmap
                    .entry(*date)
                    .or_default()
                    .entry(label)
                    .or_insert(0) += 1;
            }
        }
    }

    let mut ranked: Vec<RankedSlot> = heatmap
        .iter()
        .flat_map(|(&date, slots)| {
            slots.iter().map(move |(&label, &count)| RankedSlot {
                date,
                label,
                percent: percent_of(count, total),
            })
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.percent
            .cmp(&a.percent)
            .then(a.date.cmp(&b.date))
            .then(a.label.cmp(&b.label))
    });

    Aggregate {
        heatmap,
        total,
        ranked,
    }
}

/// Percentage of engaged participants, rounded to the nearest integer.
pub fn percent_of(count: u32, total: u32) -> u8 {
    if total == 0 {
        return 0;
    }
    (count as f64 / total as f64 * 100.0).round() as u8
}

/// The `n` best dates: each date scored by its maximum percentage, ordered
/// by score descending (date ascending on ties), carrying only the slot(s)
/// that achieve the date's maximum.
pub fn top_dates(aggregate: &Aggregate, n: usize) -> Vec<DateHighlight> {
    let mut by_date: BTreeMap<NaiveDate, DateHighlight> = BTreeMap::new();

    // `ranked` is percent-descending, so the first slot seen for a date
    // carries that date's maximum; later slots join only on an exact tie.
    for slot in &aggregate.ranked {
        let entry = by_date.entry(slot.date).or_insert_with(|| DateHighlight {
            date: slot.date,
            percent: slot.percent,
            labels: Vec::new(),
        });
        if slot.percent == entry.percent {
            entry.labels.push(slot.label);
        }
    }

    let mut highlights: Vec<DateHighlight> = by_date.into_values().collect();
    highlights.sort_by(|a, b| b.percent.cmp(&a.percent).then(a.date.cmp(&b.date)));
    highlights.truncate(n);
    highlights
}
