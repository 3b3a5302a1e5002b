//! # prikkr-engine
//!
//! The availability-aggregation core of Prikkr, a group-scheduling app:
//! an event has a date range, a slot granularity, and an hours policy;
//! participants report busy intervals (calendar sync) or hand-picked slots;
//! the engine classifies per-participant availability and aggregates it
//! into a heat-map with a deterministically ranked list of best slots.
//!
//! Everything here is pure, synchronous computation over in-memory data.
//! Fetching busy intervals from calendar providers, persisting responses,
//! and rendering the heat-map are the host's job.
//!
//! ## Modules
//!
//! - [`interval`] — busy intervals, the canonical overlap test, interval merging
//! - [`grid`] — slot durations, hours policy, slot grid generation, date ranges
//! - [`classify`] — free/partial/busy classification per participant
//! - [`response`] — participant responses, roster upsert, custom-mode freeze
//! - [`sync`] — busy intervals → per-date slot selections
//! - [`aggregate`] — heat-map, ranking, best-date selection
//! - [`error`] — error types

pub mod aggregate;
pub mod classify;
pub mod error;
pub mod grid;
pub mod interval;
pub mod response;
pub mod sync;

pub use aggregate::{aggregate, top_dates, Aggregate, DateHighlight, Heatmap, RankedSlot};
pub use classify::{classify_day, classify_slot, slot_busy_segments, SlotSegment, SlotStatus};
pub use error::EngineError;
pub use grid::{
    generate_slots, parse_time_zone, slot_window, DateRange, DayWindow, EventMeta, SlotDuration,
    SlotLabel,
};
pub use interval::{merge_intervals, validate_intervals, BusyInterval};
pub use response::{
    apply_auto_sync, upsert_response, ParticipantResponse, ResponseMode, Selections,
};
pub use sync::build_selections;
