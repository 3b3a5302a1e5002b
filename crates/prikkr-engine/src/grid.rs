//! Slot grids, durations, hours policy, and date ranges.
//!
//! A scheduling event is configured by an [`EventMeta`]: an inclusive date
//! range, a slot duration, an hours policy, and a civil time zone. The grid
//! generator turns the duration and hours policy into the ordered list of
//! slot labels for a single day; [`slot_window`] resolves a label on a
//! concrete date into UTC instants for interval math.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{EngineError, Result};

const MINUTES_PER_DAY: u32 = 1440;

/// First hour of every day window. The product schedules nothing earlier.
pub const DAY_START_HOUR: u32 = 9;

/// Exclusive end hour of the standard day window (09:00-17:00).
pub const DAY_END_HOUR_STANDARD: u32 = 17;

/// Exclusive end hour of the extended day window (09:00-21:00).
pub const DAY_END_HOUR_EXTENDED: u32 = 21;

// ---------------------------------------------------------------------------
// Slot duration
// ---------------------------------------------------------------------------

/// Granularity of the slot grid, in minutes.
///
/// The named variants are the durations the product offers; `Custom` carries
/// any other positive minute count. `Daily` (1440 minutes) collapses the
/// grid to the single [`SlotLabel::AllDay`] pseudo-slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotDuration {
    FiveMinutes,
    TenMinutes,
    QuarterHour,
    HalfHour,
    Hourly,
    Daily,
    Custom(u32),
}

impl SlotDuration {
    pub fn minutes(self) -> u32 {
        match self {
            SlotDuration::FiveMinutes => 5,
            SlotDuration::TenMinutes => 10,
            SlotDuration::QuarterHour => 15,
            SlotDuration::HalfHour => 30,
            SlotDuration::Hourly => 60,
            SlotDuration::Daily => MINUTES_PER_DAY,
            SlotDuration::Custom(m) => m,
        }
    }

    pub fn from_minutes(minutes: u32) -> Self {
        match minutes {
            5 => SlotDuration::FiveMinutes,
            10 => SlotDuration::TenMinutes,
            15 => SlotDuration::QuarterHour,
            30 => SlotDuration::HalfHour,
            60 => SlotDuration::Hourly,
            MINUTES_PER_DAY => SlotDuration::Daily,
            other => SlotDuration::Custom(other),
        }
    }

    /// Parse a stored duration value: either a bare minute count ("15") or
    /// one of the product's wire labels ("quarter-hour"). Unknown labels
    /// fall back to hourly, matching what stored metadata has always done.
    pub fn from_label(label: &str) -> Self {
        if let Ok(minutes) = label.parse::<u32>() {
            return SlotDuration::from_minutes(minutes);
        }
        match label {
            "5-minutes" => SlotDuration::FiveMinutes,
            "10-minutes" => SlotDuration::TenMinutes,
            "quarter-hour" => SlotDuration::QuarterHour,
            "half-hour" => SlotDuration::HalfHour,
            "daily" => SlotDuration::Daily,
            _ => SlotDuration::Hourly,
        }
    }

    /// The wire label used in share links and stored metadata.
    pub fn label(self) -> &'static str {
        match self.minutes() {
            5 => "5-minutes",
            10 => "10-minutes",
            15 => "quarter-hour",
            30 => "half-hour",
            60 => "hourly",
            MINUTES_PER_DAY => "daily",
            _ => "custom",
        }
    }
}

impl Serialize for SlotDuration {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.minutes())
    }
}

impl<'de> Deserialize<'de> for SlotDuration {
    fn deserialize<D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        struct DurationVisitor;

        impl<'de> Visitor<'de> for DurationVisitor {
            type Value = SlotDuration;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a minute count or a duration label")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<SlotDuration, E> {
                Ok(SlotDuration::from_minutes(v.min(u32::MAX as u64) as u32))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<SlotDuration, E> {
                self.visit_u64(v.max(0) as u64)
            }

            fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<SlotDuration, E> {
                Ok(SlotDuration::from_label(v))
            }
        }

        deserializer.deserialize_any(DurationVisitor)
    }
}

// ---------------------------------------------------------------------------
// Slot labels
// ---------------------------------------------------------------------------

/// A slot's position within a day: a start time, or the whole-day
/// pseudo-slot used at daily granularity.
///
/// Labels order `AllDay` first, then ascending start time; that ordering
/// backs every deterministic tie-break in aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SlotLabel {
    AllDay,
    At(NaiveTime),
}

impl SlotLabel {
    /// Build a timed label; `None` for out-of-range hour/minute values.
    pub fn at(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(SlotLabel::At)
    }
}

impl fmt::Display for SlotLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotLabel::AllDay => f.write_str("All Day"),
            SlotLabel::At(t) => write!(f, "{}", t.format("%H:%M")),
        }
    }
}

impl FromStr for SlotLabel {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        // "~All Day" is the transitional partial-day marker some stored
        // responses carry; it normalizes to the plain all-day label.
        if s == "All Day" || s == "~All Day" {
            return Ok(SlotLabel::AllDay);
        }
        NaiveTime::parse_from_str(s, "%H:%M")
            .map(SlotLabel::At)
            .map_err(|_| EngineError::InvalidSlotLabel(s.to_string()))
    }
}

impl Serialize for SlotLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SlotLabel {
    fn deserialize<D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Day window and date range
// ---------------------------------------------------------------------------

/// The civil hours a day's grid spans, `[start_hour, end_hour)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub start_hour: u32,
    pub end_hour: u32,
}

impl DayWindow {
    /// Standard hours are 09:00-17:00; extended hours run to 21:00.
    pub fn for_policy(extended_hours: bool) -> Self {
        DayWindow {
            start_hour: DAY_START_HOUR,
            end_hour: if extended_hours {
                DAY_END_HOUR_EXTENDED
            } else {
                DAY_END_HOUR_STANDARD
            },
        }
    }

    pub fn minutes(&self) -> u32 {
        (self.end_hour - self.start_hour) * 60
    }
}

/// An inclusive span of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    /// Ascending dates from `from` through `to`; empty when `to < from`.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let mut current = Some(self.from);
        let to = self.to;
        std::iter::from_fn(move || {
            let date = current?;
            if date > to {
                return None;
            }
            current = date.succ_opt();
            Some(date)
        })
    }
}

// ---------------------------------------------------------------------------
// Event metadata
// ---------------------------------------------------------------------------

/// Per-event configuration handed over by the persistence collaborator.
///
/// The civil zone is an explicit field rather than a process-wide constant;
/// stored metadata that predates the field deserializes with the product's
/// historical default of Europe/Amsterdam.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventMeta {
    pub range: DateRange,
    pub slot_duration: SlotDuration,
    #[serde(default)]
    pub extended_hours: bool,
    #[serde(default = "default_time_zone", with = "tz_name")]
    pub time_zone: Tz,
}

impl EventMeta {
    pub fn day_window(&self) -> DayWindow {
        DayWindow::for_policy(self.extended_hours)
    }
}

fn default_time_zone() -> Tz {
    chrono_tz::Europe::Amsterdam
}

mod tz_name {
    use super::*;

    pub fn serialize<S: Serializer>(
        tz: &Tz,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(tz.name())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Tz, D::Error> {
        let name = String::deserialize(deserializer)?;
        parse_time_zone(&name).map_err(de::Error::custom)
    }
}

/// Parse an IANA zone name.
///
/// # Errors
/// Returns [`EngineError::InvalidTimeZone`] for unknown names.
pub fn parse_time_zone(name: &str) -> Result<Tz> {
    name.parse()
        .map_err(|_| EngineError::InvalidTimeZone(name.to_string()))
}

// ---------------------------------------------------------------------------
// Grid generation
// ---------------------------------------------------------------------------

/// Generate the ordered slot labels for a single day.
///
/// Daily granularity returns the single `All Day` pseudo-slot. Otherwise the
/// grid steps through each hour of the day window by the slot duration; a
/// duration that does not divide 60 restarts at every hour boundary, so the
/// per-hour remainder is dropped rather than carried over. A label whose
/// slot would extend past the window's end hour is dropped too, keeping
/// every slot inside the day window.
///
/// # Errors
/// Returns [`EngineError::InvalidDuration`] for a zero-minute duration and
/// [`EngineError::DurationExceedsWindow`] when no slot fits the window.
pub fn generate_slots(duration: SlotDuration, extended_hours: bool) -> Result<Vec<SlotLabel>> {
    let minutes = duration.minutes();
    if minutes == 0 {
        return Err(EngineError::InvalidDuration(minutes));
    }
    if minutes >= MINUTES_PER_DAY {
        return Ok(vec![SlotLabel::AllDay]);
    }

    let window = DayWindow::for_policy(extended_hours);
    let window_end_minutes = window.end_hour * 60;

    let mut slots = Vec::new();
    for hour in window.start_hour..window.end_hour {
        let mut minute = 0;
        while minute < 60 {
            if hour * 60 + minute + minutes <= window_end_minutes {
                if let Some(label) = SlotLabel::at(hour, minute) {
                    slots.push(label);
                }
            }
            minute += minutes;
        }
    }

    if slots.is_empty() {
        return Err(EngineError::DurationExceedsWindow {
            minutes,
            window_minutes: window.minutes(),
        });
    }
    Ok(slots)
}

/// Resolve a slot on a concrete date into UTC instants.
///
/// Timed slots span `[start, start + duration)`; the all-day pseudo-slot
/// spans the whole day window. The start is resolved in the event's civil
/// zone, so the same label lands on different UTC instants across a DST
/// transition.
///
/// # Errors
/// Returns [`EngineError::LocalTime`] when the civil datetime cannot be
/// resolved in the zone.
pub fn slot_window(
    date: NaiveDate,
    label: SlotLabel,
    duration: SlotDuration,
    window: DayWindow,
    tz: Tz,
) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    match label {
        SlotLabel::AllDay => {
            let start = resolve_local(at_hour(date, window.start_hour), tz)?;
            let end = resolve_local(at_hour(date, window.end_hour), tz)?;
            Ok((start, end))
        }
        SlotLabel::At(time) => {
            let start = resolve_local(date.and_time(time), tz)?;
            let end = start + Duration::minutes(duration.minutes() as i64);
            Ok((start, end))
        }
    }
}

fn at_hour(date: NaiveDate, hour: u32) -> NaiveDateTime {
    // end_hour is at most 21, so this never rolls past midnight.
    date.and_time(NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or(NaiveTime::MIN))
}

/// Map a civil datetime to UTC under a fixed DST policy: an ambiguous
/// fall-back time takes the earliest offset, a spring-forward gap shifts
/// forward one hour. Deterministic for any input.
fn resolve_local(local: NaiveDateTime, tz: Tz) -> Result<DateTime<Utc>> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest.with_timezone(&Utc)),
        LocalResult::None => {
            let shifted = local + Duration::hours(1);
            match tz.from_local_datetime(&shifted) {
                LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
                LocalResult::Ambiguous(earliest, _) => Ok(earliest.with_timezone(&Utc)),
                LocalResult::None => Err(EngineError::LocalTime(local.to_string())),
            }
        }
    }
}
