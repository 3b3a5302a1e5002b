//! WASM bindings for prikkr-engine.
//!
//! Exposes slot grid generation, selection building, and heat-map
//! aggregation to JavaScript via `wasm-bindgen`. All complex types are
//! passed as JSON strings, so the web frontend and its API routes consume
//! the same shapes they persist.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p prikkr-engine-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target nodejs --out-dir packages/prikkr-engine-js/wasm/ \
//!   target/wasm32-unknown-unknown/release/prikkr_engine_wasm.wasm
//! ```

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

use prikkr_engine::grid::{parse_time_zone, DateRange, DayWindow, EventMeta, SlotDuration, SlotLabel};
use prikkr_engine::interval::BusyInterval;
use prikkr_engine::response::ParticipantResponse;

// ---------------------------------------------------------------------------
// Input parsing helpers
// ---------------------------------------------------------------------------

/// Input format for busy intervals passed from JavaScript.
#[derive(Deserialize)]
struct IntervalInput {
    start: String,
    end: String,
}

/// Parse an ISO 8601 datetime string into `DateTime<Utc>`.
///
/// Accepts both RFC 3339 (with timezone offset, e.g., "2026-02-17T14:00:00Z")
/// and naive local time (e.g., "2026-02-17T14:00:00"), which is interpreted
/// as UTC.
fn parse_datetime(s: &str) -> Result<DateTime<Utc>, JsValue> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .map(|ndt| ndt.and_utc())
        .map_err(|e| JsValue::from_str(&format!("Invalid datetime '{}': {}", s, e)))
}

fn parse_date(s: &str) -> Result<NaiveDate, JsValue> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| JsValue::from_str(&format!("Invalid date '{}': {}", s, e)))
}

/// Convert a JSON array of `{start, end}` objects into validated intervals.
fn parse_busy_json(json: &str) -> Result<Vec<BusyInterval>, JsValue> {
    let inputs: Vec<IntervalInput> = serde_json::from_str(json)
        .map_err(|e| JsValue::from_str(&format!("Invalid busy JSON: {}", e)))?;

    inputs
        .into_iter()
        .map(|input| {
            let start = parse_datetime(&input.start)?;
            let end = parse_datetime(&input.end)?;
            BusyInterval::new(start, end).map_err(|e| JsValue::from_str(&e.to_string()))
        })
        .collect()
}

fn parse_responses_json(json: &str) -> Result<Vec<ParticipantResponse>, JsValue> {
    serde_json::from_str(json)
        .map_err(|e| JsValue::from_str(&format!("Invalid responses JSON: {}", e)))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// Generate the ordered slot labels for a single day.
///
/// Returns a JSON array of label strings ("09:00", ..., or "All Day" for
/// daily granularity).
#[wasm_bindgen(js_name = "generateSlots")]
pub fn generate_slots(duration_minutes: u32, extended_hours: bool) -> Result<String, JsValue> {
    let labels = prikkr_engine::generate_slots(
        SlotDuration::from_minutes(duration_minutes),
        extended_hours,
    )
    .map_err(|e| JsValue::from_str(&e.to_string()))?;
    to_json(&labels)
}

/// Compute the slots a participant is free for on every date in the range,
/// given their busy intervals.
///
/// `busy_json` must be a JSON array of `{start, end}` objects. Returns a
/// JSON object mapping "YYYY-MM-DD" dates to arrays of label strings.
#[wasm_bindgen(js_name = "buildSelections")]
pub fn build_selections(
    busy_json: &str,
    from: &str,
    to: &str,
    duration_minutes: u32,
    extended_hours: bool,
    time_zone: &str,
) -> Result<String, JsValue> {
    let busy = parse_busy_json(busy_json)?;
    let meta = EventMeta {
        range: DateRange {
            from: parse_date(from)?,
            to: parse_date(to)?,
        },
        slot_duration: SlotDuration::from_minutes(duration_minutes),
        extended_hours,
        time_zone: parse_time_zone(time_zone).map_err(|e| JsValue::from_str(&e.to_string()))?,
    };

    let selections = prikkr_engine::build_selections(&busy, &meta)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    to_json(&selections)
}

/// Aggregate all participant responses into a heat-map and ranked slot
/// list.
///
/// `responses_json` must be a JSON array of stored response objects.
/// Returns a JSON object `{heatmap, total, ranked}`.
#[wasm_bindgen(js_name = "aggregateResponses")]
pub fn aggregate_responses(responses_json: &str) -> Result<String, JsValue> {
    let responses = parse_responses_json(responses_json)?;
    to_json(&prikkr_engine::aggregate(&responses))
}

/// The `n` best dates by maximum availability, each carrying only the
/// slot(s) achieving that date's maximum.
///
/// Returns a JSON array of `{date, percent, labels}` objects.
#[wasm_bindgen(js_name = "topDates")]
pub fn top_dates(responses_json: &str, n: usize) -> Result<String, JsValue> {
    let responses = parse_responses_json(responses_json)?;
    let agg = prikkr_engine::aggregate(&responses);
    to_json(&prikkr_engine::top_dates(&agg, n))
}

/// Partition one slot into free/busy fractions for gradient rendering.
///
/// Returns a JSON array of `{from, to, status}` objects with fractions in
/// `[0, 1]`.
#[wasm_bindgen(js_name = "slotBusySegments")]
pub fn slot_busy_segments(
    busy_json: &str,
    date: &str,
    label: &str,
    duration_minutes: u32,
    extended_hours: bool,
    time_zone: &str,
) -> Result<String, JsValue> {
    let busy = parse_busy_json(busy_json)?;
    let date = parse_date(date)?;
    let label: SlotLabel = label
        .parse()
        .map_err(|e: prikkr_engine::EngineError| JsValue::from_str(&e.to_string()))?;
    let duration = SlotDuration::from_minutes(duration_minutes);
    let tz = parse_time_zone(time_zone).map_err(|e| JsValue::from_str(&e.to_string()))?;

    let (slot_start, slot_end) = prikkr_engine::slot_window(
        date,
        label,
        duration,
        DayWindow::for_policy(extended_hours),
        tz,
    )
    .map_err(|e| JsValue::from_str(&e.to_string()))?;

    to_json(&prikkr_engine::slot_busy_segments(
        slot_start, slot_end, &busy,
    ))
}
