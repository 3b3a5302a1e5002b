//! Tests for heat-map aggregation, ranking determinism, and best-date
//! selection.

use chrono::{NaiveDate, TimeZone, Utc};
use prikkr_engine::aggregate::{aggregate, percent_of, top_dates};
use prikkr_engine::grid::{DateRange, EventMeta, SlotDuration, SlotLabel};
use prikkr_engine::interval::BusyInterval;
use prikkr_engine::response::{ParticipantResponse, ResponseMode, Selections};
use prikkr_engine::sync::build_selections;

fn at(hour: u32, minute: u32) -> SlotLabel {
    SlotLabel::at(hour, minute).unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn response(name: &str, email: &str, selections: Selections) -> ParticipantResponse {
    ParticipantResponse {
        name: name.to_string(),
        email: email.to_string(),
        selections,
        mode: ResponseMode::Sync,
        updated_at: Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(),
    }
}

/// Selections with the given labels on a single date.
fn on_date(d: NaiveDate, labels: &[SlotLabel]) -> Selections {
    let mut selections = Selections::new();
    selections.insert(d, labels.iter().copied().collect());
    selections
}

#[test]
fn empty_input_aggregates_to_nothing() {
    let agg = aggregate(&[]);
    assert_eq!(agg.total, 0);
    assert!(agg.heatmap.is_empty());
    assert!(agg.ranked.is_empty());
    assert!(top_dates(&agg, 3).is_empty());
}

#[test]
fn participants_without_selections_are_excluded_from_the_denominator() {
    let d = date(2024, 1, 1);
    let engaged = response("Ada", "ada@example.com", on_date(d, &[at(9, 0)]));
    let silent = response("Bob", "bob@example.com", on_date(d, &[]));

    let agg = aggregate(&[engaged, silent]);
    assert_eq!(agg.total, 1);
    assert_eq!(agg.heatmap[&d][&at(9, 0)], 1);
    assert_eq!(agg.ranked[0].percent, 100);
}

#[test]
fn counts_never_exceed_the_engaged_total() {
    let d = date(2024, 1, 1);
    let responses = vec![
        response("Ada", "ada@example.com", on_date(d, &[at(9, 0), at(10, 0)])),
        response("Bob", "bob@example.com", on_date(d, &[at(9, 0)])),
        response("Cleo", "cleo@example.com", on_date(d, &[at(10, 0)])),
    ];

    let agg = aggregate(&responses);
    assert_eq!(agg.total, 3);
    for slots in agg.heatmap.values() {
        for &count in slots.values() {
            assert!(count <= agg.total);
        }
    }
}

#[test]
fn one_busy_participant_halves_the_overlapping_slots() {
    // Single day, hourly slots 09:00-17:00 UTC. Ada is busy 09:30-10:30,
    // which touches both the 09:00 and the 10:00 slot; Bob is free all day.
    let meta = EventMeta {
        range: DateRange {
            from: date(2024, 1, 1),
            to: date(2024, 1, 1),
        },
        slot_duration: SlotDuration::Hourly,
        extended_hours: false,
        time_zone: chrono_tz::UTC,
    };
    let ada_busy = vec![BusyInterval::new(
        Utc.with_ymd_and_hms(2024, 1, 1, 9, 30, 0).unwrap(),
        Utc.with_ymd_and_hms(2024, 1, 1, 10, 30, 0).unwrap(),
    )
    .unwrap()];

    let ada = response(
        "Ada",
        "ada@example.com",
        build_selections(&ada_busy, &meta).unwrap(),
    );
    let bob = response("Bob", "bob@example.com", build_selections(&[], &meta).unwrap());

    let agg = aggregate(&[ada, bob]);
    let d = date(2024, 1, 1);

    assert_eq!(agg.total, 2);
    let percent = |label: SlotLabel| {
        agg.ranked
            .iter()
            .find(|s| s.date == d && s.label == label)
            .map(|s| s.percent)
    };
    assert_eq!(percent(at(9, 0)), Some(50));
    assert_eq!(percent(at(10, 0)), Some(50));
    assert_eq!(percent(at(11, 0)), Some(100));
    assert_eq!(percent(at(16, 0)), Some(100));
}

#[test]
fn ranked_is_percent_descending_with_date_time_tie_break() {
    let d1 = date(2024, 3, 1);
    let d2 = date(2024, 3, 2);

    // Ada picks everything; Bob skips d1 09:00. The three full slots tie
    // at 100% and must come out date-ascending, then time-ascending.
    let mut ada = Selections::new();
    ada.insert(d1, [at(9, 0), at(10, 0)].into_iter().collect());
    ada.insert(d2, [at(9, 0)].into_iter().collect());
    let mut bob = Selections::new();
    bob.insert(d1, [at(10, 0)].into_iter().collect());
    bob.insert(d2, [at(9, 0)].into_iter().collect());

    let agg = aggregate(&[
        response("Ada", "ada@example.com", ada),
        response("Bob", "bob@example.com", bob),
    ]);

    let order: Vec<(NaiveDate, SlotLabel, u8)> = agg
        .ranked
        .iter()
        .map(|s| (s.date, s.label, s.percent))
        .collect();
    assert_eq!(
        order,
        vec![
            (d1, at(10, 0), 100),
            (d2, at(9, 0), 100),
            (d1, at(9, 0), 50),
        ]
    );
}

#[test]
fn aggregation_is_deterministic_and_order_insensitive() {
    let d1 = date(2024, 3, 1);
    let d2 = date(2024, 3, 2);
    let responses = vec![
        response("Ada", "ada@example.com", on_date(d1, &[at(9, 0), at(11, 0)])),
        response("Bob", "bob@example.com", on_date(d2, &[at(9, 0)])),
        response("Cleo", "cleo@example.com", on_date(d1, &[at(9, 0)])),
    ];
    let mut reversed = responses.clone();
    reversed.reverse();

    let a = aggregate(&responses);
    let b = aggregate(&responses);
    let c = aggregate(&reversed);

    assert_eq!(a, b);
    assert_eq!(a, c);
    // Byte-identical serialized output, not just structural equality.
    assert_eq!(
        serde_json::to_string(&a).unwrap(),
        serde_json::to_string(&b).unwrap()
    );
}

#[test]
fn top_dates_orders_by_best_percent_and_keeps_only_the_best_slots() {
    let d1 = date(2024, 3, 1); // best 80%
    let d2 = date(2024, 3, 2); // best 100%
    let d3 = date(2024, 3, 3); // best 60%

    // Five participants; counts chosen to produce 80/100/60.
    let names = ["a", "b", "c", "d", "e"];
    let mut responses = Vec::new();
    for (i, &name) in names.iter().enumerate() {
        let mut selections = Selections::new();
        if i < 4 {
            selections.insert(d1, [at(9, 0)].into_iter().collect());
        }
        selections.insert(d2, [at(14, 0)].into_iter().collect());
        if i < 3 {
            selections.insert(d3, [at(9, 0)].into_iter().collect());
        }
        // d2 also has a weaker alternative that must not be surfaced.
        if i < 2 {
            selections
                .get_mut(&d2)
                .unwrap()
                .insert(at(15, 0));
        }
        responses.push(response(name, &format!("{name}@example.com"), selections));
    }

    let agg = aggregate(&responses);
    let top = top_dates(&agg, 3);

    assert_eq!(top.len(), 3);
    assert_eq!(top[0].date, d2);
    assert_eq!(top[0].percent, 100);
    assert_eq!(top[0].labels, vec![at(14, 0)]); // 40% alternative dropped
    assert_eq!(top[1].date, d1);
    assert_eq!(top[1].percent, 80);
    assert_eq!(top[2].date, d3);
    assert_eq!(top[2].percent, 60);
}

#[test]
fn top_dates_surfaces_every_slot_tied_at_the_maximum() {
    let d = date(2024, 3, 1);
    let agg = aggregate(&[response(
        "Ada",
        "ada@example.com",
        on_date(d, &[at(9, 0), at(13, 0)]),
    )]);

    let top = top_dates(&agg, 3);
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].labels, vec![at(9, 0), at(13, 0)]);
}

#[test]
fn top_dates_truncates_to_the_requested_count() {
    let responses: Vec<ParticipantResponse> = (1..=5)
        .map(|d| {
            response(
                &format!("p{d}"),
                &format!("p{d}@example.com"),
                on_date(date(2024, 3, d), &[at(9, 0)]),
            )
        })
        .collect();

    let agg = aggregate(&responses);
    assert_eq!(top_dates(&agg, 3).len(), 3);
}

#[test]
fn percent_rounds_to_nearest() {
    assert_eq!(percent_of(1, 3), 33);
    assert_eq!(percent_of(2, 3), 67);
    assert_eq!(percent_of(0, 3), 0);
    assert_eq!(percent_of(3, 3), 100);
    assert_eq!(percent_of(5, 0), 0);
}
