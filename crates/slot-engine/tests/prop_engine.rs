//! Property-based tests for expansion, projection and the slot search.
//!
//! Inputs stay within one March 2026 week at five-minute granularity so that
//! every generated case is a plausible request.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use proptest::prelude::*;
use slot_engine::expander::expand;
use slot_engine::finder::find_common;
use slot_engine::model::{
    overlaps, BusyInterval, CalendarItem, DateRange, DayKey, ParticipantAvailability, RepeatRule,
    RequestConfiguration, TimeRange,
};
use slot_engine::projector::project;
use slot_engine::space::SearchSpace;

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn base() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 3, 16)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

/// An instant within the week, on a five-minute boundary.
fn arb_instant() -> impl Strategy<Value = NaiveDateTime> {
    (0i64..7 * 24 * 12).prop_map(|ticks| base() + Duration::minutes(ticks * 5))
}

fn arb_interval() -> impl Strategy<Value = (NaiveDateTime, NaiveDateTime)> {
    (arb_instant(), 1i64..=48).prop_map(|(start, ticks)| (start, start + Duration::minutes(ticks * 5)))
}

fn arb_participant(index: usize) -> impl Strategy<Value = ParticipantAvailability> {
    prop::collection::vec(arb_interval(), 0..6).prop_map(move |intervals| {
        ParticipantAvailability::new(
            format!("p{index}"),
            format!("Participant {index}"),
            intervals
                .into_iter()
                .map(|(start, end)| BusyInterval::new("busy", start, end))
                .collect(),
        )
    })
}

fn arb_participants() -> impl Strategy<Value = Vec<ParticipantAvailability>> {
    (2usize..=5).prop_flat_map(|n| (0..n).map(arb_participant).collect::<Vec<_>>())
}

/// A daily window of at least one hour, on a quarter-hour boundary.
fn arb_time_range() -> impl Strategy<Value = TimeRange> {
    (28u32..=64, 4u32..=24).prop_map(|(start_q, len_q)| {
        let end_q = (start_q + len_q).min(95);
        let time = |q: u32| chrono::NaiveTime::from_hms_opt(q / 4, (q % 4) * 15, 0).unwrap();
        TimeRange::new(time(start_q), time(end_q))
    })
}

fn arb_config() -> impl Strategy<Value = RequestConfiguration> {
    (
        0u32..5,
        0u32..3,
        prop::collection::vec(arb_time_range(), 1..3),
        prop::sample::select(vec![15u32, 30, 45, 60, 90]),
        prop::sample::select(vec![0u32, 5, 10, 15]),
        2usize..=4,
    )
        .prop_map(|(first, len, time_ranges, duration, margin, members)| {
            let start = NaiveDate::from_ymd_opt(2026, 3, 16 + first).unwrap();
            let end = start + Duration::days(i64::from(len));
            RequestConfiguration {
                date_ranges: vec![DateRange::new(start, end)],
                time_ranges,
                desired_duration_minutes: duration,
                desired_margin_minutes: margin,
                desired_member_count: members,
            }
        })
}

fn arb_step() -> impl Strategy<Value = u32> {
    prop::sample::select(vec![5u32, 10, 15, 30])
}

fn arb_calendar() -> impl Strategy<Value = Vec<CalendarItem>> {
    let plain = arb_interval().prop_map(|(start, end)| (start, end, None::<RepeatRule>));
    let stamp = (arb_interval(), prop::collection::btree_set(0u32..7, 1..4), 0i64..21).prop_map(
        |((start, end), days, span)| {
            let rule = RepeatRule::new(
                days.into_iter().filter_map(DayKey::from_index),
                start.date() + Duration::days(span),
            );
            (start, end, Some(rule))
        },
    );
    prop::collection::vec(prop_oneof![plain, stamp], 0..8).prop_map(|entries| {
        entries
            .into_iter()
            .enumerate()
            .map(|(i, (start, end, rule))| match rule {
                Some(rule) => CalendarItem::recurring(format!("s{i}"), format!("Stamp {i}"), start, end, rule),
                None => CalendarItem::plain(format!("e{i}"), format!("Event {i}"), start, end),
            })
            .collect()
    })
}

fn config() -> ProptestConfig {
    ProptestConfig {
        cases: 128,
        ..ProptestConfig::default()
    }
}

fn padded(config: &RequestConfiguration, start: NaiveDateTime, end: NaiveDateTime) -> (NaiveDateTime, NaiveDateTime) {
    (start - config.margin(), end + config.margin())
}

// ---------------------------------------------------------------------------
// Property 1: listed participants are free over the padded window, others are not
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn availability_respects_margins(
        request in arb_config(),
        participants in arb_participants(),
        step in arb_step(),
    ) {
        let slots = find_common(&request, &participants, step).unwrap();

        for slot in &slots {
            let (padded_start, padded_end) = padded(&request, slot.start, slot.end);
            for participant in &participants {
                let busy = participant
                    .busy
                    .iter()
                    .any(|b| overlaps(b.start, b.end, padded_start, padded_end));
                prop_assert_eq!(
                    slot.includes(&participant.id),
                    !busy,
                    "participant {} misclassified in {:?}",
                    participant.id,
                    slot
                );
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Property 2: headcount, duration and ordering
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn slots_meet_headcount_and_are_sorted(
        request in arb_config(),
        participants in arb_participants(),
        step in arb_step(),
    ) {
        let slots = find_common(&request, &participants, step).unwrap();

        for slot in &slots {
            prop_assert!(slot.headcount() >= request.desired_member_count);
            prop_assert_eq!(slot.duration_minutes(), i64::from(request.desired_duration_minutes));
        }
        for pair in slots.windows(2) {
            prop_assert!(pair[0].start <= pair[1].start);
        }
    }
}

// ---------------------------------------------------------------------------
// Property 3: exhaustive at step granularity
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn no_qualifying_probe_is_omitted(
        request in arb_config(),
        participants in arb_participants(),
        step in arb_step(),
    ) {
        let slots = find_common(&request, &participants, step).unwrap();
        if participants.len() < request.desired_member_count {
            prop_assert!(slots.is_empty());
            return Ok(());
        }
        let space = SearchSpace::for_request(&request).unwrap();

        let mut expected = 0usize;
        for cell in space.cells() {
            let mut probe = cell.start;
            let span = request.duration() + request.margin() + request.margin();
            while probe + span <= cell.end {
                let free = participants
                    .iter()
                    .filter(|p| p.is_free(probe, probe + span))
                    .count();
                if free >= request.desired_member_count {
                    expected += 1;
                    let start = probe + request.margin();
                    prop_assert!(
                        slots.iter().any(|s| s.start == start),
                        "missing slot starting {}",
                        start
                    );
                }
                probe += Duration::minutes(i64::from(step));
            }
        }
        prop_assert_eq!(slots.len(), expected);
    }
}

// ---------------------------------------------------------------------------
// Property 4: projection stays inside the search space
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn projection_is_contained(
        request in arb_config(),
        items in arb_calendar(),
    ) {
        let busy = project(&items, &request.date_ranges, &request.time_ranges).unwrap();
        let space = SearchSpace::for_request(&request).unwrap();

        for interval in &busy {
            prop_assert!(interval.end > interval.start);
            prop_assert!(
                space.contains(interval.start, interval.end),
                "{:?} escapes the search space",
                interval
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Property 5: expansion is idempotent and never emits templates
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn expansion_is_idempotent(
        items in arb_calendar(),
        first in 0u32..7,
        len in 0i64..14,
    ) {
        let first_day = NaiveDate::from_ymd_opt(2026, 3, 16 + first).unwrap();
        let last_day = first_day + Duration::days(len);

        let once = expand(&items, first_day, last_day);
        let twice = expand(&items, first_day, last_day);

        prop_assert_eq!(&once, &twice);
        for occurrence in &once {
            prop_assert!(occurrence.active_rule().is_none());
        }
        let mut ids: Vec<&str> = once.iter().map(|o| o.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        prop_assert_eq!(ids.len(), once.len());
    }
}
