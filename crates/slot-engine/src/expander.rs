//! Stamp expansion -- turns calendar items into concrete occurrences inside a window.
//!
//! Plain items and already-derived occurrences pass through when they overlap
//! the window. Recurring templates are stepped day by day over the part of the
//! window their series covers, starting early enough to catch occurrences that
//! begin before the window and run into it; every matching weekday yields a
//! derived occurrence with the template's time of day and duration. Templates
//! with an active rule never appear in the output themselves.

use std::collections::HashSet;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use tracing::{debug, warn};

use crate::model::{CalendarItem, ItemKind, RepeatRule};

/// Deterministic identity of the occurrence of `template_id` on `date`.
pub fn occurrence_id(template_id: &str, date: NaiveDate) -> String {
    format!("{}_{}", template_id, date.format("%Y%m%d"))
}

/// Expand `items` into the occurrences overlapping the inclusive day range
/// `first_day..=last_day`.
///
/// The result is deduplicated by id (first seen wins) and sorted by
/// `(start, id)`, so calling this twice with the same arguments yields the same
/// list. Items with `end <= start` are skipped with a warning.
pub fn expand(items: &[CalendarItem], first_day: NaiveDate, last_day: NaiveDate) -> Vec<CalendarItem> {
    if last_day < first_day {
        debug!(%first_day, %last_day, "empty expansion window");
        return Vec::new();
    }

    let window_start = first_day.and_time(NaiveTime::MIN);
    let window_end = last_day
        .succ_opt()
        .map_or(NaiveDateTime::MAX, |day| day.and_time(NaiveTime::MIN));

    let mut occurrences = Vec::new();
    for item in items {
        if !item.is_well_formed() {
            warn!(
                id = %item.id,
                start = %item.start,
                end = %item.end,
                "skipping calendar item with non-positive duration"
            );
            continue;
        }

        match item.active_rule() {
            Some(rule) => expand_template(
                item,
                rule,
                (first_day, last_day),
                (window_start, window_end),
                &mut occurrences,
            ),
            None => {
                if item.overlaps(window_start, window_end) {
                    occurrences.push(item.clone());
                }
            }
        }
    }

    let mut seen = HashSet::new();
    occurrences.retain(|occurrence| seen.insert(occurrence.id.clone()));
    occurrences.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.id.cmp(&b.id)));
    occurrences
}

/// Push one derived occurrence per matching weekday of `template` whose
/// interval overlaps `[window_start, window_end)`, limited to the series' own
/// date range.
fn expand_template(
    template: &CalendarItem,
    rule: &RepeatRule,
    (first_day, last_day): (NaiveDate, NaiveDate),
    (window_start, window_end): (NaiveDateTime, NaiveDateTime),
    out: &mut Vec<CalendarItem>,
) {
    let series_start = template.start.date();
    if rule.repeat_end_date < series_start {
        warn!(
            id = %template.id,
            %series_start,
            repeat_end_date = %rule.repeat_end_date,
            "skipping stamp whose repeat end date precedes its start"
        );
        return;
    }

    let duration = template.duration();
    let lead = lead_days(duration);
    let scan_first = first_day
        .checked_sub_signed(Duration::days(lead))
        .unwrap_or(NaiveDate::MIN)
        .max(series_start);
    let scan_last = last_day.min(rule.repeat_end_date);
    if scan_last < scan_first {
        return;
    }

    let time_of_day = template.start.time();
    let before = out.len();

    for day in scan_first.iter_days() {
        if day > scan_last {
            break;
        }
        if !rule.repeats_on(day) {
            continue;
        }
        let occurrence = derive_occurrence(template, day, time_of_day, duration);
        if occurrence.overlaps(window_start, window_end) {
            out.push(occurrence);
        }
    }

    debug!(
        id = %template.id,
        occurrences = out.len() - before,
        "expanded stamp"
    );
}

/// Days before the window an occurrence of length `duration` may start and
/// still reach into it.
fn lead_days(duration: Duration) -> i64 {
    const DAY_SECONDS: i64 = 24 * 60 * 60;
    (duration.num_seconds() + DAY_SECONDS - 1) / DAY_SECONDS
}

fn derive_occurrence(
    template: &CalendarItem,
    day: NaiveDate,
    time_of_day: NaiveTime,
    duration: Duration,
) -> CalendarItem {
    let start = day.and_time(time_of_day);
    CalendarItem {
        id: occurrence_id(&template.id, day),
        title: template.title.clone(),
        start,
        end: start + duration,
        all_day: template.all_day,
        color: template.color.clone(),
        emoji: template.emoji.clone(),
        request_id: template.request_id.clone(),
        kind: ItemKind::Derived {
            template_id: template.id.clone(),
            occurrence_date: day,
        },
    }
}
