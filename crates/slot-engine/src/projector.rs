//! Availability projection -- a participant's calendar reduced to busy intervals
//! inside a request's search space.
//!
//! The calendar is expanded once over the bounding days of all date ranges.
//! Each expanded occurrence is then clipped to every cell it overlaps, so no
//! returned interval extends outside a `(date range, time range)` cell.

use std::collections::HashSet;

use tracing::debug;

use crate::error::Result;
use crate::expander;
use crate::model::{BusyInterval, CalendarItem, DateRange, RequestConfiguration, TimeRange};
use crate::space::SearchSpace;

/// Project `items` onto `date_ranges × time_ranges`.
///
/// Intervals are clipped to each cell, zero-length clips are dropped, and
/// duplicates by `(title, start, end)` are removed (an occurrence seen through
/// two overlapping time windows appears once).
///
/// # Errors
/// Returns `SlotError::EmptyDateRanges` or `SlotError::EmptyTimeRanges` when a
/// range list is empty.
pub fn project(
    items: &[CalendarItem],
    date_ranges: &[DateRange],
    time_ranges: &[TimeRange],
) -> Result<Vec<BusyInterval>> {
    let space = SearchSpace::new(date_ranges, time_ranges)?;
    Ok(project_onto(items, &space))
}

/// [`project`] over the ranges of a request.
pub fn project_for_request(
    items: &[CalendarItem],
    config: &RequestConfiguration,
) -> Result<Vec<BusyInterval>> {
    project(items, &config.date_ranges, &config.time_ranges)
}

pub fn project_onto(items: &[CalendarItem], space: &SearchSpace<'_>) -> Vec<BusyInterval> {
    if items.is_empty() {
        return Vec::new();
    }
    let Some((first_day, last_day)) = space.bounds() else {
        return Vec::new();
    };

    let occurrences = expander::expand(items, first_day, last_day);

    let mut seen = HashSet::new();
    let mut busy = Vec::new();
    for cell in space.cells() {
        for occurrence in occurrences
            .iter()
            .filter(|occurrence| occurrence.overlaps(cell.start, cell.end))
        {
            let start = occurrence.start.max(cell.start);
            let end = occurrence.end.min(cell.end);
            if end <= start {
                continue;
            }
            if seen.insert((occurrence.title.clone(), start, end)) {
                busy.push(BusyInterval::new(occurrence.title.clone(), start, end));
            }
        }
    }

    debug!(
        occurrences = occurrences.len(),
        busy = busy.len(),
        "projected calendar onto search space"
    );
    busy
}
