//! The search-space grid of a request: date ranges × days × daily time windows.
//!
//! Walking the grid yields one [`Cell`] per `(date range, day, time range)`
//! triple, in that nesting order. Malformed ranges are dropped once, up front,
//! with a warning, so a single bad window never aborts the whole walk.

use chrono::{NaiveDate, NaiveDateTime};
use tracing::warn;

use crate::error::{Result, SlotError};
use crate::model::{DateRange, RequestConfiguration, TimeRange};

/// One concrete `[start, end)` window on one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub day: NaiveDate,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Cell {
    pub fn contains(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        self.start <= start && end <= self.end
    }
}

/// The well-formed date and time ranges of a request.
#[derive(Debug, Clone)]
pub struct SearchSpace<'a> {
    date_ranges: Vec<&'a DateRange>,
    time_ranges: Vec<&'a TimeRange>,
}

impl<'a> SearchSpace<'a> {
    /// Build the grid, skipping inverted ranges.
    ///
    /// # Errors
    /// Returns `SlotError::EmptyDateRanges` / `SlotError::EmptyTimeRanges` when a
    /// list is empty, since the search space is then undefined.
    pub fn new(date_ranges: &'a [DateRange], time_ranges: &'a [TimeRange]) -> Result<Self> {
        if date_ranges.is_empty() {
            return Err(SlotError::EmptyDateRanges);
        }
        if time_ranges.is_empty() {
            return Err(SlotError::EmptyTimeRanges);
        }

        let date_ranges = date_ranges
            .iter()
            .filter(|range| {
                if !range.is_valid() {
                    warn!(start = %range.start, end = %range.end, "skipping inverted date range");
                }
                range.is_valid()
            })
            .collect();
        let time_ranges = time_ranges
            .iter()
            .filter(|range| {
                if !range.is_valid() {
                    warn!(range = %range, "skipping time range that does not end after it starts");
                }
                range.is_valid()
            })
            .collect();

        Ok(Self {
            date_ranges,
            time_ranges,
        })
    }

    pub fn for_request(config: &'a RequestConfiguration) -> Result<Self> {
        Self::new(&config.date_ranges, &config.time_ranges)
    }

    /// Earliest and latest day covered by any date range.
    pub fn bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.date_ranges.iter().map(|range| range.start).min()?;
        let last = self.date_ranges.iter().map(|range| range.end).max()?;
        Some((first, last))
    }

    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.date_ranges.iter().flat_map(move |range| {
            range.days().flat_map(move |day| {
                self.time_ranges.iter().map(move |window| {
                    let (start, end) = window.on(day);
                    Cell { day, start, end }
                })
            })
        })
    }

    /// True when `[start, end)` lies wholly inside at least one cell.
    pub fn contains(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        self.cells().any(|cell| cell.contains(start, end))
    }
}
