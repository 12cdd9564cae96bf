//! Calendar items, request configuration and search results.
//!
//! All instants are timezone-naive local date-times. The boundary encodings are
//! fixed: weekdays are `SUN`..`SAT` (Sunday-first, index 0..=6), and times of day
//! are 24-hour `"HH:mm"` strings without seconds or offset.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SlotError};

/// Half-open overlap test: `[a_start, a_end)` and `[b_start, b_end)` overlap iff
/// `a_start < b_end && a_end > b_start`. Touching intervals do not overlap.
pub fn overlaps(
    a_start: NaiveDateTime,
    a_end: NaiveDateTime,
    b_start: NaiveDateTime,
    b_end: NaiveDateTime,
) -> bool {
    a_start < b_end && a_end > b_start
}

// ---------------------------------------------------------------------------
// Weekdays
// ---------------------------------------------------------------------------

/// A day of the week, Sunday-first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DayKey {
    Sun,
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
}

impl DayKey {
    pub const ALL: [DayKey; 7] = [
        DayKey::Sun,
        DayKey::Mon,
        DayKey::Tue,
        DayKey::Wed,
        DayKey::Thu,
        DayKey::Fri,
        DayKey::Sat,
    ];

    /// Weekday index, 0 = Sunday .. 6 = Saturday.
    pub fn index(self) -> u32 {
        self as u32
    }

    pub fn from_index(index: u32) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    pub fn of(date: NaiveDate) -> Self {
        Self::from(date.weekday())
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DayKey::Sun => "SUN",
            DayKey::Mon => "MON",
            DayKey::Tue => "TUE",
            DayKey::Wed => "WED",
            DayKey::Thu => "THU",
            DayKey::Fri => "FRI",
            DayKey::Sat => "SAT",
        }
    }
}

impl From<Weekday> for DayKey {
    fn from(weekday: Weekday) -> Self {
        Self::ALL[weekday.num_days_from_sunday() as usize]
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DayKey {
    type Err = SlotError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|day| day.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SlotError::InvalidConfiguration(format!("unknown weekday '{s}'")))
    }
}

// ---------------------------------------------------------------------------
// Times of day
// ---------------------------------------------------------------------------

/// Parse a 24-hour `"HH:mm"` time of day.
pub fn parse_time_of_day(s: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M")
        .map_err(|_| SlotError::InvalidTimeOfDay(s.to_string()))
}

/// Serde adapter for `"HH:mm"` strings.
mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_time_of_day(&raw).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Calendar items
// ---------------------------------------------------------------------------

/// Weekly recurrence carried by a stamp template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepeatRule {
    /// Weekdays an occurrence lands on. Empty means the rule never fires.
    pub repeat_days: BTreeSet<DayKey>,
    /// Last date (inclusive) an occurrence may land on.
    pub repeat_end_date: NaiveDate,
}

impl RepeatRule {
    pub fn new(days: impl IntoIterator<Item = DayKey>, repeat_end_date: NaiveDate) -> Self {
        Self {
            repeat_days: days.into_iter().collect(),
            repeat_end_date,
        }
    }

    /// A rule with no weekdays never fires.
    pub fn is_active(&self) -> bool {
        !self.repeat_days.is_empty()
    }

    pub fn repeats_on(&self, date: NaiveDate) -> bool {
        self.repeat_days.contains(&DayKey::of(date))
    }
}

/// What a calendar item is: a standalone occurrence, a recurring template, or an
/// occurrence derived from a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ItemKind {
    Plain,
    Recurring(RepeatRule),
    #[serde(rename_all = "camelCase")]
    Derived {
        /// Id of the template this occurrence was expanded from.
        template_id: String,
        /// Calendar day the occurrence belongs to.
        occurrence_date: NaiveDate,
    },
}

/// A titled `[start, end)` interval on a user's calendar.
///
/// On the wire the [`ItemKind`] is flattened into the item under a `kind` tag.
/// Items without a `kind` are read as plain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "CalendarItemRecord")]
pub struct CalendarItem {
    /// Unique identifier; derived occurrences use `{templateId}_{yyyyMMdd}`.
    pub id: String,
    /// Display title, carried into busy intervals.
    pub title: String,
    /// Start of the interval (inclusive).
    pub start: NaiveDateTime,
    /// End of the interval (exclusive).
    pub end: NaiveDateTime,
    /// Whether the item spans whole days. Informational only.
    pub all_day: bool,
    /// Display color such as `#FF0000`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Display emoji of a stamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
    /// Scheduling request this entry was created by, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// Plain item, recurring template or derived occurrence.
    #[serde(flatten)]
    pub kind: ItemKind,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
enum KindTag {
    #[default]
    Plain,
    Recurring,
    Derived,
}

/// Wire shape of a [`CalendarItem`], with every kind-specific field optional.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CalendarItemRecord {
    id: String,
    title: String,
    start: NaiveDateTime,
    end: NaiveDateTime,
    #[serde(default)]
    all_day: bool,
    #[serde(default)]
    color: Option<String>,
    #[serde(default)]
    emoji: Option<String>,
    #[serde(default)]
    request_id: Option<String>,
    #[serde(default)]
    kind: KindTag,
    #[serde(default)]
    repeat_days: BTreeSet<DayKey>,
    #[serde(default)]
    repeat_end_date: Option<NaiveDate>,
    #[serde(default)]
    template_id: Option<String>,
    #[serde(default)]
    occurrence_date: Option<NaiveDate>,
}

impl TryFrom<CalendarItemRecord> for CalendarItem {
    type Error = SlotError;

    fn try_from(record: CalendarItemRecord) -> Result<Self> {
        let missing = |field: &str| {
            SlotError::InvalidConfiguration(format!("calendar item '{}' has no {field}", record.id))
        };
        let kind = match record.kind {
            KindTag::Plain => ItemKind::Plain,
            KindTag::Recurring => ItemKind::Recurring(RepeatRule {
                repeat_days: record.repeat_days,
                repeat_end_date: record.repeat_end_date.ok_or_else(|| missing("repeatEndDate"))?,
            }),
            KindTag::Derived => ItemKind::Derived {
                template_id: record.template_id.ok_or_else(|| missing("templateId"))?,
                occurrence_date: record.occurrence_date.ok_or_else(|| missing("occurrenceDate"))?,
            },
        };

        Ok(Self {
            id: record.id,
            title: record.title,
            start: record.start,
            end: record.end,
            all_day: record.all_day,
            color: record.color,
            emoji: record.emoji,
            request_id: record.request_id,
            kind,
        })
    }
}

impl CalendarItem {
    pub fn plain(
        id: impl Into<String>,
        title: impl Into<String>,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            start,
            end,
            all_day: false,
            color: None,
            emoji: None,
            request_id: None,
            kind: ItemKind::Plain,
        }
    }

    /// A stamp template. `start`/`end` give the first date, time of day and
    /// duration of every occurrence.
    pub fn recurring(
        id: impl Into<String>,
        title: impl Into<String>,
        start: NaiveDateTime,
        end: NaiveDateTime,
        rule: RepeatRule,
    ) -> Self {
        Self {
            kind: ItemKind::Recurring(rule),
            ..Self::plain(id, title, start, end)
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_emoji(mut self, emoji: impl Into<String>) -> Self {
        self.emoji = Some(emoji.into());
        self
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// `end > start`; anything else is malformed and never expanded.
    pub fn is_well_formed(&self) -> bool {
        self.end > self.start
    }

    /// The recurrence rule, if this item is a template whose rule can fire.
    pub fn active_rule(&self) -> Option<&RepeatRule> {
        match &self.kind {
            ItemKind::Recurring(rule) if rule.is_active() => Some(rule),
            _ => None,
        }
    }

    pub fn is_derived(&self) -> bool {
        matches!(self.kind, ItemKind::Derived { .. })
    }

    pub fn overlaps(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        overlaps(self.start, self.end, start, end)
    }
}

// ---------------------------------------------------------------------------
// Request configuration
// ---------------------------------------------------------------------------

/// An inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// First day (inclusive).
    pub start: NaiveDate,
    /// Last day (inclusive).
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn single(day: NaiveDate) -> Self {
        Self::new(day, day)
    }

    pub fn is_valid(&self) -> bool {
        self.end >= self.start
    }

    /// Every day in the range, in order. Empty when `end < start`.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |day| *day <= end)
    }
}

/// A daily window such as `09:00`–`17:00`. No overnight wraparound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    /// Window opening time (inclusive).
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
    /// Window closing time (exclusive).
    #[serde(with = "hhmm")]
    pub end: NaiveTime,
}

impl TimeRange {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// Build from two `"HH:mm"` strings.
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        Ok(Self::new(parse_time_of_day(start)?, parse_time_of_day(end)?))
    }

    pub fn is_valid(&self) -> bool {
        self.end > self.start
    }

    /// Concrete `[start, end)` instants for this window on `day`.
    pub fn on(&self, day: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
        (day.and_time(self.start), day.and_time(self.end))
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start.format("%H:%M"), self.end.format("%H:%M"))
    }
}

/// The search space and meeting constraints of one scheduling request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestConfiguration {
    /// Days to search. Must not be empty.
    pub date_ranges: Vec<DateRange>,
    /// Daily windows to search on every day. Must not be empty.
    pub time_ranges: Vec<TimeRange>,
    /// Length of the meeting in minutes.
    pub desired_duration_minutes: u32,
    /// Free buffer required before and after the meeting, in minutes.
    #[serde(default)]
    pub desired_margin_minutes: u32,
    /// Minimum number of available participants, creator included.
    pub desired_member_count: usize,
}

impl RequestConfiguration {
    /// Check the preconditions the search cannot safely ignore.
    ///
    /// Malformed individual ranges are not errors here; they are skipped when
    /// the search space is walked.
    pub fn validate(&self) -> Result<()> {
        if self.date_ranges.is_empty() {
            return Err(SlotError::EmptyDateRanges);
        }
        if self.time_ranges.is_empty() {
            return Err(SlotError::EmptyTimeRanges);
        }
        if self.desired_duration_minutes == 0 {
            return Err(SlotError::InvalidConfiguration(
                "desired duration must be positive".to_string(),
            ));
        }
        if self.desired_member_count < 2 {
            return Err(SlotError::InvalidConfiguration(format!(
                "desired member count must be at least 2, got {}",
                self.desired_member_count
            )));
        }
        Ok(())
    }

    pub fn duration(&self) -> Duration {
        Duration::minutes(i64::from(self.desired_duration_minutes))
    }

    pub fn margin(&self) -> Duration {
        Duration::minutes(i64::from(self.desired_margin_minutes))
    }
}

// ---------------------------------------------------------------------------
// Availability and results
// ---------------------------------------------------------------------------

/// A time range during which a participant cannot meet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusyInterval {
    /// Title of the calendar item this interval was clipped from.
    pub title: String,
    /// Start of the busy period (inclusive).
    pub start: NaiveDateTime,
    /// End of the busy period (exclusive).
    pub end: NaiveDateTime,
}

impl BusyInterval {
    pub fn new(title: impl Into<String>, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            title: title.into(),
            start,
            end,
        }
    }
}

/// One participant's busy intervals, already clipped to a request's search space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantAvailability {
    /// Participant identifier, reported in [`CommonSlot::available_participants`].
    pub id: String,
    /// Display name.
    pub label: String,
    /// Busy intervals inside the search space.
    #[serde(default)]
    pub busy: Vec<BusyInterval>,
}

impl ParticipantAvailability {
    pub fn new(id: impl Into<String>, label: impl Into<String>, busy: Vec<BusyInterval>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            busy,
        }
    }

    /// True when no busy interval overlaps `[start, end)`.
    pub fn is_free(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        !self
            .busy
            .iter()
            .any(|interval| overlaps(interval.start, interval.end, start, end))
    }
}

/// A candidate meeting. `[start, end)` is the bare meeting, margins excluded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommonSlot {
    /// Meeting start (inclusive).
    pub start: NaiveDateTime,
    /// Meeting end (exclusive).
    pub end: NaiveDateTime,
    /// Ids of the participants free over the padded window, in input order.
    pub available_participants: Vec<String>,
}

impl CommonSlot {
    pub fn headcount(&self) -> usize {
        self.available_participants.len()
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    pub fn includes(&self, participant_id: &str) -> bool {
        self.available_participants
            .iter()
            .any(|id| id == participant_id)
    }
}
