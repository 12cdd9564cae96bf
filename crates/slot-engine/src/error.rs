//! Error types for slot-engine operations.
//!
//! Malformed calendar data (inverted intervals, inverted time ranges, a repeat
//! end before the template start) never reaches this type: it is skipped with a
//! warning. Only configuration that leaves the search space undefined, and
//! request lifecycle violations, are reported as errors.

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::request::RequestStatus;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SlotError {
    #[error("Request has no date ranges")]
    EmptyDateRanges,

    #[error("Request has no time ranges")]
    EmptyTimeRanges,

    #[error("Invalid time of day '{0}': expected HH:mm")]
    InvalidTimeOfDay(String),

    #[error("Invalid request configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Invalid slot: end {end} is not after start {start}")]
    InvalidSlot {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },

    #[error("Only the creator may confirm this request")]
    NotCreator,

    #[error("Request is already confirmed with a different slot")]
    AlreadyConfirmed,

    #[error("Request is {0} and no longer accepts changes")]
    RequestFinalized(RequestStatus),
}

pub type Result<T> = std::result::Result<T, SlotError>;
