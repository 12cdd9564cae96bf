//! # slot-engine
//!
//! Finds meeting times that fit a group's existing calendar commitments.
//!
//! The engine is three pure stages, each usable on its own:
//!
//! 1. [`expander`] — calendar items and recurring stamp templates → concrete
//!    occurrences within a day window.
//! 2. [`projector`] — one participant's occurrences → busy intervals clipped to a
//!    request's date ranges × daily time windows.
//! 3. [`finder`] — every participant's busy intervals → candidate slots of the
//!    desired duration, with margins, meeting a minimum headcount.
//!
//! Date-times are timezone-naive local times; days step by calendar date, not
//! by 24-hour offsets.
//!
//! ## Modules
//!
//! - [`model`] — calendar items, request configuration, slots
//! - [`space`] — the search-space grid shared by projector and finder
//! - [`expander`] — stamp expansion
//! - [`projector`] — availability projection
//! - [`finder`] — common slot search
//! - [`request`] — scheduling request lifecycle and confirmation
//! - [`error`] — error types

pub mod error;
pub mod expander;
pub mod finder;
pub mod model;
pub mod projector;
pub mod request;
pub mod space;

pub use error::SlotError;
pub use expander::expand;
pub use finder::{find_common, DEFAULT_STEP_MINUTES};
pub use model::{
    BusyInterval, CalendarItem, CommonSlot, DateRange, DayKey, ItemKind, ParticipantAvailability,
    RepeatRule, RequestConfiguration, TimeRange,
};
pub use projector::{project, project_for_request};
pub use request::{Confirmation, RequestStatus, SchedulingRequest};
