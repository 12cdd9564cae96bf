//! Scheduling request lifecycle.
//!
//! A [`SchedulingRequest`] is a plain value owned by the caller; persisting it
//! and notifying participants happen elsewhere. It ties the three stages
//! together: participants submit calendars (projected onto the request's search
//! space), the creator calculates common slots, then confirms one.
//!
//! ```text
//! pending ──(enough participants)──► pending_calculation
//!    │                                   │
//!    └──────────── calculate ────────────┴──► results_ready | no_slots_found
//!                                                   │
//!                                               confirm ──► confirmed
//! any state ── close ──► closed
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Result, SlotError};
use crate::finder;
use crate::model::{CalendarItem, CommonSlot, ParticipantAvailability, RequestConfiguration};
use crate::projector;

/// Title prefix of the calendar entries created on confirmation.
pub const CONFIRMED_TITLE_PREFIX: &str = "Hangout";

/// Color of the calendar entries created on confirmation.
pub const CONFIRMED_COLOR: &str = "#38A169";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    #[default]
    Pending,
    PendingCalculation,
    ResultsReady,
    NoSlotsFound,
    Confirmed,
    Closed,
}

impl RequestStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::PendingCalculation => "pending_calculation",
            RequestStatus::ResultsReady => "results_ready",
            RequestStatus::NoSlotsFound => "no_slots_found",
            RequestStatus::Confirmed => "confirmed",
            RequestStatus::Closed => "closed",
        }
    }

    /// Confirmed and closed requests accept no further submissions or calculations.
    pub fn is_final(self) -> bool {
        matches!(self, RequestStatus::Confirmed | RequestStatus::Closed)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The outcome of confirming a slot: the slot itself plus one calendar entry
/// for each participant available in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Confirmation {
    pub slot: CommonSlot,
    pub calendar_entries: Vec<CalendarItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulingRequest {
    pub id: String,
    pub name: String,
    pub creator_id: String,
    #[serde(default)]
    pub status: RequestStatus,
    pub config: RequestConfiguration,
    #[serde(default)]
    pub participants: BTreeMap<String, ParticipantAvailability>,
    #[serde(default)]
    pub common_slots: Vec<CommonSlot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_slot: Option<CommonSlot>,
}

impl SchedulingRequest {
    /// Create a pending request.
    ///
    /// # Errors
    /// Returns the configuration's validation error, if any.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        creator_id: impl Into<String>,
        config: RequestConfiguration,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            id: id.into(),
            name: name.into(),
            creator_id: creator_id.into(),
            status: RequestStatus::Pending,
            config,
            participants: BTreeMap::new(),
            common_slots: Vec::new(),
            final_slot: None,
        })
    }

    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    pub fn has_enough_participants(&self) -> bool {
        self.participant_count() >= self.config.desired_member_count
    }

    /// Project a participant's calendar onto this request and store the result,
    /// replacing any earlier submission by the same participant.
    pub fn submit(
        &mut self,
        participant_id: &str,
        label: &str,
        items: &[CalendarItem],
    ) -> Result<&ParticipantAvailability> {
        self.ensure_open()?;

        let busy = projector::project_for_request(items, &self.config)?;
        debug!(
            request = %self.id,
            participant = participant_id,
            busy = busy.len(),
            "participant availability submitted"
        );
        self.participants.insert(
            participant_id.to_string(),
            ParticipantAvailability::new(participant_id, label, busy),
        );

        if self.status == RequestStatus::Pending && self.has_enough_participants() {
            self.status = RequestStatus::PendingCalculation;
        }

        Ok(&self.participants[participant_id])
    }

    /// Run the common slot search over the submitted availabilities.
    ///
    /// With too few participants the status is left as is and the result is
    /// empty; otherwise the status reflects whether any slot was found.
    pub fn calculate(&mut self, step_minutes: u32) -> Result<&[CommonSlot]> {
        self.ensure_open()?;

        let participants: Vec<ParticipantAvailability> =
            self.participants.values().cloned().collect();
        let slots = finder::find_common(&self.config, &participants, step_minutes)?;

        if self.has_enough_participants() {
            self.status = if slots.is_empty() {
                RequestStatus::NoSlotsFound
            } else {
                RequestStatus::ResultsReady
            };
        }
        self.common_slots = slots;

        info!(
            request = %self.id,
            status = %self.status,
            slots = self.common_slots.len(),
            "common slots calculated"
        );
        Ok(&self.common_slots)
    }

    /// Confirm `slot` on behalf of `caller_id`.
    ///
    /// Confirming the already-confirmed slot again returns the same outcome.
    /// Entry ids are derived from the request and participant ids, so callers
    /// can write them idempotently.
    ///
    /// # Errors
    /// - `SlotError::NotCreator` if `caller_id` did not create the request.
    /// - `SlotError::InvalidSlot` if the slot does not end after it starts.
    /// - `SlotError::AlreadyConfirmed` if a different slot was confirmed.
    /// - `SlotError::RequestFinalized` if the request is closed.
    pub fn confirm(&mut self, caller_id: &str, slot: &CommonSlot) -> Result<Confirmation> {
        if caller_id != self.creator_id {
            return Err(SlotError::NotCreator);
        }
        if slot.end <= slot.start {
            return Err(SlotError::InvalidSlot {
                start: slot.start,
                end: slot.end,
            });
        }

        match self.status {
            RequestStatus::Closed => return Err(SlotError::RequestFinalized(self.status)),
            RequestStatus::Confirmed => {
                return match &self.final_slot {
                    Some(existing) if existing.start == slot.start && existing.end == slot.end => {
                        debug!(request = %self.id, "request already confirmed with this slot");
                        Ok(self.confirmation_for(existing))
                    }
                    _ => Err(SlotError::AlreadyConfirmed),
                };
            }
            _ => {}
        }

        self.status = RequestStatus::Confirmed;
        self.final_slot = Some(slot.clone());

        let confirmation = self.confirmation_for(slot);
        info!(
            request = %self.id,
            start = %slot.start,
            end = %slot.end,
            participants = confirmation.calendar_entries.len(),
            "request confirmed"
        );
        Ok(confirmation)
    }

    pub fn close(&mut self) {
        self.status = RequestStatus::Closed;
    }

    fn ensure_open(&self) -> Result<()> {
        if self.status.is_final() {
            return Err(SlotError::RequestFinalized(self.status));
        }
        Ok(())
    }

    fn confirmation_for(&self, slot: &CommonSlot) -> Confirmation {
        let title = format!("{}: {}", CONFIRMED_TITLE_PREFIX, self.name);
        let calendar_entries = slot
            .available_participants
            .iter()
            .map(|participant_id| {
                CalendarItem::plain(
                    format!("{}_{}", self.id, participant_id),
                    title.clone(),
                    slot.start,
                    slot.end,
                )
                .with_color(CONFIRMED_COLOR)
                .with_request_id(self.id.clone())
            })
            .collect();

        Confirmation {
            slot: slot.clone(),
            calendar_entries,
        }
    }
}
