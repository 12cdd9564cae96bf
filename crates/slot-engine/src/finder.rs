//! Common slot search across participants.
//!
//! A stepped scan: for every cell of the search space a probe walks forward
//! from the cell start in `step_minutes` increments. At each probe the padded
//! window is `[probe, probe + margin + duration + margin)` and the meeting is
//! the middle `[probe + margin, probe + margin + duration)`. A participant is
//! available when none of their busy intervals overlaps the padded window.
//! Probes whose padded window would run past the cell end stop the scan of
//! that cell.
//!
//! Overlapping candidates are not merged: adjacent probes that both qualify are
//! both returned.

use chrono::Duration;
use tracing::debug;

use crate::error::{Result, SlotError};
use crate::model::{CommonSlot, ParticipantAvailability, RequestConfiguration};
use crate::space::{Cell, SearchSpace};

/// Probe granularity used when the caller has no preference.
pub const DEFAULT_STEP_MINUTES: u32 = 15;

/// Find every candidate slot where at least `desired_member_count` participants
/// are free, sorted ascending by start.
///
/// Fewer registered participants than `desired_member_count` is not an error:
/// the result is empty and no search is performed. Inverted time ranges are
/// skipped.
///
/// # Errors
/// Returns a precondition error for an empty range list, a zero duration, a
/// member count below 2, or a zero `step_minutes`.
pub fn find_common(
    config: &RequestConfiguration,
    participants: &[ParticipantAvailability],
    step_minutes: u32,
) -> Result<Vec<CommonSlot>> {
    config.validate()?;
    if step_minutes == 0 {
        return Err(SlotError::InvalidConfiguration(
            "step must be at least one minute".to_string(),
        ));
    }
    let space = SearchSpace::for_request(config)?;

    if participants.len() < config.desired_member_count {
        debug!(
            participants = participants.len(),
            required = config.desired_member_count,
            "not enough participants to search"
        );
        return Ok(Vec::new());
    }

    let probe = Probe {
        margin: config.margin(),
        duration: config.duration(),
        step: Duration::minutes(i64::from(step_minutes)),
        required: config.desired_member_count,
    };

    let mut slots = Vec::new();
    for cell in space.cells() {
        probe.scan(&cell, participants, &mut slots);
    }
    slots.sort_by_key(|slot| slot.start);

    debug!(
        participants = participants.len(),
        slots = slots.len(),
        "common slot search finished"
    );
    Ok(slots)
}

struct Probe {
    margin: Duration,
    duration: Duration,
    step: Duration,
    required: usize,
}

impl Probe {
    fn scan(&self, cell: &Cell, participants: &[ParticipantAvailability], out: &mut Vec<CommonSlot>) {
        let mut padded_start = cell.start;
        while padded_start < cell.end {
            let meeting_start = padded_start + self.margin;
            let meeting_end = meeting_start + self.duration;
            let padded_end = meeting_end + self.margin;
            // Later probes end later still, so none of them fit either.
            if padded_end > cell.end {
                break;
            }

            let available: Vec<String> = participants
                .iter()
                .filter(|participant| participant.is_free(padded_start, padded_end))
                .map(|participant| participant.id.clone())
                .collect();

            if available.len() >= self.required {
                out.push(CommonSlot {
                    start: meeting_start,
                    end: meeting_end,
                    available_participants: available,
                });
            }

            padded_start += self.step;
        }
    }
}
