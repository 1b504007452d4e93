// SPDX-FileCopyrightText: 2026 Downtime Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Audit trail construction and replay.
//!
//! Each transition appends exactly one [`ActionRecord`]; records are never
//! edited. `status_before` and `attempt` are captured from the ticket as it
//! was read, so the trail shows the state every decision was made against.

use chrono::{DateTime, Utc};
use thiserror::Error;

use downtime_core::action::{ActionKind, ActionRecord};
use downtime_core::status::TicketStatus;
use downtime_core::ticket::StoppageTicket;

/// Builds the audit record for a transition on `ticket`.
pub fn build_record(
    ticket: &StoppageTicket,
    kind: ActionKind,
    actor_id: &str,
    actor_name: &str,
    at: DateTime<Utc>,
    note: Option<String>,
    status_after: TicketStatus,
) -> ActionRecord {
    ActionRecord {
        id: uuid::Uuid::new_v4().to_string(),
        kind,
        actor_id: actor_id.to_owned(),
        actor_name: actor_name.to_owned(),
        at,
        note,
        attempt: ticket.attempt,
        status_before: ticket.status,
        status_after,
    }
}

/// Status reached by replaying `history` from the initial awaiting state.
pub fn replay_status(history: &[ActionRecord]) -> TicketStatus {
    history
        .last()
        .map_or(TicketStatus::Awaiting, |record| record.status_after)
}

/// A history that does not form a connected chain.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChainError {
    #[error("record {index} starts from `{found}` but the ticket was `{expected}` at that point")]
    BrokenLink {
        index: usize,
        expected: TicketStatus,
        found: TicketStatus,
    },
    #[error("history replays to `{replayed}` but the stored status is `{stored}`")]
    StatusMismatch {
        replayed: TicketStatus,
        stored: TicketStatus,
    },
}

/// Checks that the history chains from `awaiting` to the stored status.
///
/// Every `status_before` must equal the previous record's `status_after`,
/// and the final link must land on the ticket's current status. Holds for
/// every document this workflow has written; a violation means the stored
/// data was tampered with or corrupted in transit.
pub fn verify_chain(ticket: &StoppageTicket) -> Result<(), ChainError> {
    let mut current = TicketStatus::Awaiting;
    for (index, record) in ticket.history.iter().enumerate() {
        if record.status_before != current {
            return Err(ChainError::BrokenLink {
                index,
                expected: current,
                found: record.status_before,
            });
        }
        current = record.status_after;
    }
    if current == ticket.status {
        Ok(())
    } else {
        Err(ChainError::StatusMismatch {
            replayed: current,
            stored: ticket.status,
        })
    }
}
