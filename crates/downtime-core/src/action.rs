// SPDX-FileCopyrightText: 2026 Downtime Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only audit trail entries.
//!
//! Every workflow transition appends exactly one [`ActionRecord`] to the
//! ticket's history. Records are never edited or removed, so the history
//! replays to the ticket's current status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::status::TicketStatus;

/// What a single history entry says happened.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ActionKind {
    /// A maintainer began execution.
    Started,
    /// The maintainer declared the work done.
    Finished,
    /// A supervisor confirmed the fix.
    VerifiedOk,
    /// A supervisor rejected the fix.
    VerifiedNotOk,
    /// The ticket reached its terminal corrected state.
    Corrected,
    /// The ticket was sent back for rework.
    NotCorrected,
    /// The ticket was withdrawn.
    Canceled,
    /// Kept for histories written by earlier revisions of the workflow; no
    /// current transition emits it.
    Reopened,
    /// The expiration monitor closed the ticket.
    AutoExpired,
}

/// One immutable line of a ticket's history.
///
/// `status_before` and `status_after` snapshot the transition so the history
/// can be audited without re-deriving the state machine, and `attempt` pins
/// the verification cycle the entry belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub id: String,
    pub kind: ActionKind,
    pub actor_id: String,
    pub actor_name: String,
    pub at: DateTime<Utc>,
    #[serde(default)]
    pub note: Option<String>,
    pub attempt: u32,
    pub status_before: TicketStatus,
    pub status_after: TicketStatus,
}
