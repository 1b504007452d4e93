// SPDX-FileCopyrightText: 2026 Downtime Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The stoppage ticket document.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::action::ActionRecord;
use crate::status::TicketStatus;

/// Unique identifier of a stoppage ticket.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TicketId(pub String);

impl TicketId {
    /// Fresh random identifier for a newly reported stoppage.
    pub fn random() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TicketId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for TicketId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A reported equipment stoppage and everything recorded about resolving it.
///
/// The scheduled window (`scheduled_start`..`scheduled_end`, optionally pinned
/// to `scheduled_date`) is plant-local wall-clock time and drives the
/// early-start and expiration rules. `execution_started_at` is set once, on
/// the first start, and survives rework cycles; `execution_ended_at` moves to
/// the latest finish so elapsed time always spans from the original start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoppageTicket {
    pub id: TicketId,
    pub equipment: String,
    pub sector: String,
    #[serde(default)]
    pub asset_id: Option<String>,
    #[serde(default)]
    pub part_id: Option<String>,
    #[serde(default)]
    pub subpart_id: Option<String>,
    pub description: String,
    #[serde(default)]
    pub notes: Option<String>,
    pub scheduled_start: NaiveTime,
    pub scheduled_end: NaiveTime,
    #[serde(default)]
    pub scheduled_date: Option<NaiveDate>,
    #[serde(default)]
    pub execution_started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub execution_ended_at: Option<DateTime<Utc>>,
    /// Whole seconds between start and finish of execution.
    #[serde(default)]
    pub total_elapsed_secs: Option<i64>,
    pub status: TicketStatus,
    /// Verification cycle the ticket is on. Starts at 1 and is advanced by
    /// each failed verification; never reset.
    pub attempt: u32,
    /// Set when execution started after the scheduled window had opened.
    #[serde(default)]
    pub is_late: bool,
    #[serde(default)]
    pub applied_solution: Option<String>,
    #[serde(default)]
    pub verification_note: Option<String>,
    pub reported_by_id: String,
    pub reported_by_name: String,
    #[serde(default)]
    pub assigned_maintainer_id: Option<String>,
    #[serde(default)]
    pub assigned_maintainer_name: Option<String>,
    #[serde(default)]
    pub history: Vec<ActionRecord>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoppageTicket {
    /// True when `actor_id` is the maintainer the ticket is assigned to.
    pub fn is_assigned_to(&self, actor_id: &str) -> bool {
        self.assigned_maintainer_id.as_deref() == Some(actor_id)
    }

    /// The equipment part this ticket is linked to, when one was reported.
    pub fn part_ref(&self) -> Option<PartRef> {
        self.part_id.as_ref().map(|part_id| PartRef {
            asset_id: self.asset_id.clone(),
            part_id: part_id.clone(),
            subpart_id: self.subpart_id.clone(),
        })
    }
}

/// Reference to the piece of equipment a corrected ticket repaired, handed to
/// the maintenance planner for follow-up scheduling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartRef {
    pub asset_id: Option<String>,
    pub part_id: String,
    pub subpart_id: Option<String>,
}

/// Fields supplied when reporting a new stoppage.
#[derive(Debug, Clone)]
pub struct NewStoppage {
    pub equipment: String,
    pub sector: String,
    pub description: String,
    pub notes: Option<String>,
    pub asset_id: Option<String>,
    pub part_id: Option<String>,
    pub subpart_id: Option<String>,
    pub scheduled_start: NaiveTime,
    pub scheduled_end: NaiveTime,
    /// Calendar day the window applies to. `None` means every day until the
    /// ticket is resolved.
    pub scheduled_date: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_ticket() -> StoppageTicket {
        StoppageTicket {
            id: TicketId::from("t-1"),
            equipment: "press-04".into(),
            sector: "stamping".into(),
            asset_id: None,
            part_id: None,
            subpart_id: None,
            description: "hydraulic pressure loss".into(),
            notes: None,
            scheduled_start: NaiveTime::from_hms_opt(9, 0, 0).expect("time"),
            scheduled_end: NaiveTime::from_hms_opt(11, 0, 0).expect("time"),
            scheduled_date: None,
            execution_started_at: None,
            execution_ended_at: None,
            total_elapsed_secs: None,
            status: TicketStatus::Awaiting,
            attempt: 1,
            is_late: false,
            applied_solution: None,
            verification_note: None,
            reported_by_id: "op-7".into(),
            reported_by_name: "Iris".into(),
            assigned_maintainer_id: None,
            assigned_maintainer_name: None,
            history: Vec::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn part_ref_requires_a_part_id() {
        let mut ticket = minimal_ticket();
        assert_eq!(ticket.part_ref(), None);

        ticket.asset_id = Some("asset-9".into());
        ticket.part_id = Some("pump".into());
        let part = ticket.part_ref().expect("part reference");
        assert_eq!(part.part_id, "pump");
        assert_eq!(part.asset_id.as_deref(), Some("asset-9"));
        assert_eq!(part.subpart_id, None);
    }

    #[test]
    fn assignment_check_matches_exact_id() {
        let mut ticket = minimal_ticket();
        assert!(!ticket.is_assigned_to("m-1"));
        ticket.assigned_maintainer_id = Some("m-1".into());
        assert!(ticket.is_assigned_to("m-1"));
        assert!(!ticket.is_assigned_to("m-2"));
    }

    #[test]
    fn document_round_trips_and_tolerates_missing_optionals() {
        let ticket = minimal_ticket();
        let json = serde_json::to_value(&ticket).expect("serialize");
        let back: StoppageTicket = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, ticket);

        // Documents written before the late flag existed still load.
        let mut trimmed = serde_json::to_value(&ticket).expect("serialize");
        trimmed.as_object_mut().expect("object").remove("is_late");
        trimmed.as_object_mut().expect("object").remove("history");
        let back: StoppageTicket = serde_json::from_value(trimmed).expect("deserialize");
        assert!(!back.is_late);
        assert!(back.history.is_empty());
    }
}
