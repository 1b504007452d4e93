// SPDX-FileCopyrightText: 2026 Downtime Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Seam to the asset-maintenance planner.
//!
//! When a verified fix repaired a tracked equipment part, the workflow tells
//! the planner the maintenance was performed and receives the next due date.
//! The call happens after the ticket's own transition has committed and its
//! failure never rolls the ticket back.

use async_trait::async_trait;
use chrono::{Days, NaiveDate};

use crate::error::PlannerError;
use crate::ticket::PartRef;

/// Records performed maintenance and schedules the follow-up.
#[async_trait]
pub trait MaintenancePlanner: Send + Sync {
    /// Registers that `part` was serviced on `performed_on` and returns the
    /// next date the part is due for maintenance.
    async fn record_maintenance(
        &self,
        part: &PartRef,
        performed_on: NaiveDate,
    ) -> Result<NaiveDate, PlannerError>;
}

/// Planner that schedules the next service a fixed number of days out.
///
/// Stands in for plants without an asset-maintenance system of record.
#[derive(Debug, Clone, Copy)]
pub struct IntervalPlanner {
    every_days: u32,
}

impl IntervalPlanner {
    pub fn new(every_days: u32) -> Self {
        Self { every_days }
    }
}

impl Default for IntervalPlanner {
    fn default() -> Self {
        Self { every_days: 30 }
    }
}

#[async_trait]
impl MaintenancePlanner for IntervalPlanner {
    async fn record_maintenance(
        &self,
        part: &PartRef,
        performed_on: NaiveDate,
    ) -> Result<NaiveDate, PlannerError> {
        let due = performed_on
            .checked_add_days(Days::new(u64::from(self.every_days)))
            .ok_or_else(|| PlannerError::new("next due date out of calendar range"))?;
        tracing::debug!(part = %part.part_id, next_due = %due, "maintenance recorded");
        Ok(due)
    }
}
