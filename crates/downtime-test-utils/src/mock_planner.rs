// SPDX-FileCopyrightText: 2026 Downtime Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Maintenance planner double.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use chrono::{Days, NaiveDate};

use downtime_core::error::PlannerError;
use downtime_core::planner::MaintenancePlanner;
use downtime_core::ticket::PartRef;

#[derive(Debug, Clone)]
enum PlannerMode {
    DueInDays(u64),
    Fail(String),
}

/// Planner that records calls and answers with a configurable outcome.
#[derive(Debug)]
pub struct MockPlanner {
    mode: Mutex<PlannerMode>,
    calls: Mutex<Vec<(PartRef, NaiveDate)>>,
}

impl MockPlanner {
    /// Succeeds with a due date 30 days out.
    pub fn new() -> Self {
        Self {
            mode: Mutex::new(PlannerMode::DueInDays(30)),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn set_due_in_days(&self, days: u64) {
        *lock(&self.mode) = PlannerMode::DueInDays(days);
    }

    /// Makes every following call fail, for exercising the best-effort
    /// post-commit path.
    pub fn set_failing(&self, message: impl Into<String>) {
        *lock(&self.mode) = PlannerMode::Fail(message.into());
    }

    /// Every `(part, performed_on)` pair received so far.
    pub fn calls(&self) -> Vec<(PartRef, NaiveDate)> {
        lock(&self.calls).clone()
    }
}

impl Default for MockPlanner {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl MaintenancePlanner for MockPlanner {
    async fn record_maintenance(
        &self,
        part: &PartRef,
        performed_on: NaiveDate,
    ) -> Result<NaiveDate, PlannerError> {
        lock(&self.calls).push((part.clone(), performed_on));
        let mode = lock(&self.mode).clone();
        match mode {
            PlannerMode::DueInDays(days) => performed_on
                .checked_add_days(Days::new(days))
                .ok_or_else(|| PlannerError::new("due date out of calendar range")),
            PlannerMode::Fail(message) => Err(PlannerError::new(message)),
        }
    }
}
