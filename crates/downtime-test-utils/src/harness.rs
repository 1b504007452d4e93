// SPDX-FileCopyrightText: 2026 Downtime Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end workflow testing.
//!
//! `WorkflowHarness` assembles a complete workflow stack: in-memory ticket
//! store behind a connectivity-simulating wrapper, pinned clock, recording
//! notifier, and mock planner. Tests drive the engine directly and assert
//! against the captured side channels.

use std::sync::Arc;

use chrono::{DateTime, NaiveTime, Utc};

use downtime_core::actor::Actor;
use downtime_core::error::WorkflowError;
use downtime_core::ticket::{NewStoppage, StoppageTicket};
use downtime_store::MemoryTicketStore;
use downtime_workflow::engine::WorkflowEngine;

use crate::clock::FixedClock;
use crate::fixtures;
use crate::flaky_store::FlakyStore;
use crate::mock_notifier::MockNotifier;
use crate::mock_planner::MockPlanner;

/// Instant most harness tests begin at: before the fixture windows open.
pub const DEFAULT_TEST_INSTANT: &str = "2026-03-05T08:00:00Z";

/// A complete workflow test environment.
pub struct WorkflowHarness {
    pub engine: Arc<WorkflowEngine>,
    pub store: Arc<FlakyStore<MemoryTicketStore>>,
    pub clock: Arc<FixedClock>,
    pub notifier: Arc<MockNotifier>,
    pub planner: Arc<MockPlanner>,
}

impl WorkflowHarness {
    /// Harness with the clock pinned to [`DEFAULT_TEST_INSTANT`].
    pub fn new() -> Self {
        Self::starting_at(
            DEFAULT_TEST_INSTANT
                .parse()
                .expect("default instant parses"),
        )
    }

    pub fn starting_at(now: DateTime<Utc>) -> Self {
        let store = Arc::new(FlakyStore::new(MemoryTicketStore::new()));
        let clock = Arc::new(FixedClock::at(now));
        let notifier = Arc::new(MockNotifier::new());
        let planner = Arc::new(MockPlanner::new());
        let engine = Arc::new(WorkflowEngine::new(
            store.clone(),
            clock.clone(),
            notifier.clone(),
            planner.clone(),
        ));
        Self {
            engine,
            store,
            clock,
            notifier,
            planner,
        }
    }

    /// Opens a fixture stoppage with the given daily window, reported by
    /// [`fixtures::reporter`].
    pub async fn open_window(
        &self,
        scheduled_start: NaiveTime,
        scheduled_end: NaiveTime,
    ) -> Result<StoppageTicket, WorkflowError> {
        self.open(fixtures::stoppage(scheduled_start, scheduled_end))
            .await
    }

    /// Opens an arbitrary stoppage, reported by [`fixtures::reporter`].
    pub async fn open(&self, new: NewStoppage) -> Result<StoppageTicket, WorkflowError> {
        self.engine.open(new, &fixtures::reporter()).await
    }

    /// Shorthand for the reporter identity used by [`Self::open`].
    pub fn reporter(&self) -> Actor {
        fixtures::reporter()
    }
}

impl Default for WorkflowHarness {
    fn default() -> Self {
        Self::new()
    }
}
