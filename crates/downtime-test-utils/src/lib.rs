// SPDX-FileCopyrightText: 2026 Downtime Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Downtime integration tests.
//!
//! Provides mock adapters and a workflow harness for fast, deterministic,
//! CI-runnable tests without wall-clock dependence or external services.
//!
//! # Components
//!
//! - [`FixedClock`] - Manually advanced clock pinned to a chosen instant
//! - [`MockNotifier`] - Records every notice for later assertion
//! - [`MockPlanner`] - Scripted maintenance planner (fixed due date or failure)
//! - [`FlakyStore`] - Store wrapper that simulates connectivity loss
//! - [`WorkflowHarness`] - Fully wired engine over the mocks above

pub mod clock;
pub mod fixtures;
pub mod flaky_store;
pub mod harness;
pub mod mock_notifier;
pub mod mock_planner;

pub use clock::FixedClock;
pub use flaky_store::FlakyStore;
pub use harness::WorkflowHarness;
pub use mock_notifier::MockNotifier;
pub use mock_planner::MockPlanner;
