// SPDX-FileCopyrightText: 2026 Downtime Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Stoppage resolution workflow.
//!
//! The state machine that takes a reported equipment stoppage from awaiting
//! through execution, verification, rework cycles, and closure:
//!
//! - [`guard`]: pure eligibility rules (early-start grace, window
//!   expiration, role and identity checks).
//! - [`audit`]: append-only action records and history replay.
//! - [`engine`]: the guarded transition functions.
//! - [`monitor`]: the periodic sweep that closes missed windows.
//! - [`shutdown`]: signal handling for the long-running tasks.

pub mod audit;
pub mod engine;
pub mod guard;
pub mod monitor;
pub mod shutdown;

pub use engine::{AUTO_EXPIRE_NOTE, StartOutcome, VerifyOutcome, WorkflowEngine};
pub use guard::{EARLY_START_GRACE_MINUTES, StartEligibility};
pub use monitor::{ExpirationMonitor, SweepReport};
