// SPDX-FileCopyrightText: 2026 Downtime Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules for the mirror table and the pending-write queue.

pub mod mirror;
pub mod pending;
