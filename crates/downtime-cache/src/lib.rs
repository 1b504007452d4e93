// SPDX-FileCopyrightText: 2026 Downtime Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Offline cache for the stoppage ticket store.
//!
//! Plant-floor terminals lose connectivity to the authoritative store;
//! stoppages do not wait for it to come back. This crate keeps a local
//! SQLite copy of the world and a durable queue of writes made while
//! offline:
//!
//! - [`database::Database`]: single-connection SQLite handle, WAL mode,
//!   embedded migrations.
//! - [`queries::mirror`]: last confirmed snapshot of every ticket.
//! - [`queries::pending`]: crash-safe FIFO queue of offline writes.
//! - [`bridge::CachedTicketStore`]: `TicketStore` wrapper gluing the three
//!   to a remote store, with [`bridge::CachedTicketStore::reconcile`] to
//!   replay the queue after an outage.

pub mod bridge;
pub mod database;
pub mod migrations;
pub mod queries;

pub use bridge::{CachedTicketStore, ReconcileReport};
pub use database::Database;
