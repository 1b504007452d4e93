// SPDX-FileCopyrightText: 2026 Downtime Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ticket store implementations.
//!
//! [`MemoryTicketStore`] is the authoritative in-process store. Deployments
//! that need to ride out store outages wrap it (or any other
//! [`downtime_core::store::TicketStore`]) in the offline cache from the
//! `downtime-cache` crate.

mod memory;

pub use memory::MemoryTicketStore;
