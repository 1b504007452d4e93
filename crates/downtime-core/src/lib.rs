// SPDX-FileCopyrightText: 2026 Downtime Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core domain types and adapter traits for the Downtime stoppage workflow.
//!
//! Everything other crates share lives here: the ticket document and its
//! status vocabulary, the append-only audit record, the store and
//! collaborator traits, and the error taxonomy. This crate carries no
//! storage or transition logic of its own.

pub mod action;
pub mod actor;
pub mod clock;
pub mod error;
pub mod notify;
pub mod planner;
pub mod status;
pub mod store;
pub mod ticket;

pub use action::{ActionKind, ActionRecord};
pub use actor::{Actor, Role, SYSTEM_ACTOR_ID, SYSTEM_ACTOR_NAME};
pub use clock::{Clock, SystemClock};
pub use error::{PlannerError, StoreError, WorkflowError};
pub use notify::{Notice, Notifier, Severity};
pub use planner::{IntervalPlanner, MaintenancePlanner};
pub use status::{ParseStatusError, StatusKind, TicketStatus};
pub use store::{
    FeedPublisher, TicketFeed, TicketFilter, TicketPatch, TicketStore, all_tickets, in_sector,
};
pub use ticket::{NewStoppage, PartRef, StoppageTicket, TicketId};
