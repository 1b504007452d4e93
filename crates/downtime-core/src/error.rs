// SPDX-FileCopyrightText: 2026 Downtime Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types shared across the workspace.
//!
//! Two layers are kept apart on purpose: [`StoreError`] is what a ticket
//! store implementation can say about a document operation, and
//! [`WorkflowError`] is what a workflow transition can say about a request.
//! Store failures bubble into the workflow layer through
//! `WorkflowError::Store`.

use thiserror::Error;

use crate::status::TicketStatus;
use crate::ticket::TicketId;

/// Failures surfaced by [`crate::store::TicketStore`] implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The authoritative store cannot be reached. `queued` is true when a
    /// write-behind layer accepted the operation for later replay.
    #[error("ticket store unreachable")]
    Unreachable { queued: bool },

    /// A conditional update found the ticket in a different status than the
    /// caller expected. The caller lost a race and must re-read.
    #[error("concurrent update: expected status `{expected}`, found `{found}`")]
    Conflict {
        expected: TicketStatus,
        found: TicketStatus,
    },

    /// Create was called with an identifier that is already present.
    #[error("ticket already exists: {id}")]
    AlreadyExists { id: TicketId },

    /// Update was called for an identifier that is not in the store.
    #[error("no such ticket: {id}")]
    NotFound { id: TicketId },

    /// Anything else the backend reports (I/O, serialization, SQL).
    #[error("storage backend error: {source}")]
    Backend {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl StoreError {
    /// Wraps an arbitrary backend failure.
    pub fn backend<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Backend {
            source: Box::new(source),
        }
    }

    /// True when the operation was absorbed by an offline queue and will be
    /// replayed once the store is reachable again.
    pub fn is_queued(&self) -> bool {
        matches!(self, Self::Unreachable { queued: true })
    }
}

/// Failures surfaced by workflow transitions.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// The referenced ticket does not exist in the store.
    #[error("ticket not found: {id}")]
    NotFound { id: TicketId },

    /// The ticket is not in a status from which the requested transition is
    /// defined. Includes replays of an already-applied transition.
    #[error("cannot {action} while ticket is `{status}`")]
    InvalidState {
        action: &'static str,
        status: TicketStatus,
    },

    /// A required input field is missing or malformed.
    #[error("invalid input: {0}")]
    Validation(String),

    /// The acting identity is not allowed to perform this transition.
    #[error("not allowed: {reason}")]
    Denied { reason: String },

    /// The store failed underneath the transition.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A stored document could not be interpreted. Surfaced instead of
    /// guessing at a default status.
    #[error("stored ticket data is malformed: {0}")]
    Corrupt(String),
}

impl WorkflowError {
    /// Shorthand for a validation failure.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Shorthand for a role or assignment guard failure.
    pub fn denied(reason: impl Into<String>) -> Self {
        Self::Denied {
            reason: reason.into(),
        }
    }
}

/// Failure reported by the asset-maintenance collaborator when a corrected
/// part could not be scheduled for follow-up.
#[derive(Debug, Error)]
#[error("maintenance planner error: {message}")]
pub struct PlannerError {
    pub message: String,
}

impl PlannerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
