// SPDX-FileCopyrightText: 2026 Downtime Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User-facing outcome messages.
//!
//! Every public workflow operation emits exactly one [`Notice`] describing
//! its outcome, successful or not. Rule rejections that are expected in
//! normal use, such as starting ahead of the grace window, are advisories
//! rather than errors.

use async_trait::async_trait;

use crate::ticket::TicketId;

/// How a notice should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum Severity {
    /// The operation succeeded.
    Info,
    /// The operation was declined by a business rule; nothing is wrong.
    Advisory,
    /// The operation failed.
    Error,
}

/// A single message produced by one workflow operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Ticket the message is about, when one is in scope.
    pub ticket: Option<TicketId>,
    pub severity: Severity,
    pub message: String,
}

impl Notice {
    pub fn info(ticket: Option<TicketId>, message: impl Into<String>) -> Self {
        Self {
            ticket,
            severity: Severity::Info,
            message: message.into(),
        }
    }

    pub fn advisory(ticket: Option<TicketId>, message: impl Into<String>) -> Self {
        Self {
            ticket,
            severity: Severity::Advisory,
            message: message.into(),
        }
    }

    pub fn error(ticket: Option<TicketId>, message: impl Into<String>) -> Self {
        Self {
            ticket,
            severity: Severity::Error,
            message: message.into(),
        }
    }
}

/// Sink for operation outcome messages.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notice: Notice);
}
