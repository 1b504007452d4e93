// SPDX-FileCopyrightText: 2026 Downtime Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tracing-backed notifier for the service binary.

use async_trait::async_trait;
use tracing::{error, info};

use downtime_core::notify::{Notice, Notifier, Severity};

/// Notifier that writes every operation outcome to the service log.
///
/// Plants without a wired-up andon or paging channel still get a full
/// record of workflow outcomes this way.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, notice: Notice) {
        let ticket = notice.ticket.as_ref().map(|id| id.as_str());
        match notice.severity {
            Severity::Info | Severity::Advisory => {
                info!(severity = %notice.severity, ticket, "{}", notice.message);
            }
            Severity::Error => {
                error!(severity = %notice.severity, ticket, "{}", notice.message);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use downtime_core::ticket::TicketId;

    #[tokio::test]
    async fn notifier_accepts_every_severity() {
        let notifier = LogNotifier;
        notifier.notify(Notice::info(None, "repair verified")).await;
        notifier
            .notify(Notice::advisory(
                Some(TicketId::from("t-1")),
                "too early to start",
            ))
            .await;
        notifier
            .notify(Notice::error(Some(TicketId::from("t-2")), "store rejected the update"))
            .await;
    }
}
