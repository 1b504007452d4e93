// SPDX-FileCopyrightText: 2026 Downtime Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Expiration monitor.
//!
//! A periodic sweep over awaiting tickets that force-closes the ones whose
//! scheduled window elapsed without execution starting. The monitor never
//! writes directly: it hands each candidate to
//! [`WorkflowEngine::auto_expire`], whose conditional write guarantees a
//! last-second human start is never clobbered.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use downtime_core::clock::Clock;
use downtime_core::error::WorkflowError;
use downtime_core::status::StatusKind;
use downtime_core::store::TicketStore;

use crate::engine::WorkflowEngine;
use crate::guard;

/// What one sweep did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Awaiting tickets examined.
    pub scanned: usize,
    /// Tickets transitioned to auto-expired.
    pub expired: usize,
    /// Tickets past their window that could not be expired, because a
    /// concurrent transition won or the individual write failed.
    pub skipped: usize,
}

/// Periodic background sweep closing missed repair windows.
pub struct ExpirationMonitor {
    engine: Arc<WorkflowEngine>,
    store: Arc<dyn TicketStore>,
    clock: Arc<dyn Clock>,
    interval: Duration,
}

impl ExpirationMonitor {
    pub fn new(
        engine: Arc<WorkflowEngine>,
        store: Arc<dyn TicketStore>,
        clock: Arc<dyn Clock>,
        interval: Duration,
    ) -> Self {
        Self {
            engine,
            store,
            clock,
            interval,
        }
    }

    /// Runs the sweep loop until `cancel` fires.
    ///
    /// Sweep failures are logged and the loop keeps going; a transient store
    /// outage must not kill the monitor.
    pub async fn run(self, cancel: CancellationToken) {
        let mut interval = tokio::time::interval(self.interval);
        // Skip the first immediate tick.
        interval.tick().await;

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    match self.sweep().await {
                        Ok(report) if report.expired > 0 || report.skipped > 0 => {
                            info!(
                                scanned = report.scanned,
                                expired = report.expired,
                                skipped = report.skipped,
                                "expiration sweep finished"
                            );
                        }
                        Ok(report) => {
                            debug!(scanned = report.scanned, "expiration sweep found nothing due");
                        }
                        Err(err) => {
                            warn!(error = %err, "expiration sweep failed");
                        }
                    }
                }
                _ = cancel.cancelled() => {
                    info!("expiration monitor shutting down");
                    break;
                }
            }
        }
    }

    /// Performs one sweep over the awaiting tickets.
    ///
    /// Idempotent: tickets already expired are no longer awaiting and fall
    /// out of the scan, so repeated sweeps change nothing.
    pub async fn sweep(&self) -> Result<SweepReport, WorkflowError> {
        let awaiting = self.store.list(Some(StatusKind::Awaiting)).await?;
        let now = self.clock.now();
        let mut report = SweepReport {
            scanned: awaiting.len(),
            ..SweepReport::default()
        };
        for ticket in awaiting {
            if !guard::is_expired(ticket.scheduled_end, ticket.scheduled_date, now) {
                continue;
            }
            match self.engine.auto_expire(&ticket.id).await {
                Ok(Some(_)) => report.expired += 1,
                Ok(None) => report.skipped += 1,
                Err(err) => {
                    warn!(
                        ticket = ticket.id.as_str(),
                        error = %err,
                        "could not expire ticket"
                    );
                    report.skipped += 1;
                }
            }
        }
        Ok(report)
    }
}
