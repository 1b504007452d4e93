// SPDX-FileCopyrightText: 2026 Downtime Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Offline cache bridge over an authoritative ticket store.
//!
//! [`CachedTicketStore`] passes every call through to the remote store.
//! When the remote is unreachable, reads are served from the local SQLite
//! mirror and writes are queued for replay; the caller still sees
//! `StoreError::Unreachable` so nothing pretends a queued write committed.
//! [`CachedTicketStore::reconcile`] replays the queue once connectivity is
//! back, and [`CachedTicketStore::spawn_mirror_task`] keeps the mirror
//! following the remote's feed.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use downtime_core::error::StoreError;
use downtime_core::status::{StatusKind, TicketStatus};
use downtime_core::store::{TicketFeed, TicketFilter, TicketPatch, TicketStore, all_tickets};
use downtime_core::ticket::{StoppageTicket, TicketId};

use crate::database::Database;
use crate::queries::mirror;
use crate::queries::pending::{self, PendingOp};

/// Outcome of one [`CachedTicketStore::reconcile`] run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Queued writes the remote accepted.
    pub replayed: usize,
    /// Queued writes the remote rejected; the authoritative state won.
    pub rejected: usize,
    /// Tickets refreshed into the mirror afterwards.
    pub refreshed: usize,
}

/// Ticket store wrapper that rides out remote outages.
pub struct CachedTicketStore {
    remote: Arc<dyn TicketStore>,
    db: Database,
}

impl CachedTicketStore {
    /// Open the bridge with its cache database at `path`.
    pub async fn open(
        remote: Arc<dyn TicketStore>,
        path: &Path,
        wal_mode: bool,
    ) -> Result<Self, StoreError> {
        let db = Database::open(path, wal_mode).await?;
        Ok(Self { remote, db })
    }

    /// Replay queued writes FIFO against the remote, then refresh the whole
    /// mirror from it.
    ///
    /// Each queued update replays with the expected-status precondition it
    /// was captured with; a replay the remote rejects is marked failed and
    /// logged, never forced. Returns `StoreError::Unreachable` with
    /// `queued: true` if the remote drops away mid-replay; progress made so
    /// far is durable and the next call resumes where this one stopped.
    pub async fn reconcile(&self) -> Result<ReconcileReport, StoreError> {
        let reclaimed = pending::release_stale(&self.db).await?;
        if reclaimed > 0 {
            warn!(reclaimed, "requeued replay entries from an interrupted run");
        }
        let depth = pending::pending_count(&self.db).await?;
        debug!(depth, "reconcile started");

        let mut report = ReconcileReport::default();
        while let Some(row) = pending::next_pending(&self.db).await? {
            let op: PendingOp = match serde_json::from_str(&row.payload) {
                Ok(op) => op,
                Err(err) => {
                    warn!(entry = row.id, error = %err, "dropping undecodable queued write");
                    pending::reject(&self.db, row.id).await?;
                    report.rejected += 1;
                    continue;
                }
            };

            match self.replay(op).await {
                Ok(()) => {
                    pending::ack(&self.db, row.id).await?;
                    report.replayed += 1;
                }
                Err(StoreError::Unreachable { .. }) => {
                    pending::release(&self.db, row.id).await?;
                    debug!(
                        entry = row.id,
                        replayed = report.replayed,
                        "remote unreachable again, reconcile paused"
                    );
                    return Err(StoreError::Unreachable { queued: true });
                }
                Err(
                    StoreError::Conflict { .. }
                    | StoreError::AlreadyExists { .. }
                    | StoreError::NotFound { .. },
                ) => {
                    warn!(entry = row.id, "queued write rejected by the authoritative store");
                    pending::reject(&self.db, row.id).await?;
                    report.rejected += 1;
                }
                Err(err) => {
                    warn!(entry = row.id, error = %err, "queued write replay failed");
                    if pending::fail(&self.db, row.id).await? {
                        report.rejected += 1;
                    }
                }
            }
        }

        for ticket in self.remote.list(None).await? {
            mirror::upsert_ticket(&self.db, &ticket).await?;
            report.refreshed += 1;
        }
        info!(
            replayed = report.replayed,
            rejected = report.rejected,
            refreshed = report.refreshed,
            "reconcile finished"
        );
        Ok(report)
    }

    /// Follow the remote's feed and keep the mirror current.
    ///
    /// Runs until `cancel` fires or the remote closes the feed. Snapshots
    /// arriving here are commits the remote already published, so they
    /// overwrite the mirror unconditionally.
    pub fn spawn_mirror_task(&self, cancel: CancellationToken) -> JoinHandle<()> {
        let remote = self.remote.clone();
        let db = self.db.clone();
        tokio::spawn(async move {
            let mut feed = match remote.subscribe(all_tickets()).await {
                Ok(feed) => feed,
                Err(err) => {
                    warn!(error = %err, "mirror task could not subscribe to the store feed");
                    return;
                }
            };
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    snapshot = feed.next() => match snapshot {
                        Some(ticket) => {
                            if let Err(err) = mirror::upsert_ticket(&db, &ticket).await {
                                warn!(
                                    ticket = ticket.id.as_str(),
                                    error = %err,
                                    "mirror update from feed failed"
                                );
                            }
                        }
                        None => break,
                    },
                }
            }
            debug!("mirror task stopped");
        })
    }

    /// The cache database, for direct mirror inspection.
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Checkpoint the cache WAL. Called on orderly shutdown.
    pub async fn shutdown(&self) -> Result<(), StoreError> {
        self.db
            .connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)
    }

    async fn replay(&self, op: PendingOp) -> Result<(), StoreError> {
        match op {
            PendingOp::Create { ticket } => self.remote.create(&ticket).await,
            PendingOp::Update {
                id,
                expected,
                patch,
            } => {
                self.remote.update(&id, &expected, patch).await?;
                Ok(())
            }
        }
    }

    /// Best-effort mirror write after a successful remote read or write. A
    /// cache disk hiccup must not fail an operation the remote accepted.
    async fn refresh_mirror(&self, ticket: &StoppageTicket) {
        if let Err(err) = mirror::upsert_ticket(&self.db, ticket).await {
            warn!(
                ticket = ticket.id.as_str(),
                error = %err,
                "mirror refresh failed"
            );
        }
    }
}

#[async_trait]
impl TicketStore for CachedTicketStore {
    async fn create(&self, ticket: &StoppageTicket) -> Result<(), StoreError> {
        match self.remote.create(ticket).await {
            Ok(()) => {
                self.refresh_mirror(ticket).await;
                Ok(())
            }
            Err(StoreError::Unreachable { .. }) => {
                pending::enqueue(&self.db, &PendingOp::Create {
                    ticket: ticket.clone(),
                })
                .await?;
                debug!(ticket = ticket.id.as_str(), "create queued while offline");
                Err(StoreError::Unreachable { queued: true })
            }
            Err(err) => Err(err),
        }
    }

    async fn get(&self, id: &TicketId) -> Result<Option<StoppageTicket>, StoreError> {
        match self.remote.get(id).await {
            Ok(Some(ticket)) => {
                self.refresh_mirror(&ticket).await;
                Ok(Some(ticket))
            }
            Ok(None) => Ok(None),
            Err(StoreError::Unreachable { .. }) => {
                debug!(ticket = id.as_str(), "remote unreachable, serving mirror");
                mirror::get_ticket(&self.db, id).await
            }
            Err(err) => Err(err),
        }
    }

    async fn update(
        &self,
        id: &TicketId,
        expected: &TicketStatus,
        patch: TicketPatch,
    ) -> Result<StoppageTicket, StoreError> {
        match self.remote.update(id, expected, patch.clone()).await {
            Ok(ticket) => {
                self.refresh_mirror(&ticket).await;
                Ok(ticket)
            }
            Err(StoreError::Unreachable { .. }) => {
                pending::enqueue(&self.db, &PendingOp::Update {
                    id: id.clone(),
                    expected: *expected,
                    patch,
                })
                .await?;
                debug!(ticket = id.as_str(), "update queued while offline");
                Err(StoreError::Unreachable { queued: true })
            }
            Err(err) => Err(err),
        }
    }

    async fn list(&self, status: Option<StatusKind>) -> Result<Vec<StoppageTicket>, StoreError> {
        match self.remote.list(status).await {
            Ok(tickets) => {
                for ticket in &tickets {
                    self.refresh_mirror(ticket).await;
                }
                Ok(tickets)
            }
            Err(StoreError::Unreachable { .. }) => {
                debug!("remote unreachable, serving mirror listing");
                mirror::list_tickets(&self.db, status).await
            }
            Err(err) => Err(err),
        }
    }

    async fn subscribe(&self, filter: TicketFilter) -> Result<TicketFeed, StoreError> {
        self.remote.subscribe(filter).await
    }
}
