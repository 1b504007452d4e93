// SPDX-FileCopyrightText: 2026 Downtime Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ticket store contract and live-update feed.
//!
//! A [`TicketStore`] is the authoritative home of ticket documents. Writes
//! are conditional: [`TicketStore::update`] applies a [`TicketPatch`] only if
//! the ticket is still in the status the caller read, otherwise it fails with
//! [`StoreError::Conflict`] and the caller re-reads. Stores also fan out
//! every committed snapshot to [`TicketFeed`] subscribers.

use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::action::ActionRecord;
use crate::error::StoreError;
use crate::status::{StatusKind, TicketStatus};
use crate::ticket::{StoppageTicket, TicketId};

/// Predicate selecting which snapshots a subscription receives.
pub type TicketFilter = Arc<dyn Fn(&StoppageTicket) -> bool + Send + Sync>;

/// Filter accepting every ticket.
pub fn all_tickets() -> TicketFilter {
    Arc::new(|_| true)
}

/// Filter accepting tickets from one plant sector.
pub fn in_sector(sector: impl Into<String>) -> TicketFilter {
    let sector = sector.into();
    Arc::new(move |ticket| ticket.sector == sector)
}

/// Partial update applied through [`TicketStore::update`].
///
/// Fields left `None` keep their stored value; a patch can set fields but
/// never clear them. `record` appends to the ticket's history, which is how
/// the append-only audit trail is enforced at the storage seam.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TicketPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TicketStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attempt: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_late: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_ended_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_elapsed_secs: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applied_solution: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_maintainer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_maintainer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record: Option<ActionRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl TicketPatch {
    /// Applies the patch in place. Shared by every store implementation so
    /// replaying a queued patch later produces the same document.
    pub fn apply(&self, ticket: &mut StoppageTicket) {
        if let Some(status) = self.status {
            ticket.status = status;
        }
        if let Some(attempt) = self.attempt {
            ticket.attempt = attempt;
        }
        if let Some(is_late) = self.is_late {
            ticket.is_late = is_late;
        }
        if let Some(at) = self.execution_started_at {
            ticket.execution_started_at = Some(at);
        }
        if let Some(at) = self.execution_ended_at {
            ticket.execution_ended_at = Some(at);
        }
        if let Some(secs) = self.total_elapsed_secs {
            ticket.total_elapsed_secs = Some(secs);
        }
        if let Some(solution) = &self.applied_solution {
            ticket.applied_solution = Some(solution.clone());
        }
        if let Some(note) = &self.verification_note {
            ticket.verification_note = Some(note.clone());
        }
        if let Some(id) = &self.assigned_maintainer_id {
            ticket.assigned_maintainer_id = Some(id.clone());
        }
        if let Some(name) = &self.assigned_maintainer_name {
            ticket.assigned_maintainer_name = Some(name.clone());
        }
        if let Some(record) = &self.record {
            ticket.history.push(record.clone());
        }
        if let Some(at) = self.updated_at {
            ticket.updated_at = at;
        }
    }
}

/// Live feed of committed ticket snapshots.
///
/// An owned handle: dropping it unsubscribes. The publisher side notices the
/// dropped receiver on its next publish and prunes the slot, so a consumer
/// that goes away cannot leak registrations.
pub struct TicketFeed {
    rx: mpsc::UnboundedReceiver<StoppageTicket>,
}

impl TicketFeed {
    /// Next matching snapshot, or `None` once the store side is gone.
    pub async fn next(&mut self) -> Option<StoppageTicket> {
        self.rx.recv().await
    }
}

impl futures_core::Stream for TicketFeed {
    type Item = StoppageTicket;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

struct FeedSlot {
    filter: TicketFilter,
    tx: mpsc::UnboundedSender<StoppageTicket>,
}

/// Publisher half of the feed, embedded in store implementations.
#[derive(Default)]
pub struct FeedPublisher {
    slots: Mutex<Vec<FeedSlot>>,
}

impl FeedPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a subscriber and hands back its receiving end.
    pub fn subscribe(&self, filter: TicketFilter) -> TicketFeed {
        let (tx, rx) = mpsc::unbounded_channel();
        self.lock_slots().push(FeedSlot { filter, tx });
        TicketFeed { rx }
    }

    /// Sends `ticket` to every subscriber whose filter matches, dropping
    /// slots whose receiver has gone away.
    pub fn publish(&self, ticket: &StoppageTicket) {
        let mut slots = self.lock_slots();
        let before = slots.len();
        slots.retain(|slot| {
            if slot.tx.is_closed() {
                return false;
            }
            if !(slot.filter)(ticket) {
                return true;
            }
            slot.tx.send(ticket.clone()).is_ok()
        });
        let pruned = before - slots.len();
        if pruned > 0 {
            tracing::debug!(pruned, remaining = slots.len(), "dropped closed ticket feeds");
        }
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        let mut slots = self.lock_slots();
        slots.retain(|slot| !slot.tx.is_closed());
        slots.len()
    }

    fn lock_slots(&self) -> MutexGuard<'_, Vec<FeedSlot>> {
        // A poisoned lock only means a panic mid-publish; the slot list is
        // still structurally sound.
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Contract of the authoritative ticket document store.
#[async_trait]
pub trait TicketStore: Send + Sync {
    /// Inserts a new ticket. Fails with [`StoreError::AlreadyExists`] if the
    /// identifier is taken.
    async fn create(&self, ticket: &StoppageTicket) -> Result<(), StoreError>;

    /// Fetches one ticket by identifier.
    async fn get(&self, id: &TicketId) -> Result<Option<StoppageTicket>, StoreError>;

    /// Applies `patch` if the ticket is currently in `expected` status and
    /// returns the updated snapshot. Fails with [`StoreError::Conflict`] when
    /// a concurrent writer got there first.
    async fn update(
        &self,
        id: &TicketId,
        expected: &TicketStatus,
        patch: TicketPatch,
    ) -> Result<StoppageTicket, StoreError>;

    /// Lists tickets, optionally narrowed to one status kind.
    async fn list(&self, status: Option<StatusKind>) -> Result<Vec<StoppageTicket>, StoreError>;

    /// Subscribes to committed snapshots matching `filter`.
    async fn subscribe(&self, filter: TicketFilter) -> Result<TicketFeed, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionKind;
    use chrono::NaiveTime;

    fn ticket_in(sector: &str) -> StoppageTicket {
        StoppageTicket {
            id: TicketId::random(),
            equipment: "lathe-2".into(),
            sector: sector.into(),
            asset_id: None,
            part_id: None,
            subpart_id: None,
            description: "spindle stall".into(),
            notes: None,
            scheduled_start: NaiveTime::from_hms_opt(8, 0, 0).expect("time"),
            scheduled_end: NaiveTime::from_hms_opt(10, 0, 0).expect("time"),
            scheduled_date: None,
            execution_started_at: None,
            execution_ended_at: None,
            total_elapsed_secs: None,
            status: TicketStatus::Awaiting,
            attempt: 1,
            is_late: false,
            applied_solution: None,
            verification_note: None,
            reported_by_id: "op-1".into(),
            reported_by_name: "Noa".into(),
            assigned_maintainer_id: None,
            assigned_maintainer_name: None,
            history: Vec::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn feed_delivers_only_matching_snapshots() {
        let publisher = FeedPublisher::new();
        let mut all = publisher.subscribe(all_tickets());
        let mut stamping = publisher.subscribe(in_sector("stamping"));

        publisher.publish(&ticket_in("stamping"));
        publisher.publish(&ticket_in("paint"));

        assert_eq!(all.next().await.expect("first").sector, "stamping");
        assert_eq!(all.next().await.expect("second").sector, "paint");
        assert_eq!(stamping.next().await.expect("match").sector, "stamping");
        // Nothing else is buffered for the sector feed.
        assert!(stamping.rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn dropped_feed_is_pruned_on_next_publish() {
        let publisher = FeedPublisher::new();
        let feed = publisher.subscribe(all_tickets());
        let _kept = publisher.subscribe(all_tickets());
        assert_eq!(publisher.subscriber_count(), 2);

        drop(feed);
        publisher.publish(&ticket_in("stamping"));
        assert_eq!(publisher.subscriber_count(), 1);
    }

    #[test]
    fn patch_sets_fields_and_appends_history() {
        let mut ticket = ticket_in("stamping");
        let record = ActionRecord {
            id: "rec-1".into(),
            kind: ActionKind::Started,
            actor_id: "m-1".into(),
            actor_name: "Dana".into(),
            at: Utc::now(),
            note: None,
            attempt: 1,
            status_before: TicketStatus::Awaiting,
            status_after: TicketStatus::InProgress,
        };
        let started = Utc::now();
        let patch = TicketPatch {
            status: Some(TicketStatus::InProgress),
            execution_started_at: Some(started),
            assigned_maintainer_id: Some("m-1".into()),
            assigned_maintainer_name: Some("Dana".into()),
            record: Some(record),
            updated_at: Some(started),
            ..Default::default()
        };

        patch.apply(&mut ticket);
        assert_eq!(ticket.status, TicketStatus::InProgress);
        assert_eq!(ticket.execution_started_at, Some(started));
        assert_eq!(ticket.assigned_maintainer_id.as_deref(), Some("m-1"));
        assert_eq!(ticket.history.len(), 1);
        assert_eq!(ticket.history[0].kind, ActionKind::Started);

        // A second apply of an empty patch changes nothing.
        let snapshot = ticket.clone();
        TicketPatch::default().apply(&mut ticket);
        assert_eq!(ticket, snapshot);
    }

    #[test]
    fn patch_serializes_only_set_fields() {
        let patch = TicketPatch {
            status: Some(TicketStatus::Canceled),
            ..Default::default()
        };
        let json = serde_json::to_string(&patch).expect("serialize");
        assert_eq!(json, "{\"status\":\"canceled\"}");
        let back: TicketPatch = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, patch);
    }
}
