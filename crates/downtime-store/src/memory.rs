// SPDX-FileCopyrightText: 2026 Downtime Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory ticket store.
//!
//! The reference [`TicketStore`] implementation: a map behind an async
//! read-write lock, with conditional updates and feed publication done under
//! the write guard so subscribers observe commits in order.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use downtime_core::error::StoreError;
use downtime_core::status::{StatusKind, TicketStatus};
use downtime_core::store::{FeedPublisher, TicketFeed, TicketFilter, TicketPatch, TicketStore};
use downtime_core::ticket::{StoppageTicket, TicketId};

/// Process-local ticket store.
#[derive(Default)]
pub struct MemoryTicketStore {
    tickets: RwLock<HashMap<TicketId, StoppageTicket>>,
    feed: FeedPublisher,
}

impl MemoryTicketStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Live subscriptions, after pruning closed ones.
    pub fn subscriber_count(&self) -> usize {
        self.feed.subscriber_count()
    }
}

#[async_trait]
impl TicketStore for MemoryTicketStore {
    async fn create(&self, ticket: &StoppageTicket) -> Result<(), StoreError> {
        let mut tickets = self.tickets.write().await;
        if tickets.contains_key(&ticket.id) {
            return Err(StoreError::AlreadyExists {
                id: ticket.id.clone(),
            });
        }
        tickets.insert(ticket.id.clone(), ticket.clone());
        self.feed.publish(ticket);
        tracing::debug!(ticket = ticket.id.as_str(), "ticket created");
        Ok(())
    }

    async fn get(&self, id: &TicketId) -> Result<Option<StoppageTicket>, StoreError> {
        Ok(self.tickets.read().await.get(id).cloned())
    }

    async fn update(
        &self,
        id: &TicketId,
        expected: &TicketStatus,
        patch: TicketPatch,
    ) -> Result<StoppageTicket, StoreError> {
        let mut tickets = self.tickets.write().await;
        let ticket = tickets
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound { id: id.clone() })?;
        if ticket.status != *expected {
            return Err(StoreError::Conflict {
                expected: *expected,
                found: ticket.status,
            });
        }
        patch.apply(ticket);
        let snapshot = ticket.clone();
        self.feed.publish(&snapshot);
        tracing::debug!(
            ticket = id.as_str(),
            status = %snapshot.status,
            "ticket updated"
        );
        Ok(snapshot)
    }

    async fn list(&self, status: Option<StatusKind>) -> Result<Vec<StoppageTicket>, StoreError> {
        let tickets = self.tickets.read().await;
        let mut rows: Vec<StoppageTicket> = tickets
            .values()
            .filter(|ticket| status.is_none_or(|kind| ticket.status.kind() == kind))
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.as_str().cmp(b.id.as_str()))
        });
        Ok(rows)
    }

    async fn subscribe(&self, filter: TicketFilter) -> Result<TicketFeed, StoreError> {
        Ok(self.feed.subscribe(filter))
    }
}
