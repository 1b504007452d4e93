// SPDX-FileCopyrightText: 2026 Downtime Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Store wrapper simulating connectivity loss.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use downtime_core::error::StoreError;
use downtime_core::status::{StatusKind, TicketStatus};
use downtime_core::store::{TicketFeed, TicketFilter, TicketPatch, TicketStore};
use downtime_core::ticket::{StoppageTicket, TicketId};

/// Wraps any store and, when switched offline, fails every call with
/// [`StoreError::Unreachable`].
pub struct FlakyStore<S> {
    inner: S,
    offline: AtomicBool,
}

impl<S> FlakyStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            offline: AtomicBool::new(false),
        }
    }

    pub fn go_offline(&self) {
        self.offline.store(true, Ordering::SeqCst);
    }

    pub fn go_online(&self) {
        self.offline.store(false, Ordering::SeqCst);
    }

    pub fn is_offline(&self) -> bool {
        self.offline.load(Ordering::SeqCst)
    }

    /// The wrapped store, for direct inspection.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn gate(&self) -> Result<(), StoreError> {
        if self.is_offline() {
            Err(StoreError::Unreachable { queued: false })
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl<S: TicketStore> TicketStore for FlakyStore<S> {
    async fn create(&self, ticket: &StoppageTicket) -> Result<(), StoreError> {
        self.gate()?;
        self.inner.create(ticket).await
    }

    async fn get(&self, id: &TicketId) -> Result<Option<StoppageTicket>, StoreError> {
        self.gate()?;
        self.inner.get(id).await
    }

    async fn update(
        &self,
        id: &TicketId,
        expected: &TicketStatus,
        patch: TicketPatch,
    ) -> Result<StoppageTicket, StoreError> {
        self.gate()?;
        self.inner.update(id, expected, patch).await
    }

    async fn list(&self, status: Option<StatusKind>) -> Result<Vec<StoppageTicket>, StoreError> {
        self.gate()?;
        self.inner.list(status).await
    }

    async fn subscribe(&self, filter: TicketFilter) -> Result<TicketFeed, StoreError> {
        self.gate()?;
        self.inner.subscribe(filter).await
    }
}
