// SPDX-FileCopyrightText: 2026 Downtime Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notifier that records every notice for assertions.

use async_trait::async_trait;
use tokio::sync::Mutex;

use downtime_core::notify::{Notice, Notifier};

/// Captures notices in order of delivery.
#[derive(Debug, Default)]
pub struct MockNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns everything captured so far.
    pub async fn take(&self) -> Vec<Notice> {
        std::mem::take(&mut *self.notices.lock().await)
    }

    /// The most recent notice, without consuming anything.
    pub async fn last(&self) -> Option<Notice> {
        self.notices.lock().await.last().cloned()
    }

    pub async fn count(&self) -> usize {
        self.notices.lock().await.len()
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn notify(&self, notice: Notice) {
        self.notices.lock().await.push(notice);
    }
}
