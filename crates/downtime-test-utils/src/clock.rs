// SPDX-FileCopyrightText: 2026 Downtime Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Settable clock for pinning transition rules to exact instants.

use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Duration, Utc};

use downtime_core::clock::Clock;

/// Clock that only moves when a test tells it to.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Parses an RFC 3339 instant. Panics on bad input; test-only.
    pub fn at_str(now: &str) -> Self {
        Self::at(now.parse().expect("valid RFC 3339 instant"))
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.lock() = now;
    }

    pub fn set_str(&self, now: &str) {
        self.set(now.parse().expect("valid RFC 3339 instant"));
    }

    pub fn advance(&self, by: Duration) {
        let mut guard = self.lock();
        *guard += by;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, DateTime<Utc>> {
        self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.lock()
    }
}
