// SPDX-FileCopyrightText: 2026 Downtime Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cache database lifecycle: open with PRAGMA setup, migrate, close.
//!
//! A [`Database`] owns a single `tokio-rusqlite` connection, which runs all
//! SQL on one background thread. Every query in this crate funnels through
//! that connection, so concurrent tasks serialize on it instead of fighting
//! over SQLite write locks.

use std::path::Path;

use downtime_core::error::StoreError;
use tokio_rusqlite::Connection;

/// Convert a tokio-rusqlite error into `StoreError::Backend`.
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> StoreError {
    StoreError::Backend {
        source: Box::new(e),
    }
}

/// Handle to the cache database.
///
/// Cloning is cheap and hands out another sender to the same background
/// connection thread.
#[derive(Clone)]
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `path`, creating parent directories, applying
    /// pragmas, and running any pending migrations.
    ///
    /// `journal_mode` is persistent, so WAL is set while migrating on the
    /// blocking handle; `busy_timeout` and `foreign_keys` are per-connection
    /// and applied to the long-lived connection afterwards.
    pub async fn open(path: &Path, wal_mode: bool) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(StoreError::backend)?;
            }
        }

        // refinery drives a plain rusqlite connection, so migrations run on
        // a short-lived blocking handle before the async one opens.
        let migrate_path = path.to_path_buf();
        tokio::task::spawn_blocking(move || -> Result<(), StoreError> {
            let mut conn = rusqlite::Connection::open(&migrate_path).map_err(StoreError::backend)?;
            if wal_mode {
                conn.pragma_update(None, "journal_mode", "WAL")
                    .map_err(StoreError::backend)?;
            }
            crate::migrations::run_migrations(&mut conn)
        })
        .await
        .map_err(StoreError::backend)??;

        let conn = Connection::open(path.to_path_buf())
            .await
            .map_err(StoreError::backend)?;
        conn.call(|conn| -> Result<(), rusqlite::Error> {
            conn.pragma_update(None, "busy_timeout", 5000)?;
            conn.pragma_update(None, "foreign_keys", "ON")?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        tracing::debug!(path = %path.display(), wal_mode, "cache database opened");
        Ok(Self { conn })
    }

    /// The underlying connection, for query modules.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Checkpoint the WAL and release the connection.
    ///
    /// Consuming `self` drops the last handle once every clone is gone, which
    /// stops the background connection thread.
    pub async fn close(self) -> Result<(), StoreError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        tracing::debug!("cache database closed");
        Ok(())
    }
}
