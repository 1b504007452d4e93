// SPDX-FileCopyrightText: 2026 Downtime Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pending-write queue operations.
//!
//! Writes issued while the authoritative store is unreachable land here and
//! are replayed FIFO by `CachedTicketStore::reconcile`. Rows move
//! `pending -> processing -> completed`, or to `failed` when the remote
//! rejects the replay outright or transient retries are exhausted.

use downtime_core::error::StoreError;
use downtime_core::status::TicketStatus;
use downtime_core::store::TicketPatch;
use downtime_core::ticket::{StoppageTicket, TicketId};
use rusqlite::params;
use serde::{Deserialize, Serialize};

use crate::database::Database;

/// A store write captured for later replay.
///
/// An update keeps the expected-status precondition it was issued with, so
/// the replay makes exactly the conditional write the caller asked for. If
/// the remote moved on in the meantime the replay conflicts and loses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum PendingOp {
    Create {
        ticket: StoppageTicket,
    },
    Update {
        id: TicketId,
        expected: TicketStatus,
        patch: TicketPatch,
    },
}

/// One queued row, payload still serialized.
#[derive(Debug, Clone)]
pub struct PendingRow {
    pub id: i64,
    pub payload: String,
    pub status: String,
    pub attempts: i32,
    pub max_attempts: i32,
}

/// Enqueue an operation. Returns the auto-generated row ID.
pub async fn enqueue(db: &Database, op: &PendingOp) -> Result<i64, StoreError> {
    let payload = serde_json::to_string(op).map_err(StoreError::backend)?;
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO pending_ops (payload) VALUES (?1)",
                params![payload],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Take the oldest pending row for replay.
///
/// Atomically selects it and marks it `processing` with a 5-minute lock, so
/// a crash mid-replay leaves a row [`release_stale`] can reclaim. Returns
/// `None` when nothing is pending.
pub async fn next_pending(db: &Database) -> Result<Option<PendingRow>, StoreError> {
    db.connection()
        .call(|conn| {
            let tx = conn.transaction()?;

            let result = {
                let mut stmt = tx.prepare(
                    "SELECT id, payload, status, attempts, max_attempts
                     FROM pending_ops
                     WHERE status = 'pending'
                     ORDER BY id ASC
                     LIMIT 1",
                )?;
                stmt.query_row([], |row| {
                    Ok(PendingRow {
                        id: row.get(0)?,
                        payload: row.get(1)?,
                        status: row.get(2)?,
                        attempts: row.get(3)?,
                        max_attempts: row.get(4)?,
                    })
                })
            };

            match result {
                Ok(row) => {
                    tx.execute(
                        "UPDATE pending_ops SET status = 'processing',
                         locked_until = strftime('%Y-%m-%dT%H:%M:%fZ', 'now', '+5 minutes'),
                         updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                         WHERE id = ?1",
                        params![row.id],
                    )?;
                    tx.commit()?;
                    Ok(Some(PendingRow {
                        status: "processing".to_string(),
                        ..row
                    }))
                }
                Err(rusqlite::Error::QueryReturnedNoRows) => {
                    tx.commit()?;
                    Ok(None)
                }
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Mark a row successfully replayed.
pub async fn ack(db: &Database, id: i64) -> Result<(), StoreError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE pending_ops SET status = 'completed', locked_until = NULL,
                 updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?1",
                params![id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Record a transient replay failure.
///
/// Increments attempts. Returns `true` when attempts reached max_attempts
/// and the row is now permanently `failed`; otherwise the row goes back to
/// `pending` for another try.
pub async fn fail(db: &Database, id: i64) -> Result<bool, StoreError> {
    db.connection()
        .call(move |conn| {
            let (attempts, max_attempts): (i32, i32) = conn.query_row(
                "SELECT attempts, max_attempts FROM pending_ops WHERE id = ?1",
                params![id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )?;

            let new_attempts = attempts + 1;
            let exhausted = new_attempts >= max_attempts;
            let next_status = if exhausted { "failed" } else { "pending" };
            conn.execute(
                "UPDATE pending_ops SET status = ?1, attempts = ?2,
                 locked_until = NULL,
                 updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?3",
                params![next_status, new_attempts, id],
            )?;
            Ok(exhausted)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Mark a row permanently failed without retry.
///
/// Used when the authoritative store rejected the replay outright (status
/// conflict, duplicate create). Retrying can never succeed because the
/// precondition the op was queued with is gone.
pub async fn reject(db: &Database, id: i64) -> Result<(), StoreError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE pending_ops SET status = 'failed', locked_until = NULL,
                 updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?1",
                params![id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Return a row to `pending` without touching its attempt count.
///
/// Used when the remote dropped away again mid-replay. Connectivity loss is
/// not the op's fault, so it keeps its retries.
pub async fn release(db: &Database, id: i64) -> Result<(), StoreError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE pending_ops SET status = 'pending', locked_until = NULL,
                 updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?1",
                params![id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Reclaim `processing` rows whose lock expired.
///
/// Covers a process that crashed between [`next_pending`] and the ack.
/// Returns how many rows went back to `pending`.
pub async fn release_stale(db: &Database) -> Result<usize, StoreError> {
    db.connection()
        .call(|conn| {
            let reclaimed = conn.execute(
                "UPDATE pending_ops SET status = 'pending', locked_until = NULL,
                 updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE status = 'processing'
                   AND locked_until < strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
                [],
            )?;
            Ok(reclaimed)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Number of rows still waiting for replay.
pub async fn pending_count(db: &Database) -> Result<i64, StoreError> {
    db.connection()
        .call(|conn| {
            conn.query_row(
                "SELECT COUNT(*) FROM pending_ops WHERE status = 'pending'",
                [],
                |row| row.get(0),
            )
        })
        .await
        .map_err(crate::database::map_tr_err)
}
