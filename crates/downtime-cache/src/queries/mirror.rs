// SPDX-FileCopyrightText: 2026 Downtime Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mirror table operations.
//!
//! The mirror holds the last authoritative snapshot of each ticket as a JSON
//! payload. Snapshots only ever come from the remote store, never from
//! queued local writes, so a mirror read is always a state the remote
//! actually confirmed at some point.

use downtime_core::error::StoreError;
use downtime_core::status::StatusKind;
use downtime_core::ticket::{StoppageTicket, TicketId};
use rusqlite::params;

use crate::database::Database;

/// Insert or replace the mirrored snapshot for a ticket.
pub async fn upsert_ticket(db: &Database, ticket: &StoppageTicket) -> Result<(), StoreError> {
    let id = ticket.id.to_string();
    let status = ticket.status.to_string();
    let status_kind = ticket.status.kind().to_string();
    let created_at = ticket
        .created_at
        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string();
    let payload = serde_json::to_string(ticket).map_err(StoreError::backend)?;

    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO ticket_mirror (id, status, status_kind, payload, created_at, cached_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
                 ON CONFLICT(id) DO UPDATE SET
                     status = excluded.status,
                     status_kind = excluded.status_kind,
                     payload = excluded.payload,
                     created_at = excluded.created_at,
                     cached_at = excluded.cached_at",
                params![id, status, status_kind, payload, created_at],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Fetch the mirrored snapshot of one ticket.
pub async fn get_ticket(db: &Database, id: &TicketId) -> Result<Option<StoppageTicket>, StoreError> {
    let id = id.to_string();
    let payload: Option<String> = db
        .connection()
        .call(move |conn| {
            let result = conn.query_row(
                "SELECT payload FROM ticket_mirror WHERE id = ?1",
                params![id],
                |row| row.get(0),
            );
            match result {
                Ok(payload) => Ok(Some(payload)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    match payload {
        Some(json) => {
            let ticket = serde_json::from_str(&json).map_err(StoreError::backend)?;
            Ok(Some(ticket))
        }
        None => Ok(None),
    }
}

/// List mirrored tickets, optionally narrowed to one status kind.
///
/// Ordered by ticket creation time, matching the authoritative store's
/// listing order so offline callers see the same sequence.
pub async fn list_tickets(
    db: &Database,
    kind: Option<StatusKind>,
) -> Result<Vec<StoppageTicket>, StoreError> {
    let kind = kind.map(|k| k.to_string());
    let payloads: Vec<String> = db
        .connection()
        .call(move |conn| {
            let mut payloads = Vec::new();
            match &kind {
                Some(kind_filter) => {
                    let mut stmt = conn.prepare(
                        "SELECT payload FROM ticket_mirror
                         WHERE status_kind = ?1 ORDER BY created_at ASC, id ASC",
                    )?;
                    let rows = stmt.query_map(params![kind_filter], |row| row.get(0))?;
                    for row in rows {
                        payloads.push(row?);
                    }
                }
                None => {
                    let mut stmt = conn.prepare(
                        "SELECT payload FROM ticket_mirror ORDER BY created_at ASC, id ASC",
                    )?;
                    let rows = stmt.query_map([], |row| row.get(0))?;
                    for row in rows {
                        payloads.push(row?);
                    }
                }
            }
            Ok(payloads)
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    payloads
        .iter()
        .map(|json| serde_json::from_str(json).map_err(StoreError::backend))
        .collect()
}
