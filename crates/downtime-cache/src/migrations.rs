// SPDX-FileCopyrightText: 2026 Downtime Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedded schema migrations for the cache database.
//!
//! Migration files live in `migrations/` and are compiled into the binary
//! by refinery, so a deployment never needs SQL files on disk. Applied
//! versions are tracked in `refinery_schema_history`; reopening an
//! up-to-date database is a no-op.

use downtime_core::error::StoreError;

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

/// Run all pending migrations on the given connection.
pub fn run_migrations(conn: &mut rusqlite::Connection) -> Result<(), StoreError> {
    let report = embedded::migrations::runner()
        .run(conn)
        .map_err(StoreError::backend)?;
    let applied = report.applied_migrations().len();
    if applied > 0 {
        tracing::info!(applied, "applied cache schema migrations");
    }
    Ok(())
}
