// SPDX-FileCopyrightText: 2026 Downtime Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `downtime sweep`: one expiration sweep over the mirrored tickets.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use downtime_cache::CachedTicketStore;
use downtime_config::DowntimeConfig;
use downtime_core::clock::SystemClock;
use downtime_core::error::WorkflowError;
use downtime_core::planner::IntervalPlanner;
use downtime_core::store::TicketStore;
use downtime_store::MemoryTicketStore;
use downtime_workflow::{ExpirationMonitor, WorkflowEngine};

use crate::notify::LogNotifier;
use crate::serve;

/// Run a single expiration sweep and print the report.
///
/// Tickets come from the offline mirror, so a sweep can close missed windows
/// even while the service itself is down. With the cache disabled there is
/// nothing to load and the report shows zeros.
pub async fn run(config: DowntimeConfig) -> Result<(), WorkflowError> {
    serve::init_tracing(&config.plant.log_level);

    let primary = Arc::new(MemoryTicketStore::new());
    let mut bridge = None;
    let store: Arc<dyn TicketStore> = if config.cache.enabled {
        let cached = Arc::new(
            CachedTicketStore::open(
                primary.clone(),
                Path::new(&config.cache.database_path),
                config.cache.wal_mode,
            )
            .await?,
        );
        let restored = serve::restore_from_mirror(cached.as_ref(), primary.as_ref()).await?;
        info!(restored, "loaded tickets from the offline mirror");
        bridge = Some(cached.clone());
        cached
    } else {
        primary.clone()
    };

    let engine = Arc::new(WorkflowEngine::new(
        store.clone(),
        Arc::new(SystemClock),
        Arc::new(LogNotifier),
        Arc::new(IntervalPlanner::new(config.planner.interval_days)),
    ));
    let monitor = ExpirationMonitor::new(
        engine,
        store,
        Arc::new(SystemClock),
        Duration::from_secs(config.monitor.interval_secs),
    );

    let report = monitor.sweep().await?;
    println!(
        "sweep report: scanned {}, expired {}, skipped {}",
        report.scanned, report.expired, report.skipped
    );

    if let Some(cached) = bridge {
        cached.shutdown().await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime, Utc};
    use downtime_cache::queries::mirror;
    use downtime_config::model::CacheConfig;
    use downtime_core::status::{StatusKind, TicketStatus};
    use downtime_core::ticket::{StoppageTicket, TicketId};
    use tempfile::TempDir;

    fn ticket(id: &str) -> StoppageTicket {
        StoppageTicket {
            id: TicketId::from(id),
            equipment: "press-07".into(),
            sector: "stamping".into(),
            asset_id: None,
            part_id: None,
            subpart_id: None,
            description: "feed roller seized".into(),
            notes: None,
            scheduled_start: NaiveTime::from_hms_opt(7, 30, 0).expect("time"),
            scheduled_end: NaiveTime::from_hms_opt(9, 30, 0).expect("time"),
            scheduled_date: None,
            execution_started_at: None,
            execution_ended_at: None,
            total_elapsed_secs: None,
            status: TicketStatus::Awaiting,
            attempt: 1,
            is_late: false,
            applied_solution: None,
            verification_note: None,
            reported_by_id: "op-3".into(),
            reported_by_name: "Mara".into(),
            assigned_maintainer_id: None,
            assigned_maintainer_name: None,
            history: Vec::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn sweep_expires_tickets_whose_window_day_has_passed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sweep.db");

        // Seed the mirror with a ticket whose window day is long gone.
        {
            let primary = Arc::new(MemoryTicketStore::new());
            let cached = CachedTicketStore::open(primary.clone(), &path, false)
                .await
                .unwrap();
            let mut stale = ticket("t-old");
            stale.scheduled_date = Some(NaiveDate::from_ymd_opt(2026, 1, 5).expect("date"));
            cached.create(&stale).await.unwrap();
            cached.shutdown().await.unwrap();
        }

        let config = DowntimeConfig {
            cache: CacheConfig {
                database_path: path.to_string_lossy().into_owned(),
                ..CacheConfig::default()
            },
            ..DowntimeConfig::default()
        };
        run(config).await.unwrap();

        // The expiration was written back to the mirror.
        let primary = Arc::new(MemoryTicketStore::new());
        let cached = CachedTicketStore::open(primary, &path, false).await.unwrap();
        let after = mirror::get_ticket(cached.database(), &TicketId::from("t-old"))
            .await
            .unwrap()
            .expect("ticket still mirrored");
        assert_eq!(after.status.kind(), StatusKind::Expired);
    }
}
