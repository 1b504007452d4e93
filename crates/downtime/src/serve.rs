// SPDX-FileCopyrightText: 2026 Downtime Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `downtime serve`: the long-running stoppage workflow service.
//!
//! Wires the in-process ticket store, the optional offline cache bridge and
//! the expiration monitor together, then parks until a shutdown signal
//! arrives.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use downtime_cache::CachedTicketStore;
use downtime_cache::queries::mirror;
use downtime_config::DowntimeConfig;
use downtime_core::clock::SystemClock;
use downtime_core::error::{StoreError, WorkflowError};
use downtime_core::planner::IntervalPlanner;
use downtime_core::store::TicketStore;
use downtime_store::MemoryTicketStore;
use downtime_workflow::shutdown::install_signal_handler;
use downtime_workflow::{ExpirationMonitor, WorkflowEngine};

use crate::notify::LogNotifier;

pub async fn run(config: DowntimeConfig) -> Result<(), WorkflowError> {
    init_tracing(&config.plant.log_level);
    info!(plant = %config.plant.name, "starting downtime serve");

    let cancel = install_signal_handler();

    // The memory store is authoritative; the cache bridge persists a mirror
    // of it so tickets survive restarts.
    let primary = Arc::new(MemoryTicketStore::new());
    let mut bridge = None;
    let mut mirror_task = None;
    let store: Arc<dyn TicketStore> = if config.cache.enabled {
        let cached = Arc::new(
            CachedTicketStore::open(
                primary.clone(),
                Path::new(&config.cache.database_path),
                config.cache.wal_mode,
            )
            .await?,
        );
        let restored = restore_from_mirror(cached.as_ref(), primary.as_ref()).await?;
        if restored > 0 {
            info!(restored, "restored tickets from the offline mirror");
        }
        let report = cached.reconcile().await?;
        if report.replayed > 0 || report.rejected > 0 {
            info!(
                replayed = report.replayed,
                rejected = report.rejected,
                "drained writes queued by a previous run"
            );
        }
        mirror_task = Some(cached.spawn_mirror_task(cancel.clone()));
        bridge = Some(cached.clone());
        cached
    } else {
        warn!("offline cache disabled; tickets will not survive a restart");
        primary.clone()
    };

    let engine = Arc::new(WorkflowEngine::new(
        store.clone(),
        Arc::new(SystemClock),
        Arc::new(LogNotifier),
        Arc::new(IntervalPlanner::new(config.planner.interval_days)),
    ));

    let monitor_task = if config.monitor.enabled {
        let monitor = ExpirationMonitor::new(
            engine.clone(),
            store.clone(),
            Arc::new(SystemClock),
            Duration::from_secs(config.monitor.interval_secs),
        );
        info!(
            interval_secs = config.monitor.interval_secs,
            "expiration monitor running"
        );
        Some(tokio::spawn(monitor.run(cancel.clone())))
    } else {
        warn!("expiration monitor disabled; missed repair windows stay open");
        None
    };

    info!("downtime serve is up");
    cancel.cancelled().await;
    info!("shutting down");

    if let Some(task) = monitor_task {
        let _ = task.await;
    }
    if let Some(task) = mirror_task {
        let _ = task.await;
    }
    if let Some(cached) = bridge {
        cached.shutdown().await?;
    }
    info!("downtime serve stopped");
    Ok(())
}

/// Load every mirrored ticket into the fresh in-process store.
///
/// Tickets already present, such as after a supervised restart that kept the
/// process alive, are left untouched.
pub(crate) async fn restore_from_mirror(
    cached: &CachedTicketStore,
    primary: &MemoryTicketStore,
) -> Result<usize, StoreError> {
    let mut restored = 0;
    for ticket in mirror::list_tickets(cached.database(), None).await? {
        match primary.create(&ticket).await {
            Ok(()) => restored += 1,
            Err(StoreError::AlreadyExists { .. }) => {}
            Err(err) => return Err(err),
        }
    }
    Ok(restored)
}

/// Initializes the tracing subscriber with the given log level.
pub(crate) fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    // The configured level covers every downtime crate; dependencies stay
    // at warn unless RUST_LOG says otherwise.
    let directives = [
        "downtime",
        "downtime_core",
        "downtime_config",
        "downtime_store",
        "downtime_cache",
        "downtime_workflow",
    ]
    .map(|target| format!("{target}={log_level}"))
    .join(",");
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{directives},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveTime, Utc};
    use downtime_core::status::TicketStatus;
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
    async fn restore_round_trips_through_the_mirror() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("serve.db");

        // First run mirrors two tickets.
        {
            let primary = Arc::new(MemoryTicketStore::new());
            let cached = CachedTicketStore::open(primary.clone(), &path, false)
                .await
                .unwrap();
            cached.create(&ticket("t-1")).await.unwrap();
            cached.create(&ticket("t-2")).await.unwrap();
            cached.shutdown().await.unwrap();
        }

        // A fresh store starts empty and is refilled from the mirror.
        let primary = Arc::new(MemoryTicketStore::new());
        let cached = CachedTicketStore::open(primary.clone(), &path, false)
            .await
            .unwrap();
        let restored = restore_from_mirror(&cached, primary.as_ref()).await.unwrap();
        assert_eq!(restored, 2);
        assert_eq!(primary.list(None).await.unwrap().len(), 2);

        // Restoring again is a no-op.
        let restored = restore_from_mirror(&cached, primary.as_ref()).await.unwrap();
        assert_eq!(restored, 0);
    }
}
