use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::catalog::EquipmentCatalog;
use crate::registry::{ConnectionRegistry, Outbound};
use crate::repo;
use sqlx::PgPool;

/// Periodic heartbeat timeout sweep and graceful-shutdown reset. Runs on
/// its own `tokio::time::interval`, so a dedicated ticker exists alongside
/// the per-connection tasks; it only ever enqueues maintenance work, here
/// a `Close` sent through the same channel every connection task already
/// selects on.
pub async fn run(
    registry: Arc<ConnectionRegistry>,
    catalog: Arc<EquipmentCatalog>,
    pool: PgPool,
    interval: Duration,
    heartbeat_timeout: Duration,
    mut shutdown: tokio::sync::watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(interval);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                sweep(&registry, heartbeat_timeout).await;
            }
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    break;
                }
            }
        }
    }
    reset_all(&registry, &catalog, &pool).await;
}

async fn sweep(registry: &ConnectionRegistry, heartbeat_timeout: Duration) {
    let now = Instant::now();
    let mut timed_out = 0usize;
    for (conn_id, last_heartbeat) in registry.snapshot().await {
        if now.duration_since(last_heartbeat) > heartbeat_timeout {
            registry.mark_unhealthy(conn_id).await;
            if let Some(sender) = registry.sender(conn_id).await {
                let _ = sender.send(Outbound::Close("heartbeat_timeout")).await;
            }
            timed_out += 1;
        }
    }
    if timed_out > 0 {
        warn!(count = timed_out, "closed connections on heartbeat timeout");
    }
}

/// Shutdown reset-all: every catalog entry forced offline/off,
/// the DB updated to match, then every connection closed.
async fn reset_all(registry: &ConnectionRegistry, catalog: &EquipmentCatalog, pool: &PgPool) {
    info!("supervisor running shutdown reset-all");
    catalog.reset_all_offline().await;
    if let Err(e) = repo::equipment::reset_all_offline(pool).await {
        warn!(error = %e, "failed to persist reset-all offline state");
    }
    for (conn_id, _) in registry.snapshot().await {
        if let Some(sender) = registry.sender(conn_id).await {
            let _ = sender.send(Outbound::Close("server_shutdown")).await;
        }
    }
}
