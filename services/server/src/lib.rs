pub mod auth;
pub mod catalog;
pub mod config;
pub mod conn;
pub mod db;
pub mod error;
pub mod forwarder;
pub mod handlers;
pub mod registry;
pub mod repo;
pub mod state;
pub mod supervisor;

pub use config::Config;
pub use state::AppState;

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn};

/// The event loop: a single `TcpListener::accept`
/// loop handing each connection to its own task. Runs until `shutdown`
/// fires, at which point the supervisor's reset-all pass runs and every
/// connection is closed.
pub async fn run(
    listener: tokio::net::TcpListener,
    state: AppState,
    supervisor_interval: std::time::Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let supervisor_handle = tokio::spawn(supervisor::run(
        state.registry.clone(),
        state.catalog.clone(),
        state.pool.clone(),
        supervisor_interval,
        state.heartbeat_timeout,
        shutdown.clone(),
    ));

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, peer)) => {
                        let state = state.clone();
                        tokio::spawn(async move { conn::run(stream, peer, state).await });
                    }
                    Err(e) => {
                        warn!(error = %e, "accept failed");
                    }
                }
            }
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    break;
                }
            }
        }
    }

    info!("event loop exiting, waiting for supervisor reset-all");
    let _ = supervisor_handle.await;
}

pub async fn load_catalog(pool: &sqlx::PgPool) -> Arc<catalog::EquipmentCatalog> {
    catalog::EquipmentCatalog::load(pool)
        .await
        .expect("failed to load equipment catalog")
}
