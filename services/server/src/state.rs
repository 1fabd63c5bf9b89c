use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;
use tokio::sync::watch;

use crate::catalog::EquipmentCatalog;
use crate::registry::ConnectionRegistry;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub registry: Arc<ConnectionRegistry>,
    pub catalog: Arc<EquipmentCatalog>,
    pub heartbeat_timeout: Duration,
    /// Flipped by a connection task on `ServerError::Fatal` to trigger the
    /// same graceful shutdown the accept loop runs on SIGTERM/Ctrl+C.
    pub shutdown: watch::Sender<bool>,
}

impl AppState {
    pub fn new(
        pool: PgPool,
        catalog: Arc<EquipmentCatalog>,
        heartbeat_timeout: Duration,
        shutdown: watch::Sender<bool>,
    ) -> Self {
        Self {
            pool,
            registry: ConnectionRegistry::new(),
            catalog,
            heartbeat_timeout,
            shutdown,
        }
    }
}
