use clap::Parser;
use server::{db, AppState, Config};
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let config = Config::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(config.log_level.clone()))
        .init();

    info!("connecting to database...");
    let pool = db::create_pool(&config.database_url).await;
    db::run_migrations(&pool).await;
    info!("migrations applied");

    // No connections exist yet at startup, so any online/on state left
    // over from an unclean shutdown is stale.
    server::repo::equipment::reset_all_offline(&pool)
        .await
        .expect("failed to reset equipment state at startup");

    let catalog = server::load_catalog(&pool).await;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let state = AppState::new(pool, catalog, config.heartbeat_timeout(), shutdown_tx.clone());

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("failed to bind listen socket");
    info!(addr = %config.bind_addr, "server listening");

    tokio::spawn(shutdown_signal(shutdown_tx));

    server::run(listener, state, config.supervisor_interval(), shutdown_rx).await;
    info!("server shut down gracefully");
}

/// Waits for SIGTERM or Ctrl-C (SIGINT) and flips the shutdown flag.
async fn shutdown_signal(shutdown_tx: watch::Sender<bool>) {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => { info!("received Ctrl+C, shutting down"); },
        _ = terminate => { info!("received SIGTERM, shutting down"); },
    }
    let _ = shutdown_tx.send(true);
}
