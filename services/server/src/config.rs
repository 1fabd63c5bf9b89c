use std::time::Duration;

use clap::Parser;

/// Startup parameters. Every flag can also be set via the matching
/// environment variable (`DATABASE_URL`, `BIND_ADDR`, ...), mirroring the
/// teacher's `main.rs` env-var reads; `clap` layers optional overrides on
/// top for local runs and scripted tests.
#[derive(Debug, Parser)]
#[command(name = "server", about = "Campus equipment management backend")]
pub struct Config {
    /// Postgres connection string.
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: String,

    /// Address the TCP listener binds to.
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:9000")]
    pub bind_addr: String,

    /// `tracing_subscriber::EnvFilter` directive.
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Seconds since last received frame before the supervisor closes a
    /// connection.
    #[arg(long, env = "HEARTBEAT_TIMEOUT_SECS", default_value_t = 60)]
    pub heartbeat_timeout_secs: u64,

    /// Supervisor sweep interval, in seconds.
    #[arg(long, env = "SUPERVISOR_INTERVAL_SECS", default_value_t = 1)]
    pub supervisor_interval_secs: u64,
}

impl Config {
    pub fn heartbeat_timeout(&self) -> Duration {
        Duration::from_secs(self.heartbeat_timeout_secs)
    }

    pub fn supervisor_interval(&self) -> Duration {
        Duration::from_secs(self.supervisor_interval_secs)
    }
}
