use thiserror::Error;

/// Error taxonomy for the connection-and-protocol core (kinds, not a single
/// flat type). The event loop converts each variant into the policy in its
/// doc comment; handlers never need to know how their error surfaces.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Frame length overflow, decode failure, or a message sent on an
    /// unbound connection other than `login`/`equipment_online`. Closes the
    /// connection; no reply frame.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Online for an unknown device, duplicate online, approve by a
    /// non-admin. Replies a negative response; connection stays open.
    #[error("state error: {0}")]
    State(String),

    /// Device offline when an operator requests control, or a DB write
    /// failed. Replies failure with a human-readable reason; connection
    /// stays open.
    #[error("downstream unavailable: {0}")]
    DownstreamUnavailable(String),

    /// Accept socket broken, supervisor unable to run, or any other
    /// condition the process cannot recover from. Triggers shutdown.
    #[error("fatal error: {0}")]
    Fatal(String),
}

impl From<sqlx::Error> for ServerError {
    fn from(e: sqlx::Error) -> Self {
        ServerError::DownstreamUnavailable(e.to_string())
    }
}
