use equipment_protocol::ConnBuffer;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::error::ServerError;
use crate::handlers::{self, HandlerCtx};
use crate::registry::{Identity, Outbound};
use crate::state::AppState;

const READ_SCRATCH: usize = 8 * 1024;
/// Send retry budget: a short write loop before giving up and
/// closing the connection.
const WRITE_RETRIES: usize = 3;

/// Per-connection task. Owns its socket, its receive buffer, and the
/// outbound channel other tasks use to deliver frames or a close directive.
pub async fn run(stream: TcpStream, peer: std::net::SocketAddr, state: AppState) {
    let _ = stream.set_nodelay(true);
    let (mut read_half, mut write_half) = stream.into_split();
    let (outbound_tx, mut outbound_rx) = mpsc::channel::<Outbound>(32);

    let bound = state.registry.accept(outbound_tx).await;
    let conn = bound.id;
    info!(%peer, conn, "connection accepted");

    let mut buf = ConnBuffer::new();
    let mut scratch = vec![0u8; READ_SCRATCH];
    let mut close_reason = "peer_closed";

    'outer: loop {
        tokio::select! {
            read = read_half.read(&mut scratch) => {
                match read {
                    Ok(0) => { break; }
                    Ok(n) => {
                        if buf.append(&scratch[..n]).is_err() {
                            warn!(conn, "receive buffer overflow");
                            close_reason = "buffer_overflow";
                            break;
                        }
                        let bodies = match buf.extract() {
                            Ok(bodies) => bodies,
                            Err(e) => {
                                warn!(conn, error = %e, "frame too large");
                                close_reason = "frame_too_large";
                                break;
                            }
                        };
                        for body in bodies {
                            match handle_body(&state, conn, &body, &mut write_half).await {
                                Ok(true) => {}
                                Ok(false) => { close_reason = "rejected"; break 'outer; }
                                Err(()) => { close_reason = "write_error"; break 'outer; }
                            }
                        }
                    }
                    Err(e) => {
                        debug!(conn, error = %e, "read error");
                        break;
                    }
                }
            }
            outbound = outbound_rx.recv() => {
                match outbound {
                    Some(Outbound::Frame(frame)) => {
                        if write_all_retrying(&mut write_half, &frame).await.is_err() {
                            close_reason = "write_error";
                            break;
                        }
                    }
                    Some(Outbound::Close(reason)) => {
                        close_reason = reason;
                        break;
                    }
                    None => { break; }
                }
            }
        }
    }

    let identity = state.registry.unbind(conn).await;
    if let Identity::Equipment { device_id } = &identity {
        state.catalog.set_offline(device_id).await;
        if let Err(e) = crate::repo::equipment::set_status(&state.pool, device_id, "offline", "off").await {
            warn!(conn, device_id, error = %e, "failed to persist offline transition");
        }
    }
    info!(%peer, conn, close_reason, "connection closed");
}

/// Decodes one frame body and dispatches it. Returns `Ok(true)` if the
/// connection should stay open, `Ok(false)` if it should close (a protocol
/// error or a fatal error that also trips server-wide shutdown), `Err(())`
/// if writing a reply failed (also closes).
async fn handle_body(
    state: &AppState,
    conn: u64,
    body: &[u8],
    write_half: &mut tokio::net::tcp::OwnedWriteHalf,
) -> Result<bool, ()> {
    let frame = match equipment_protocol::decode(body) {
        Ok(f) => f,
        Err(e) => {
            warn!(conn, error = %e, "decode error");
            return Ok(false);
        }
    };

    let identity = state.registry.identity(conn).await;
    // An unbound connection may only send login or equipment_online; any
    // other kind is rejected until one of those binds an identity.
    if matches!(identity, Identity::Unbound)
        && frame.kind != equipment_protocol::kind::LOGIN
        && frame.kind != equipment_protocol::kind::EQUIPMENT_ONLINE
    {
        warn!(conn, kind = frame.kind, "message on unbound connection");
        return Ok(false);
    }

    // Covers every dispatched frame regardless of outcome, so a connection
    // that's only ever sending e.g. control_request/reservation_apply never
    // times out as idle.
    state.registry.touch(conn).await;

    let ctx = HandlerCtx {
        state,
        conn,
        identity,
    };
    let reply = match handlers::dispatch(&ctx, &frame).await {
        Ok(reply) => reply,
        Err(ServerError::Protocol(msg)) => {
            warn!(conn, error = %msg, "protocol error");
            return Ok(false);
        }
        Err(ServerError::State(msg)) | Err(ServerError::DownstreamUnavailable(msg)) => {
            warn!(conn, error = %msg, "handler failed, replying with failure");
            match equipment_protocol::kind::response_for(frame.kind) {
                Some(response_kind) => {
                    equipment_protocol::encode(frame.client_type, response_kind, &frame.subject, &["fail", &msg])
                        .unwrap()
                }
                None => return Ok(true),
            }
        }
        Err(ServerError::Fatal(msg)) => {
            warn!(conn, error = %msg, "fatal error, triggering server shutdown");
            let _ = state.shutdown.send(true);
            return Ok(false);
        }
    };

    if !reply.is_empty() {
        write_all_retrying(write_half, &reply).await.map_err(|_| ())?;
    }
    Ok(true)
}

async fn write_all_retrying(
    write_half: &mut tokio::net::tcp::OwnedWriteHalf,
    bytes: &[u8],
) -> std::io::Result<()> {
    for _ in 0..WRITE_RETRIES {
        match write_half.write_all(bytes).await {
            Ok(()) => return Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    write_half.write_all(bytes).await
}
