pub mod alarm;
pub mod control;
pub mod energy;
pub mod equipment;
pub mod operator;
pub mod query;
pub mod reservation;

use equipment_protocol::{kind, DecodedFrame};

use crate::error::ServerError;
use crate::registry::{ConnId, Identity};
use crate::state::AppState;

/// Everything a handler needs: the shared state, which connection the
/// frame arrived on, and that connection's current binding. Handlers do
/// not keep state of their own.
pub struct HandlerCtx<'a> {
    pub state: &'a AppState,
    pub conn: ConnId,
    pub identity: Identity,
}

/// Routes a decoded frame to its handler. An `Err(ServerError::Protocol)`
/// here means the payload fields didn't match the kind's own schema (too
/// few fields, unparseable number); the caller closes the connection.
/// Everything else a handler needs to tell the caller is encoded directly
/// in the `Ok` reply frame.
pub async fn dispatch(ctx: &HandlerCtx<'_>, frame: &DecodedFrame) -> Result<Vec<u8>, ServerError> {
    match frame.kind {
        kind::EQUIPMENT_ONLINE => equipment::online(ctx, frame).await,
        kind::STATUS_UPDATE => equipment::status_update(ctx, frame).await,
        kind::POWER_REPORT => equipment::power_report(ctx, frame).await,
        kind::HEARTBEAT => query::heartbeat(ctx, frame).await,
        kind::STATUS_QUERY => query::status_query(ctx, frame).await,
        kind::PLACE_LIST_QUERY => query::place_list(ctx, frame).await,
        kind::CONTROL_REQUEST => control::control_request(ctx, frame).await,
        kind::CONTROL_RESPONSE => control::control_response(ctx, frame).await,
        kind::RESERVATION_APPLY => reservation::apply(ctx, frame).await,
        kind::RESERVATION_QUERY => reservation::query(ctx, frame).await,
        kind::RESERVATION_APPROVE => reservation::approve(ctx, frame).await,
        kind::ENERGY_QUERY => energy::query(ctx, frame).await,
        kind::SET_THRESHOLD => energy::set_threshold(ctx, frame).await,
        kind::ALARM_QUERY => alarm::query(ctx, frame).await,
        kind::ALARM_ACK => alarm::ack(ctx, frame).await,
        kind::LOGIN => operator::login(ctx, frame).await,
        other => Err(ServerError::Protocol(format!(
            "no handler for message kind {other}"
        ))),
    }
}

/// Splits a handler's `payload_rest` into its own fields, requiring at
/// least `min` of them.
pub(crate) fn require_fields<'a>(
    frame: &'a DecodedFrame,
    min: usize,
) -> Result<Vec<&'a str>, ServerError> {
    let fields = frame.fields();
    if fields.len() < min {
        return Err(ServerError::Protocol(format!(
            "kind {} expects at least {min} fields, got {}",
            frame.kind,
            fields.len()
        )));
    }
    Ok(fields)
}
