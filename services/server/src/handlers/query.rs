use equipment_protocol::{client_type, encode, encode_raw, kind, DecodedFrame};

use super::HandlerCtx;
use crate::error::ServerError;
use crate::registry::Identity;

/// `heartbeat` (wire tag 4): persist the device's heartbeat timestamp, if
/// this connection is bound to one, and reply with the legacy literal body
/// preserved for simulator compatibility. The in-memory registry timestamp
/// is touched centrally by the caller for every dispatched frame.
pub async fn heartbeat(ctx: &HandlerCtx<'_>, _frame: &DecodedFrame) -> Result<Vec<u8>, ServerError> {
    if let Identity::Equipment { device_id } = &ctx.identity {
        crate::repo::equipment::touch_heartbeat(&ctx.state.pool, device_id).await?;
    }
    Ok(encode_raw("4|pong").unwrap())
}

/// `status_query`: reply the catalog's current status+power for a device.
pub async fn status_query(ctx: &HandlerCtx<'_>, frame: &DecodedFrame) -> Result<Vec<u8>, ServerError> {
    let device_id = frame.subject.as_str();
    let reply = match ctx.state.catalog.get(device_id).await {
        Some(entry) => encode(
            client_type::OPERATOR,
            kind::STATUS_QUERY_RESPONSE,
            device_id,
            &["success", &entry.status, &entry.power_state],
        ),
        None => encode(
            client_type::OPERATOR,
            kind::STATUS_QUERY_RESPONSE,
            device_id,
            &["fail", "unknown_device"],
        ),
    };
    Ok(reply.unwrap())
}

/// `place_list_query`: the full place roster, each with its device ids,
/// `;`-joined the way multi-record replies are expressed elsewhere.
pub async fn place_list(ctx: &HandlerCtx<'_>, _frame: &DecodedFrame) -> Result<Vec<u8>, ServerError> {
    let places = crate::repo::places::list_with_equipment(&ctx.state.pool).await?;
    let body = places
        .iter()
        .map(|p| format!("{}|{}|{}", p.id, p.name, p.equipment_ids.join(",")))
        .collect::<Vec<_>>()
        .join(";");
    Ok(encode(
        client_type::OPERATOR,
        kind::PLACE_LIST_RESPONSE,
        kind::SUBJECT_ALL,
        &[&body],
    )
    .unwrap())
}
