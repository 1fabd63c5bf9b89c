use equipment_protocol::{client_type, encode, kind, DecodedFrame};
use tracing::{info, warn};

use super::{require_fields, HandlerCtx};
use crate::error::ServerError;
use crate::registry::Outbound;

/// `equipment_online` (wire tag 1): validate, bind, persist, reply.
pub async fn online(ctx: &HandlerCtx<'_>, frame: &DecodedFrame) -> Result<Vec<u8>, ServerError> {
    let fields = require_fields(frame, 2)?;
    let (location, device_type) = (fields[0], fields[1]);
    let device_id = frame.subject.as_str();

    let fail = |reason: &str| {
        Ok(encode(client_type::EQUIPMENT, kind::EQUIPMENT_ONLINE_RESPONSE, "", &["fail", reason]).unwrap())
    };

    let Some(entry) = ctx.state.catalog.get(device_id).await else {
        return fail("unknown_device");
    };
    if !entry.may_connect() {
        return fail("not_registered");
    }

    // First writer to acquire the registry's lock wins; the loser is told
    // to fail and does not get a binding. The rejected connection is left
    // open rather than force-closed (see DESIGN.md).
    if ctx.state.registry.bind_equipment(ctx.conn, device_id).await.is_err() {
        warn!(device_id, location, device_type, "duplicate online rejected");
        return fail("already_online");
    }

    ctx.state
        .catalog
        .set_status_power(device_id, "online", &entry.power_state)
        .await;
    crate::repo::equipment::set_status(&ctx.state.pool, device_id, "online", &entry.power_state).await?;
    crate::repo::status::insert(&ctx.state.pool, device_id, "online", &entry.power_state, None).await?;

    info!(device_id, location, device_type, "equipment online");
    Ok(encode(client_type::EQUIPMENT, kind::EQUIPMENT_ONLINE_RESPONSE, "", &["success"]).unwrap())
}

/// `status_update` (wire tag 2): update status+power and append a status
/// log row. The connection's heartbeat is touched centrally by the caller
/// for every dispatched frame, not just this one.
pub async fn status_update(ctx: &HandlerCtx<'_>, frame: &DecodedFrame) -> Result<Vec<u8>, ServerError> {
    let fields = require_fields(frame, 2)?;
    let (status, power_state) = (fields[0], fields[1]);
    let extra = fields.get(2).copied();
    let device_id = frame.subject.as_str();

    ctx.state.catalog.set_status_power(device_id, status, power_state).await;
    crate::repo::equipment::set_status(&ctx.state.pool, device_id, status, power_state).await?;
    crate::repo::status::insert(&ctx.state.pool, device_id, status, power_state, extra).await?;

    Ok(encode(
        client_type::EQUIPMENT,
        kind::STATUS_UPDATE_RESPONSE,
        device_id,
        &["success"],
    )
    .unwrap())
}

/// `power_report` (wire tag/extension): insert a power-log row, add to the
/// device's running energy total, and raise an alarm + broadcast an alert
/// if the reading exceeds the device's threshold. Unlike every other
/// device-originated kind, this one has no reply.
pub async fn power_report(ctx: &HandlerCtx<'_>, frame: &DecodedFrame) -> Result<Vec<u8>, ServerError> {
    let fields = require_fields(frame, 1)?;
    let device_id = frame.subject.as_str();
    let watts: f64 = fields[0]
        .parse()
        .map_err(|_| ServerError::Protocol("power_report watts is not a number".to_owned()))?;

    crate::repo::power::insert(&ctx.state.pool, device_id, watts).await?;
    crate::repo::equipment::add_energy(&ctx.state.pool, device_id, watts).await?;
    ctx.state.catalog.add_energy(device_id, watts).await;

    let threshold = ctx.state.catalog.get(device_id).await.and_then(|e| e.threshold_watts);
    if let Some(threshold) = threshold {
        if watts > threshold {
            let message = format!("{device_id} reported {watts}W, exceeding threshold {threshold}W");
            let alarm_id =
                crate::repo::alarms::insert(&ctx.state.pool, device_id, "warning", &message).await?;
            warn!(device_id, watts, threshold, alarm_id, "threshold exceeded");

            let alert = encode(
                client_type::OPERATOR,
                kind::ALERT_MESSAGE,
                device_id,
                &[&alarm_id.to_string(), "warning", &message],
            )
            .unwrap();
            for sender in ctx.state.registry.operator_senders().await {
                let _ = sender.send(Outbound::Frame(alert.clone())).await;
            }
        }
    }

    Ok(Vec::new())
}
