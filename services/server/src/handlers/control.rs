use equipment_protocol::{client_type, encode, kind, DecodedFrame};
use tracing::info;

use super::{require_fields, HandlerCtx};
use crate::error::ServerError;
use crate::forwarder::{forward_control, ForwardResult};
use crate::registry::Outbound;

/// `control_request` (operator ingress): resolve the device's connection
/// and forward a `control_command`, then synchronously acknowledge the
/// *forwarding* outcome to the operator, not the device's eventual
/// execution result, which arrives later via `control_response`.
pub async fn control_request(ctx: &HandlerCtx<'_>, frame: &DecodedFrame) -> Result<Vec<u8>, ServerError> {
    let fields = require_fields(frame, 1)?;
    let cmd_kind: u32 = fields[0]
        .parse()
        .map_err(|_| ServerError::Protocol("control_request cmd_kind is not a number".to_owned()))?;
    let params = &fields[1..];
    let device_id = frame.subject.as_str();

    let result = forward_control(&ctx.state.registry, device_id, cmd_kind, params).await;
    let reply = match result {
        ForwardResult::Sent => {
            info!(device_id, cmd_kind, "control request forwarded");
            encode(client_type::OPERATOR, kind::CONTROL_RESPONSE, device_id, &["success", "forwarded"])
        }
        ForwardResult::DeviceOffline => {
            encode(client_type::OPERATOR, kind::CONTROL_RESPONSE, device_id, &["fail", "device_offline"])
        }
        ForwardResult::WriteError => {
            encode(client_type::OPERATOR, kind::CONTROL_RESPONSE, device_id, &["fail", "write_error"])
        }
    };
    Ok(reply.unwrap())
}

/// `control_response` (wire tag 8, from equipment): update power state on
/// success, persist a status log row, and fan out an unsolicited copy to
/// every connected operator.
pub async fn control_response(ctx: &HandlerCtx<'_>, frame: &DecodedFrame) -> Result<Vec<u8>, ServerError> {
    let fields = require_fields(frame, 2)?;
    let (outcome, cmd_name) = (fields[0], fields[1]);
    let reason = fields.get(2).copied();
    let device_id = frame.subject.as_str();

    if outcome == "success" {
        let power_state = match cmd_name {
            "turn_on" => Some("on"),
            "turn_off" => Some("off"),
            "restart" => Some("on"),
            _ => None,
        };
        if let Some(power_state) = power_state {
            ctx.state.catalog.set_power(device_id, power_state).await;
            crate::repo::equipment::set_power_state(&ctx.state.pool, device_id, power_state).await?;
        }
    }
    crate::repo::status::insert(&ctx.state.pool, device_id, outcome, cmd_name, reason).await?;

    let mut relay_fields = vec![outcome, cmd_name];
    if let Some(reason) = reason {
        relay_fields.push(reason);
    }
    let relay = encode(client_type::OPERATOR, kind::CONTROL_RESPONSE, device_id, &relay_fields).unwrap();
    for sender in ctx.state.registry.operator_senders().await {
        let _ = sender.send(Outbound::Frame(relay.clone())).await;
    }

    Ok(Vec::new())
}
