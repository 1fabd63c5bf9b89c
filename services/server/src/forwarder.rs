use equipment_protocol::{client_type, encode, kind};

use crate::registry::{ConnectionRegistry, Outbound};

pub enum ForwardResult {
    Sent,
    DeviceOffline,
    WriteError,
}

/// Thin relay over the registry: looks up the device's
/// connection, encodes a `control_command` frame, and hands it to that
/// connection's outbound channel. Does not wait for the device's reply;
/// correlation back to the operator happens later, keyed by device id, when
/// the device's `control_response` arrives.
pub async fn forward_control(
    registry: &ConnectionRegistry,
    device_id: &str,
    cmd_kind: u32,
    params: &[&str],
) -> ForwardResult {
    let Some((_, sender)) = registry.lookup_device(device_id).await else {
        return ForwardResult::DeviceOffline;
    };

    let mut fields = vec![cmd_kind.to_string()];
    fields.extend(params.iter().map(|s| s.to_string()));
    let field_refs: Vec<&str> = fields.iter().map(String::as_str).collect();

    let frame = match encode(
        client_type::EQUIPMENT,
        kind::CONTROL_COMMAND,
        device_id,
        &field_refs,
    ) {
        Ok(f) => f,
        Err(_) => return ForwardResult::WriteError,
    };

    match sender.send(Outbound::Frame(frame)).await {
        Ok(()) => ForwardResult::Sent,
        Err(_) => ForwardResult::WriteError,
    }
}
