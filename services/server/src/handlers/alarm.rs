use equipment_protocol::{client_type, encode, kind, DecodedFrame};

use super::{require_fields, HandlerCtx};
use crate::error::ServerError;

/// `alarm_query`: every unacknowledged alarm, `;`-joined.
pub async fn query(ctx: &HandlerCtx<'_>, _frame: &DecodedFrame) -> Result<Vec<u8>, ServerError> {
    let alarms = crate::repo::alarms::list_unacknowledged(&ctx.state.pool).await?;
    let body = alarms
        .iter()
        .map(|a| format!("{}|{}|{}|{}|{}", a.id, a.equipment_id, a.severity, a.message, a.created_at.to_rfc3339()))
        .collect::<Vec<_>>()
        .join(";");
    Ok(encode(client_type::OPERATOR, kind::ALARM_RESPONSE, kind::SUBJECT_ALL, &[&body]).unwrap())
}

/// `alarm_ack`: mark an alarm id acknowledged.
pub async fn ack(ctx: &HandlerCtx<'_>, frame: &DecodedFrame) -> Result<Vec<u8>, ServerError> {
    let fields = require_fields(frame, 1)?;
    let alarm_id: i64 = fields[0]
        .parse()
        .map_err(|_| ServerError::Protocol("alarm_ack alarm_id is not a number".to_owned()))?;

    let found = crate::repo::alarms::acknowledge(&ctx.state.pool, alarm_id).await?;
    let outcome = if found { "success" } else { "fail" };
    Ok(encode(client_type::OPERATOR, kind::ALARM_ACK_RESPONSE, kind::SUBJECT_ALL, &[outcome]).unwrap())
}
