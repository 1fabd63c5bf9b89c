use equipment_protocol::{client_type, encode, kind, DecodedFrame};

use super::{require_fields, HandlerCtx};
use crate::auth::is_admin;
use crate::error::ServerError;
use crate::registry::Identity;

/// `energy_query`: hourly wattage buckets for one device or every device,
/// `;`-joined and bounded by the per-query row cap.
pub async fn query(ctx: &HandlerCtx<'_>, frame: &DecodedFrame) -> Result<Vec<u8>, ServerError> {
    let subject = frame.subject.as_str();
    let buckets = if subject.is_empty() || subject == kind::SUBJECT_ALL {
        crate::repo::power::buckets_all(&ctx.state.pool).await?
    } else {
        crate::repo::power::buckets_for_device(&ctx.state.pool, subject).await?
    };

    let body = buckets
        .iter()
        .map(|b| format!("{}|{}|{}", b.equipment_id, b.bucket_start.to_rfc3339(), b.total_watts))
        .collect::<Vec<_>>()
        .join(";");
    Ok(encode(client_type::OPERATOR, kind::ENERGY_RESPONSE, subject, &[&body]).unwrap())
}

/// `set_threshold` (admin role only): persist a per-device watt threshold.
pub async fn set_threshold(ctx: &HandlerCtx<'_>, frame: &DecodedFrame) -> Result<Vec<u8>, ServerError> {
    let fields = require_fields(frame, 1)?;
    let device_id = frame.subject.as_str();

    let Identity::Operator { role, .. } = &ctx.identity else {
        return Err(ServerError::Protocol("set_threshold requires a logged-in operator".to_owned()));
    };
    if !is_admin(role) {
        return Ok(encode(client_type::OPERATOR, kind::SET_THRESHOLD_RESPONSE, device_id, &["fail", "not_admin"]).unwrap());
    }

    let watts: f64 = fields[0]
        .parse()
        .map_err(|_| ServerError::Protocol("set_threshold watts is not a number".to_owned()))?;

    crate::repo::equipment::set_threshold(&ctx.state.pool, device_id, watts).await?;
    ctx.state.catalog.set_threshold(device_id, watts).await;

    Ok(encode(client_type::OPERATOR, kind::SET_THRESHOLD_RESPONSE, device_id, &["success"]).unwrap())
}
