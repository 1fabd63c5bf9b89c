use chrono::{DateTime, Utc};
use equipment_protocol::{client_type, encode, kind, DecodedFrame};

use super::{require_fields, HandlerCtx};
use crate::auth::is_admin;
use crate::error::ServerError;
use crate::registry::Identity;

fn parse_time(s: &str) -> Result<DateTime<Utc>, ServerError> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| ServerError::Protocol(format!("not a valid RFC 3339 timestamp: {s}")))
}

/// `reservation_apply`: validate the user, reject overlapping bookings for
/// the place, insert, reply.
pub async fn apply(ctx: &HandlerCtx<'_>, frame: &DecodedFrame) -> Result<Vec<u8>, ServerError> {
    let fields = require_fields(frame, 4)?;
    let user_id: i64 = fields[0]
        .parse()
        .map_err(|_| ServerError::Protocol("reservation_apply user_id is not a number".to_owned()))?;
    let start = parse_time(fields[1])?;
    let end = parse_time(fields[2])?;
    let purpose = fields[3];
    let place_id = frame.subject.as_str();

    let fail = |reason: &str| {
        Ok(encode(
            client_type::OPERATOR,
            kind::RESERVATION_APPLY_RESPONSE,
            place_id,
            &["fail", reason],
        )
        .unwrap())
    };

    // Validated against the real user table rather than treating any id
    // in a fixed debug range as valid.
    if !crate::repo::users::exists(&ctx.state.pool, user_id).await? {
        return fail("unknown_user");
    }
    if crate::repo::reservations::has_overlap(&ctx.state.pool, place_id, start, end).await? {
        return fail("overlap");
    }

    let id = crate::repo::reservations::insert(&ctx.state.pool, place_id, user_id, purpose, start, end).await?;
    Ok(encode(
        client_type::OPERATOR,
        kind::RESERVATION_APPLY_RESPONSE,
        place_id,
        &["success", &id.to_string()],
    )
    .unwrap())
}

/// `reservation_query`: filtered per the caller's role (admin sees all,
/// teacher sees their own plus supervised students', student sees only
/// their own).
pub async fn query(ctx: &HandlerCtx<'_>, frame: &DecodedFrame) -> Result<Vec<u8>, ServerError> {
    let Identity::Operator { user_id, role } = &ctx.identity else {
        return Err(ServerError::Protocol("reservation_query requires a logged-in operator".to_owned()));
    };
    let place_id = if frame.subject.is_empty() || frame.subject == kind::SUBJECT_ALL {
        None
    } else {
        Some(frame.subject.as_str())
    };

    let rows = crate::repo::reservations::list_for_viewer(&ctx.state.pool, place_id, *user_id, role).await?;
    let body = rows
        .iter()
        .map(|r| {
            format!(
                "{}|{}|{}|{}|{}|{}|{}",
                r.id, r.place_id, r.user_id, r.purpose, r.start_time.to_rfc3339(), r.end_time.to_rfc3339(), r.status
            )
        })
        .collect::<Vec<_>>()
        .join(";");
    Ok(encode(
        client_type::OPERATOR,
        kind::RESERVATION_QUERY_RESPONSE,
        &frame.subject,
        &[&body],
    )
    .unwrap())
}

/// `reservation_approve` (admin role only, per the DB-derived role rather
/// than a literal-string admin check).
pub async fn approve(ctx: &HandlerCtx<'_>, frame: &DecodedFrame) -> Result<Vec<u8>, ServerError> {
    let fields = require_fields(frame, 2)?;
    let place_id = frame.subject.as_str();

    let Identity::Operator { role, .. } = &ctx.identity else {
        return Err(ServerError::Protocol("reservation_approve requires a logged-in operator".to_owned()));
    };
    if !is_admin(role) {
        return Ok(encode(
            client_type::OPERATOR,
            kind::RESERVATION_APPROVE_RESPONSE,
            place_id,
            &["fail", "not_admin"],
        )
        .unwrap());
    }

    let reservation_id: i64 = fields[0]
        .parse()
        .map_err(|_| ServerError::Protocol("reservation_approve reservation_id is not a number".to_owned()))?;
    let status = match fields[1] {
        "approve" => "approved",
        "reject" => "rejected",
        other => {
            return Err(ServerError::Protocol(format!(
                "reservation_approve expects approve|reject, got {other}"
            )))
        }
    };

    let updated =
        crate::repo::reservations::set_status(&ctx.state.pool, reservation_id, place_id, status).await?;
    let outcome = if updated { "success" } else { "fail" };
    Ok(encode(
        client_type::OPERATOR,
        kind::RESERVATION_APPROVE_RESPONSE,
        place_id,
        &[outcome],
    )
    .unwrap())
}
