use equipment_protocol::{client_type, encode, kind, DecodedFrame};

use super::{require_fields, HandlerCtx};
use crate::auth;
use crate::error::ServerError;
use crate::registry::Outbound;

/// `login`: authenticates an operator connection and binds it to a user
/// id. A second login for the same user closes the older connection first
/// (last-wins,).
pub async fn login(ctx: &HandlerCtx<'_>, frame: &DecodedFrame) -> Result<Vec<u8>, ServerError> {
    let fields = require_fields(frame, 2)?;
    let (username, password) = (fields[0], fields[1]);

    let Some(identity) = auth::authenticate(&ctx.state.pool, username, password).await? else {
        return Ok(encode(client_type::OPERATOR, kind::LOGIN_RESPONSE, "", &["fail", "invalid_credentials"]).unwrap());
    };

    if let Some((_, superseded_sender)) = ctx
        .state
        .registry
        .bind_operator(ctx.conn, identity.user_id, &identity.role)
        .await
    {
        let _ = superseded_sender.send(Outbound::Close("session_superseded")).await;
    }

    Ok(encode(client_type::OPERATOR, kind::LOGIN_RESPONSE, "", &["success", &identity.role]).unwrap())
}
