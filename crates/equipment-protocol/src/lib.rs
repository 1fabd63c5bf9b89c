//! Wire codec for the campus equipment management protocol.
//!
//! A frame is `[4-byte big-endian length N][N bytes body]`. The body is a
//! UTF-8 pipe-delimited string: `CLIENT_TYPE '|' KIND '|' SUBJECT ('|' FIELD)*`.
//! There is no escaping of `|` within fields; handlers that carry free-form
//! text must tolerate it and must not inject it into fields they control.

pub mod buffer;
pub mod client_type;
pub mod error;
pub mod kind;

pub use buffer::ConnBuffer;
pub use error::{BufferError, DecodeError, FrameError};

/// Maximum body length accepted on the wire (64 KiB).
pub const MAX_FRAME: usize = 64 * 1024;

/// A decoded frame body, split into its header fields and an un-split
/// payload remainder.
///
/// `payload_rest` is the literal substring after the third `|`, not
/// re-split here: several message kinds embed their own `;`/`|`-delimited
/// sub-records and must see them verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFrame {
    pub client_type: u32,
    pub kind: u32,
    pub subject: String,
    pub payload_rest: String,
}

impl DecodedFrame {
    /// Splits `payload_rest` on `|` into the handler's own fields.
    pub fn fields(&self) -> Vec<&str> {
        if self.payload_rest.is_empty() {
            Vec::new()
        } else {
            self.payload_rest.split('|').collect()
        }
    }
}

/// Encodes a frame body from its header fields and payload, length-prefixed.
///
/// Fails only when the resulting body would exceed [`MAX_FRAME`].
pub fn encode(
    client_type: u32,
    kind: u32,
    subject: &str,
    fields: &[&str],
) -> Result<Vec<u8>, FrameError> {
    let mut body = format!("{client_type}|{kind}|{subject}");
    for field in fields {
        body.push('|');
        body.push_str(field);
    }
    if body.len() > MAX_FRAME {
        return Err(FrameError::TooLarge(body.len()));
    }
    let mut out = Vec::with_capacity(4 + body.len());
    out.extend_from_slice(&(body.len() as u32).to_be_bytes());
    out.extend_from_slice(body.as_bytes());
    Ok(out)
}

/// Encodes a frame whose body is a single pre-built string (used for the
/// legacy `4|pong` heartbeat reply, which has no `client_type` field).
pub fn encode_raw(body: &str) -> Result<Vec<u8>, FrameError> {
    if body.len() > MAX_FRAME {
        return Err(FrameError::TooLarge(body.len()));
    }
    let mut out = Vec::with_capacity(4 + body.len());
    out.extend_from_slice(&(body.len() as u32).to_be_bytes());
    out.extend_from_slice(body.as_bytes());
    Ok(out)
}

/// Decodes a frame body (already extracted from the length prefix) into its
/// header fields. `ok=false` cases from surface as `Err`:
/// fewer than 3 fields, an unparseable `client_type`, or a `kind` outside
/// `[1, 200]`.
pub fn decode(body: &[u8]) -> Result<DecodedFrame, DecodeError> {
    let text = std::str::from_utf8(body).map_err(|_| DecodeError::InvalidUtf8)?;
    let mut parts = text.splitn(4, '|');
    let client_type = parts.next().ok_or(DecodeError::TooFewFields)?;
    let kind = parts.next().ok_or(DecodeError::TooFewFields)?;
    let subject = parts.next().ok_or(DecodeError::TooFewFields)?;
    let rest = parts.next().unwrap_or("");

    if client_type.is_empty() || kind.is_empty() {
        return Err(DecodeError::TooFewFields);
    }

    let client_type: u32 = client_type
        .parse()
        .map_err(|_| DecodeError::InvalidClientType)?;
    let kind: u32 = kind.parse().map_err(|_| DecodeError::InvalidKind)?;
    if !(1..=200).contains(&kind) {
        return Err(DecodeError::InvalidKind);
    }

    Ok(DecodedFrame {
        client_type,
        kind,
        subject: subject.to_owned(),
        payload_rest: rest.to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_law() {
        let frame = encode(1, 1, "proj_101", &["room_A", "projector"]).unwrap();
        let len = u32::from_be_bytes(frame[0..4].try_into().unwrap()) as usize;
        let body = &frame[4..4 + len];
        let decoded = decode(body).unwrap();
        assert_eq!(decoded.client_type, 1);
        assert_eq!(decoded.kind, 1);
        assert_eq!(decoded.subject, "proj_101");
        assert_eq!(decoded.payload_rest, "room_A|projector");
        assert_eq!(decoded.fields(), vec!["room_A", "projector"]);
    }

    #[test]
    fn preserves_inner_pipes_in_remainder() {
        let body = b"2|6|all|rec1;a|b|c;rec2;x|y";
        let decoded = decode(body).unwrap();
        assert_eq!(decoded.payload_rest, "rec1;a|b|c;rec2;x|y");
    }

    #[test]
    fn empty_body_is_protocol_error() {
        assert!(matches!(decode(b""), Err(DecodeError::TooFewFields)));
    }

    #[test]
    fn too_few_fields_is_protocol_error() {
        assert!(matches!(decode(b"1|2"), Err(DecodeError::TooFewFields)));
    }

    #[test]
    fn kind_out_of_range_is_protocol_error() {
        assert!(matches!(decode(b"1|201|x"), Err(DecodeError::InvalidKind)));
        assert!(matches!(decode(b"1|0|x"), Err(DecodeError::InvalidKind)));
    }

    #[test]
    fn unparseable_client_type_is_protocol_error() {
        assert!(matches!(
            decode(b"abc|1|x"),
            Err(DecodeError::InvalidClientType)
        ));
    }

    #[test]
    fn encode_rejects_oversize_body() {
        let huge = "a".repeat(MAX_FRAME + 1);
        let err = encode(1, 1, &huge, &[]).unwrap_err();
        assert!(matches!(err, FrameError::TooLarge(_)));
    }

    #[test]
    fn encode_raw_matches_legacy_heartbeat_reply() {
        let frame = encode_raw("4|pong").unwrap();
        let len = u32::from_be_bytes(frame[0..4].try_into().unwrap()) as usize;
        assert_eq!(&frame[4..4 + len], b"4|pong");
    }
}
