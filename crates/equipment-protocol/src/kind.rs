//! Message-kind numeric tags. The tags in the "frozen" block below
//! must never be renumbered: existing equipment simulators and operator
//! clients depend on them. The tags below that are this server's own
//! extension of the protocol's open-ended "(others)" bucket and the
//! various `*_response` replies the original protocol leaves unlisted;
//! they are stable for this implementation but carry no external
//! backward-compat obligation beyond it.

// --- Frozen wire tags ---
pub const EQUIPMENT_ONLINE: u32 = 1;
pub const STATUS_UPDATE: u32 = 2;
pub const CONTROL_COMMAND: u32 = 3;
pub const HEARTBEAT: u32 = 4;
pub const RESERVATION_APPLY: u32 = 5;
pub const RESERVATION_QUERY: u32 = 6;
pub const RESERVATION_APPROVE: u32 = 7;
pub const CONTROL_RESPONSE: u32 = 8;

// --- Login / catalog / energy / alarm / control-request family ---
pub const LOGIN: u32 = 20;
pub const LOGIN_RESPONSE: u32 = 21;
pub const PLACE_LIST_QUERY: u32 = 22;
pub const PLACE_LIST_RESPONSE: u32 = 23;
pub const ENERGY_QUERY: u32 = 24;
pub const ENERGY_RESPONSE: u32 = 25;
pub const SET_THRESHOLD: u32 = 26;
pub const SET_THRESHOLD_RESPONSE: u32 = 27;
pub const ALARM_QUERY: u32 = 28;
pub const ALARM_RESPONSE: u32 = 29;
pub const ALARM_ACK: u32 = 30;
pub const ALARM_ACK_RESPONSE: u32 = 31;
pub const POWER_REPORT: u32 = 32;
pub const CONTROL_REQUEST: u32 = 34;
pub const CONTROL_REQUEST_RESPONSE: u32 = 35;
pub const STATUS_QUERY: u32 = 36;
pub const STATUS_QUERY_RESPONSE: u32 = 37;
pub const EQUIPMENT_ONLINE_RESPONSE: u32 = 38;
pub const STATUS_UPDATE_RESPONSE: u32 = 39;
pub const RESERVATION_APPLY_RESPONSE: u32 = 40;
pub const RESERVATION_QUERY_RESPONSE: u32 = 41;
pub const RESERVATION_APPROVE_RESPONSE: u32 = 42;
pub const ALERT_MESSAGE: u32 = 43;

/// `qt_heartbeat` in is the legacy operator-side name for the same
/// `heartbeat` wire tag; kept as an alias rather than a second numeric tag.
pub const QT_HEARTBEAT: u32 = HEARTBEAT;

/// Subject-id sentinel meaning "all devices" / "all places" depending on kind.
pub const SUBJECT_ALL: &str = "all";

/// The `*_response` kind a request kind replies with, if any. Used by the
/// connection loop to build a generic negative reply when a handler's own
/// error (a downstream failure, typically) propagates before the handler
/// gets a chance to encode its own reply. Kinds with no natural reply
/// (device-originated, fire-and-forget messages) return `None`.
pub fn response_for(request_kind: u32) -> Option<u32> {
    match request_kind {
        EQUIPMENT_ONLINE => Some(EQUIPMENT_ONLINE_RESPONSE),
        STATUS_UPDATE => Some(STATUS_UPDATE_RESPONSE),
        RESERVATION_APPLY => Some(RESERVATION_APPLY_RESPONSE),
        RESERVATION_QUERY => Some(RESERVATION_QUERY_RESPONSE),
        RESERVATION_APPROVE => Some(RESERVATION_APPROVE_RESPONSE),
        LOGIN => Some(LOGIN_RESPONSE),
        PLACE_LIST_QUERY => Some(PLACE_LIST_RESPONSE),
        ENERGY_QUERY => Some(ENERGY_RESPONSE),
        SET_THRESHOLD => Some(SET_THRESHOLD_RESPONSE),
        ALARM_QUERY => Some(ALARM_RESPONSE),
        ALARM_ACK => Some(ALARM_ACK_RESPONSE),
        CONTROL_REQUEST => Some(CONTROL_RESPONSE),
        STATUS_QUERY => Some(STATUS_QUERY_RESPONSE),
        _ => None,
    }
}

/// Command kinds embedded inside `control_command` / `control_response`.
pub mod cmd {
    pub const TURN_ON: u32 = 1;
    pub const TURN_OFF: u32 = 2;
    pub const RESTART: u32 = 3;
    pub const ADJUST_SETTINGS: u32 = 4;
}
