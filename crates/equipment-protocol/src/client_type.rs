/// Wire `client_type` tag values. Additional values are reserved.
pub const EQUIPMENT: u32 = 1;
pub const OPERATOR: u32 = 2;
