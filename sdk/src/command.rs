/// Numeric codes identifying the two RPC operations on the wire. Kept as
/// plain constants rather than a derive-heavy enum-dispatch machine since the
/// whole surface is two calls (unlike the teacher's dozens of commands).
pub const PRODUCE_CODE: u32 = 1;
pub const POLL_CODE: u32 = 2;

/// Status codes in the response frame's first four bytes.
pub const STATUS_OK: u32 = 0;
pub const STATUS_ERROR: u32 = 1;
