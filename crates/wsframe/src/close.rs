//! Close frame payloads (RFC 6455 Section 5.5.1, 7.4).

/// Well-known WebSocket close status codes per RFC 6455 Section 7.4.1.
pub struct CloseCode;

impl CloseCode {
    /// Normal closure (1000).
    pub const NORMAL: u16 = 1000;
    /// Going away (1001).
    pub const GOING_AWAY: u16 = 1001;
    /// Protocol error (1002): reserved bits, unknown opcodes.
    pub const PROTOCOL_ERROR: u16 = 1002;
    /// No status code present (1005). Never sent on the wire.
    pub const NO_STATUS: u16 = 1005;
    /// Invalid frame payload data (1007).
    pub const INVALID_DATA: u16 = 1007;
    /// Message too big (1009): size and continuation limits.
    pub const MESSAGE_TOO_BIG: u16 = 1009;

    /// Short name for a well-known code.
    pub fn name(code: u16) -> Option<&'static str> {
        match code {
            Self::NORMAL => Some("normal"),
            Self::GOING_AWAY => Some("going away"),
            Self::PROTOCOL_ERROR => Some("protocol error"),
            Self::NO_STATUS => Some("no status"),
            Self::INVALID_DATA => Some("invalid data"),
            Self::MESSAGE_TOO_BIG => Some("message too big"),
            _ => None,
        }
    }
}

/// Status code and reason carried by a peer's close frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseFrame {
    pub code: u16,
    pub reason: String,
}

impl CloseFrame {
    /// Parse a close frame payload.
    ///
    /// With at least 2 bytes the code is the big-endian first two bytes and
    /// the rest is the reason, decoded as lossy UTF-8. Shorter payloads
    /// carry no status: code 1005 and an empty reason.
    pub fn parse(payload: &[u8]) -> CloseFrame {
        if payload.len() >= 2 {
            CloseFrame {
                code: u16::from_be_bytes([payload[0], payload[1]]),
                reason: String::from_utf8_lossy(&payload[2..]).into_owned(),
            }
        } else {
            CloseFrame {
                code: CloseCode::NO_STATUS,
                reason: String::new(),
            }
        }
    }
}
