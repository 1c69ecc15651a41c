//! Errors surfaced by frame decoding and message reads.

use std::io;

use crate::close::CloseFrame;

/// Coarse classification of a [`WsError`], for callers deciding how to end
/// the connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The byte stream failed or ended early.
    Transport,
    /// The peer violated the framing protocol.
    Protocol,
    /// The peer sent a close frame.
    Close,
    /// A configured or built-in limit was exceeded.
    ResourceLimit,
}

/// Failure of a single frame decode or message read.
///
/// None of these are recovered from internally: the read that produced the
/// error returns immediately and no partial frame or message is kept.
#[derive(Debug, thiserror::Error)]
pub enum WsError {
    /// Lower-layer I/O failure, passed through unchanged.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// RSV1-3 must be zero without a negotiated extension.
    #[error("unexpected reserved bits rsv1={rsv1}, rsv2={rsv2}, rsv3={rsv3}")]
    ReservedBits { rsv1: bool, rsv2: bool, rsv3: bool },

    #[error("unknown control message, fin={fin}, op={opcode}")]
    UnknownOpcode { fin: bool, opcode: u8 },

    /// A continuation frame arrived with no message in progress.
    #[error("unexpected continuation frame")]
    UnexpectedContinuation,

    /// 64-bit length with the most significant bit set, or a length that
    /// does not fit in memory on this platform.
    #[error("invalid payload length {0}")]
    InvalidLength(u64),

    /// The peer asked to close the connection.
    #[error("close control message")]
    Close(CloseFrame),

    #[error("continuation frame max read ({limit} frames)")]
    ContinuationLimit { limit: usize },

    #[error("frame payload of {len} bytes exceeds maximum {max}")]
    FrameTooLarge { len: u64, max: u64 },

    #[error("message payload of {len} bytes exceeds maximum {max}")]
    MessageTooLarge { len: usize, max: usize },
}

impl WsError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WsError::Io(_) => ErrorKind::Transport,
            WsError::ReservedBits { .. }
            | WsError::UnknownOpcode { .. }
            | WsError::UnexpectedContinuation
            | WsError::InvalidLength(_) => ErrorKind::Protocol,
            WsError::Close(_) => ErrorKind::Close,
            WsError::ContinuationLimit { .. }
            | WsError::FrameTooLarge { .. }
            | WsError::MessageTooLarge { .. } => ErrorKind::ResourceLimit,
        }
    }

    /// True when the peer sent a close frame. The connection must not be
    /// read from again.
    pub fn is_close(&self) -> bool {
        matches!(self, WsError::Close(_))
    }

    /// The close code a caller would send back when terminating on this error.
    pub fn close_code(&self) -> Option<u16> {
        use crate::close::CloseCode;
        match self.kind() {
            ErrorKind::Protocol => Some(CloseCode::PROTOCOL_ERROR),
            ErrorKind::ResourceLimit => Some(CloseCode::MESSAGE_TOO_BIG),
            ErrorKind::Close | ErrorKind::Transport => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_pass_through() {
        let err = WsError::from(io::Error::new(io::ErrorKind::UnexpectedEof, "early eof"));
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(err.to_string(), "early eof");
        assert!(err.close_code().is_none());
    }

    #[test]
    fn kinds() {
        let rsv = WsError::ReservedBits { rsv1: true, rsv2: false, rsv3: false };
        assert_eq!(rsv.kind(), ErrorKind::Protocol);
        assert_eq!(rsv.close_code(), Some(1002));

        let close = WsError::Close(CloseFrame { code: 1000, reason: String::new() });
        assert!(close.is_close());
        assert_eq!(close.kind(), ErrorKind::Close);

        let limit = WsError::ContinuationLimit { limit: 100 };
        assert_eq!(limit.kind(), ErrorKind::ResourceLimit);
        assert_eq!(limit.close_code(), Some(1009));
        assert!(!limit.is_close());
    }
}
