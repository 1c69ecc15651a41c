//! WebSocket frame decoder (RFC 6455 Section 5.2).
//!
//! Frames are the smallest unit of the wire protocol. [`read_frame`] decodes
//! exactly one of them from a [`ByteStream`]: header bits, extended length,
//! optional masking key, and the payload, unmasked when the MASK bit is set.
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-------+-+-------------+-------------------------------+
//! |F|R|R|R| opcode|M| Payload len |    Extended payload length    |
//! |I|S|S|S|  (4)  |A|     (7)     |             (16/64)           |
//! |N|V|V|V|       |S|             |   (if payload len==126/127)   |
//! | |1|2|3|       |K|             |                               |
//! +-+-+-+-+-------+-+-------------+ - - - - - - - - - - - - - - - +
//! |     Extended payload length continued, if payload len == 127  |
//! + - - - - - - - - - - - - - - - +-------------------------------+
//! |                               |Masking-key, if MASK set to 1  |
//! +-------------------------------+-------------------------------+
//! | Masking-key (continued)       |          Payload Data         |
//! +-------------------------------- - - - - - - - - - - - - - - - +
//! ```

use std::fmt;

use tracing::trace;

use crate::error::WsError;
use crate::mask::mask_bytes;
use crate::stream::ByteStream;

// Header byte 0.
const FIN_BIT: u8 = 1 << 7;
const RSV1_BIT: u8 = 1 << 6;
const RSV2_BIT: u8 = 1 << 5;
const RSV3_BIT: u8 = 1 << 4;
const OPCODE_BITS: u8 = 0x0F;

// Header byte 1.
const MASK_BIT: u8 = 1 << 7;
const LEN_BITS: u8 = 0x7F;

/// WebSocket frame opcodes per RFC 6455 Section 11.8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    Continuation = 0x0,
    Text = 0x1,
    Binary = 0x2,
    // 0x3-0x7 reserved for further data frames
    Close = 0x8,
    Ping = 0x9,
    Pong = 0xA,
    // 0xB-0xF reserved for further control frames
}

impl Opcode {
    /// Close, Ping or Pong.
    pub const fn is_control(self) -> bool {
        matches!(self, Self::Close | Self::Ping | Self::Pong)
    }

    /// Continuation, Text or Binary.
    pub const fn is_data(self) -> bool {
        matches!(self, Self::Continuation | Self::Text | Self::Binary)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Continuation => "continuation",
            Self::Text => "text",
            Self::Binary => "binary",
            Self::Close => "close",
            Self::Ping => "ping",
            Self::Pong => "pong",
        }
    }
}

impl TryFrom<u8> for Opcode {
    /// The unrecognized opcode value.
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, u8> {
        match value {
            0x0 => Ok(Self::Continuation),
            0x1 => Ok(Self::Text),
            0x2 => Ok(Self::Binary),
            0x8 => Ok(Self::Close),
            0x9 => Ok(Self::Ping),
            0xA => Ok(Self::Pong),
            other => Err(other),
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One decoded wire frame.
///
/// The opcode is kept as the raw 4-bit value: the decoder accepts reserved
/// opcodes and leaves rejecting them to the message reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// FIN bit -- `true` if this is the final fragment of a message.
    pub fin: bool,
    pub opcode: u8,
    /// Whether the payload arrived masked.
    pub masked: bool,
    /// The payload, already unmasked.
    pub payload: Vec<u8>,
}

impl Frame {
    /// The frame's opcode, or the raw value if it is not one RFC 6455 defines.
    pub fn kind(&self) -> Result<Opcode, u8> {
        Opcode::try_from(self.opcode)
    }
}

/// Parse one WebSocket frame from the stream.
///
/// A masked frame's key is read into `mask_key`, overwriting whatever the
/// previous frame left there; the key is consumed even when the payload is
/// empty. Payloads declared longer than `max_payload` are rejected before any
/// payload byte is read.
///
/// Any stream failure is returned as [`WsError::Io`] and no partial frame is
/// produced.
pub fn read_frame<S: ByteStream>(
    stream: &mut S,
    mask_key: &mut [u8; 4],
    max_payload: Option<u64>,
) -> Result<Frame, WsError> {
    // Byte 0: FIN(1) RSV(3) Opcode(4)
    let b0 = stream.read_byte()?;
    let fin = b0 & FIN_BIT != 0;
    if b0 & (RSV1_BIT | RSV2_BIT | RSV3_BIT) != 0 {
        return Err(WsError::ReservedBits {
            rsv1: b0 & RSV1_BIT != 0,
            rsv2: b0 & RSV2_BIT != 0,
            rsv3: b0 & RSV3_BIT != 0,
        });
    }
    let opcode = b0 & OPCODE_BITS;

    // Byte 1: MASK(1) Payload-Length(7)
    let b1 = stream.read_byte()?;
    let masked = b1 & MASK_BIT != 0;
    let payload_len: u64 = match b1 & LEN_BITS {
        126 => {
            let mut buf = [0u8; 2];
            stream.read_into(&mut buf)?;
            u64::from(u16::from_be_bytes(buf))
        }
        127 => {
            let mut buf = [0u8; 8];
            stream.read_into(&mut buf)?;
            let len = u64::from_be_bytes(buf);
            if len >> 63 != 0 {
                return Err(WsError::InvalidLength(len));
            }
            len
        }
        len => u64::from(len),
    };

    if let Some(max) = max_payload {
        if payload_len > max {
            return Err(WsError::FrameTooLarge { len: payload_len, max });
        }
    }

    if masked {
        stream.read_into(mask_key)?;
    }

    let mut payload = Vec::new();
    if payload_len > 0 {
        let len = usize::try_from(payload_len).map_err(|_| WsError::InvalidLength(payload_len))?;
        payload = stream.read_bytes(len)?;
        if masked {
            // A whole payload is unmasked in one block, always from key position 0.
            mask_bytes(mask_key, 0, &mut payload);
        }
    }

    trace!(fin, opcode, masked, payload_len, "decoded frame");

    Ok(Frame {
        fin,
        opcode,
        masked,
        payload,
    })
}
