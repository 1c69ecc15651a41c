//! Message reassembly (RFC 6455 Section 5.4).
//!
//! A message is one data frame with FIN set, or a first fragment (FIN=0,
//! text/binary) followed by continuation frames up to one with FIN set.
//! Ping and pong frames may be interleaved anywhere; a close frame ends the
//! read.

use std::str;

use tracing::{debug, trace, warn};

use crate::close::CloseFrame;
use crate::conn::Connection;
use crate::error::WsError;
use crate::frame::{Frame, Opcode};
use crate::stream::ByteStream;

/// A complete application message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Opcode of the frame that started the message; never `Continuation`.
    pub opcode: Opcode,
    pub payload: Vec<u8>,
}

impl Message {
    pub fn is_text(&self) -> bool {
        self.opcode == Opcode::Text
    }

    /// The payload as UTF-8, if it is valid.
    pub fn as_text(&self) -> Option<&str> {
        str::from_utf8(&self.payload).ok()
    }
}

/// Where a message read stands between frames.
#[derive(Debug)]
enum Assembly {
    /// No data frame seen yet in this read.
    Idle,
    /// A first fragment arrived; waiting for the frame with FIN set.
    Accumulating { opcode: Opcode, payload: Vec<u8> },
}

/// Result of feeding a data frame to the [`Assembler`].
#[derive(Debug)]
enum Step {
    /// Still accumulating fragments.
    Pending,
    /// The message is complete.
    Done(Message),
}

/// Reassembly state machine for one message read.
///
/// Control frames never reach it; they are handled by the read loop without
/// touching fragment state.
#[derive(Debug)]
struct Assembler {
    state: Assembly,
    max_message_size: Option<usize>,
}

impl Assembler {
    fn new(max_message_size: Option<usize>) -> Self {
        Assembler {
            state: Assembly::Idle,
            max_message_size,
        }
    }

    fn check_size(&self, len: usize) -> Result<(), WsError> {
        match self.max_message_size {
            Some(max) if len > max => Err(WsError::MessageTooLarge { len, max }),
            _ => Ok(()),
        }
    }

    /// Feed a text, binary or continuation frame.
    fn push(&mut self, fin: bool, opcode: Opcode, payload: Vec<u8>) -> Result<Step, WsError> {
        match std::mem::replace(&mut self.state, Assembly::Idle) {
            Assembly::Idle => self.start(fin, opcode, payload),
            Assembly::Accumulating {
                opcode: first,
                payload: buffer,
            } => self.extend(fin, first, buffer, payload),
        }
    }

    fn start(&mut self, fin: bool, opcode: Opcode, payload: Vec<u8>) -> Result<Step, WsError> {
        if opcode == Opcode::Continuation {
            return Err(WsError::UnexpectedContinuation);
        }
        self.check_size(payload.len())?;
        if fin {
            // Unfragmented message: hand the frame's payload over as is.
            return Ok(Step::Done(Message { opcode, payload }));
        }
        self.state = Assembly::Accumulating { opcode, payload };
        Ok(Step::Pending)
    }

    /// Any data opcode is accepted mid-sequence; the first fragment's opcode
    /// stays the message opcode.
    fn extend(
        &mut self,
        fin: bool,
        opcode: Opcode,
        mut buffer: Vec<u8>,
        payload: Vec<u8>,
    ) -> Result<Step, WsError> {
        self.check_size(buffer.len() + payload.len())?;
        buffer.extend_from_slice(&payload);
        if fin {
            return Ok(Step::Done(Message {
                opcode,
                payload: buffer,
            }));
        }
        self.state = Assembly::Accumulating {
            opcode,
            payload: buffer,
        };
        Ok(Step::Pending)
    }
}

impl<S: ByteStream> Connection<S> {
    /// Read one complete message, skipping pings and pongs.
    ///
    /// See [`read_message_with`](Self::read_message_with).
    pub fn read_message(&mut self) -> Result<Message, WsError> {
        self.read_message_with(|_| {})
    }

    /// Read one complete message, reassembling fragments.
    ///
    /// Ping and pong frames interleaved with the message are passed to
    /// `on_control` and otherwise ignored; answering them is up to the
    /// caller. Every frame that does not complete the message counts
    /// towards [`ReaderConfig::continuation_limit`](crate::ReaderConfig),
    /// and the read fails once that count goes over the limit.
    ///
    /// A close frame ends the read with [`WsError::Close`]; the connection
    /// must not be read again after that.
    pub fn read_message_with<F>(&mut self, mut on_control: F) -> Result<Message, WsError>
    where
        F: FnMut(&Frame),
    {
        let limit = self.config().continuation_limit;
        let mut assembler = Assembler::new(self.config().max_message_size);
        let mut skipped = 0usize;

        loop {
            let frame = self.read_frame()?;
            match frame.kind() {
                Ok(opcode @ (Opcode::Text | Opcode::Binary | Opcode::Continuation)) => {
                    if let Step::Done(message) = assembler.push(frame.fin, opcode, frame.payload)? {
                        debug!(
                            opcode = %message.opcode,
                            frames = skipped + 1,
                            len = message.payload.len(),
                            "message complete"
                        );
                        return Ok(message);
                    }
                }
                Ok(opcode @ (Opcode::Ping | Opcode::Pong)) => {
                    trace!(%opcode, len = frame.payload.len(), "control frame inside message read");
                    on_control(&frame);
                }
                Ok(Opcode::Close) => {
                    let close = CloseFrame::parse(&frame.payload);
                    debug!(code = close.code, reason = %close.reason, "peer sent close");
                    return Err(WsError::Close(close));
                }
                Err(opcode) => {
                    warn!(fin = frame.fin, opcode, "unknown opcode");
                    return Err(WsError::UnknownOpcode {
                        fin: frame.fin,
                        opcode,
                    });
                }
            }

            skipped += 1;
            if skipped > limit {
                warn!(limit, "too many frames without completing a message");
                return Err(WsError::ContinuationLimit { limit });
            }
        }
    }
}
