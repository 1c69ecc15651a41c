//! Decode-side state of one WebSocket connection.

use crate::config::ReaderConfig;
use crate::error::WsError;
use crate::frame::{read_frame, Frame};
use crate::stream::ByteStream;

/// Receive half of an established WebSocket connection.
///
/// Created once the opening handshake is complete. Reads take `&mut self`,
/// so at most one frame or message read is in flight and the mask-key
/// buffer has a single writer. Sharing a connection across threads needs an
/// explicit lock around it, e.g. `parking_lot::Mutex<Connection<S>>`.
///
/// Cancel a blocked read by shutting down the underlying stream; the read
/// then fails with a transport error.
#[derive(Debug)]
pub struct Connection<S> {
    stream: S,
    /// Key of the most recent masked frame. Meaningless between frames.
    mask_key: [u8; 4],
    config: ReaderConfig,
}

impl<S: ByteStream> Connection<S> {
    pub fn new(stream: S) -> Self {
        Self::with_config(stream, ReaderConfig::default())
    }

    pub fn with_config(stream: S, config: ReaderConfig) -> Self {
        Connection {
            stream,
            mask_key: [0; 4],
            config,
        }
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    pub fn get_ref(&self) -> &S {
        &self.stream
    }

    pub fn get_mut(&mut self) -> &mut S {
        &mut self.stream
    }

    /// Give the stream back, e.g. to close it.
    pub fn into_inner(self) -> S {
        self.stream
    }

    /// Decode the next frame without any message-level handling.
    pub fn read_frame(&mut self) -> Result<Frame, WsError> {
        read_frame(&mut self.stream, &mut self.mask_key, self.config.max_frame_size)
    }
}
