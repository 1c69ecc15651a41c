//! Receive side of the WebSocket framing protocol (RFC 6455 Section 5).
//!
//! Turns a blocking byte stream from an already-upgraded connection into
//! application messages:
//!
//! - **Masking** (`mask`): XOR unmasking with a rolling key position
//! - **Frame decoder** (`frame`): one wire frame at a time -- header bits,
//!   extended lengths, masking key, payload
//! - **Message reader** (`message`): fragment reassembly with interleaved
//!   ping/pong, close detection, and a cap on frames per message
//!
//! Handshake, frame encoding and ping/pong replies live outside this crate.
//!
//! ```no_run
//! use std::io::BufReader;
//! use std::net::TcpStream;
//!
//! # fn run(stream: TcpStream) -> Result<(), wsframe::WsError> {
//! let mut conn = wsframe::Connection::new(BufReader::new(stream));
//! loop {
//!     match conn.read_message() {
//!         Ok(message) => println!("{} {} bytes", message.opcode, message.payload.len()),
//!         Err(e) if e.is_close() => return Ok(()),
//!         Err(e) => return Err(e),
//!     }
//! }
//! # }
//! ```

pub mod close;
pub mod config;
pub mod conn;
pub mod error;
pub mod frame;
pub mod mask;
pub mod message;
pub mod stream;

pub use close::{CloseCode, CloseFrame};
pub use config::{ReaderConfig, DEFAULT_CONTINUATION_LIMIT};
pub use conn::Connection;
pub use error::{ErrorKind, WsError};
pub use frame::{read_frame, Frame, Opcode};
pub use mask::mask_bytes;
pub use message::Message;
pub use stream::ByteStream;
