//! Byte-stream collaborator consumed by the frame decoder.

use std::io::{self, Read};

/// Upper bound on the buffer reserved ahead of a payload read. Larger
/// payloads grow as bytes actually arrive, so a forged length header cannot
/// force a huge allocation on its own.
const PREALLOC_LIMIT: usize = 64 * 1024;

/// Blocking reads the decoder needs from the transport.
///
/// Every method blocks until it is satisfied or fails; a stream that ends
/// early reports [`io::ErrorKind::UnexpectedEof`]. Implemented for every
/// [`Read`], so a `TcpStream`, a `BufReader` over one, or an in-memory
/// `Cursor` can back a connection directly.
pub trait ByteStream {
    /// Read a single byte.
    fn read_byte(&mut self) -> io::Result<u8>;

    /// Fill `buf` completely.
    fn read_into(&mut self, buf: &mut [u8]) -> io::Result<()>;

    /// Read exactly `n` bytes into a fresh buffer.
    fn read_bytes(&mut self, n: usize) -> io::Result<Vec<u8>>;
}

impl<R: Read> ByteStream for R {
    fn read_byte(&mut self) -> io::Result<u8> {
        let mut byte = [0u8; 1];
        self.read_exact(&mut byte)?;
        Ok(byte[0])
    }

    fn read_into(&mut self, buf: &mut [u8]) -> io::Result<()> {
        self.read_exact(buf)
    }

    fn read_bytes(&mut self, n: usize) -> io::Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(n.min(PREALLOC_LIMIT));
        self.by_ref().take(n as u64).read_to_end(&mut buf)?;
        if buf.len() < n {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("stream ended after {} of {} payload bytes", buf.len(), n),
            ));
        }
        Ok(buf)
    }
}
