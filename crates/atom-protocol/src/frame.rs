//! Frame encoding/decoding utilities.
//!
//! Every message on the serial link is wrapped in a frame made of a direction
//! byte, a 2-byte length (little-endian) and the payload.
//!
//! ```text
//! +-----+--------+--------+-------------------+
//! | dir | len_lo | len_hi | data[0..len]      |
//! +-----+--------+--------+-------------------+
//! ```
//!
//! The host sends frames starting with `<`, the Atom answers with `>`.

use bytes::{Buf, BufMut, BytesMut};

/// Maximum frame payload size supported.
pub const MAX_FRAMED_SIZE: usize = 1024;

/// Header byte of host→Atom frames.
pub const HOST_FRAME_HEADER: u8 = b'<';

/// Header byte of Atom→host frames.
pub const ATOM_FRAME_HEADER: u8 = b'>';

/// A codec for reading and writing framed messages.
#[derive(Debug, Default)]
pub struct FrameCodec {
    /// Buffer for accumulating incoming data.
    buffer: BytesMut,
}

impl FrameCodec {
    /// Create a new frame codec.
    pub fn new() -> Self {
        FrameCodec {
            buffer: BytesMut::with_capacity(MAX_FRAMED_SIZE),
        }
    }

    /// Add received data to the buffer.
    pub fn push(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Add a single received byte to the buffer.
    pub fn push_byte(&mut self, byte: u8) {
        self.buffer.put_u8(byte);
    }

    /// Try to decode a complete Atom→host frame from the buffer.
    ///
    /// Returns `Some(frame_data)` if a complete frame is available,
    /// or `None` if more data is needed.
    pub fn decode(&mut self) -> Option<Vec<u8>> {
        loop {
            // Scan for the header byte, discarding any preceding garbage
            let skipped = self
                .buffer
                .iter()
                .position(|&b| b == ATOM_FRAME_HEADER)
                .unwrap_or(self.buffer.len());
            if skipped > 0 {
                log::debug!("discarding {} bytes before frame header", skipped);
                self.buffer.advance(skipped);
            }

            if self.buffer.len() < 3 {
                return None;
            }

            let len = u16::from_le_bytes([self.buffer[1], self.buffer[2]]) as usize;
            if len > MAX_FRAMED_SIZE {
                // Not a real header; resync on the next candidate
                log::warn!("frame length {} exceeds {}, resyncing", len, MAX_FRAMED_SIZE);
                self.buffer.advance(1);
                continue;
            }

            if self.buffer.len() < 3 + len {
                return None;
            }

            self.buffer.advance(3);
            return Some(self.buffer.split_to(len).to_vec());
        }
    }

    /// Encode a host→Atom frame with header and length prefix.
    ///
    /// Payloads longer than [`MAX_FRAMED_SIZE`] are the caller's bug; request
    /// encoders bound every variable field before they get here.
    pub fn encode(data: &[u8]) -> Vec<u8> {
        let len = data.len() as u16;
        let mut buf = Vec::with_capacity(3 + data.len());
        buf.push(HOST_FRAME_HEADER);
        buf.put_u16_le(len);
        buf.extend_from_slice(data);
        buf
    }

    /// Get the number of buffered bytes.
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Clear the buffer.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}
