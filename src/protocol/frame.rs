//! Frame encoding and decoding for the serial host link.
//!
//! The wire format is a length-prefixed frame:
//! ```text
//! ┌──────────────┬───────────────┬─────────────────┐
//! │  0x94 0xC3   │  size (BE)    │    payload      │
//! │   2 bytes    │   2 bytes     │   size bytes    │
//! └──────────────┴───────────────┴─────────────────┘
//! ```
//! The payload is a protobuf-encoded `ToRadio` or `FromRadio` message.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::FrameError;

/// Frame start bytes.
pub const MAGIC: [u8; 2] = [0x94, 0xC3];

/// Maximum frame payload size.
pub const MAX_FRAME_SIZE: usize = 512;

/// Frame header length (magic + 2-byte big-endian length).
pub const HEADER_SIZE: usize = 4;

/// Encodes a payload into a framed message.
///
/// # Errors
///
/// Returns [`FrameError::TooLarge`] if the payload exceeds
/// [`MAX_FRAME_SIZE`].
pub fn encode(payload: &[u8]) -> Result<Bytes, FrameError> {
    if payload.len() > MAX_FRAME_SIZE {
        return Err(FrameError::TooLarge {
            size: payload.len(),
            max: MAX_FRAME_SIZE,
        });
    }

    let mut buf = BytesMut::with_capacity(HEADER_SIZE + payload.len());
    buf.put_slice(&MAGIC);
    // Cast is safe: length checked against MAX_FRAME_SIZE above
    buf.put_u16(payload.len() as u16);
    buf.put_slice(payload);
    Ok(buf.freeze())
}

/// Frame decoder that handles partial data and mid-stream garbage.
///
/// Bytes preceding the next magic pair are discarded, which resynchronizes
/// the decoder after serial noise or a dropped frame. The decoder is fed
/// from a single input stream and emits payloads in on-wire order.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buffer: BytesMut,
}

impl FrameDecoder {
    /// Creates a new frame decoder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::new(),
        }
    }

    /// Feeds data into the decoder.
    pub fn feed(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Attempts to decode the next complete frame.
    ///
    /// Returns `Ok(Some(payload))` if a complete frame was decoded and
    /// `Ok(None)` if more data is needed.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::TooLarge`] when a frame header declares a
    /// payload above the size limit. The offending header is dropped and the
    /// next call resumes scanning for a magic pair.
    pub fn decode(&mut self) -> Result<Option<Bytes>, FrameError> {
        self.resync();

        if self.buffer.len() < HEADER_SIZE {
            return Ok(None);
        }

        let length = usize::from(u16::from_be_bytes([self.buffer[2], self.buffer[3]]));

        if length > MAX_FRAME_SIZE {
            // Drop the bogus header; payload bytes get rescanned for magic.
            self.buffer.advance(HEADER_SIZE);
            return Err(FrameError::TooLarge {
                size: length,
                max: MAX_FRAME_SIZE,
            });
        }

        if self.buffer.len() < HEADER_SIZE + length {
            return Ok(None);
        }

        self.buffer.advance(HEADER_SIZE);
        let payload = self.buffer.split_to(length).freeze();

        Ok(Some(payload))
    }

    /// Discards buffered bytes up to the next magic pair.
    fn resync(&mut self) {
        while !self.buffer.is_empty() {
            if self.buffer[0] != MAGIC[0] {
                // Skip to the next candidate start byte in one step.
                match self.buffer.iter().position(|&b| b == MAGIC[0]) {
                    Some(pos) => self.buffer.advance(pos),
                    None => self.buffer.clear(),
                }
                continue;
            }
            if self.buffer.len() < 2 {
                return;
            }
            if self.buffer[1] == MAGIC[1] {
                return;
            }
            self.buffer.advance(1);
        }
    }

    /// Returns the number of bytes currently buffered.
    #[must_use]
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Clears the internal buffer.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_simple() {
        let frame = encode(b"hello").unwrap();

        assert_eq!(frame[0], 0x94);
        assert_eq!(frame[1], 0xC3);
        assert_eq!(frame[2], 0); // length high byte
        assert_eq!(frame[3], 5); // length low byte
        assert_eq!(&frame[4..], b"hello");
    }

    #[test]
    fn test_encode_rejects_oversize() {
        let payload = vec![0u8; MAX_FRAME_SIZE + 1];
        assert!(matches!(
            encode(&payload),
            Err(FrameError::TooLarge { size: 513, .. })
        ));
    }

    #[test]
    fn test_decode_complete_frame() {
        let mut decoder = FrameDecoder::new();
        decoder.feed(&[0x94, 0xC3, 0x00, 0x05, b'h', b'e', b'l', b'l', b'o']);

        let result = decoder.decode().unwrap();
        assert_eq!(result, Some(Bytes::from_static(b"hello")));
    }

    #[test]
    fn test_decode_partial_frame() {
        let mut decoder = FrameDecoder::new();

        decoder.feed(&[0x94, 0xC3, 0x00, 0x05, b'h', b'e']);
        assert_eq!(decoder.decode().unwrap(), None);

        decoder.feed(b"llo");
        let result = decoder.decode().unwrap();
        assert_eq!(result, Some(Bytes::from_static(b"hello")));
    }

    #[test]
    fn test_decode_skips_garbage() {
        let mut decoder = FrameDecoder::new();
        decoder.feed(&[
            0xDE, 0xAD, 0x94, 0x00, // noise, including a lone start byte
            0x94, 0xC3, 0x00, 0x02, b'o', b'k',
        ]);

        let result = decoder.decode().unwrap();
        assert_eq!(result, Some(Bytes::from_static(b"ok")));
        assert_eq!(decoder.buffered(), 0);
    }

    #[test]
    fn test_decode_multiple_frames_in_order() {
        let mut decoder = FrameDecoder::new();
        decoder.feed(&[
            0x94, 0xC3, 0x00, 0x02, b'h', b'i', // first frame
            0x94, 0xC3, 0x00, 0x03, b'b', b'y', b'e', // second frame
        ]);

        assert_eq!(decoder.decode().unwrap(), Some(Bytes::from_static(b"hi")));
        assert_eq!(decoder.decode().unwrap(), Some(Bytes::from_static(b"bye")));
        assert_eq!(decoder.decode().unwrap(), None);
    }

    #[test]
    fn test_decode_drops_oversize_frame_and_resyncs() {
        let mut decoder = FrameDecoder::new();
        // Declared length 0xFFFF is over the limit.
        decoder.feed(&[0x94, 0xC3, 0xFF, 0xFF]);
        assert!(decoder.decode().is_err());

        // The stream recovers on the next valid frame.
        decoder.feed(&[0x94, 0xC3, 0x00, 0x02, b'o', b'k']);
        assert_eq!(decoder.decode().unwrap(), Some(Bytes::from_static(b"ok")));
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let payload = b"roundtrip payload";
        let frame = encode(payload).unwrap();

        let mut decoder = FrameDecoder::new();
        decoder.feed(&frame);
        let decoded = decoder.decode().unwrap().unwrap();
        assert_eq!(&decoded[..], payload);

        // Re-encoding the decoded payload reproduces the original frame.
        assert_eq!(encode(&decoded).unwrap(), frame);
    }

    #[test]
    fn test_byte_at_a_time_feed() {
        let frame = encode(b"drip").unwrap();
        let mut decoder = FrameDecoder::new();

        for (i, byte) in frame.iter().enumerate() {
            decoder.feed(&[*byte]);
            let result = decoder.decode().unwrap();
            if i + 1 == frame.len() {
                assert_eq!(result, Some(Bytes::from_static(b"drip")));
            } else {
                assert_eq!(result, None);
            }
        }
    }
}
