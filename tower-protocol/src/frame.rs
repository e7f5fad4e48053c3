//! Gateway link framing
//!
//! ```text
//! +------+--------+------+-------------+------+
//! | 0xA5 | LENGTH | TYPE | PAYLOAD ... | CRC8 |
//! +------+--------+------+-------------+------+
//! ```
//!
//! LENGTH counts payload bytes only (at most [`MAX_PAYLOAD_SIZE`]). The
//! checksum is CRC-8 with polynomial 0x07 and zero init, computed over
//! LENGTH, TYPE and PAYLOAD. Payloads are postcard-encoded message bodies.

use heapless::Vec;

/// Synchronization byte that opens every frame
pub const FRAME_START: u8 = 0xA5;

/// Largest payload a frame can carry
pub const MAX_PAYLOAD_SIZE: usize = 64;

/// START, LENGTH, TYPE and CRC around the payload
const OVERHEAD: usize = 4;

/// Largest frame on the wire
pub const MAX_FRAME_SIZE: usize = MAX_PAYLOAD_SIZE + OVERHEAD;

/// Framing and payload errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Payload longer than [`MAX_PAYLOAD_SIZE`]
    PayloadTooLarge,
    /// Checksum byte does not match the frame contents
    InvalidChecksum,
    /// Length out of range or unknown message type
    InvalidFrame,
    /// Output buffer cannot hold the encoded frame
    BufferTooSmall,
    /// Payload could not be (de)serialized
    Payload,
}

/// CRC-8, polynomial 0x07, init 0x00, no reflection, no final xor
#[derive(Debug, Clone, Copy, Default)]
struct Crc8(u8);

impl Crc8 {
    const POLY: u8 = 0x07;

    fn push(self, byte: u8) -> Self {
        let mut crc = self.0 ^ byte;
        for _ in 0..8 {
            let carry = crc & 0x80 != 0;
            crc <<= 1;
            if carry {
                crc ^= Self::POLY;
            }
        }
        Self(crc)
    }

    fn push_all(self, bytes: &[u8]) -> Self {
        bytes.iter().fold(self, |crc, &b| crc.push(b))
    }

    fn value(self) -> u8 {
        self.0
    }
}

/// One message on the link: a type id and its raw payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub msg_type: u8,
    pub payload: Vec<u8, MAX_PAYLOAD_SIZE>,
}

impl Frame {
    pub fn new(msg_type: u8, payload: &[u8]) -> Result<Self, FrameError> {
        Ok(Self {
            msg_type,
            payload: Vec::from_slice(payload).map_err(|_| FrameError::PayloadTooLarge)?,
        })
    }

    /// Frame without a payload
    pub fn empty(msg_type: u8) -> Self {
        Self {
            msg_type,
            payload: Vec::new(),
        }
    }

    /// Bytes needed by [`Frame::encode`]
    pub fn encoded_len(&self) -> usize {
        self.payload.len() + OVERHEAD
    }

    fn checksum(&self) -> u8 {
        Crc8::default()
            .push(self.payload.len() as u8)
            .push(self.msg_type)
            .push_all(&self.payload)
            .value()
    }

    /// Write the frame to `out`, returning the number of bytes used
    pub fn encode(&self, out: &mut [u8]) -> Result<usize, FrameError> {
        let len = self.encoded_len();
        let out = out.get_mut(..len).ok_or(FrameError::BufferTooSmall)?;

        let (header, rest) = out.split_at_mut(3);
        header.copy_from_slice(&[FRAME_START, self.payload.len() as u8, self.msg_type]);
        let (body, crc) = rest.split_at_mut(self.payload.len());
        body.copy_from_slice(&self.payload);
        crc[0] = self.checksum();

        Ok(len)
    }

    /// Encode into an owned buffer
    pub fn encode_to_vec(&self) -> Result<Vec<u8, MAX_FRAME_SIZE>, FrameError> {
        let mut out = Vec::new();
        out.resize_default(self.encoded_len())
            .map_err(|_| FrameError::BufferTooSmall)?;
        self.encode(&mut out)?;
        Ok(out)
    }
}

/// Where the parser is inside a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    /// Hunting for [`FRAME_START`]
    Sync,
    Length,
    Type { len: u8 },
    Body { len: u8, msg_type: u8 },
    Crc { msg_type: u8 },
}

/// Byte-at-a-time frame parser
///
/// Bytes before a start byte are skipped. After a complete frame or an
/// error the parser goes back to hunting for the next start byte.
#[derive(Debug, Clone)]
pub struct FrameParser {
    stage: Stage,
    payload: Vec<u8, MAX_PAYLOAD_SIZE>,
}

impl Default for FrameParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameParser {
    pub const fn new() -> Self {
        Self {
            stage: Stage::Sync,
            payload: Vec::new(),
        }
    }

    /// Drop any partial frame
    pub fn reset(&mut self) {
        self.stage = Stage::Sync;
        self.payload.clear();
    }

    /// Feed one received byte
    ///
    /// Returns `Ok(Some(frame))` once a frame with a valid checksum is
    /// complete and `Ok(None)` while more bytes are needed.
    pub fn feed(&mut self, byte: u8) -> Result<Option<Frame>, FrameError> {
        self.stage = match self.stage {
            Stage::Sync if byte == FRAME_START => Stage::Length,
            Stage::Sync => Stage::Sync,
            Stage::Length if byte as usize > MAX_PAYLOAD_SIZE => {
                self.reset();
                return Err(FrameError::InvalidFrame);
            }
            Stage::Length => Stage::Type { len: byte },
            Stage::Type { len: 0 } => Stage::Crc { msg_type: byte },
            Stage::Type { len } => {
                self.payload.clear();
                Stage::Body {
                    len,
                    msg_type: byte,
                }
            }
            Stage::Body { len, msg_type } => {
                // Bounded by the length check above
                let _ = self.payload.push(byte);
                if self.payload.len() == len as usize {
                    Stage::Crc { msg_type }
                } else {
                    Stage::Body { len, msg_type }
                }
            }
            Stage::Crc { msg_type } => {
                let frame = Frame {
                    msg_type,
                    payload: core::mem::take(&mut self.payload),
                };
                self.reset();
                return if frame.checksum() == byte {
                    Ok(Some(frame))
                } else {
                    Err(FrameError::InvalidChecksum)
                };
            }
        };
        Ok(None)
    }

    /// Feed bytes until the first complete frame
    ///
    /// Bytes after that frame are not consumed.
    pub fn feed_bytes(&mut self, bytes: &[u8]) -> Result<Option<Frame>, FrameError> {
        for &byte in bytes {
            if let Some(frame) = self.feed(byte)? {
                return Ok(Some(frame));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_crc_matches_smbus_check() {
        assert_eq!(Crc8::default().push_all(b"123456789").value(), 0xF4);
    }

    #[test]
    fn test_pairing_accepted_wire_bytes() {
        let mut out = [0u8; 8];
        let n = Frame::empty(0x21).encode(&mut out).unwrap();
        let crc = Crc8::default().push(0).push(0x21).value();
        assert_eq!(&out[..n], &[FRAME_START, 0x00, 0x21, crc]);
    }

    #[test]
    fn test_encode_needs_room_for_crc() {
        let frame = Frame::new(0x02, &[1, 2, 3]).unwrap();
        assert_eq!(frame.encoded_len(), 7);
        assert_eq!(frame.encode(&mut [0u8; 6]), Err(FrameError::BufferTooSmall));
        assert_eq!(frame.encode(&mut [0u8; 7]), Ok(7));
    }

    #[test]
    fn test_parse_publish_frame() {
        let sent = Frame::new(0x02, &[3, 0, 0, 0x20, 0x41]).unwrap();
        let bytes = sent.encode_to_vec().unwrap();

        let mut parser = FrameParser::new();
        assert_eq!(parser.feed_bytes(&bytes), Ok(Some(sent)));
    }

    #[test]
    fn test_corrupted_payload_rejected() {
        let mut bytes = Frame::new(0x20, &[1, 2]).unwrap().encode_to_vec().unwrap();
        bytes[3] ^= 0x01;

        let mut parser = FrameParser::new();
        assert_eq!(parser.feed_bytes(&bytes), Err(FrameError::InvalidChecksum));
    }

    #[test]
    fn test_oversized_length_rejected() {
        let mut parser = FrameParser::new();
        parser.feed(FRAME_START).unwrap();
        assert_eq!(
            parser.feed(MAX_PAYLOAD_SIZE as u8 + 1),
            Err(FrameError::InvalidFrame)
        );
    }

    #[test]
    fn test_recovers_after_bad_frame() {
        let mut bytes = Frame::new(0x20, &[7]).unwrap().encode_to_vec().unwrap();
        let last = bytes.len() - 1;
        bytes[last] = bytes[last].wrapping_add(1);
        let good = Frame::empty(0x21).encode_to_vec().unwrap();

        let mut parser = FrameParser::new();
        assert!(parser.feed_bytes(&bytes).is_err());
        let frame = parser.feed_bytes(&good).unwrap().unwrap();
        assert_eq!(frame.msg_type, 0x21);
    }

    #[test]
    fn test_leading_noise_skipped() {
        let mut parser = FrameParser::new();
        assert_eq!(parser.feed_bytes(&[0x00, 0xFF, 0x12]), Ok(None));
        let frame = parser
            .feed_bytes(&Frame::empty(0x21).encode_to_vec().unwrap())
            .unwrap();
        assert_eq!(frame, Some(Frame::empty(0x21)));
    }

    #[test]
    fn test_payload_limit() {
        assert!(Frame::new(0x02, &[0u8; MAX_PAYLOAD_SIZE]).is_ok());
        assert_eq!(
            Frame::new(0x02, &[0u8; MAX_PAYLOAD_SIZE + 1]),
            Err(FrameError::PayloadTooLarge)
        );
    }

    proptest! {
        #[test]
        fn parser_never_panics(bytes in proptest::collection::vec(any::<u8>(), 0..512)) {
            let mut parser = FrameParser::new();
            for b in bytes {
                let _ = parser.feed(b);
            }
        }

        #[test]
        fn frame_found_after_noise(
            noise in proptest::collection::vec(any::<u8>().prop_filter("no start", |b| *b != FRAME_START), 0..32),
            payload in proptest::collection::vec(any::<u8>(), 0..=MAX_PAYLOAD_SIZE),
            msg_type in any::<u8>(),
        ) {
            let frame = Frame::new(msg_type, &payload).unwrap();
            let bytes = frame.encode_to_vec().unwrap();

            let mut parser = FrameParser::new();
            prop_assert_eq!(parser.feed_bytes(&noise), Ok(None));
            prop_assert_eq!(parser.feed_bytes(&bytes), Ok(Some(frame)));
        }
    }
}
