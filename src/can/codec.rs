// Serial frame codec for CAN messages
//
// Frame format: [0xFF, Length, Id0, Id1, Manufacturer, DeviceType, Payload...]
// Length counts the identifier plus the un-stuffed payload bytes. Payload bytes
// equal to 0xFF or 0xFE are stuffed as 0xFE 0xFE and 0xFE 0xFD respectively,
// which grows the frame without changing the length byte.

use tracing::trace;

use super::message::{CanMessage, MAX_DATA_BYTES};

/// Special byte values
pub const START_OF_FRAME: u8 = 0xFF;
pub const ENCODE_BYTE_A: u8 = 0xFE;
pub const ENCODE_BYTE_B: u8 = 0xFD;

/// Start marker + length byte + identifier
pub const HEADER_SIZE: usize = 6;
pub const CAN_ID_SIZE: usize = 4;
/// Largest physical frame: header plus a fully stuffed payload
pub const MAX_MSG_BYTES: usize = HEADER_SIZE + 2 * MAX_DATA_BYTES;

/// Valid range of the logical length byte
pub const MIN_LENGTH: u8 = CAN_ID_SIZE as u8;
pub const MAX_LENGTH: u8 = (CAN_ID_SIZE + MAX_DATA_BYTES) as u8;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("Invalid escape sequence at offset {position}: 0xFE followed by 0x{byte:02X}")]
    InvalidEscape { position: usize, byte: u8 },

    #[error("Invalid length byte {0} (expected 4..=12)")]
    InvalidLength(u8),

    #[error("Truncated frame: expected at least {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    #[error("Missing start of frame marker, found 0x{0:02X}")]
    MissingStartMarker(u8),

    #[error("Field {field} out of range: {value} (max {max})")]
    FieldOutOfRange {
        field: &'static str,
        value: u8,
        max: u8,
    },

    #[error("Payload of {0} bytes exceeds 8")]
    PayloadTooLarge(usize),
}

/// Physical, byte-stuffed form of one message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodedFrame {
    data: [u8; MAX_MSG_BYTES],
    size: usize,
}

impl EncodedFrame {
    /// Wrap an assembled buffer of `size` physical bytes
    pub(crate) fn from_parts(data: [u8; MAX_MSG_BYTES], size: usize) -> Self {
        Self {
            data,
            size: size.min(MAX_MSG_BYTES),
        }
    }

    /// The bytes to put on the wire
    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..self.size]
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Logical length carried in the frame (identifier + un-stuffed payload)
    pub fn length_field(&self) -> u8 {
        self.data[1]
    }
}

/// Pack the 4-byte CAN identifier
///
/// byte0 = device (bits 0-5) | api_index bits 0-1 (bits 6-7)
/// byte1 = api_index bits 2-3 (bits 0-1) | api_class (bits 2-7)
pub fn pack_identifier(message: &CanMessage) -> [u8; CAN_ID_SIZE] {
    [
        (message.device & 0x3F) | ((message.api_index & 0x03) << 6),
        ((message.api_index >> 2) & 0x03) | ((message.api_class & 0x3F) << 2),
        message.manufacturer,
        message.device_type,
    ]
}

/// Unpack a CAN identifier into the identifier fields of `message`
pub fn unpack_identifier(id: [u8; CAN_ID_SIZE], message: &mut CanMessage) {
    message.device = id[0] & 0x3F;
    message.api_index = (id[0] >> 6) | ((id[1] & 0x03) << 2);
    message.api_class = id[1] >> 2;
    message.manufacturer = id[2];
    message.device_type = id[3];
}

/// Resolve the byte that follows an escape byte
///
/// `position` is the physical offset of `second`, used for error reporting.
pub fn resolve_escape(second: u8, position: usize) -> Result<u8, CodecError> {
    match second {
        ENCODE_BYTE_A => Ok(START_OF_FRAME),
        ENCODE_BYTE_B => Ok(ENCODE_BYTE_A),
        byte => Err(CodecError::InvalidEscape { position, byte }),
    }
}

/// Check a length byte and return the payload size it announces
pub fn payload_size(length: u8) -> Result<usize, CodecError> {
    if !(MIN_LENGTH..=MAX_LENGTH).contains(&length) {
        return Err(CodecError::InvalidLength(length));
    }
    Ok((length - MIN_LENGTH) as usize)
}

/// Encode a message into its physical frame
///
/// Identifier fields are masked to their wire width; callers are expected to
/// pass a message that satisfies `CanMessage::validate`.
pub fn encode(message: &CanMessage) -> EncodedFrame {
    let payload = message.payload();
    let mut data = [0u8; MAX_MSG_BYTES];

    data[0] = START_OF_FRAME;
    data[1] = (CAN_ID_SIZE + payload.len()) as u8;
    data[2..HEADER_SIZE].copy_from_slice(&pack_identifier(message));

    let mut size = HEADER_SIZE;
    for &byte in payload {
        match byte {
            START_OF_FRAME => {
                data[size] = ENCODE_BYTE_A;
                data[size + 1] = ENCODE_BYTE_A;
                size += 2;
            }
            ENCODE_BYTE_A => {
                data[size] = ENCODE_BYTE_A;
                data[size + 1] = ENCODE_BYTE_B;
                size += 2;
            }
            other => {
                data[size] = other;
                size += 1;
            }
        }
    }

    let frame = EncodedFrame { data, size };
    trace!("Encoded frame: {:02X?}", frame.as_bytes());
    frame
}

/// Decode a physical frame, starting at its start-of-frame marker
pub fn decode(frame: &[u8]) -> Result<CanMessage, CodecError> {
    if frame.len() < 2 {
        return Err(CodecError::Truncated {
            expected: HEADER_SIZE,
            actual: frame.len(),
        });
    }
    if frame[0] != START_OF_FRAME {
        return Err(CodecError::MissingStartMarker(frame[0]));
    }

    let data_size = payload_size(frame[1])?;
    if frame.len() < HEADER_SIZE {
        return Err(CodecError::Truncated {
            expected: HEADER_SIZE + data_size,
            actual: frame.len(),
        });
    }

    let mut message = CanMessage {
        device: 0,
        api_class: 0,
        api_index: 0,
        manufacturer: 0,
        device_type: 0,
        data: [0u8; MAX_DATA_BYTES],
        data_size,
    };
    let mut id = [0u8; CAN_ID_SIZE];
    id.copy_from_slice(&frame[2..HEADER_SIZE]);
    unpack_identifier(id, &mut message);

    // One logical byte per iteration, one or two physical bytes each
    let mut pos = HEADER_SIZE;
    for i in 0..data_size {
        let byte = *frame.get(pos).ok_or(CodecError::Truncated {
            expected: pos + 1,
            actual: frame.len(),
        })?;

        if byte == ENCODE_BYTE_A {
            let second = *frame.get(pos + 1).ok_or(CodecError::Truncated {
                expected: pos + 2,
                actual: frame.len(),
            })?;
            message.data[i] = resolve_escape(second, pos + 1)?;
            pos += 2;
        } else {
            message.data[i] = byte;
            pos += 1;
        }
    }

    Ok(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::can::api::{API_SPEED, Operation, speed};

    fn message(device: u8, api_class: u8, api_index: u8, payload: &[u8]) -> CanMessage {
        CanMessage::new(device, Operation::new(api_class, api_index), 2, 2, payload).unwrap()
    }

    #[test]
    fn test_encode_speed_set_without_stuffing() {
        let msg = message(5, API_SPEED, speed::SET, &[0x34, 0x12]);
        let frame = encode(&msg);

        // device 5, index 2 -> byte0 = 0x05 | (2 << 6) = 0x85
        // index 2 >> 2 = 0, class 1 -> byte1 = 1 << 2 = 0x04
        assert_eq!(
            frame.as_bytes(),
            &[0xFF, 0x06, 0x85, 0x04, 0x02, 0x02, 0x34, 0x12]
        );
        assert_eq!(frame.len(), 8);
        assert_eq!(decode(frame.as_bytes()).unwrap(), msg);
    }

    #[test]
    fn test_stuffing_keeps_logical_length() {
        let msg = message(1, 0, 2, &[0xFF, 0xFE]);
        let frame = encode(&msg);

        assert_eq!(frame.length_field(), 6);
        assert_eq!(&frame.as_bytes()[HEADER_SIZE..], &[0xFE, 0xFE, 0xFE, 0xFD]);
        assert_eq!(frame.len(), HEADER_SIZE + 4);
        assert_eq!(decode(frame.as_bytes()).unwrap().payload(), &[0xFF, 0xFE]);
    }

    #[test]
    fn test_physical_size_counts_special_bytes() {
        let payload = [0x00, 0xFF, 0x10, 0xFE, 0xFD, 0xFF, 0x7F, 0xFE];
        let frame = encode(&message(3, 4, 5, &payload));
        let specials = payload.iter().filter(|&&b| b >= 0xFE).count();

        assert_eq!(frame.len(), HEADER_SIZE + payload.len() + specials);
        assert_eq!(frame.length_field() as usize, CAN_ID_SIZE + payload.len());
        // 0xFD is only special after an escape byte
        assert_eq!(frame.as_bytes()[HEADER_SIZE + 4], 0xFE);
        assert_eq!(frame.as_bytes()[HEADER_SIZE + 5], 0xFD);
        assert_eq!(frame.as_bytes()[HEADER_SIZE + 6], 0xFD);
    }

    #[test]
    fn test_max_frame_size() {
        let frame = encode(&message(63, 63, 15, &[0xFF; 8]));
        assert_eq!(frame.len(), MAX_MSG_BYTES);
        assert_eq!(frame.length_field(), 12);
    }

    #[test]
    fn test_identifier_boundaries() {
        for &(device, class, index) in &[
            (0, 0, 0),
            (63, 63, 15),
            (0, 0, 15),
            (63, 0, 3),
            (0, 63, 12),
            (42, 21, 5),
            (21, 42, 10),
        ] {
            let msg = message(device, class, index, &[]);
            let mut unpacked = message(0, 0, 0, &[]);
            unpack_identifier(pack_identifier(&msg), &mut unpacked);
            assert_eq!(
                (unpacked.device, unpacked.api_class, unpacked.api_index),
                (device, class, index)
            );
        }
    }

    #[test]
    fn test_identifier_straddles_bytes() {
        // index 0b1001: low bits 01 in byte0 bits 6-7, high bits 10 in byte1 bits 0-1
        let id = pack_identifier(&message(0x3F, 0, 0b1001, &[]));
        assert_eq!(id[0], 0x7F);
        assert_eq!(id[1], 0x02);
    }

    #[test]
    fn test_invalid_escape() {
        let frame = [0xFF, 0x05, 0x01, 0x00, 0x02, 0x02, 0xFE, 0x00];
        assert_eq!(
            decode(&frame),
            Err(CodecError::InvalidEscape {
                position: 7,
                byte: 0x00
            })
        );
    }

    #[test]
    fn test_decode_rejects_bad_length() {
        assert_eq!(
            decode(&[0xFF, 0x03, 0, 0, 0]),
            Err(CodecError::InvalidLength(3))
        );
        assert_eq!(
            decode(&[0xFF, 13, 0, 0, 0, 0]),
            Err(CodecError::InvalidLength(13))
        );
    }

    #[test]
    fn test_decode_truncated() {
        assert!(matches!(
            decode(&[0xFF, 0x06, 0x01, 0x00, 0x02, 0x02, 0x10]),
            Err(CodecError::Truncated { expected: 8, actual: 7 })
        ));
        assert!(matches!(
            decode(&[0xFF, 0x05, 0x01, 0x00, 0x02, 0x02, 0xFE]),
            Err(CodecError::Truncated { .. })
        ));
        assert!(matches!(decode(&[0xFF]), Err(CodecError::Truncated { .. })));
    }

    #[test]
    fn test_decode_requires_start_marker() {
        assert_eq!(
            decode(&[0x00, 0x04, 0, 0, 0, 0]),
            Err(CodecError::MissingStartMarker(0x00))
        );
    }
}
