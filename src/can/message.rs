// CAN message model
//
// A CanMessage is the logical, pre-stuffing form of one frame. The identifier
// fields are bit-limited: device and api_class are 6 bits, api_index is 4 bits.

use super::api::{DEVTYPE_MOTORCTRL, DEVTYPE_SYS, MANUFACTURER_SYS, MANUFACTURER_TI, Operation};
use super::codec::CodecError;

/// Maximum payload bytes carried by one message
pub const MAX_DATA_BYTES: usize = 8;

/// Exclusive upper bounds of the bit-limited identifier fields
pub const DEVICE_LIMIT: u8 = 64;
pub const API_CLASS_LIMIT: u8 = 64;
pub const API_INDEX_LIMIT: u8 = 16;

#[derive(Debug, Clone, Copy, Eq)]
pub struct CanMessage {
    pub device: u8,
    pub api_class: u8,
    pub api_index: u8,
    pub manufacturer: u8,
    pub device_type: u8,
    pub data: [u8; MAX_DATA_BYTES],
    pub data_size: usize,
}

impl CanMessage {
    /// Build a message with an explicit vendor and device type
    pub fn new(
        device: u8,
        operation: Operation,
        manufacturer: u8,
        device_type: u8,
        payload: &[u8],
    ) -> Result<Self, CodecError> {
        if payload.len() > MAX_DATA_BYTES {
            return Err(CodecError::PayloadTooLarge(payload.len()));
        }

        let mut data = [0u8; MAX_DATA_BYTES];
        data[..payload.len()].copy_from_slice(payload);

        let message = Self {
            device,
            api_class: operation.api_class,
            api_index: operation.api_index,
            manufacturer,
            device_type,
            data,
            data_size: payload.len(),
        };
        message.validate()?;
        Ok(message)
    }

    /// Message addressed to a motor controller
    pub fn motor_controller(
        device: u8,
        operation: Operation,
        payload: &[u8],
    ) -> Result<Self, CodecError> {
        Self::new(device, operation, MANUFACTURER_TI, DEVTYPE_MOTORCTRL, payload)
    }

    /// Message in the system category
    pub fn system(device: u8, operation: Operation, payload: &[u8]) -> Result<Self, CodecError> {
        Self::new(device, operation, MANUFACTURER_SYS, DEVTYPE_SYS, payload)
    }

    /// Check that every field fits its wire width
    pub fn validate(&self) -> Result<(), CodecError> {
        check_field("device", self.device, DEVICE_LIMIT)?;
        check_field("api_class", self.api_class, API_CLASS_LIMIT)?;
        check_field("api_index", self.api_index, API_INDEX_LIMIT)?;
        if self.data_size > MAX_DATA_BYTES {
            return Err(CodecError::PayloadTooLarge(self.data_size));
        }
        Ok(())
    }

    /// The valid payload bytes
    pub fn payload(&self) -> &[u8] {
        &self.data[..self.data_size.min(MAX_DATA_BYTES)]
    }

    pub fn operation(&self) -> Operation {
        Operation::new(self.api_class, self.api_index)
    }
}

// Bytes past data_size are not part of the message.
impl PartialEq for CanMessage {
    fn eq(&self, other: &Self) -> bool {
        self.device == other.device
            && self.api_class == other.api_class
            && self.api_index == other.api_index
            && self.manufacturer == other.manufacturer
            && self.device_type == other.device_type
            && self.payload() == other.payload()
    }
}

fn check_field(field: &'static str, value: u8, limit: u8) -> Result<(), CodecError> {
    if value >= limit {
        return Err(CodecError::FieldOutOfRange {
            field,
            value,
            max: limit - 1,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::can::api::{API_SPEED, speed};

    #[test]
    fn test_new_copies_payload() {
        let msg =
            CanMessage::motor_controller(5, Operation::new(API_SPEED, speed::SET), &[0x34, 0x12])
                .unwrap();
        assert_eq!(msg.payload(), &[0x34, 0x12]);
        assert_eq!(msg.data_size, 2);
        assert_eq!(msg.manufacturer, MANUFACTURER_TI);
        assert_eq!(msg.device_type, DEVTYPE_MOTORCTRL);
    }

    #[test]
    fn test_field_limits() {
        let op = Operation::new(0, 0);
        assert!(CanMessage::system(63, op, &[]).is_ok());
        assert!(matches!(
            CanMessage::system(64, op, &[]),
            Err(CodecError::FieldOutOfRange { field: "device", value: 64, max: 63 })
        ));
        assert!(matches!(
            CanMessage::system(1, Operation::new(64, 0), &[]),
            Err(CodecError::FieldOutOfRange { field: "api_class", .. })
        ));
        assert!(matches!(
            CanMessage::system(1, Operation::new(0, 16), &[]),
            Err(CodecError::FieldOutOfRange { field: "api_index", .. })
        ));
        assert!(matches!(
            CanMessage::system(1, op, &[0; 9]),
            Err(CodecError::PayloadTooLarge(9))
        ));
    }

    #[test]
    fn test_equality_ignores_unused_data() {
        let a = CanMessage::system(1, Operation::new(0, 3), &[1, 2]).unwrap();
        let mut b = a;
        b.data[5] = 0xAA;
        assert_eq!(a, b);
        b.data[1] = 0xAA;
        assert_ne!(a, b);
    }
}
