// CAN message layer for the Jaguar serial protocol
//
// Provides:
// - The logical message model and identifier catalogue
// - Byte-stuffed frame encoding and decoding
// - Fixed-point helpers for controller payloads

pub mod api;
pub mod codec;
pub mod fixed;
mod message;

pub use api::Operation;
pub use codec::{CodecError, EncodedFrame, decode, encode};
pub use message::{API_CLASS_LIMIT, API_INDEX_LIMIT, CanMessage, DEVICE_LIMIT, MAX_DATA_BYTES};
