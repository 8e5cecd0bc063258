// Jaguar motor controller over a serial link
//
// Provides:
// - CAN message model and the byte-stuffed serial frame codec
// - Frame synchronization over a serial byte channel
// - Request / reply / acknowledgement exchanges and typed controller commands

pub mod can;
pub mod config;
pub mod error;
pub mod jaguar;

pub use can::{CanMessage, CodecError, EncodedFrame};
pub use error::{JaguarError, Result};
pub use jaguar::{Connection, JaguarDriver};
