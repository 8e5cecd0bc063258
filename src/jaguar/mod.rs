// Jaguar motor controller link
//
// Provides:
// - Serial connection with frame synchronization
// - Request / reply / acknowledgement exchanges
// - High-level typed controller commands

mod connection;
mod driver;
pub mod exchange;
pub mod report;

#[cfg(test)]
pub(crate) mod testing;

pub use connection::{ByteChannel, Connection, SerialChannel};
pub use driver::JaguarDriver;
pub use exchange::{DecodeReply, EncodePayload, ProtocolError, ResponseKind};
pub use report::{ControlMode, DeviceInfo, Faults, LimitState, StatusReport};
