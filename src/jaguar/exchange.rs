// Request / reply / acknowledgement exchanges
//
// Exchanges are strictly sequential: a request is written, then its response
// frames are read in a fixed order. Frames carry no request id, so a second
// request must never be issued before the previous exchange is fully read.
//
// Shapes:
// - command:      request -> ack
// - query:        request -> device reply -> ack
// - system query: request -> system reply -> ack
// - broadcast:    request (no response)

use std::fmt;

use tracing::{debug, warn};

use super::connection::{ByteChannel, Connection};
use crate::can::api::{
    API_ACK, API_SYS, BROADCAST_DEVICE, DEVTYPE_MOTORCTRL, DEVTYPE_SYS, MANUFACTURER_SYS,
    MANUFACTURER_TI, Operation,
};
use crate::can::CanMessage;
use crate::error::{JaguarError, Result};

/// Which response a frame was validated as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    Ack,
    DeviceReply,
    SystemReply,
}

impl fmt::Display for ResponseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseKind::Ack => f.write_str("acknowledgement"),
            ResponseKind::DeviceReply => f.write_str("device reply"),
            ResponseKind::SystemReply => f.write_str("system reply"),
        }
    }
}

/// A well-formed frame that does not answer the request
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    #[error("Unexpected {kind}: {field} expected {expected}, got {actual}")]
    Mismatch {
        kind: ResponseKind,
        field: &'static str,
        expected: u8,
        actual: u8,
    },

    #[error("Reply payload too short: expected {expected} bytes, got {actual}")]
    ReplyTooShort { expected: usize, actual: usize },
}

fn expect_field(
    kind: ResponseKind,
    field: &'static str,
    expected: u8,
    actual: u8,
) -> std::result::Result<(), ProtocolError> {
    if expected != actual {
        return Err(ProtocolError::Mismatch {
            kind,
            field,
            expected,
            actual,
        });
    }
    Ok(())
}

/// An acknowledgement only has to come from the requested device.
/// Its api_index is not checked against the request.
pub fn validate_ack(
    request: &CanMessage,
    response: &CanMessage,
) -> std::result::Result<(), ProtocolError> {
    let kind = ResponseKind::Ack;
    expect_field(kind, "manufacturer", MANUFACTURER_TI, response.manufacturer)?;
    expect_field(kind, "device_type", DEVTYPE_MOTORCTRL, response.device_type)?;
    expect_field(kind, "api_class", API_ACK, response.api_class)?;
    expect_field(kind, "device", request.device, response.device)
}

/// A device reply echoes the request's full identifier
pub fn validate_device_reply(
    request: &CanMessage,
    response: &CanMessage,
) -> std::result::Result<(), ProtocolError> {
    let kind = ResponseKind::DeviceReply;
    expect_field(kind, "manufacturer", request.manufacturer, response.manufacturer)?;
    expect_field(kind, "device_type", request.device_type, response.device_type)?;
    expect_field(kind, "api_class", request.api_class, response.api_class)?;
    expect_field(kind, "api_index", request.api_index, response.api_index)?;
    expect_field(kind, "device", request.device, response.device)
}

/// A system reply carries the system codes and echoes index and device
pub fn validate_system_reply(
    request: &CanMessage,
    response: &CanMessage,
) -> std::result::Result<(), ProtocolError> {
    let kind = ResponseKind::SystemReply;
    expect_field(kind, "manufacturer", MANUFACTURER_SYS, response.manufacturer)?;
    expect_field(kind, "device_type", DEVTYPE_SYS, response.device_type)?;
    expect_field(kind, "api_class", API_SYS, response.api_class)?;
    expect_field(kind, "api_index", request.api_index, response.api_index)?;
    expect_field(kind, "device", request.device, response.device)
}

/// Typed request argument, written little-endian
pub trait EncodePayload {
    fn encode_payload(&self, out: &mut Vec<u8>);
}

/// Typed reply value, read little-endian; trailing bytes are ignored
pub trait DecodeReply: Sized {
    fn decode_reply(data: &[u8]) -> std::result::Result<Self, ProtocolError>;
}

impl EncodePayload for () {
    fn encode_payload(&self, _out: &mut Vec<u8>) {}
}

impl DecodeReply for () {
    fn decode_reply(_data: &[u8]) -> std::result::Result<Self, ProtocolError> {
        Ok(())
    }
}

impl EncodePayload for [u8] {
    fn encode_payload(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(self);
    }
}

macro_rules! le_payload {
    ($($ty:ty),*) => {
        $(
            impl EncodePayload for $ty {
                fn encode_payload(&self, out: &mut Vec<u8>) {
                    out.extend_from_slice(&self.to_le_bytes());
                }
            }

            impl DecodeReply for $ty {
                fn decode_reply(data: &[u8]) -> std::result::Result<Self, ProtocolError> {
                    const SIZE: usize = std::mem::size_of::<$ty>();
                    let bytes: [u8; SIZE] = data
                        .get(..SIZE)
                        .and_then(|b| b.try_into().ok())
                        .ok_or(ProtocolError::ReplyTooShort {
                            expected: SIZE,
                            actual: data.len(),
                        })?;
                    Ok(<$ty>::from_le_bytes(bytes))
                }
            }
        )*
    };
}

le_payload!(u8, u16, i16, u32, i32);

impl<A: EncodePayload, B: EncodePayload> EncodePayload for (A, B) {
    fn encode_payload(&self, out: &mut Vec<u8>) {
        self.0.encode_payload(out);
        self.1.encode_payload(out);
    }
}

impl DecodeReply for (u8, u8) {
    fn decode_reply(data: &[u8]) -> std::result::Result<Self, ProtocolError> {
        match data {
            [a, b, ..] => Ok((*a, *b)),
            _ => Err(ProtocolError::ReplyTooShort {
                expected: 2,
                actual: data.len(),
            }),
        }
    }
}

fn payload_bytes<P: EncodePayload + ?Sized>(payload: &P) -> Vec<u8> {
    let mut out = Vec::with_capacity(crate::can::MAX_DATA_BYTES);
    payload.encode_payload(&mut out);
    out
}

fn motor_request<P: EncodePayload + ?Sized>(
    device: u8,
    operation: Operation,
    payload: &P,
) -> Result<CanMessage> {
    CanMessage::motor_controller(device, operation, &payload_bytes(payload))
        .map_err(JaguarError::InvalidRequest)
}

fn system_request<P: EncodePayload + ?Sized>(
    device: u8,
    api_index: u8,
    payload: &P,
) -> Result<CanMessage> {
    CanMessage::system(device, Operation::new(API_SYS, api_index), &payload_bytes(payload))
        .map_err(JaguarError::InvalidRequest)
}

impl<C: ByteChannel> Connection<C> {
    /// Send a motor-controller request and wait for its acknowledgement
    pub fn command<P: EncodePayload + ?Sized>(
        &mut self,
        device: u8,
        operation: Operation,
        payload: &P,
    ) -> Result<()> {
        let request = motor_request(device, operation, payload)?;
        self.send_message(&request)?;
        self.expect_ack(&request)
    }

    /// Send a motor-controller request, read its reply, then its acknowledgement
    pub fn query<P: EncodePayload + ?Sized, R: DecodeReply>(
        &mut self,
        device: u8,
        operation: Operation,
        payload: &P,
    ) -> Result<R> {
        let request = motor_request(device, operation, payload)?;
        self.send_message(&request)?;
        let reply = self.expect_reply_then_ack(&request, ResponseKind::DeviceReply)?;
        Ok(R::decode_reply(reply.payload())?)
    }

    /// Send a system-class request to one device, read its system reply, then
    /// its acknowledgement
    pub fn system_query<P: EncodePayload + ?Sized, R: DecodeReply>(
        &mut self,
        device: u8,
        api_index: u8,
        payload: &P,
    ) -> Result<R> {
        let request = system_request(device, api_index, payload)?;
        self.send_message(&request)?;
        let reply = self.expect_reply_then_ack(&request, ResponseKind::SystemReply)?;
        Ok(R::decode_reply(reply.payload())?)
    }

    /// Send a system-class request to every device; nothing is read back
    pub fn broadcast<P: EncodePayload + ?Sized>(&mut self, api_index: u8, payload: &P) -> Result<()> {
        let request = system_request(BROADCAST_DEVICE, api_index, payload)?;
        self.send_message(&request)
    }

    /// Read one frame and validate it as an acknowledgement of `request`
    pub fn expect_ack(&mut self, request: &CanMessage) -> Result<()> {
        self.expect_response(request, ResponseKind::Ack).map(|_| ())
    }

    /// Read one frame and validate it as the given kind of response to `request`
    pub fn expect_response(
        &mut self,
        request: &CanMessage,
        kind: ResponseKind,
    ) -> Result<CanMessage> {
        let response = self.receive_message()?;
        check_response(request, &response, kind)?;
        Ok(response)
    }

    /// Read a reply and the acknowledgement that follows it
    ///
    /// A mismatched reply is still followed by an acknowledgement; it is
    /// consumed before the mismatch is reported.
    fn expect_reply_then_ack(
        &mut self,
        request: &CanMessage,
        kind: ResponseKind,
    ) -> Result<CanMessage> {
        let reply = self.receive_message()?;
        let validation = check_response(request, &reply, kind);
        self.expect_ack(request)?;
        validation?;
        Ok(reply)
    }
}

fn check_response(
    request: &CanMessage,
    response: &CanMessage,
    kind: ResponseKind,
) -> std::result::Result<(), ProtocolError> {
    let validation = match kind {
        ResponseKind::Ack => validate_ack(request, response),
        ResponseKind::DeviceReply => validate_device_reply(request, response),
        ResponseKind::SystemReply => validate_system_reply(request, response),
    };

    match &validation {
        Err(e) => warn!("Device {}: {}", request.device, e),
        Ok(()) => debug!("Device {}: valid {}", request.device, kind),
    }
    validation
}
