// Serial connection and frame synchronization
//
// Frames are located by scanning for the start-of-frame byte. The length byte
// counts logical bytes, so payload reading consumes one or two physical bytes
// per logical byte depending on stuffing.

use std::io::{self, ErrorKind, Read, Write};
use std::time::{Duration, Instant};

use serialport::{ClearBuffer, DataBits, FlowControl, Parity, SerialPort, StopBits};
use tracing::{debug, info, trace, warn};

use crate::can::codec::{
    self, CAN_ID_SIZE, ENCODE_BYTE_A, EncodedFrame, MAX_MSG_BYTES, START_OF_FRAME,
};
use crate::can::CanMessage;
use crate::config::LinkConfig;
use crate::error::{JaguarError, Result};

/// Byte-level access to the link
pub trait ByteChannel {
    /// Read exactly one byte, blocking until it arrives or the channel fails
    fn read_byte(&mut self) -> io::Result<u8>;

    /// Write all bytes and flush them out as one unit
    fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()>;
}

impl<T: Read + Write + ?Sized> ByteChannel for T {
    fn read_byte(&mut self) -> io::Result<u8> {
        let mut byte = [0u8; 1];
        self.read_exact(&mut byte)?;
        Ok(byte[0])
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.write_all(bytes)?;
        self.flush()
    }
}

/// An open serial port, released when dropped
pub struct SerialChannel {
    port: Box<dyn SerialPort>,
    name: String,
}

impl SerialChannel {
    /// Open a port in raw 8N1 mode without flow control and clear stale bytes
    pub fn open(config: &LinkConfig) -> Result<Self> {
        info!("Opening Jaguar link on {} at {} baud", config.port, config.baudrate);
        let port = serialport::new(&config.port, config.baudrate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(config.read_timeout())
            .open()?;
        port.clear(ClearBuffer::All)?;

        Ok(Self {
            port,
            name: config.port.clone(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Read for SerialChannel {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.port.read(buf)
    }
}

impl Write for SerialChannel {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.port.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.port.flush()
    }
}

impl Drop for SerialChannel {
    fn drop(&mut self) {
        if let Err(e) = self.port.clear(ClearBuffer::All) {
            warn!("Failed to clear buffers on {}: {}", self.name, e);
        }
        info!("Closed Jaguar link on {}", self.name);
    }
}

/// Frame-level connection over a byte channel
pub struct Connection<C = SerialChannel> {
    channel: C,
    frame_timeout: Option<Duration>,
}

impl Connection<SerialChannel> {
    /// Open the serial port described by `config`
    pub fn open(config: &LinkConfig) -> Result<Self> {
        let channel = SerialChannel::open(config)?;
        Ok(Self::new(channel).with_frame_timeout(config.frame_timeout()))
    }
}

impl<C: ByteChannel> Connection<C> {
    pub fn new(channel: C) -> Self {
        Self {
            channel,
            frame_timeout: None,
        }
    }

    /// Bound each receive (resync plus frame body) by a deadline
    pub fn with_frame_timeout(mut self, frame_timeout: Option<Duration>) -> Self {
        self.frame_timeout = frame_timeout;
        self
    }

    /// Encode and write one message as a single write
    pub fn send_message(&mut self, message: &CanMessage) -> Result<()> {
        message.validate().map_err(JaguarError::InvalidRequest)?;
        let frame = codec::encode(message);
        debug!(
            "Send device={} class={} index={} ({} bytes)",
            message.device,
            message.api_class,
            message.api_index,
            frame.len()
        );
        self.channel
            .write_bytes(frame.as_bytes())
            .map_err(transport_error)
    }

    /// Read the next frame and decode it
    pub fn receive_message(&mut self) -> Result<CanMessage> {
        let frame = self.receive_frame()?;
        let message = codec::decode(frame.as_bytes())?;
        debug!(
            "Received device={} class={} index={} payload={:02X?}",
            message.device,
            message.api_class,
            message.api_index,
            message.payload()
        );
        Ok(message)
    }

    /// Synchronize on the next start-of-frame and assemble its physical bytes
    ///
    /// The identifier is never stuffed, so its four bytes are read verbatim.
    /// Each payload byte that starts with the escape byte pulls one more
    /// physical byte.
    pub fn receive_frame(&mut self) -> Result<EncodedFrame> {
        let deadline = self.frame_timeout.map(|t| Instant::now() + t);

        let mut discarded = 0usize;
        while self.read_byte(deadline)? != START_OF_FRAME {
            discarded += 1;
        }
        if discarded > 0 {
            debug!("Discarded {} bytes before start of frame", discarded);
        }

        let mut data = [0u8; MAX_MSG_BYTES];
        data[0] = START_OF_FRAME;
        let length = self.read_byte(deadline)?;
        data[1] = length;
        let data_size = codec::payload_size(length)?;

        let mut size = 2;
        for _ in 0..CAN_ID_SIZE {
            data[size] = self.read_byte(deadline)?;
            size += 1;
        }

        let mut escaped = 0usize;
        for _ in 0..data_size {
            let byte = self.read_byte(deadline)?;
            data[size] = byte;
            size += 1;
            if byte == ENCODE_BYTE_A {
                data[size] = self.read_byte(deadline)?;
                size += 1;
                escaped += 1;
            }
        }

        debug_assert_eq!(size, 2 + length as usize + escaped);
        let frame = EncodedFrame::from_parts(data, size);
        trace!("Received frame: {:02X?}", frame.as_bytes());
        Ok(frame)
    }

    fn read_byte(&mut self, deadline: Option<Instant>) -> Result<u8> {
        if deadline.is_some_and(|d| Instant::now() >= d) {
            return Err(JaguarError::Timeout);
        }
        self.channel.read_byte().map_err(transport_error)
    }

    pub fn get_ref(&self) -> &C {
        &self.channel
    }

    pub fn get_mut(&mut self) -> &mut C {
        &mut self.channel
    }

    pub fn into_inner(self) -> C {
        self.channel
    }
}

fn transport_error(e: io::Error) -> JaguarError {
    match e.kind() {
        ErrorKind::UnexpectedEof => JaguarError::ConnectionClosed,
        ErrorKind::TimedOut | ErrorKind::WouldBlock => JaguarError::Timeout,
        _ => JaguarError::Io(e),
    }
}
