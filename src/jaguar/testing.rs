// In-memory byte channel for unit tests
use std::collections::VecDeque;
use std::io::{self, ErrorKind, Read, Write};

use crate::can::{CanMessage, codec};

pub struct MockChannel {
    rx: VecDeque<u8>,
    tx: Vec<u8>,
    exhausted: ErrorKind,
}

impl MockChannel {
    pub fn new() -> Self {
        Self::with_input(&[])
    }

    pub fn with_input(input: &[u8]) -> Self {
        Self {
            rx: input.iter().copied().collect(),
            tx: Vec::new(),
            exhausted: ErrorKind::UnexpectedEof,
        }
    }

    /// Queue the encoded frames of `messages` as incoming bytes
    pub fn with_replies(messages: &[CanMessage]) -> Self {
        let mut channel = Self::new();
        for message in messages {
            channel.rx.extend(codec::encode(message).as_bytes());
        }
        channel
    }

    /// Error returned once the input runs out (default: end of file)
    pub fn exhausted_with(mut self, kind: ErrorKind) -> Self {
        self.exhausted = kind;
        self
    }

    pub fn written(&self) -> &[u8] {
        &self.tx
    }

    pub fn remaining(&self) -> usize {
        self.rx.len()
    }
}

impl Read for MockChannel {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.rx.is_empty() {
            return match self.exhausted {
                ErrorKind::UnexpectedEof => Ok(0),
                kind => Err(kind.into()),
            };
        }
        let n = buf.len().min(self.rx.len());
        for (slot, byte) in buf.iter_mut().zip(self.rx.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }
}

impl Write for MockChannel {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.tx.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
