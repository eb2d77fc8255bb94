//! Line and sentence framing on top of [`SerialChannel`]
//!
//! A command/response cycle looks like this on the wire:
//!
//! ```text
//! host -> $PBRTL,*HH\r\n
//! dev  -> XOFF
//! dev  -> $PBRTL,...*HH\r\n   (zero or more lines)
//! dev  -> XON
//! ```

use std::io::{Read, Write};

use tini_protocol::{decode_sentence, Command, EncodeCommand, XOFF, XON};
use tracing::debug;

use crate::channel::SerialChannel;
use crate::error::{DeviceError, ProtocolViolation};

/// Line limit for checksum-framed sentences
pub const SENTENCE_LIMIT: usize = 128;

/// Line limit for raw track content
pub const TRACK_LINE_LIMIT: usize = 1024;

impl<T: Read + Write> SerialChannel<T> {
    /// Send `command` and wait for the start of its response
    pub fn begin_response(&mut self, command: Command) -> Result<(), DeviceError> {
        debug!("Sending {} to {}", command.name(), self.device());
        self.write_all(&command.encode())?;
        self.expect_byte(XOFF)
    }

    /// Consume the end-of-response marker
    pub fn end_response(&mut self) -> Result<(), DeviceError> {
        self.expect_byte(XON)
    }

    /// Read one line including its terminator
    ///
    /// Returns `None`, without consuming anything, when the next byte is the
    /// end-of-response marker.
    pub fn read_line(&mut self, limit: usize) -> Result<Option<Vec<u8>>, DeviceError> {
        if self.peek_byte()? == XON {
            return Ok(None);
        }
        let mut line = Vec::with_capacity(limit.min(SENTENCE_LIMIT));
        while line.len() < limit {
            let b = self.read_byte()?;
            line.push(b);
            if b == b'\n' {
                self.log_received(&line);
                return Ok(Some(line));
            }
        }
        Err(self.violation(ProtocolViolation::LineTooLong { limit }))
    }

    /// Read one checksum-framed line and return its payload
    pub fn read_sentence(&mut self) -> Result<Option<String>, DeviceError> {
        let Some(line) = self.read_line(SENTENCE_LIMIT)? else {
            return Ok(None);
        };
        let payload = decode_sentence(&line).map_err(|e| self.violation(e.into()))?;
        Ok(Some(String::from_utf8_lossy(payload).into_owned()))
    }
}
