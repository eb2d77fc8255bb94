//! Buffered byte channel to an instrument
//!
//! Wraps the serial port (or any `Read + Write` transport) with a fixed
//! receive buffer. Every refill is a single read bounded by the port's read
//! timeout; an expired timeout or end of stream is fatal.

use std::io::{self, Read, Write};
use std::time::Duration;

use serialport::{ClearBuffer, DataBits, FlowControl, Parity, SerialPort, StopBits};
use tracing::{info, trace, warn};

use crate::error::{DeviceError, ProtocolViolation};

/// Line speed of all supported instruments
pub const BAUD_RATE: u32 = 57_600;

/// Deadline for each buffer refill
pub const READ_TIMEOUT: Duration = Duration::from_millis(250);

/// Receive buffer capacity
pub const BUFFER_SIZE: usize = 128;

/// Buffered connection to an instrument
pub struct SerialChannel<T> {
    device: String,
    transport: T,
    buf: [u8; BUFFER_SIZE],
    next: usize,
    end: usize,
    log: Option<Box<dyn Write>>,
}

impl SerialChannel<Box<dyn SerialPort>> {
    /// Open and configure a serial port
    ///
    /// The port is set to 57600 baud, 8 data bits, no parity, one stop bit,
    /// no flow control, and any stale data in either direction is discarded.
    pub fn open(device: &str) -> Result<Self, DeviceError> {
        let open_failed = |source| DeviceError::Open {
            device: device.to_string(),
            source,
        };

        let port = serialport::new(device, BAUD_RATE)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(READ_TIMEOUT)
            .open()
            .map_err(open_failed)?;
        port.clear(ClearBuffer::All).map_err(open_failed)?;

        info!("Opened {} at {} baud", device, BAUD_RATE);
        Ok(Self::new(device, port))
    }
}

impl<T: Read + Write> SerialChannel<T> {
    /// Wrap an already configured transport
    ///
    /// Reads from `transport` must time out with `TimedOut` or `WouldBlock`
    /// instead of blocking forever.
    pub fn new(device: impl Into<String>, transport: T) -> Self {
        Self {
            device: device.into(),
            transport,
            buf: [0; BUFFER_SIZE],
            next: 0,
            end: 0,
            log: None,
        }
    }

    /// Mirror all traffic to `log`
    pub fn with_log(mut self, log: Box<dyn Write>) -> Self {
        self.log = Some(log);
        self
    }

    /// Device name used in diagnostics
    pub fn device(&self) -> &str {
        &self.device
    }

    /// Access the transport
    pub fn get_ref(&self) -> &T {
        &self.transport
    }

    /// Refill the receive buffer with one read
    fn fill(&mut self) -> Result<(), DeviceError> {
        let n = loop {
            match self.transport.read(&mut self.buf) {
                Ok(n) => break n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e)
                    if matches!(
                        e.kind(),
                        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock
                    ) =>
                {
                    return Err(DeviceError::Timeout {
                        device: self.device.clone(),
                    });
                }
                Err(source) => {
                    return Err(DeviceError::Transport {
                        device: self.device.clone(),
                        operation: "read",
                        source,
                    });
                }
            }
        };
        if n == 0 {
            return Err(DeviceError::EndOfStream {
                device: self.device.clone(),
            });
        }
        trace!("Read {} bytes from {}", n, self.device);
        self.next = 0;
        self.end = n;
        Ok(())
    }

    /// Next byte without consuming it
    pub fn peek_byte(&mut self) -> Result<u8, DeviceError> {
        if self.next == self.end {
            self.fill()?;
        }
        Ok(self.buf[self.next])
    }

    /// Consume the next byte
    pub fn read_byte(&mut self) -> Result<u8, DeviceError> {
        let b = self.peek_byte()?;
        self.next += 1;
        Ok(b)
    }

    /// Consume the next byte, which must be `expected`
    pub fn expect_byte(&mut self, expected: u8) -> Result<(), DeviceError> {
        let found = self.read_byte()?;
        if found != expected {
            return Err(self.violation(ProtocolViolation::UnexpectedByte { expected, found }));
        }
        Ok(())
    }

    /// Send raw bytes
    pub fn write_all(&mut self, data: &[u8]) -> Result<(), DeviceError> {
        self.log_traffic(b'>', data);
        // write_all retries on Interrupted
        self.transport
            .write_all(data)
            .and_then(|()| self.transport.flush())
            .map_err(|source| DeviceError::Transport {
                device: self.device.clone(),
                operation: "write",
                source,
            })
    }

    /// Record one received line in the diagnostic log
    pub(crate) fn log_received(&mut self, line: &[u8]) {
        self.log_traffic(b'<', line);
    }

    fn log_traffic(&mut self, direction: u8, data: &[u8]) {
        trace!(
            "{} {} {:?}",
            self.device,
            direction as char,
            String::from_utf8_lossy(data)
        );
        if let Some(log) = self.log.as_mut() {
            let result = log
                .write_all(&[direction, b' '])
                .and_then(|()| log.write_all(data))
                .and_then(|()| log.flush());
            if let Err(e) = result {
                warn!("Failed to write communication log: {}", e);
            }
        }
    }

    /// Wrap a protocol violation with the device name
    pub(crate) fn violation(&self, violation: ProtocolViolation) -> DeviceError {
        DeviceError::Protocol {
            device: self.device.clone(),
            violation,
        }
    }
}
