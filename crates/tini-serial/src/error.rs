//! Error types for instrument sessions

use std::io;

use thiserror::Error;
use tini_protocol::{DecodeError, FrameError, ListingError};

/// The instrument or the link sent something the protocol does not allow
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolViolation {
    /// Malformed sentence or checksum mismatch
    #[error("invalid sentence: {0}")]
    Frame(#[from] FrameError),

    /// A flow-control byte was expected
    #[error("unexpected character 0x{found:02X} (expected 0x{expected:02X})")]
    UnexpectedByte { expected: u8, found: u8 },

    /// No line terminator within the line limit
    #[error("line exceeds {limit} bytes")]
    LineTooLong { limit: usize },

    /// A single-line response carried no line
    #[error("missing response to {command}")]
    MissingResponse { command: &'static str },

    /// Track listing out of sequence or inconsistent
    #[error("inconsistent data: {0}")]
    Listing(#[from] ListingError),

    /// Track position cannot be expressed in a two-digit retrieval command
    #[error("track index {index} out of range")]
    TrackIndexOutOfRange { index: u32 },

    /// A previous line stream was dropped before the instrument finished
    #[error("previous response was not read to the end")]
    Desynchronized,
}

/// Errors that can occur while talking to an instrument
#[derive(Debug, Error)]
pub enum DeviceError {
    /// Failed to open or configure the serial port
    #[error("failed to open {device}")]
    Open {
        device: String,
        #[source]
        source: serialport::Error,
    },

    /// I/O error on the transport
    #[error("{operation}: {device}")]
    Transport {
        device: String,
        operation: &'static str,
        #[source]
        source: io::Error,
    },

    /// Read deadline expired
    #[error("{device}: timeout waiting for data")]
    Timeout { device: String },

    /// Transport reported end of stream
    #[error("{device}: unexpected end of stream")]
    EndOfStream { device: String },

    /// Protocol violation
    #[error("{device}: {violation}")]
    Protocol {
        device: String,
        violation: ProtocolViolation,
    },

    /// Response body did not decode
    #[error("{device}: invalid response")]
    Decode {
        device: String,
        #[source]
        source: DecodeError,
    },
}

/// Broad classes of [`DeviceError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Open, configure, read, write or wait failures
    Transport,
    /// Framing, flow control or sequencing violations
    Protocol,
    /// Response bodies that do not match their grammar
    Decode,
}

impl DeviceError {
    /// Classify the error
    pub fn category(&self) -> ErrorCategory {
        match self {
            DeviceError::Open { .. }
            | DeviceError::Transport { .. }
            | DeviceError::Timeout { .. }
            | DeviceError::EndOfStream { .. } => ErrorCategory::Transport,
            DeviceError::Protocol { .. } => ErrorCategory::Protocol,
            DeviceError::Decode { .. } => ErrorCategory::Decode,
        }
    }

    /// The protocol violation, if this is one
    pub fn violation(&self) -> Option<&ProtocolViolation> {
        match self {
            DeviceError::Protocol { violation, .. } => Some(violation),
            _ => None,
        }
    }
}
