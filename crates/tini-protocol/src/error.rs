//! Error types for sentence framing and record parsing

use thiserror::Error;
use tracing::trace;

/// Errors that can occur while validating a checksum-framed sentence
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// Line is shorter than the smallest possible frame
    #[error("sentence too short: {len} bytes")]
    TooShort { len: usize },

    /// Missing `$` at the start or `*` before the checksum
    #[error("missing sentence delimiter")]
    MissingDelimiter,

    /// Line does not end with CR LF
    #[error("sentence not terminated by CR LF")]
    BadTerminator,

    /// Checksum field contains something other than `0-9A-F`
    #[error("invalid checksum digit: 0x{0:02X}")]
    InvalidChecksumDigit(u8),

    /// Checksum mismatch
    #[error("checksum mismatch: expected 0x{expected:02X}, got 0x{actual:02X}")]
    ChecksumMismatch { expected: u8, actual: u8 },
}

/// A sentence body did not match the grammar of the record it should contain
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid {record} record: {body:?}")]
pub struct DecodeError {
    /// Name of the record being decoded
    pub record: &'static str,
    /// The offending body
    pub body: String,
}

impl DecodeError {
    pub(crate) fn new(record: &'static str, body: &str) -> Self {
        trace!("Rejected {} body {:?}", record, body);
        Self {
            record,
            body: body.to_string(),
        }
    }
}

/// A track selection expression could not be parsed
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid list: {expression:?}")]
pub struct RangeSetError {
    /// The rejected expression
    pub expression: String,
}

/// A track listing violated its sequencing rules
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ListingError {
    /// Track positions must arrive as exactly `0..count`
    #[error("track {found} received where track {expected} was expected")]
    OutOfSequence { expected: u32, found: u32 },

    /// Every descriptor of one listing must report the same count
    #[error("track count changed from {expected} to {found}")]
    CountMismatch { expected: u32, found: u32 },
}
