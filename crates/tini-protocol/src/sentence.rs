//! Checksum-framed sentences
//!
//! # Format
//! ```text
//! $<payload>*<checksum>\r\n
//! ```
//!
//! - `$`: Sentence delimiter
//! - `payload`: ASCII command or response text, e.g. `PBRSNP,`
//! - `*`: Checksum delimiter
//! - `checksum`: XOR of every payload byte, as two upper-case hex digits
//! - `\r\n`: Terminator
//!
//! Multi-line responses are bracketed by the flow-control bytes
//! [`XOFF`](crate::XOFF) and [`XON`](crate::XON).

use crate::error::FrameError;
use crate::EncodeCommand;

/// Sentence delimiter
pub const START: u8 = b'$';
/// Checksum delimiter
pub const CHECKSUM_DELIMITER: u8 = b'*';

/// Shortest possible frame: `$*HH\r\n`
const MIN_FRAME_LEN: usize = 6;

/// XOR-fold of `payload`
pub fn checksum(payload: &[u8]) -> u8 {
    payload.iter().fold(0, |acc, b| acc ^ b)
}

/// Frame `payload` as `$<payload>*HH\r\n`
pub fn encode_sentence(payload: &str) -> Vec<u8> {
    format!("${}*{:02X}\r\n", payload, checksum(payload.as_bytes())).into_bytes()
}

/// Validate a framed line and return its payload
pub fn decode_sentence(line: &[u8]) -> Result<&[u8], FrameError> {
    let len = line.len();
    if len < MIN_FRAME_LEN {
        return Err(FrameError::TooShort { len });
    }
    if line[0] != START || line[len - 5] != CHECKSUM_DELIMITER {
        return Err(FrameError::MissingDelimiter);
    }
    if !line.ends_with(b"\r\n") {
        return Err(FrameError::BadTerminator);
    }

    let payload = &line[1..len - 5];
    let expected = (hex_digit(line[len - 4])? << 4) | hex_digit(line[len - 3])?;
    let actual = checksum(payload);
    if expected != actual {
        return Err(FrameError::ChecksumMismatch { expected, actual });
    }

    Ok(payload)
}

fn hex_digit(b: u8) -> Result<u8, FrameError> {
    match b {
        b'0'..=b'9' => Ok(b - b'0'),
        b'A'..=b'F' => Ok(b - b'A' + 0xA),
        _ => Err(FrameError::InvalidChecksumDigit(b)),
    }
}

/// Host commands understood by the instrument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Identity query: `PBRSNP,`
    Identify,
    /// Track listing: `PBRTL,`
    ListTracks,
    /// Retrieve one listed track by zero-based index: `PBRTR,NN`
    RetrieveTrack(u8),
    /// Retrieve the track selected on the instrument: `PBRIGC,`
    RetrieveSelectedTrack,
}

impl Command {
    /// Unframed payload text
    pub fn payload(&self) -> String {
        match self {
            Command::Identify => "PBRSNP,".to_string(),
            Command::ListTracks => "PBRTL,".to_string(),
            Command::RetrieveTrack(index) => format!("PBRTR,{:02}", index),
            Command::RetrieveSelectedTrack => "PBRIGC,".to_string(),
        }
    }

    /// Short name used in diagnostics
    pub fn name(&self) -> &'static str {
        match self {
            Command::Identify => "PBRSNP",
            Command::ListTracks => "PBRTL",
            Command::RetrieveTrack(_) => "PBRTR",
            Command::RetrieveSelectedTrack => "PBRIGC",
        }
    }
}

impl EncodeCommand for Command {
    fn encode(&self) -> Vec<u8> {
        encode_sentence(&self.payload())
    }
}
