//! Flight Recorder Protocol Library
//!
//! This crate provides framing and parsing for the serial protocol spoken by
//! Flytec and Bräuniger flight recorders (Flytec 5020/5030/6020/6030,
//! Bräuniger Compeo, Competino and Galileo):
//!
//! - **Sentences**: `$<payload>*<checksum>\r\n` with an XOR checksum
//! - **Flow control**: multi-line responses bracketed by XOFF ... XON
//! - **Records**: identity (`PBRSNP`) and track listing (`PBRTL`) bodies
//! - **IGC content**: `B` and `HFDTE` records for progress tracking
//! - **Filenames**: long and short (8.3) IGC filenames
//! - **Selections**: `1,3-5,8-` style track lists
//!
//! Nothing in this crate performs I/O; see `tini-serial` for the session
//! layer that drives a real instrument.
//!
//! # Example
//!
//! ```rust
//! use tini_protocol::{decode_sentence, encode_sentence, DeviceIdentity};
//!
//! let frame = encode_sentence("PBRSNP,5020,Tom Payne,1234,1.22");
//! let payload = decode_sentence(&frame).unwrap();
//!
//! let identity = DeviceIdentity::decode(std::str::from_utf8(payload).unwrap()).unwrap();
//! assert_eq!(identity.serial_number, 1234);
//! assert_eq!(identity.manufacturer_code(), "FLY");
//! ```

pub mod error;
pub mod filename;
pub mod identity;
pub mod igc;
pub mod manufacturer;
pub mod matcher;
pub mod range_set;
pub mod sentence;
pub mod track;

pub use error::{DecodeError, FrameError, ListingError, RangeSetError};
pub use filename::FilenameFormat;
pub use identity::DeviceIdentity;
pub use igc::{IgcClock, IgcRecord};
pub use range_set::{Interval, RangeSet};
pub use sentence::{checksum, decode_sentence, encode_sentence, Command};
pub use track::{assign_day_indices, TrackDescriptor, TrackListing};

/// Flow-control byte ending a multi-line response (DC1)
pub const XON: u8 = 0x11;
/// Flow-control byte starting a multi-line response (DC3)
pub const XOFF: u8 = 0x13;

/// Trait for commands that can be encoded to bytes
pub trait EncodeCommand {
    /// Encode this command to its wire format
    fn encode(&self) -> Vec<u8>;
}
