//! Flight Recorder Simulation Library
//!
//! This crate provides a virtual Flytec/Bräuniger instrument for testing the
//! session layer without physical hardware. [`VirtualInstrument`] implements
//! `Read + Write`, so it can stand in for a serial port anywhere a transport
//! is accepted.
//!
//! # Example
//!
//! ```rust
//! use std::io::{Read, Write};
//! use tini_sim::{VirtualInstrument, VirtualInstrumentConfig};
//!
//! let mut instrument = VirtualInstrument::new(VirtualInstrumentConfig::default());
//! instrument.write_all(b"$PBRSNP,*21\r\n").unwrap();
//!
//! let mut buf = [0u8; 128];
//! let n = instrument.read(&mut buf).unwrap();
//! assert_eq!(buf[0], tini_protocol::XOFF);
//! assert_eq!(buf[n - 1], tini_protocol::XON);
//! ```

pub mod instrument;

pub use instrument::{Faults, VirtualInstrument, VirtualInstrumentConfig, VirtualTrack};
