//! Flight Recorder Session Library
//!
//! This crate drives a Flytec or Bräuniger flight recorder over a serial
//! port: it opens and configures the port, runs the command/response cycle
//! of the sentence protocol, caches identity and track listings, and streams
//! track content.
//!
//! # Example
//!
//! ```rust,no_run
//! use tini_serial::{Session, SessionConfig};
//!
//! let mut session = Session::open("/dev/ttyUSB0", SessionConfig::default())?;
//! println!("Pilot: {}", session.identity()?.trimmed_pilot_name());
//!
//! let tracks = session.tracks()?.to_vec();
//! for track in &tracks {
//!     println!("{} {}", track.index + 1, track.igc_filename);
//! }
//! if let Some(track) = tracks.last() {
//!     for line in session.retrieve_track(track)? {
//!         print!("{}", line?);
//!     }
//! }
//! # Ok::<(), tini_serial::DeviceError>(())
//! ```

pub mod channel;
pub mod error;
pub mod framer;
pub mod progress;
pub mod session;
pub mod stream;

pub use channel::SerialChannel;
pub use error::{DeviceError, ErrorCategory, ProtocolViolation};
pub use progress::{MinutesSeconds, ProgressEstimator, ProgressUpdate};
pub use session::{Session, SessionConfig};
pub use stream::LineStream;
