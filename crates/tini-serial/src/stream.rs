//! Pull-based track content
//!
//! Track retrieval answers with raw IGC lines, not checksum-framed
//! sentences. [`LineStream`] hands them out one at a time and consumes the
//! end-of-response marker once the instrument is done.

use std::io::{Read, Write};

use tracing::warn;

use crate::error::DeviceError;
use crate::framer::TRACK_LINE_LIMIT;
use crate::session::Session;

/// Lines of one track retrieval
///
/// Holds the session mutably, so no other command can be issued until the
/// stream is dropped. Dropping it before the last line leaves the instrument
/// mid-response and the session refuses any further command.
pub struct LineStream<'a, T: Read + Write> {
    session: &'a mut Session<T>,
    done: bool,
    complete: bool,
}

impl<'a, T: Read + Write> LineStream<'a, T> {
    pub(crate) fn new(session: &'a mut Session<T>) -> Self {
        Self {
            session,
            done: false,
            complete: false,
        }
    }

    /// Whether the whole response was read
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    fn next_line(&mut self) -> Result<Option<String>, DeviceError> {
        let channel = &mut self.session.channel;
        match channel.read_line(TRACK_LINE_LIMIT)? {
            Some(line) => Ok(Some(String::from_utf8_lossy(&line).into_owned())),
            None => {
                channel.end_response()?;
                Ok(None)
            }
        }
    }
}

impl<T: Read + Write> Iterator for LineStream<'_, T> {
    type Item = Result<String, DeviceError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_line() {
            Ok(Some(line)) => Some(Ok(line)),
            Ok(None) => {
                self.done = true;
                self.complete = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl<T: Read + Write> Drop for LineStream<'_, T> {
    fn drop(&mut self) {
        if self.complete {
            return;
        }
        if !self.done {
            warn!(
                "Abandoned track download on {}, reopen the device to continue",
                self.session.device()
            );
        }
        self.session.desynchronized = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::tests::ScriptedTransport;
    use crate::channel::SerialChannel;
    use crate::error::ProtocolViolation;
    use crate::session::SessionConfig;

    fn session(data: &[u8]) -> Session<ScriptedTransport> {
        let channel = SerialChannel::new("test", ScriptedTransport::with_chunks(&[data]));
        Session::new(channel, SessionConfig::default())
    }

    #[test]
    fn test_lines_until_end_marker() {
        let mut session = session(b"\x13AFLY05094\r\nB1101355206343N\r\n\x11");
        let lines: Vec<String> = session
            .retrieve_selected_track()
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(lines, ["AFLY05094\r\n", "B1101355206343N\r\n"]);
        assert_eq!(session.channel().get_ref().written, b"$PBRIGC,*21\r\n");
    }

    #[test]
    fn test_empty_track() {
        let mut session = session(b"\x13\x11");
        let mut stream = session.retrieve_selected_track().unwrap();
        assert!(stream.next().is_none());
        assert!(stream.is_complete());
        assert!(stream.next().is_none());
    }

    #[test]
    fn test_abandoned_stream_desynchronizes_session() {
        let mut session = session(b"\x13AFLY05094\r\nB1101355206343N\r\n\x11");
        {
            let mut stream = session.retrieve_selected_track().unwrap();
            assert!(stream.next().unwrap().is_ok());
        }
        let err = session.identity().unwrap_err();
        assert_eq!(err.violation(), Some(&ProtocolViolation::Desynchronized));
    }

    #[test]
    fn test_error_ends_stream() {
        let mut session = session(b"\x13AFLY05094\r\n");
        let mut stream = session.retrieve_selected_track().unwrap();
        assert!(stream.next().unwrap().is_ok());
        assert!(matches!(
            stream.next(),
            Some(Err(DeviceError::Timeout { .. }))
        ));
        assert!(stream.next().is_none());
    }
}
