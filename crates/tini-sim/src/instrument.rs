//! Virtual flight recorder
//!
//! Answers the four host commands the way a real instrument does, over an
//! in-memory `Read + Write` transport. Responses can be delivered in small
//! chunks and a few faults can be injected to exercise error paths.

use std::collections::{HashMap, VecDeque};
use std::io::{self, Read, Write};

use chrono::{DateTime, Datelike, Duration, Timelike, Utc};
use serde::{Deserialize, Serialize};
use tini_protocol::{decode_sentence, encode_sentence, XOFF, XON};
use tracing::{trace, warn};

/// A track stored on the virtual instrument
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtualTrack {
    /// Track start
    pub start: DateTime<Utc>,
    /// Track duration in seconds
    pub duration_secs: u32,
    /// IGC lines including their CR LF terminators
    pub igc: Vec<String>,
}

impl VirtualTrack {
    /// Create a track with synthetic IGC content
    ///
    /// The content holds a header, a date record and one fix every
    /// `interval_secs` seconds from start to end.
    pub fn generate(start: DateTime<Utc>, duration_secs: u32, interval_secs: u32) -> Self {
        let mut igc = vec![
            "AFLY05094\r\n".to_string(),
            format!(
                "HFDTE{:02}{:02}{:02}\r\n",
                start.day(),
                start.month(),
                start.year() % 100
            ),
        ];
        let step = interval_secs.max(1);
        let mut offset = 0;
        while offset <= duration_secs {
            let t = start + Duration::seconds(i64::from(offset));
            igc.push(format!(
                "B{:02}{:02}{:02}4700000N00800000EA0100001000\r\n",
                t.hour(),
                t.minute(),
                t.second()
            ));
            offset += step;
        }
        igc.push("G0123456789ABCDEF\r\n".to_string());
        Self {
            start,
            duration_secs,
            igc,
        }
    }

    fn listing_body(&self, count: usize, index: usize) -> String {
        let d = self.duration_secs;
        format!(
            "PBRTL,{},{},{:02}.{:02}.{:02},{:02}:{:02}:{:02},{:02}:{:02}:{:02}",
            count,
            index,
            self.start.day(),
            self.start.month(),
            self.start.year() % 100,
            self.start.hour(),
            self.start.minute(),
            self.start.second(),
            d / 3600,
            d / 60 % 60,
            d % 60
        )
    }
}

/// Configuration for creating a virtual instrument
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VirtualInstrumentConfig {
    /// Model reported in the identity sentence
    pub instrument_id: String,
    /// Pilot name, sent as is
    pub pilot_name: String,
    pub serial_number: u32,
    pub software_version: String,
    /// Stored tracks, oldest first
    pub tracks: Vec<VirtualTrack>,
    /// Position of the track selected on the instrument
    pub selected: Option<usize>,
}

impl Default for VirtualInstrumentConfig {
    fn default() -> Self {
        Self {
            instrument_id: "6030".to_string(),
            pilot_name: "Test Pilot          ".to_string(),
            serial_number: 1234,
            software_version: "3.28".to_string(),
            tracks: Vec::new(),
            selected: None,
        }
    }
}

/// Injected misbehaviour
#[derive(Debug, Clone, Default)]
pub struct Faults {
    /// Send every checksum off by one
    pub corrupt_checksums: bool,
    /// Leave this position out of the track listing
    pub skip_listing_index: Option<usize>,
    /// Never answer
    pub silent: bool,
    /// Replace the response to a command name (e.g. `PBRSNP`) with raw bytes
    pub raw_responses: HashMap<String, Vec<u8>>,
}

/// A simulated flight recorder
#[derive(Debug)]
pub struct VirtualInstrument {
    config: VirtualInstrumentConfig,
    faults: Faults,
    /// Sizes of successive reads, cycled; empty means as much as fits
    chunk_sizes: Vec<usize>,
    next_chunk: usize,
    pending_output: VecDeque<u8>,
    partial_input: Vec<u8>,
    /// Commands received (for test verification)
    received_commands: Vec<String>,
}

impl VirtualInstrument {
    /// Create a virtual instrument from configuration
    pub fn new(config: VirtualInstrumentConfig) -> Self {
        Self {
            config,
            faults: Faults::default(),
            chunk_sizes: Vec::new(),
            next_chunk: 0,
            pending_output: VecDeque::new(),
            partial_input: Vec::new(),
            received_commands: Vec::new(),
        }
    }

    /// Inject faults
    pub fn with_faults(mut self, faults: Faults) -> Self {
        self.faults = faults;
        self
    }

    /// Deliver output in reads of these sizes, cycling
    pub fn with_chunk_sizes(mut self, sizes: &[usize]) -> Self {
        self.chunk_sizes = sizes.iter().copied().filter(|&n| n > 0).collect();
        self
    }

    /// Get all received command payloads (for test verification)
    pub fn received_commands(&self) -> &[String] {
        &self.received_commands
    }

    /// Bytes queued but not yet read by the host
    pub fn pending_len(&self) -> usize {
        self.pending_output.len()
    }

    fn process_line(&mut self, line: &[u8]) {
        let payload = match decode_sentence(line) {
            Ok(payload) => String::from_utf8_lossy(payload).into_owned(),
            Err(e) => {
                warn!("Virtual instrument ignoring {:?}: {}", line, e);
                return;
            }
        };
        trace!("Virtual instrument received {}", payload);
        self.received_commands.push(payload.clone());

        if self.faults.silent {
            return;
        }
        let name = payload.split(',').next().unwrap_or_default();
        if let Some(raw) = self.faults.raw_responses.get(name) {
            self.pending_output.extend(raw.iter().copied());
            return;
        }

        match name {
            "PBRSNP" if payload == "PBRSNP," => {
                let body = format!(
                    "PBRSNP,{},{},{},{}",
                    self.config.instrument_id,
                    self.config.pilot_name,
                    self.config.serial_number,
                    self.config.software_version
                );
                self.respond_sentences(&[body]);
            }
            "PBRTL" if payload == "PBRTL," => {
                let count = self.config.tracks.len();
                let bodies: Vec<String> = self
                    .config
                    .tracks
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| Some(*i) != self.faults.skip_listing_index)
                    .map(|(i, track)| track.listing_body(count, i))
                    .collect();
                self.respond_sentences(&bodies);
            }
            "PBRTR" => {
                let index = payload
                    .strip_prefix("PBRTR,")
                    .filter(|digits| digits.len() == 2)
                    .and_then(|digits| digits.parse::<usize>().ok());
                match index {
                    Some(index) => self.respond_track(Some(index)),
                    None => warn!("Virtual instrument ignoring malformed {}", payload),
                }
            }
            "PBRIGC" if payload == "PBRIGC," => self.respond_track(self.config.selected),
            _ => warn!("Virtual instrument ignoring unknown command {}", payload),
        }
    }

    fn respond_sentences(&mut self, bodies: &[String]) {
        self.pending_output.push_back(XOFF);
        for body in bodies {
            let mut frame = encode_sentence(body);
            if self.faults.corrupt_checksums {
                // Low hex digit of the checksum, 0-9A-F stays in range
                let pos = frame.len() - 3;
                frame[pos] = match frame[pos] {
                    b'F' => b'0',
                    b'9' => b'A',
                    b => b + 1,
                };
            }
            self.pending_output.extend(frame);
        }
        self.pending_output.push_back(XON);
    }

    fn respond_track(&mut self, index: Option<usize>) {
        self.pending_output.push_back(XOFF);
        if let Some(track) = index.and_then(|i| self.config.tracks.get(i)) {
            for line in &track.igc {
                self.pending_output.extend(line.bytes());
            }
        }
        self.pending_output.push_back(XON);
    }

    fn chunk_len(&mut self, capacity: usize) -> usize {
        let limit = if self.chunk_sizes.is_empty() {
            capacity
        } else {
            let n = self.chunk_sizes[self.next_chunk % self.chunk_sizes.len()];
            self.next_chunk += 1;
            n.min(capacity)
        };
        limit.min(self.pending_output.len())
    }
}

impl Read for VirtualInstrument {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.pending_output.is_empty() {
            return Err(io::ErrorKind::TimedOut.into());
        }
        let n = self.chunk_len(buf.len());
        for (slot, b) in buf.iter_mut().zip(self.pending_output.drain(..n)) {
            *slot = b;
        }
        Ok(n)
    }
}

impl Write for VirtualInstrument {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for &b in buf {
            self.partial_input.push(b);
            if b == b'\n' {
                let line = std::mem::take(&mut self.partial_input);
                self.process_line(&line);
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2007, 6, 5, 9, 30, 0).unwrap()
    }

    fn read_all(instrument: &mut VirtualInstrument) -> Vec<u8> {
        let mut out = Vec::new();
        let mut buf = [0u8; 64];
        while let Ok(n) = instrument.read(&mut buf) {
            out.extend_from_slice(&buf[..n]);
        }
        out
    }

    #[test]
    fn test_identity_response() {
        let mut instrument = VirtualInstrument::new(VirtualInstrumentConfig::default());
        instrument.write_all(b"$PBRSNP,*21\r\n").unwrap();

        let mut expected = vec![XOFF];
        expected.extend(encode_sentence("PBRSNP,6030,Test Pilot          ,1234,3.28"));
        expected.push(XON);
        assert_eq!(read_all(&mut instrument), expected);
        assert_eq!(instrument.received_commands(), ["PBRSNP,"]);
    }

    #[test]
    fn test_listing_response() {
        let config = VirtualInstrumentConfig {
            tracks: vec![VirtualTrack::generate(start(), 5400, 60)],
            ..Default::default()
        };
        let mut instrument = VirtualInstrument::new(config);
        instrument.write_all(&encode_sentence("PBRTL,")).unwrap();

        let mut expected = vec![XOFF];
        expected.extend(encode_sentence("PBRTL,1,0,05.06.07,09:30:00,01:30:00"));
        expected.push(XON);
        assert_eq!(read_all(&mut instrument), expected);
    }

    #[test]
    fn test_chunked_reads() {
        let mut instrument = VirtualInstrument::new(VirtualInstrumentConfig::default())
            .with_chunk_sizes(&[1, 2, 3]);
        instrument.write_all(b"$PBRSNP,*21\r\n").unwrap();

        let mut buf = [0u8; 64];
        let sizes: Vec<usize> = (0..4).map(|_| instrument.read(&mut buf).unwrap()).collect();
        assert_eq!(sizes, [1, 2, 3, 1]);
    }

    #[test]
    fn test_silent_instrument_times_out() {
        let faults = Faults {
            silent: true,
            ..Default::default()
        };
        let mut instrument =
            VirtualInstrument::new(VirtualInstrumentConfig::default()).with_faults(faults);
        instrument.write_all(b"$PBRSNP,*21\r\n").unwrap();
        let err = instrument.read(&mut [0u8; 8]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::TimedOut);
        assert_eq!(instrument.received_commands().len(), 1);
    }

    #[test]
    fn test_corrupt_frames_are_ignored() {
        let mut instrument = VirtualInstrument::new(VirtualInstrumentConfig::default());
        instrument.write_all(b"$PBRSNP,*00\r\n").unwrap();
        assert_eq!(instrument.pending_len(), 0);
        assert!(instrument.received_commands().is_empty());
    }

    #[test]
    fn test_generated_track_content() {
        let track = VirtualTrack::generate(start(), 120, 60);
        assert_eq!(
            track.igc,
            [
                "AFLY05094\r\n",
                "HFDTE050607\r\n",
                "B0930004700000N00800000EA0100001000\r\n",
                "B0931004700000N00800000EA0100001000\r\n",
                "B0932004700000N00800000EA0100001000\r\n",
                "G0123456789ABCDEF\r\n",
            ]
        );
    }
}
