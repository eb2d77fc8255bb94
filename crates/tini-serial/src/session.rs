//! Instrument sessions
//!
//! A [`Session`] owns the channel to one instrument and issues the four
//! commands it understands. Identity and track listing are queried at most
//! once and cached; track content is streamed through a [`LineStream`].

use std::io::{Read, Write};

use serialport::SerialPort;
use tini_protocol::{
    Command, DecodeError, DeviceIdentity, FilenameFormat, TrackDescriptor, TrackListing,
};
use tracing::debug;

use crate::channel::SerialChannel;
use crate::error::{DeviceError, ProtocolViolation};
use crate::stream::LineStream;

/// Options affecting derived data
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionConfig {
    /// Replaces the manufacturer code derived from the instrument model
    pub manufacturer: Option<String>,
    /// Style of synthesized IGC filenames
    pub filename_format: FilenameFormat,
}

/// Connection to one instrument
pub struct Session<T> {
    pub(crate) channel: SerialChannel<T>,
    config: SessionConfig,
    identity: Option<DeviceIdentity>,
    tracks: Option<Vec<TrackDescriptor>>,
    pub(crate) desynchronized: bool,
}

impl Session<Box<dyn SerialPort>> {
    /// Open the serial device and start a session on it
    pub fn open(device: &str, config: SessionConfig) -> Result<Self, DeviceError> {
        Ok(Self::new(SerialChannel::open(device)?, config))
    }
}

impl<T: Read + Write> Session<T> {
    /// Start a session on an open channel
    pub fn new(channel: SerialChannel<T>, config: SessionConfig) -> Self {
        Self {
            channel,
            config,
            identity: None,
            tracks: None,
            desynchronized: false,
        }
    }

    /// Device name used in diagnostics
    pub fn device(&self) -> &str {
        self.channel.device()
    }

    /// Access the underlying channel
    pub fn channel(&self) -> &SerialChannel<T> {
        &self.channel
    }

    /// Instrument identity (`PBRSNP`)
    pub fn identity(&mut self) -> Result<&DeviceIdentity, DeviceError> {
        let identity = match self.identity.take() {
            Some(identity) => identity,
            None => self.query_identity()?,
        };
        Ok(&*self.identity.insert(identity))
    }

    /// Manufacturer code used in filenames
    ///
    /// The configured override wins over the code derived from the model.
    pub fn manufacturer(&mut self) -> Result<String, DeviceError> {
        if let Some(manufacturer) = &self.config.manufacturer {
            return Ok(manufacturer.clone());
        }
        Ok(self.identity()?.manufacturer_code().to_string())
    }

    /// Tracks stored on the instrument, oldest first (`PBRTL`)
    pub fn tracks(&mut self) -> Result<&[TrackDescriptor], DeviceError> {
        let tracks = match self.tracks.take() {
            Some(tracks) => tracks,
            None => self.query_tracks()?,
        };
        Ok(self.tracks.insert(tracks).as_slice())
    }

    /// Stream the content of a listed track (`PBRTR`)
    pub fn retrieve_track(
        &mut self,
        track: &TrackDescriptor,
    ) -> Result<LineStream<'_, T>, DeviceError> {
        let index = u8::try_from(track.index)
            .ok()
            .filter(|index| *index < 100)
            .ok_or_else(|| {
                self.channel.violation(ProtocolViolation::TrackIndexOutOfRange {
                    index: track.index,
                })
            })?;
        self.begin(Command::RetrieveTrack(index))?;
        Ok(LineStream::new(self))
    }

    /// Stream the track currently selected on the instrument (`PBRIGC`)
    pub fn retrieve_selected_track(&mut self) -> Result<LineStream<'_, T>, DeviceError> {
        self.begin(Command::RetrieveSelectedTrack)?;
        Ok(LineStream::new(self))
    }

    fn begin(&mut self, command: Command) -> Result<(), DeviceError> {
        if self.desynchronized {
            return Err(self.channel.violation(ProtocolViolation::Desynchronized));
        }
        self.channel.begin_response(command)
    }

    fn query_identity(&mut self) -> Result<DeviceIdentity, DeviceError> {
        let command = Command::Identify;
        self.begin(command)?;
        let body = self.channel.read_sentence()?.ok_or_else(|| {
            self.channel.violation(ProtocolViolation::MissingResponse {
                command: command.name(),
            })
        })?;
        let identity = DeviceIdentity::decode(&body).map_err(|e| self.decode_error(e))?;
        self.channel.end_response()?;

        debug!(
            "{} is a {} (serial {}, software {})",
            self.device(),
            identity.instrument_id,
            identity.serial_number,
            identity.software_version
        );
        Ok(identity)
    }

    fn query_tracks(&mut self) -> Result<Vec<TrackDescriptor>, DeviceError> {
        let serial_number = self.identity()?.serial_number;
        let manufacturer = self.manufacturer()?;

        self.begin(Command::ListTracks)?;
        let mut listing = TrackListing::new();
        while let Some(body) = self.channel.read_sentence()? {
            let track = TrackDescriptor::decode(&body).map_err(|e| self.decode_error(e))?;
            listing
                .push(track)
                .map_err(|e| self.channel.violation(e.into()))?;
        }
        self.channel.end_response()?;

        let tracks = listing.finish(&manufacturer, serial_number, self.config.filename_format);
        debug!("{} tracks on {}", tracks.len(), self.device());
        Ok(tracks)
    }

    fn decode_error(&self, source: DecodeError) -> DeviceError {
        DeviceError::Decode {
            device: self.device().to_string(),
            source,
        }
    }
}
