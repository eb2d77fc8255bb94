//! Track listing sentences (`PBRTL`)
//!
//! ```text
//! PBRTL,<count>,<index>,<dd>.<mm>.<yy>,<hh>:<mm>:<ss>,<hh>:<mm>:<ss>
//! ```
//!
//! The instrument sends one sentence per recorded track, oldest first. The
//! first time is the start of the track, the second its duration.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use crate::error::{DecodeError, ListingError};
use crate::filename::FilenameFormat;
use crate::matcher::Cursor;

/// One recorded track
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrackDescriptor {
    /// Number of tracks on the instrument when the listing was taken
    pub count: u32,
    /// Zero-based position in the listing
    pub index: u32,
    /// Calendar date of the track start
    pub date: NaiveDate,
    /// Position among the tracks of the same day, newest is 1
    pub day_index: u32,
    /// Track start
    pub start: DateTime<Utc>,
    /// Track duration in seconds
    pub duration_secs: u32,
    /// Synthesized IGC filename
    pub igc_filename: String,
}

impl TrackDescriptor {
    /// Decode the payload of a track listing sentence
    ///
    /// `day_index` and `igc_filename` are left unset until the full listing
    /// is known; see [`TrackListing::finish`].
    pub fn decode(body: &str) -> Result<Self, DecodeError> {
        Self::parse(body).ok_or_else(|| DecodeError::new("PBRTL", body))
    }

    fn parse(body: &str) -> Option<Self> {
        let c = Cursor::new(body).literal("PBRTL,")?;
        let (c, count) = c.unsigned()?;
        let (c, index) = c.char(',')?.unsigned()?;
        let (c, day) = c.char(',')?.unsigned()?;
        let (c, month) = c.char('.')?.unsigned()?;
        let (c, year) = c.char('.')?.unsigned()?;
        let (c, (hour, minute, second)) = hms(c.char(',')?)?;
        let (c, (hours, minutes, seconds)) = hms(c.char(',')?)?;
        c.eos()?;

        let year = i32::try_from(year).ok()?.checked_add(2000)?;
        let date = NaiveDate::from_ymd_opt(year, month, day)?;
        let time = NaiveTime::from_hms_opt(hour, minute, second)?;
        let duration_secs = hours
            .checked_mul(3600)?
            .checked_add(minutes.checked_mul(60)?)?
            .checked_add(seconds)?;

        Some(Self {
            count,
            index,
            date,
            day_index: 0,
            start: date.and_time(time).and_utc(),
            duration_secs,
            igc_filename: String::new(),
        })
    }

    /// Track duration
    pub fn duration(&self) -> chrono::Duration {
        chrono::Duration::seconds(i64::from(self.duration_secs))
    }

    /// Track end
    pub fn end(&self) -> DateTime<Utc> {
        self.start + self.duration()
    }
}

fn hms(c: Cursor<'_>) -> Option<(Cursor<'_>, (u32, u32, u32))> {
    let (c, h) = c.unsigned()?;
    let (c, m) = c.char(':')?.unsigned()?;
    let (c, s) = c.char(':')?.unsigned()?;
    Some((c, (h, m, s)))
}

/// Accumulates the descriptors of one listing response
///
/// Positions must arrive as exactly `0..count` and every descriptor must
/// report the same count.
#[derive(Debug, Default)]
pub struct TrackListing {
    tracks: Vec<TrackDescriptor>,
}

impl TrackListing {
    /// Create an empty listing
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the next descriptor
    pub fn push(&mut self, track: TrackDescriptor) -> Result<(), ListingError> {
        let expected = self.tracks.len() as u32;
        if track.index != expected {
            return Err(ListingError::OutOfSequence {
                expected,
                found: track.index,
            });
        }
        if let Some(first) = self.tracks.first() {
            if track.count != first.count {
                return Err(ListingError::CountMismatch {
                    expected: first.count,
                    found: track.count,
                });
            }
        }
        self.tracks.push(track);
        Ok(())
    }

    /// Number of descriptors received so far
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Whether no descriptor has been received
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Assign day indices and filenames
    pub fn finish(
        mut self,
        manufacturer: &str,
        serial_number: u32,
        format: FilenameFormat,
    ) -> Vec<TrackDescriptor> {
        assign_day_indices(&mut self.tracks);
        for track in &mut self.tracks {
            track.igc_filename =
                format.render(track.date, manufacturer, serial_number, track.day_index);
        }
        self.tracks
    }
}

/// Number tracks within each calendar day, newest first
///
/// The last track gets 1. Walking backwards, a track on the same date as its
/// successor gets the successor's index plus one, otherwise 1.
pub fn assign_day_indices(tracks: &mut [TrackDescriptor]) {
    let mut next: Option<(NaiveDate, u32)> = None;
    for track in tracks.iter_mut().rev() {
        track.day_index = match next {
            Some((date, day_index)) if date == track.date => day_index + 1,
            _ => 1,
        };
        next = Some((track.date, track.day_index));
    }
}
