//! Download progress from timestamps inside the track content
//!
//! The instrument does not report how many bytes a track download will take,
//! but every `B` fix carries the time it was recorded. Comparing that time
//! against the track start and duration gives the share of the track already
//! received; the wall-clock time spent so far then extrapolates the rest.

use std::fmt;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tini_protocol::{IgcClock, IgcRecord, TrackDescriptor};

/// Largest time shown, 99:59
pub const MAX_DISPLAY_SECS: u64 = 99 * 60 + 59;

/// A progress display refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressUpdate {
    /// Share of the track received, 0 to 99
    pub percentage: u32,
    /// Estimated time left, 1 s to 99:59
    pub remaining: Duration,
}

impl fmt::Display for ProgressUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:3}%  {} ETA",
            self.percentage,
            MinutesSeconds(self.remaining)
        )
    }
}

/// Formats a duration as `MM:SS`, capped at 99:59
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinutesSeconds(pub Duration);

impl fmt::Display for MinutesSeconds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.0.as_secs().min(MAX_DISPLAY_SECS);
        write!(f, "{:02}:{:02}", secs / 60, secs % 60)
    }
}

/// Tracks the download of one track
#[derive(Debug)]
pub struct ProgressEstimator {
    start: DateTime<Utc>,
    duration_secs: i64,
    clock: IgcClock,
    percentage: Option<u32>,
    remaining: Option<Duration>,
    started: Instant,
}

impl ProgressEstimator {
    /// Start estimating the download of `track`
    pub fn new(track: &TrackDescriptor) -> Self {
        Self {
            start: track.start,
            duration_secs: i64::from(track.duration_secs),
            clock: IgcClock::starting_at(track.start),
            percentage: None,
            remaining: None,
            started: Instant::now(),
        }
    }

    /// Feed one streamed line, timing it against the wall clock
    pub fn observe(&mut self, line: &str) -> Option<ProgressUpdate> {
        let elapsed = self.started.elapsed();
        self.observe_at(line, elapsed)
    }

    /// Feed one streamed line received `elapsed` after the download started
    ///
    /// Returns an update when the percentage changed or the estimate dropped.
    pub fn observe_at(&mut self, line: &str, elapsed: Duration) -> Option<ProgressUpdate> {
        if self.clock.update(line) != Some(IgcRecord::Fix) {
            return None;
        }
        let now = self.clock.timestamp()?;
        let track_elapsed = (now - self.start).num_seconds();

        let percentage = (100 * track_elapsed / self.duration_secs.max(1)).clamp(0, 99) as u32;
        let remaining = Duration::from_secs(estimate_remaining(
            elapsed,
            track_elapsed,
            self.duration_secs,
        ));

        let changed = self.percentage != Some(percentage);
        let improved = self.remaining.map_or(true, |last| remaining < last);
        if !changed && !improved {
            return None;
        }
        self.percentage = Some(percentage);
        self.remaining = Some(remaining);
        Some(ProgressUpdate {
            percentage,
            remaining,
        })
    }

    /// Wall-clock time since the download started
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

fn estimate_remaining(wall: Duration, track_elapsed: i64, duration_secs: i64) -> u64 {
    if track_elapsed <= 0 {
        return 1;
    }
    let left = (duration_secs - track_elapsed) as f64;
    let secs = (wall.as_secs_f64() * left / track_elapsed as f64).round();
    secs.clamp(1.0, MAX_DISPLAY_SECS as f64) as u64
}
