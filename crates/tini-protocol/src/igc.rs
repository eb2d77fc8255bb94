//! Timestamp tracking through IGC track content
//!
//! Track content is streamed as raw IGC lines. Only two record kinds carry
//! time information:
//!
//! - `B` fix records: `Bhhmmss...\r\n`
//! - `HFDTE` date headers: `HFDTEddmmyy\r\n`
//!
//! Everything else is passed through untouched.

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Timelike, Utc};

use crate::matcher::Cursor;

/// Kind of timestamp-bearing record recognized by [`IgcClock::update`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgcRecord {
    /// `B` fix record, updates the time of day
    Fix,
    /// `HFDTE` header, updates the date
    Date,
}

/// Calendar date and time of day accumulated from IGC records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IgcClock {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

impl IgcClock {
    /// Start from a known instant, normally the track start
    pub fn starting_at(instant: DateTime<Utc>) -> Self {
        Self {
            year: instant.year(),
            month: instant.month(),
            day: instant.day(),
            hour: instant.hour(),
            minute: instant.minute(),
            second: instant.second(),
        }
    }

    /// Update from one IGC line
    ///
    /// The clock only changes when the whole record matches.
    pub fn update(&mut self, line: &str) -> Option<IgcRecord> {
        let (c, kind) = Cursor::new(line).one_of("BH")?;
        match kind {
            'B' => {
                let (c, hour) = c.digits(2)?;
                let (c, minute) = c.digits(2)?;
                let (c, second) = c.digits(2)?;
                c.until_eol()?;
                self.hour = hour;
                self.minute = minute;
                self.second = second;
                Some(IgcRecord::Fix)
            }
            _ => {
                let c = c.literal("FDTE")?;
                let (c, day) = c.digits(2)?;
                let (c, month) = c.digits(2)?;
                let (c, year) = c.digits(2)?;
                c.literal("\r\n")?;
                self.year = 2000 + year as i32;
                self.month = month;
                self.day = day;
                Some(IgcRecord::Date)
            }
        }
    }

    /// The accumulated instant, if it names a real date and time
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        let date = NaiveDate::from_ymd_opt(self.year, self.month, self.day)?;
        let time = NaiveTime::from_hms_opt(self.hour, self.minute, self.second)?;
        Some(date.and_time(time).and_utc())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_b_record_updates_time() {
        let mut clock = IgcClock::default();
        let record = clock.update("B1101355206343N00006198WA0058700558\r\n");
        assert_eq!(record, Some(IgcRecord::Fix));
        assert_eq!((clock.hour, clock.minute, clock.second), (11, 1, 35));
    }

    #[test]
    fn test_hfdte_record_updates_date() {
        let mut clock = IgcClock::default();
        assert_eq!(clock.update("HFDTE050607\r\n"), Some(IgcRecord::Date));
        assert_eq!((clock.year, clock.month, clock.day), (2007, 6, 5));
    }

    #[test]
    fn test_combined_timestamp() {
        let mut clock = IgcClock::default();
        clock.update("HFDTE050607\r\n");
        clock.update("B120000\r\n");
        assert_eq!(
            clock.timestamp(),
            Some(Utc.with_ymd_and_hms(2007, 6, 5, 12, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_unrecognized_lines_leave_clock_alone() {
        let start = Utc.with_ymd_and_hms(2008, 1, 2, 3, 4, 5).unwrap();
        let mut clock = IgcClock::starting_at(start);
        for line in [
            "AXXX001 FLYTEC\r\n",
            "HFPLTPILOT:Tom\r\n",
            "HFDTE0506\r\n",
            "HFDTE050607\n",
            "B12a000\r\n",
            "B120000",
            "LXXX comment\r\n",
            "",
        ] {
            assert_eq!(clock.update(line), None, "{:?}", line);
        }
        assert_eq!(clock.timestamp(), Some(start));
    }

    #[test]
    fn test_invalid_date_has_no_timestamp() {
        let mut clock = IgcClock::default();
        clock.update("HFDTE000000\r\n");
        assert_eq!(clock.timestamp(), None);
    }
}
