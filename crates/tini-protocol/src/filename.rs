//! IGC filename synthesis
//!
//! # Long format
//! ```text
//! YYYY-MM-DD-MMM-SERIAL-DD.IGC
//! ```
//! e.g. `2007-06-05-FLY-123-02.IGC`
//!
//! # Short format
//! Eight characters plus `.IGC`, each character a base-36 digit (`0-9A-Z`):
//!
//! | pos | value                                   |
//! |-----|-----------------------------------------|
//! | 0   | year modulo 10                          |
//! | 1   | month                                   |
//! | 2   | day of month                            |
//! | 3   | first character of the manufacturer     |
//! | 4-6 | serial number, least significant first  |
//! | 7   | day index                               |
//!
//! e.g. `765FF302.IGC`. Only the last digit of the year is kept, so tracks
//! recorded ten years apart can collide.

use chrono::{Datelike, NaiveDate};

const BASE36: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Filename style for downloaded tracks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FilenameFormat {
    /// `YYYY-MM-DD-MMM-SERIAL-DD.IGC`
    #[default]
    Long,
    /// 8.3 style `YMDMSSSD.IGC`
    Short,
}

impl FilenameFormat {
    /// Build the filename for one track
    ///
    /// # Panics
    ///
    /// In the short format, panics if the day index is 36 or more or the
    /// manufacturer code does not start with an ASCII letter or digit.
    pub fn render(
        &self,
        date: NaiveDate,
        manufacturer: &str,
        serial_number: u32,
        day_index: u32,
    ) -> String {
        match self {
            FilenameFormat::Long => format!(
                "{:04}-{:02}-{:02}-{}-{}-{:02}.IGC",
                date.year(),
                date.month(),
                date.day(),
                manufacturer,
                serial_number,
                day_index
            ),
            FilenameFormat::Short => {
                let mut stem = String::with_capacity(12);
                stem.push(base36(date.year().rem_euclid(10) as u32));
                stem.push(base36(date.month()));
                stem.push(base36(date.day()));
                let initial = manufacturer.bytes().next().unwrap_or(0);
                assert!(
                    initial.is_ascii_alphanumeric(),
                    "manufacturer code {:?} cannot start a short filename",
                    manufacturer
                );
                stem.push(char::from(initial));
                stem.push(base36(serial_number % 36));
                stem.push(base36(serial_number / 36 % 36));
                stem.push(base36(serial_number / (36 * 36) % 36));
                stem.push(base36(day_index));
                stem.push_str(".IGC");
                stem
            }
        }
    }
}

fn base36(value: u32) -> char {
    char::from(BASE36[value as usize])
}
