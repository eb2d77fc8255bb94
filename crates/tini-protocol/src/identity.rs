//! Identity sentence (`PBRSNP`)
//!
//! ```text
//! PBRSNP,<instrument_id>,<pilot_name>,<serial_number>,<software_version>
//! ```

use crate::error::DecodeError;
use crate::manufacturer;
use crate::matcher::Cursor;

/// Identity reported by an instrument
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeviceIdentity {
    /// Instrument model, e.g. `5020` or `COMPEO`
    pub instrument_id: String,
    /// Pilot name exactly as sent, usually space padded
    pub pilot_name: String,
    /// Instrument serial number
    pub serial_number: u32,
    /// Firmware version
    pub software_version: String,
}

impl DeviceIdentity {
    /// Decode the payload of an identity sentence
    pub fn decode(body: &str) -> Result<Self, DecodeError> {
        Self::parse(body).ok_or_else(|| DecodeError::new("PBRSNP", body))
    }

    fn parse(body: &str) -> Option<Self> {
        let c = Cursor::new(body).literal("PBRSNP,")?;
        let (c, instrument_id) = c.until(',', true)?;
        let (c, pilot_name) = c.until(',', true)?;
        let (c, serial_number) = c.unsigned()?;
        let (c, software_version) = c.char(',')?.until_end();
        c.eos()?;

        Some(Self {
            instrument_id,
            pilot_name,
            serial_number,
            software_version,
        })
    }

    /// Pilot name without surrounding spaces
    pub fn trimmed_pilot_name(&self) -> &str {
        self.pilot_name.trim_matches(' ')
    }

    /// Three-letter manufacturer code derived from the instrument id
    pub fn manufacturer_code(&self) -> &'static str {
        manufacturer::manufacturer_code(&self.instrument_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_identity() {
        let id = DeviceIdentity::decode("PBRSNP,5020,  Tom Payne   ,1234,1.22").unwrap();
        assert_eq!(id.instrument_id, "5020");
        assert_eq!(id.pilot_name, "  Tom Payne   ");
        assert_eq!(id.trimmed_pilot_name(), "Tom Payne");
        assert_eq!(id.serial_number, 1234);
        assert_eq!(id.software_version, "1.22");
        assert_eq!(id.manufacturer_code(), "FLY");
    }

    #[test]
    fn test_version_runs_to_end() {
        let id = DeviceIdentity::decode("PBRSNP,COMPEO+,Pilot,7,V 2.1, beta").unwrap();
        assert_eq!(id.software_version, "V 2.1, beta");
        assert_eq!(id.manufacturer_code(), "BRA");
    }

    #[test]
    fn test_empty_fields() {
        let id = DeviceIdentity::decode("PBRSNP,,,0,").unwrap();
        assert_eq!(id.instrument_id, "");
        assert_eq!(id.trimmed_pilot_name(), "");
        assert_eq!(id.software_version, "");
        assert_eq!(id.manufacturer_code(), "XXX");
    }

    #[test]
    fn test_tabs_are_not_trimmed() {
        let id = DeviceIdentity::decode("PBRSNP,5030,\tPilot ,1,1").unwrap();
        assert_eq!(id.trimmed_pilot_name(), "\tPilot");
    }

    #[test]
    fn test_decode_failures() {
        for body in [
            "",
            "PBRSNP",
            "PBRTL,5020,Pilot,1,1.0",
            "PBRSNP,5020,Pilot",
            "PBRSNP,5020,Pilot,abc,1.0",
            "PBRSNP,5020,Pilot,12",
            "PBRSNP,5020,Pilot,12;1.0",
        ] {
            let err = DeviceIdentity::decode(body).unwrap_err();
            assert_eq!(err.record, "PBRSNP");
            assert_eq!(err.body, body);
        }
    }
}
