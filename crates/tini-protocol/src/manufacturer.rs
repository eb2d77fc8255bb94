//! Instrument model database
//!
//! Maps the instrument identifier reported in the identity sentence to the
//! three-letter IGC manufacturer code used in track filenames.

/// Code used for instruments not in the database
pub const UNKNOWN_CODE: &str = "XXX";

/// A known instrument model (static version for database)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstrumentModel {
    /// Identifier as reported by the instrument
    pub instrument_id: &'static str,
    /// Manufacturer display name
    pub manufacturer: &'static str,
    /// Three-letter IGC manufacturer code
    pub code: &'static str,
}

const fn flytec(instrument_id: &'static str) -> InstrumentModel {
    InstrumentModel {
        instrument_id,
        manufacturer: "Flytec",
        code: "FLY",
    }
}

const fn brauniger(instrument_id: &'static str) -> InstrumentModel {
    InstrumentModel {
        instrument_id,
        manufacturer: "Bräuniger",
        code: "BRA",
    }
}

static INSTRUMENTS: &[InstrumentModel] = &[
    flytec("5020"),
    flytec("5030"),
    flytec("6020"),
    flytec("6030"),
    brauniger("COMPEO"),
    brauniger("COMPEO+"),
    brauniger("COMPETINO"),
    brauniger("COMPETINO+"),
    brauniger("GALILEO"),
];

/// Look up an instrument by its exact identifier
pub fn by_instrument_id(instrument_id: &str) -> Option<&'static InstrumentModel> {
    INSTRUMENTS.iter().find(|m| m.instrument_id == instrument_id)
}

/// Three-letter manufacturer code for an instrument, `XXX` if unknown
pub fn manufacturer_code(instrument_id: &str) -> &'static str {
    by_instrument_id(instrument_id)
        .map(|m| m.code)
        .unwrap_or(UNKNOWN_CODE)
}

/// All known instrument models
pub fn all() -> &'static [InstrumentModel] {
    INSTRUMENTS
}
