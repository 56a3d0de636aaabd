use std::fmt::{Display, Formatter};

use chrono_tz::{Europe, Tz};

/// The time zone the ENTSO-E API and its users reason in (CET/CEST).
pub const API_TIME_ZONE: Tz = Europe::Brussels;

/// Bidding zones the tool can query.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, clap::ValueEnum)]
pub enum BiddingZone {
    #[value(name = "CZ", alias = "cz")]
    Cz,

    #[value(name = "DE_LU", alias = "de_lu", alias = "de-lu")]
    DeLu,

    #[value(name = "SK", alias = "sk")]
    Sk,

    #[value(name = "PL", alias = "pl")]
    Pl,

    #[value(name = "AT", alias = "at")]
    At,

    #[value(name = "HU", alias = "hu")]
    Hu,

    #[value(name = "FR", alias = "fr")]
    Fr,

    #[value(name = "IT", alias = "it")]
    It,

    #[value(name = "BE", alias = "be")]
    Be,

    #[value(name = "NL", alias = "nl")]
    Nl,

    #[value(name = "CH", alias = "ch")]
    Ch,
}

impl BiddingZone {
    pub const ALL: [Self; 11] = [
        Self::Cz,
        Self::DeLu,
        Self::Sk,
        Self::Pl,
        Self::At,
        Self::Hu,
        Self::Fr,
        Self::It,
        Self::Be,
        Self::Nl,
        Self::Ch,
    ];

    /// Short code as used by the ENTSO-E client libraries.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Cz => "CZ",
            Self::DeLu => "DE_LU",
            Self::Sk => "SK",
            Self::Pl => "PL",
            Self::At => "AT",
            Self::Hu => "HU",
            Self::Fr => "FR",
            Self::It => "IT",
            Self::Be => "BE",
            Self::Nl => "NL",
            Self::Ch => "CH",
        }
    }

    /// Energy Identification Code of the area, sent as `in_Domain`.
    #[must_use]
    pub const fn eic(self) -> &'static str {
        match self {
            Self::Cz => "10YCZ-CEPS-----N",
            Self::DeLu => "10Y1001A1001A82H",
            Self::Sk => "10YSK-SEPS-----K",
            Self::Pl => "10YPL-AREA-----S",
            Self::At => "10YAT-APG------L",
            Self::Hu => "10YHU-MAVIR----U",
            Self::Fr => "10YFR-RTE------C",
            Self::It => "10YIT-GRTN-----B",
            Self::Be => "10YBE----------2",
            Self::Nl => "10YNL----------L",
            Self::Ch => "10YCH-SWISSGRIDZ",
        }
    }

    /// Human-readable name, also used in the export file names.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Cz => "Czech Republic (CZ)",
            Self::DeLu => "Germany & Luxembourg (DE_LU)",
            Self::Sk => "Slovakia (SK)",
            Self::Pl => "Poland (PL)",
            Self::At => "Austria (AT)",
            Self::Hu => "Hungary (HU)",
            Self::Fr => "France (FR)",
            Self::It => "Italy (IT)",
            Self::Be => "Belgium (BE)",
            Self::Nl => "Netherlands (NL)",
            Self::Ch => "Switzerland (CH)",
        }
    }

    /// Local time zone of the area. All of them currently observe CET/CEST.
    #[must_use]
    pub const fn time_zone(self) -> Tz {
        match self {
            Self::Cz => Europe::Prague,
            Self::DeLu => Europe::Berlin,
            Self::Sk => Europe::Bratislava,
            Self::Pl => Europe::Warsaw,
            Self::At => Europe::Vienna,
            Self::Hu => Europe::Budapest,
            Self::Fr => Europe::Paris,
            Self::It => Europe::Rome,
            Self::Be => Europe::Brussels,
            Self::Nl => Europe::Amsterdam,
            Self::Ch => Europe::Zurich,
        }
    }

    /// Display name with the characters that are awkward in file names replaced.
    #[must_use]
    pub fn file_name_label(self) -> String {
        self.display_name().replace([' ', '&'], "_").replace(['(', ')'], "")
    }
}

impl Display for BiddingZone {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}
