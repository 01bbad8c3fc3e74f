#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Fire incident severity codes and calendar month definitions.
//!
//! Both types are closed enumerations. Chart payloads are keyed by them, so
//! every key that reaches the front end is one of a fixed, validated set.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strum_macros::{AsRefStr, Display, EnumString};

/// Severity level of a fire incident.
///
/// Stored and serialized as its numeric code (1-3). The `Display` form is
/// the human-readable label shown on list pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString, AsRefStr)]
pub enum FireSeverity {
    /// Level 1: contained, minor damage
    #[strum(serialize = "Minor Fire")]
    Minor = 1,
    /// Level 2: moderate spread or damage
    #[strum(serialize = "Moderate Fire")]
    Moderate = 2,
    /// Level 3: major fire
    #[strum(serialize = "Major Fire")]
    Major = 3,
}

impl FireSeverity {
    /// All severity levels in ascending order.
    pub const ALL: [Self; 3] = [Self::Minor, Self::Moderate, Self::Major];

    /// Returns the numeric code of this severity level.
    #[must_use]
    pub const fn value(self) -> u8 {
        self as u8
    }

    /// Returns the numeric code rendered as text, as used for chart keys.
    #[must_use]
    pub fn code(self) -> String {
        self.value().to_string()
    }

    /// Creates a severity level from its numeric code.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not in the range 1-3.
    pub const fn from_value(value: u8) -> Result<Self, InvalidSeverityError> {
        match value {
            1 => Ok(Self::Minor),
            2 => Ok(Self::Moderate),
            3 => Ok(Self::Major),
            _ => Err(InvalidSeverityError {
                value: value as i64,
            }),
        }
    }

    /// Creates a severity level from a wide integer, as read from the
    /// database.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not in the range 1-3.
    pub fn from_i64(value: i64) -> Result<Self, InvalidSeverityError> {
        u8::try_from(value)
            .map_err(|_| InvalidSeverityError { value })
            .and_then(Self::from_value)
    }
}

impl Serialize for FireSeverity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.value())
    }
}

impl<'de> Deserialize<'de> for FireSeverity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = i64::deserialize(deserializer)?;
        Self::from_i64(value).map_err(serde::de::Error::custom)
    }
}

/// Error returned when a numeric code is not a valid [`FireSeverity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidSeverityError {
    /// The rejected value.
    pub value: i64,
}

impl std::fmt::Display for InvalidSeverityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid severity value {}: expected 1-3", self.value)
    }
}

impl std::error::Error for InvalidSeverityError {}

/// A calendar month.
///
/// `Display`/`AsRef<str>` give the English three-letter abbreviation;
/// [`Month::code`] gives the zero-padded two-digit number used by
/// `strftime('%m', ...)`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum Month {
    Jan = 1,
    Feb = 2,
    Mar = 3,
    Apr = 4,
    May = 5,
    Jun = 6,
    Jul = 7,
    Aug = 8,
    Sep = 9,
    Oct = 10,
    Nov = 11,
    Dec = 12,
}

impl Month {
    /// All twelve months in calendar order.
    pub const ALL: [Self; 12] = [
        Self::Jan,
        Self::Feb,
        Self::Mar,
        Self::Apr,
        Self::May,
        Self::Jun,
        Self::Jul,
        Self::Aug,
        Self::Sep,
        Self::Oct,
        Self::Nov,
        Self::Dec,
    ];

    /// Zero-based position in [`Month::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize - 1
    }

    /// Three-letter English abbreviation (`"Jan"`).
    #[must_use]
    pub fn abbreviation(self) -> &'static str {
        Self::ABBREVIATIONS[self.index()]
    }

    /// Two-digit month code (`"01"`).
    #[must_use]
    pub const fn code(self) -> &'static str {
        Self::CODES[self.index()]
    }

    /// Parses a two-digit month code such as `"02"`.
    ///
    /// # Errors
    ///
    /// Returns an error if `code` is not one of `"01"`..`"12"`.
    pub fn from_code(code: &str) -> Result<Self, InvalidMonthError> {
        Self::CODES
            .iter()
            .position(|c| *c == code)
            .map(|idx| Self::ALL[idx])
            .ok_or_else(|| InvalidMonthError {
                value: code.to_string(),
            })
    }

    const ABBREVIATIONS: [&'static str; 12] = [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ];

    const CODES: [&'static str; 12] = [
        "01", "02", "03", "04", "05", "06", "07", "08", "09", "10", "11", "12",
    ];
}

/// Error returned when a value does not name a calendar month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidMonthError {
    /// The rejected value.
    pub value: String,
}

impl std::fmt::Display for InvalidMonthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid month '{}': expected 01-12", self.value)
    }
}

impl std::error::Error for InvalidMonthError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_from_value_roundtrip() {
        for v in 1..=3u8 {
            let severity = FireSeverity::from_value(v).unwrap();
            assert_eq!(severity.value(), v);
        }
        assert!(FireSeverity::from_value(0).is_err());
        assert!(FireSeverity::from_value(4).is_err());
        assert!(FireSeverity::from_i64(-1).is_err());
        assert!(FireSeverity::from_i64(300).is_err());
    }

    #[test]
    fn severity_serializes_as_number() {
        let json = serde_json::to_string(&FireSeverity::Major).unwrap();
        assert_eq!(json, "3");
        let parsed: FireSeverity = serde_json::from_str("2").unwrap();
        assert_eq!(parsed, FireSeverity::Moderate);
        assert!(serde_json::from_str::<FireSeverity>("7").is_err());
    }

    #[test]
    fn severity_labels() {
        assert_eq!(FireSeverity::Minor.to_string(), "Minor Fire");
        assert_eq!("Major Fire".parse::<FireSeverity>().unwrap(), FireSeverity::Major);
        assert_eq!(FireSeverity::Moderate.code(), "2");
    }

    #[test]
    fn month_codes_and_abbreviations_line_up() {
        for (idx, month) in Month::ALL.iter().enumerate() {
            assert_eq!(month.index(), idx);
            assert_eq!(month.abbreviation(), month.to_string());
            assert_eq!(Month::from_code(month.code()).unwrap(), *month);
        }
        assert_eq!(Month::Feb.code(), "02");
        assert_eq!(Month::Dec.abbreviation(), "Dec");
    }

    #[test]
    fn month_rejects_out_of_range() {
        assert!(Month::from_code("00").is_err());
        assert!(Month::from_code("2").is_err());
        assert!(Month::from_code("13").is_err());
        assert!(Month::from_code("").is_err());
    }
}
