//! # Temporal Module
//!
//! Timestamp handling for the organizational graph. All instants are
//! normalized to UTC. Transaction dates arrive as bare `YYYY-MM-DD` values
//! and are widened to midnight UTC before they are stored as relationship
//! start and end times, so every instant in the store carries the same
//! RFC 3339 `Z`-suffixed form.

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, UtcOffset};

/// A UTC instant with second precision.
///
/// Wire form is RFC 3339 with a `Z` suffix (`2024-01-01T00:00:00Z`), which is
/// the form the entity store persists for `startTime` and `endTime`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(OffsetDateTime);

impl Timestamp {
    /// Parse a bare `YYYY-MM-DD` date and widen it to midnight UTC.
    pub fn from_day(raw: &str) -> Result<Self> {
        let format = format_description!("[year]-[month]-[day]");
        let date = Date::parse(raw.trim(), &format)
            .map_err(|err| Error::invariant(format!("malformed date '{}': {}", raw.trim(), err)))?;
        Ok(Self(date.midnight().assume_utc()))
    }

    /// Parse a full RFC 3339 timestamp, normalizing to UTC.
    pub fn parse(raw: &str) -> Result<Self> {
        let parsed = OffsetDateTime::parse(raw.trim(), &Rfc3339).map_err(|err| {
            Error::invariant(format!("malformed timestamp '{}': {}", raw.trim(), err))
        })?;
        Ok(Self(parsed.to_offset(UtcOffset::UTC)))
    }

    /// Render in the store's wire form.
    pub fn to_rfc3339(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.format(&Rfc3339) {
            Ok(formatted) => f.write_str(&formatted),
            Err(_) => Err(fmt::Error),
        }
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Timestamp::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_widened_to_midnight_utc() {
        let ts = Timestamp::from_day("2024-01-01").unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-01-01T00:00:00Z");
    }

    #[test]
    fn test_day_parse_trims_whitespace() {
        let ts = Timestamp::from_day(" 2019-12-10 ").unwrap();
        assert_eq!(ts.to_rfc3339(), "2019-12-10T00:00:00Z");
    }

    #[test]
    fn test_malformed_date_rejected() {
        assert!(matches!(
            Timestamp::from_day("2024-13-40"),
            Err(Error::Invariant(_))
        ));
        assert!(matches!(
            Timestamp::from_day("not a date"),
            Err(Error::Invariant(_))
        ));
    }

    #[test]
    fn test_rfc3339_round_trip() {
        let ts = Timestamp::parse("2024-09-27T00:00:00Z").unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-09-27T00:00:00Z");
    }

    #[test]
    fn test_offset_normalized_to_utc() {
        let ts = Timestamp::parse("2024-01-01T05:30:00+05:30").unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-01-01T00:00:00Z");
    }

    #[test]
    fn test_ordering() {
        let earlier = Timestamp::from_day("2019-12-10").unwrap();
        let later = Timestamp::from_day("2024-01-01").unwrap();
        assert!(earlier < later);
    }
}
