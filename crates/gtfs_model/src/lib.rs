use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

mod entities;
mod enums;

pub use entities::*;
pub use enums::*;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GtfsParseError {
    #[error("invalid date format: {0}")]
    InvalidDateFormat(String),
    #[error("invalid date value: {0}")]
    InvalidDateValue(String),
    #[error("invalid time format: {0}")]
    InvalidTimeFormat(String),
    #[error("invalid time value: {0}")]
    InvalidTimeValue(String),
    #[error("invalid number: {0}")]
    InvalidNumber(String),
    #[error("{axis} out of range: {value}")]
    CoordinateOutOfRange { axis: &'static str, value: f64 },
    #[error("invalid {type_name} code: {value}")]
    InvalidEnumCode {
        type_name: &'static str,
        value: String,
    },
}

/// Service-day time of a GTFS `Time` field.
///
/// Hours may exceed 23 to express trips running past midnight (`28:41:30`).
/// An empty field yields a time that is not provided, which is distinct from
/// `00:00:00`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct GtfsTime {
    hours: u16,
    minutes: u16,
    seconds: u16,
    provided: bool,
}

impl GtfsTime {
    pub const NOT_PROVIDED: GtfsTime = GtfsTime {
        hours: 0,
        minutes: 0,
        seconds: 0,
        provided: false,
    };

    /// Parses `H:MM:SS` or `HH:MM:SS`.
    ///
    /// Minutes and seconds are accepted up to and including 60. That bound is
    /// kept for compatibility with existing feeds.
    pub fn parse(value: &str) -> Result<Self, GtfsParseError> {
        if value.is_empty() {
            return Ok(Self::NOT_PROVIDED);
        }

        let bytes = value.as_bytes();
        let len = bytes.len();
        if !value.is_ascii()
            || !(len == 7 || len == 8)
            || bytes[len - 3] != b':'
            || bytes[len - 6] != b':'
        {
            return Err(GtfsParseError::InvalidTimeFormat(value.to_string()));
        }

        let invalid = || GtfsParseError::InvalidTimeFormat(value.to_string());
        let hours = parse_digits(&value[..len - 6]).ok_or_else(invalid)?;
        let minutes = parse_digits(&value[len - 5..len - 3]).ok_or_else(invalid)?;
        let seconds = parse_digits(&value[len - 2..]).ok_or_else(invalid)?;

        Self::from_hms(hours, minutes, seconds)
            .map_err(|_| GtfsParseError::InvalidTimeValue(value.to_string()))
    }

    pub fn from_hms(hours: u16, minutes: u16, seconds: u16) -> Result<Self, GtfsParseError> {
        if minutes > 60 || seconds > 60 {
            return Err(GtfsParseError::InvalidTimeValue(format!(
                "{} minutes, {} seconds",
                minutes, seconds
            )));
        }
        Ok(Self {
            hours,
            minutes,
            seconds,
            provided: true,
        })
    }

    pub fn is_provided(&self) -> bool {
        self.provided
    }

    pub fn total_seconds(&self) -> u32 {
        self.hours as u32 * 3600 + self.minutes as u32 * 60 + self.seconds as u32
    }

    pub fn hours(&self) -> u16 {
        self.hours
    }

    pub fn minutes(&self) -> u16 {
        self.minutes
    }

    pub fn seconds(&self) -> u16 {
        self.seconds
    }

    pub fn hh_mm_ss(&self) -> (u16, u16, u16) {
        (self.hours, self.minutes, self.seconds)
    }

    /// Folds hours past midnight back into a 24 hour clock.
    ///
    /// Returns `true` when the hours were changed.
    pub fn reduce_to_24h(&mut self) -> bool {
        if self.hours < 24 {
            return false;
        }
        self.hours %= 24;
        true
    }
}

impl fmt::Display for GtfsTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.provided {
            return Ok(());
        }
        write!(
            f,
            "{:02}:{:02}:{:02}",
            self.hours, self.minutes, self.seconds
        )
    }
}

impl Serialize for GtfsTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for GtfsTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct GtfsTimeVisitor;

        impl<'de> Visitor<'de> for GtfsTimeVisitor {
            type Value = GtfsTime;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a GTFS time in [H]H:MM:SS format")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<GtfsTime, E> {
                GtfsTime::parse(value).map_err(E::custom)
            }
        }

        deserializer.deserialize_str(GtfsTimeVisitor)
    }
}

/// Service date of a GTFS `Date` field (`YYYYMMDD`).
///
/// Ordering follows the calendar; dates that were not provided sort first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct GtfsDate {
    provided: bool,
    year: u16,
    month: u8,
    day: u8,
}

impl GtfsDate {
    pub const NOT_PROVIDED: GtfsDate = GtfsDate {
        provided: false,
        year: 0,
        month: 0,
        day: 0,
    };

    pub fn parse(value: &str) -> Result<Self, GtfsParseError> {
        if value.is_empty() {
            return Ok(Self::NOT_PROVIDED);
        }
        if value.len() != 8 || !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(GtfsParseError::InvalidDateFormat(value.to_string()));
        }

        let invalid = || GtfsParseError::InvalidDateFormat(value.to_string());
        let year = parse_digits(&value[0..4]).ok_or_else(invalid)?;
        let month = parse_digits(&value[4..6]).ok_or_else(invalid)? as u8;
        let day = parse_digits(&value[6..8]).ok_or_else(invalid)? as u8;

        Self::from_ymd(year, month, day)
            .map_err(|_| GtfsParseError::InvalidDateValue(value.to_string()))
    }

    pub fn from_ymd(year: u16, month: u8, day: u8) -> Result<Self, GtfsParseError> {
        check_date(year, month, day)?;
        Ok(Self {
            provided: true,
            year,
            month,
            day,
        })
    }

    pub fn is_provided(&self) -> bool {
        self.provided
    }

    pub fn year(&self) -> u16 {
        self.year
    }

    pub fn month(&self) -> u8 {
        self.month
    }

    pub fn day(&self) -> u8 {
        self.day
    }

    pub fn ymd(&self) -> (u16, u8, u8) {
        (self.year, self.month, self.day)
    }

    pub fn to_naive_date(&self) -> Option<NaiveDate> {
        if !self.provided {
            return None;
        }
        NaiveDate::from_ymd_opt(self.year as i32, self.month as u32, self.day as u32)
    }
}

/// Fails for years outside the four-digit range a GTFS date can spell.
impl TryFrom<NaiveDate> for GtfsDate {
    type Error = GtfsParseError;

    fn try_from(date: NaiveDate) -> Result<Self, Self::Error> {
        let year = u16::try_from(date.year())
            .map_err(|_| GtfsParseError::InvalidDateValue(date.to_string()))?;
        // chrono keeps month in 1..=12 and day in 1..=31.
        Self::from_ymd(year, date.month() as u8, date.day() as u8)
    }
}

impl fmt::Display for GtfsDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.provided {
            return Ok(());
        }
        write!(f, "{:04}{:02}{:02}", self.year, self.month, self.day)
    }
}

impl Serialize for GtfsDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for GtfsDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct GtfsDateVisitor;

        impl<'de> Visitor<'de> for GtfsDateVisitor {
            type Value = GtfsDate;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a GTFS date in YYYYMMDD format")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<GtfsDate, E> {
                GtfsDate::parse(value).map_err(E::custom)
            }
        }

        deserializer.deserialize_str(GtfsDateVisitor)
    }
}

fn check_date(year: u16, month: u8, day: u8) -> Result<(), GtfsParseError> {
    if !(1000..=9999).contains(&year)
        || NaiveDate::from_ymd_opt(year as i32, month as u32, day as u32).is_none()
    {
        return Err(GtfsParseError::InvalidDateValue(format!(
            "{:04}{:02}{:02}",
            year, month, day
        )));
    }
    Ok(())
}

fn parse_digits(value: &str) -> Option<u16> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}

/// Parses a finite decimal number.
pub fn parse_decimal(value: &str) -> Result<f64, GtfsParseError> {
    match value.parse::<f64>() {
        Ok(number) if number.is_finite() => Ok(number),
        _ => Err(GtfsParseError::InvalidNumber(value.to_string())),
    }
}

/// Rejects coordinates that are not WGS84 decimal degrees.
pub fn check_coordinates(latitude: f64, longitude: f64) -> Result<(), GtfsParseError> {
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(GtfsParseError::CoordinateOutOfRange {
            axis: "latitude",
            value: latitude,
        });
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(GtfsParseError::CoordinateOutOfRange {
            axis: "longitude",
            value: longitude,
        });
    }
    Ok(())
}

pub fn parse_coordinates(latitude: &str, longitude: &str) -> Result<(f64, f64), GtfsParseError> {
    let latitude = parse_decimal(latitude)?;
    let longitude = parse_decimal(longitude)?;
    check_coordinates(latitude, longitude)?;
    Ok((latitude, longitude))
}
