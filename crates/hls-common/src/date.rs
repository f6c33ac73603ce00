//! Acquisition dates expressed as year and day-of-year.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{HlsError, HlsResult};

/// Last ordinal day of a leap year.
pub const MAX_DAY_OF_YEAR: u32 = 366;

const MIN_YEAR: i32 = 1000;
const MAX_YEAR: i32 = 9999;

/// Format an ordinal day as the three-digit, zero-padded key component.
///
/// ```
/// use hls_common::format_day_of_year;
///
/// assert_eq!(format_day_of_year(1).unwrap(), "001");
/// assert_eq!(format_day_of_year(366).unwrap(), "366");
/// assert!(format_day_of_year(0).is_err());
/// ```
pub fn format_day_of_year(day_of_year: u32) -> HlsResult<String> {
    validate_day(day_of_year)?;
    Ok(format!("{:03}", day_of_year))
}

fn validate_day(day_of_year: u32) -> HlsResult<()> {
    if !(1..=MAX_DAY_OF_YEAR).contains(&day_of_year) {
        return Err(HlsError::invalid(
            "day_of_year",
            format!("{} is outside 1..={}", day_of_year, MAX_DAY_OF_YEAR),
        ));
    }
    Ok(())
}

fn validate_year(year: i32) -> HlsResult<()> {
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return Err(HlsError::invalid(
            "year",
            format!("{} is not a 4-digit year", year),
        ));
    }
    Ok(())
}

/// Date of an HLS acquisition as used in object names (`YYYYDDD`).
///
/// Day 366 is accepted for every year: key building only formats numbers,
/// it does not check the calendar. Use [`AcquisitionDate::to_naive_date`]
/// when a real calendar date is needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AcquisitionDate {
    year: i32,
    day_of_year: u32,
}

impl AcquisitionDate {
    pub fn new(year: i32, day_of_year: u32) -> HlsResult<Self> {
        validate_year(year)?;
        validate_day(day_of_year)?;
        Ok(Self { year, day_of_year })
    }

    /// Build from the string components of a key: a 4-digit year and a
    /// 1-3 digit day number (`"1"`, `"01"` and `"001"` are equivalent).
    pub fn parse_parts(year: &str, day_of_year: &str) -> HlsResult<Self> {
        if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
            return Err(HlsError::invalid(
                "year",
                format!("'{}' is not a 4-digit year", year),
            ));
        }
        if day_of_year.is_empty()
            || day_of_year.len() > 3
            || !day_of_year.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(HlsError::invalid(
                "day_of_year",
                format!("'{}' is not a day number", day_of_year),
            ));
        }

        // Both strings are short digit runs, so parsing cannot overflow
        let year: i32 = year
            .parse()
            .map_err(|_| HlsError::invalid("year", year.to_string()))?;
        let day: u32 = day_of_year
            .parse()
            .map_err(|_| HlsError::invalid("day_of_year", day_of_year.to_string()))?;

        Self::new(year, day)
    }

    pub fn from_naive_date(date: NaiveDate) -> HlsResult<Self> {
        Self::new(date.year(), date.ordinal())
    }

    /// Calendar date, or `None` for day 366 of a non-leap year.
    pub fn to_naive_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_yo_opt(self.year, self.day_of_year)
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn day_of_year(&self) -> u32 {
        self.day_of_year
    }

    /// The following day number within the same year, `None` after day 366.
    pub fn next_day(&self) -> Option<Self> {
        if self.day_of_year >= MAX_DAY_OF_YEAR {
            return None;
        }
        Some(Self {
            year: self.year,
            day_of_year: self.day_of_year + 1,
        })
    }

    pub fn year_str(&self) -> String {
        format!("{:04}", self.year)
    }

    pub fn day_str(&self) -> String {
        format!("{:03}", self.day_of_year)
    }
}

impl fmt::Display for AcquisitionDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}{:03}", self.year, self.day_of_year)
    }
}

impl FromStr for AcquisitionDate {
    type Err = HlsError;

    /// Parse the 7-digit `YYYYDDD` form used in object names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 7 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(HlsError::invalid(
                "date",
                format!("'{}' is not in YYYYDDD form", s),
            ));
        }
        Self::parse_parts(&s[..4], &s[4..])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_day_of_year() {
        assert_eq!(format_day_of_year(1).unwrap(), "001");
        assert_eq!(format_day_of_year(42).unwrap(), "042");
        assert_eq!(format_day_of_year(366).unwrap(), "366");
        assert!(matches!(
            format_day_of_year(0),
            Err(HlsError::InvalidArgument { .. })
        ));
        assert!(matches!(
            format_day_of_year(367),
            Err(HlsError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_parse_parts() {
        let date = AcquisitionDate::parse_parts("2019", "001").unwrap();
        assert_eq!(date.year(), 2019);
        assert_eq!(date.day_of_year(), 1);
        assert_eq!(AcquisitionDate::parse_parts("2019", "1").unwrap(), date);

        assert!(AcquisitionDate::parse_parts("19", "001").is_err());
        assert!(AcquisitionDate::parse_parts("2019", "").is_err());
        assert!(AcquisitionDate::parse_parts("2019", "0001").is_err());
        assert!(AcquisitionDate::parse_parts("2019", "000").is_err());
        assert!(AcquisitionDate::parse_parts("2019", "367").is_err());
        assert!(AcquisitionDate::parse_parts("20a9", "001").is_err());
    }

    #[test]
    fn test_display_and_parse() {
        let date = AcquisitionDate::new(2019, 5).unwrap();
        assert_eq!(date.to_string(), "2019005");
        assert_eq!("2019005".parse::<AcquisitionDate>().unwrap(), date);
        assert!("201905".parse::<AcquisitionDate>().is_err());
    }

    #[test]
    fn test_next_day_stops_after_366() {
        let date = AcquisitionDate::new(2020, 365).unwrap();
        let last = date.next_day().unwrap();
        assert_eq!(last.day_of_year(), 366);
        assert!(last.next_day().is_none());
    }

    #[test]
    fn test_naive_date_conversion() {
        let date = NaiveDate::from_ymd_opt(2019, 2, 1).unwrap();
        let acq = AcquisitionDate::from_naive_date(date).unwrap();
        assert_eq!(acq.to_string(), "2019032");
        assert_eq!(acq.to_naive_date(), Some(date));

        // 2019 is not a leap year
        let day_366 = AcquisitionDate::new(2019, 366).unwrap();
        assert!(day_366.to_naive_date().is_none());
        assert!(AcquisitionDate::new(2020, 366)
            .unwrap()
            .to_naive_date()
            .is_some());
    }
}
