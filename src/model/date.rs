// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Glossa and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use thiserror::Error;

/// A calendar date with year, month or day precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DateRepresentation {
    year: i32,
    month: Option<u32>,
    day: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePrecision {
    Year,
    Month,
    Day,
}

impl DateRepresentation {
    pub fn year(year: i32) -> Self {
        Self { year, month: None, day: None }
    }

    pub fn month(year: i32, month: u32) -> Result<Self, ParseDateError> {
        if !(1..=12).contains(&month) {
            return Err(ParseDateError::MonthOutOfRange(month));
        }
        Ok(Self { year, month: Some(month), day: None })
    }

    pub fn day(year: i32, month: u32, day: u32) -> Result<Self, ParseDateError> {
        NaiveDate::from_ymd_opt(year, month, day)
            .ok_or(ParseDateError::NoSuchDay { year, month, day })?;
        Ok(Self { year, month: Some(month), day: Some(day) })
    }

    pub fn year_value(&self) -> i32 {
        self.year
    }

    pub fn month_value(&self) -> Option<u32> {
        self.month
    }

    pub fn day_value(&self) -> Option<u32> {
        self.day
    }

    pub fn precision(&self) -> DatePrecision {
        match (self.month, self.day) {
            (Some(_), Some(_)) => DatePrecision::Day,
            (Some(_), None) => DatePrecision::Month,
            _ => DatePrecision::Year,
        }
    }

    pub fn parse(input: &str) -> Result<Self, ParseDateError> {
        let input = input.trim();
        let mut parts = input.splitn(3, '-');
        let year = parse_part(parts.next(), input)?;
        let month = parts.next().map(|raw| parse_part(Some(raw), input)).transpose()?;
        let day = parts.next().map(|raw| parse_part(Some(raw), input)).transpose()?;
        let year = i32::try_from(year).map_err(|_| ParseDateError::Malformed(input.to_owned()))?;
        match (month, day) {
            (None, _) => Ok(Self::year(year)),
            (Some(month), None) => Self::month(year, month),
            (Some(month), Some(day)) => Self::day(year, month, day),
        }
    }
}

fn parse_part(raw: Option<&str>, input: &str) -> Result<u32, ParseDateError> {
    raw.filter(|raw| !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|raw| raw.parse::<u32>().ok())
        .ok_or_else(|| ParseDateError::Malformed(input.to_owned()))
}

impl fmt::Display for DateRepresentation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}", self.year)?;
        if let Some(month) = self.month {
            write!(f, "-{month:02}")?;
        }
        if let Some(day) = self.day {
            write!(f, "-{day:02}")?;
        }
        Ok(())
    }
}

impl FromStr for DateRepresentation {
    type Err = ParseDateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseDateError {
    #[error("date must look like YYYY, YYYY-MM or YYYY-MM-DD, got '{0}'")]
    Malformed(String),
    #[error("month {0} is out of range")]
    MonthOutOfRange(u32),
    #[error("{year:04}-{month:02}-{day:02} is not a calendar day")]
    NoSuchDay { year: i32, month: u32, day: u32 },
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{DatePrecision, DateRepresentation, ParseDateError};

    #[rstest]
    #[case("1848", DatePrecision::Year)]
    #[case("1848-02", DatePrecision::Month)]
    #[case("1848-02-21", DatePrecision::Day)]
    fn parses_each_precision(#[case] input: &str, #[case] precision: DatePrecision) {
        let date = DateRepresentation::parse(input).expect("date");
        assert_eq!(date.precision(), precision);
        assert_eq!(date.to_string(), input);
    }

    #[test]
    fn pads_short_components() {
        let date = DateRepresentation::day(812, 3, 4).expect("date");
        assert_eq!(date.to_string(), "0812-03-04");
    }

    #[rstest]
    #[case("", ParseDateError::Malformed(String::new()))]
    #[case("18x8", ParseDateError::Malformed("18x8".to_owned()))]
    #[case("1848-13", ParseDateError::MonthOutOfRange(13))]
    #[case("1900-02-29", ParseDateError::NoSuchDay { year: 1900, month: 2, day: 29 })]
    fn rejects_invalid_dates(#[case] input: &str, #[case] expected: ParseDateError) {
        assert_eq!(DateRepresentation::parse(input), Err(expected));
    }
}
