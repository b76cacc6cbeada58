// src/analytics/computus.rs
//! Date of Easter and the distribution of Shrove Tuesday
//!
//! # Computus
//!
//! Gregorian Easter by integer arithmetic only (no tables):
//! ```text
//! a = Y mod 19          b = Y >> 2
//! c = b / 25 + 1        d = (3c) >> 2
//! e = (19a - (8c + 5)/25 + d + 15) mod 30
//! e += (29578 - a - 32e) >> 10
//! e -= (Y mod 7 + b - d + e + 2) mod 7
//! month = 3 + (e >> 5), day = e - 31(e >> 5)
//! ```
//! Shrove Tuesday (Pancake Day) falls 47 days before Easter Sunday.

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

use crate::error::{DrawError, DrawResult};
use crate::math_utils::percentage;

pub const FIRST_GREGORIAN_YEAR: i32 = 1583;
pub const LAST_SUPPORTED_YEAR: i32 = 9999;

fn check_year(year: i32) -> DrawResult<()> {
    if !(FIRST_GREGORIAN_YEAR..=LAST_SUPPORTED_YEAR).contains(&year) {
        return Err(DrawError::InvalidParameters {
            parameter: "year".to_string(),
            value: year as f64,
            constraint: format!(
                "must be in range [{}, {}]",
                FIRST_GREGORIAN_YEAR, LAST_SUPPORTED_YEAR
            ),
        });
    }
    Ok(())
}

pub fn easter(year: i32) -> DrawResult<NaiveDate> {
    check_year(year)?;
    let a = year % 19;
    let b = year >> 2;
    let c = b / 25 + 1;
    let mut d = (c * 3) >> 2;
    let mut e = ((a * 19) - ((c * 8 + 5) / 25) + d + 15) % 30;
    e += (29578 - a - e * 32) >> 10;
    e -= ((year % 7) + b - d + e + 2) % 7;
    d = e >> 5;
    let day = e - d * 31;
    let month = d + 3;

    NaiveDate::from_ymd_opt(year, month as u32, day as u32).ok_or_else(|| {
        DrawError::InvalidParameters {
            parameter: "year".to_string(),
            value: year as f64,
            constraint: format!("computus produced an invalid date {}-{}", month, day),
        }
    })
}

pub fn shrove_tuesday(year: i32) -> DrawResult<NaiveDate> {
    Ok(easter(year)? - Duration::days(47))
}

/// Share of years in which Shrove Tuesday fell on one calendar day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayShare {
    pub month: u32,
    pub day: u32,
    pub count: usize,
    pub percent: f64,
}

impl DayShare {
    pub fn label(&self) -> String {
        let month = match self.month {
            2 => "Feb",
            3 => "Mar",
            _ => "???",
        };
        format!("{} {:02}", month, self.day)
    }
}

/// Shrove Tuesday histogram over `first..=last`.
///
/// Covers every calendar day from the earliest to the latest observed date,
/// with zero counts included; Feb 29 is its own bucket.
pub fn shrove_tuesday_distribution(first: i32, last: i32) -> DrawResult<Vec<DayShare>> {
    if last < first {
        return Err(DrawError::InvalidConfiguration {
            field: "years".to_string(),
            reason: format!("last year {} precedes first year {}", last, first),
        });
    }

    // Index by ordinal in a leap year so Feb 29 keeps a slot.
    let mut counts = [0usize; 366];
    for year in first..=last {
        let date = shrove_tuesday(year)?;
        counts[leap_ordinal(date.month(), date.day())] += 1;
    }

    let total = (last - first + 1) as usize;
    let lo = counts.iter().position(|&c| c > 0).unwrap_or(0);
    let hi = counts.iter().rposition(|&c| c > 0).unwrap_or(0);

    Ok((lo..=hi)
        .filter_map(|ordinal| {
            let date = NaiveDate::from_yo_opt(2000, ordinal as u32 + 1)?;
            Some(DayShare {
                month: date.month(),
                day: date.day(),
                count: counts[ordinal],
                percent: percentage(counts[ordinal] as u64, total),
            })
        })
        .collect())
}

fn leap_ordinal(month: u32, day: u32) -> usize {
    NaiveDate::from_ymd_opt(2000, month, day)
        .map(|d| d.ordinal0() as usize)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_known_easters() {
        assert_eq!(easter(2024).unwrap(), ymd(2024, 3, 31));
        assert_eq!(easter(2025).unwrap(), ymd(2025, 4, 20));
        assert_eq!(easter(2000).unwrap(), ymd(2000, 4, 23));
        assert_eq!(easter(1900).unwrap(), ymd(1900, 4, 15));
        assert_eq!(easter(1583).unwrap(), ymd(1583, 4, 10));
    }

    #[test]
    fn test_shrove_tuesday_is_a_tuesday() {
        for year in [1900, 1999, 2017, 2024, 2100, 5000] {
            let date = shrove_tuesday(year).unwrap();
            assert_eq!(date.weekday(), chrono::Weekday::Tue, "year {}", year);
        }
        assert_eq!(shrove_tuesday(2017).unwrap(), ymd(2017, 2, 28));
    }

    #[test]
    fn test_out_of_range_year() {
        assert!(easter(1582).is_err());
        assert!(easter(10_000).is_err());
    }

    #[test]
    fn test_distribution_bounds() {
        let dist = shrove_tuesday_distribution(1900, 9999).unwrap();
        let first = dist.first().unwrap();
        let last = dist.last().unwrap();
        assert_eq!((first.month, first.day), (2, 3));
        assert_eq!((last.month, last.day), (3, 9));
        assert_eq!(first.label(), "Feb 03");

        let total: usize = dist.iter().map(|d| d.count).sum();
        assert_eq!(total, 8100);
        let pct: f64 = dist.iter().map(|d| d.percent).sum();
        assert!((pct - 100.0).abs() < 1e-9);

        let leap_day = dist.iter().find(|d| d.month == 2 && d.day == 29).unwrap();
        assert_eq!(leap_day.count, 66);
    }

    #[test]
    fn test_reversed_range() {
        assert!(shrove_tuesday_distribution(2000, 1999).is_err());
    }
}
