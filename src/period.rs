use crate::error::{EmissionsError, Result};
use chrono::{Datelike, Days, NaiveDate};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An inclusive date range, typically one billing or reporting period.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
pub struct Period {
    #[schemars(description = "First day of the period (inclusive), YYYY-MM-DD")]
    start: NaiveDate,

    #[schemars(description = "Last day of the period (inclusive), YYYY-MM-DD")]
    end: NaiveDate,
}

impl Period {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end < start {
            return Err(EmissionsError::InvalidPeriod(format!(
                "end date {} is before start date {}",
                end, start
            )));
        }
        Ok(Self { start, end })
    }

    /// The full calendar month `year`-`month`.
    pub fn calendar_month(year: i32, month: u32) -> Result<Self> {
        let start = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
            EmissionsError::InvalidPeriod(format!("no such month: {:04}-{:02}", year, month))
        })?;
        Ok(Self {
            start,
            end: last_day_of_month(year, month),
        })
    }

    /// Parses "YYYY-MM" (a single month) or "YYYY-MM:YYYY-MM" (a month range).
    pub fn parse(period: &str) -> Result<Self> {
        let parts: Vec<&str> = period.split(':').collect();

        match parts.len() {
            1 => {
                let start = parse_month_start(parts[0])?;
                Ok(Self {
                    start,
                    end: last_day_of_month(start.year(), start.month()),
                })
            }
            2 => {
                let start = parse_month_start(parts[0])?;
                let end_ref = parse_month_start(parts[1])?;
                Self::new(start, last_day_of_month(end_ref.year(), end_ref.month()))
            }
            _ => Err(EmissionsError::InvalidPeriod(format!(
                "'{}' does not match 'YYYY-MM' or 'YYYY-MM:YYYY-MM'",
                period
            ))),
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Whether `other` falls entirely within this period (inclusive bounds).
    pub fn contains_period(&self, other: &Period) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// True when the period starts on the first day of a month and ends on
    /// the last day of a month.
    pub fn is_month_aligned(&self) -> bool {
        self.start.day() == 1 && self.end == last_day_of_month(self.end.year(), self.end.month())
    }

    /// The immediately preceding period of equal length.
    ///
    /// Month-aligned periods step back in whole months (the prior calendar
    /// month for a month, the prior quarter for a quarter), so month-length
    /// differences do not skew comparisons. Anything else shifts back by the
    /// exact day length.
    pub fn preceding(&self) -> Period {
        let prev_end = self
            .start
            .checked_sub_days(Days::new(1))
            .expect("period start underflow");

        if self.is_month_aligned() {
            let months = months_between(self.start, self.end) + 1;
            let mut year = prev_end.year();
            let mut month = prev_end.month() as i32 - (months - 1);
            while month < 1 {
                month += 12;
                year -= 1;
            }
            let prev_start = NaiveDate::from_ymd_opt(year, month as u32, 1)
                .expect("month arithmetic out of range");
            Period {
                start: prev_start,
                end: prev_end,
            }
        } else {
            let len = (self.end - self.start).num_days() as u64;
            let prev_start = prev_end
                .checked_sub_days(Days::new(len))
                .expect("period start underflow");
            Period {
                start: prev_start,
                end: prev_end,
            }
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_month_aligned() {
            if self.start.year() == self.end.year() && self.start.month() == self.end.month() {
                write!(f, "{}", self.start.format("%Y-%m"))
            } else {
                write!(
                    f,
                    "{}:{}",
                    self.start.format("%Y-%m"),
                    self.end.format("%Y-%m")
                )
            }
        } else {
            write!(f, "{}:{}", self.start, self.end)
        }
    }
}

fn parse_month_start(raw: &str) -> Result<NaiveDate> {
    let padded = format!("{}-01", raw.trim());
    NaiveDate::parse_from_str(&padded, "%Y-%m-%d").map_err(|_| {
        EmissionsError::InvalidPeriod(format!("'{}' does not match 'YYYY-MM'", raw))
    })
}

pub fn last_day_of_month(year: i32, month: u32) -> NaiveDate {
    let next_month = if month == 12 { 1 } else { month + 1 };
    let next_year = if month == 12 { year + 1 } else { year };

    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .unwrap()
        .checked_sub_days(Days::new(1))
        .unwrap()
}

pub fn months_between(start: NaiveDate, end: NaiveDate) -> i32 {
    let year_diff = end.year() - start.year();
    let month_diff = end.month() as i32 - start.month() as i32;
    year_diff * 12 + month_diff
}
