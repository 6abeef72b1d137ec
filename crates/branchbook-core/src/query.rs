//! # Query Parameters
//!
//! Pagination, inclusive date ranges and report periods shared by every
//! list and report query.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{CoreError, ValidationError};
use crate::{DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};

// =============================================================================
// Pagination
// =============================================================================

/// A 0-based page request.
///
/// Endpoints that speak 1-based pages convert with [`PageRequest::one_based`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest {
            page: 0,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl PageRequest {
    /// Builds a request from optional query parameters, clamping bad values
    /// to the defaults the way list screens expect.
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        PageRequest {
            page: page.filter(|p| *p >= 0).unwrap_or(0),
            limit: limit
                .filter(|l| *l > 0)
                .map(|l| l.min(MAX_PAGE_LIMIT))
                .unwrap_or(DEFAULT_PAGE_LIMIT),
        }
    }

    /// Converts a 1-based page number.
    pub fn one_based(page: Option<i64>, limit: Option<i64>) -> Self {
        Self::new(page.map(|p| p - 1), limit)
    }

    pub fn offset(&self) -> i64 {
        self.page * self.limit
    }
}

/// One page of rows plus the size of the full filtered set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub rows: Vec<T>,
    pub total_count: i64,
}

/// One page of rows plus totals computed over the full filtered set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report<T, S> {
    pub rows: Vec<T>,
    pub total_count: i64,
    pub totals: S,
}

// =============================================================================
// Date Range
// =============================================================================

/// Inclusive `[start, end]` range of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ValidationError> {
        if end < start {
            return Err(ValidationError::invalid_format(
                "end_date",
                "must not be before start_date",
            ));
        }
        Ok(DateRange { start, end })
    }

    pub fn single(day: NaiveDate) -> Self {
        DateRange {
            start: day,
            end: day,
        }
    }

    /// Parses `YYYY-MM-DD` bounds; a missing bound defaults to `today`.
    pub fn parse(
        start: Option<&str>,
        end: Option<&str>,
        today: NaiveDate,
    ) -> Result<Self, ValidationError> {
        let start = match start.filter(|s| !s.trim().is_empty()) {
            Some(s) => parse_date("start_date", s)?,
            None => today,
        };
        let end = match end.filter(|s| !s.trim().is_empty()) {
            Some(s) => parse_date("end_date", s)?,
            None => today,
        };
        Self::new(start, end)
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }
}

/// Parses a `YYYY-MM-DD` date.
pub fn parse_date(field: &str, value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| ValidationError::invalid_format(field, "expected YYYY-MM-DD"))
}

// =============================================================================
// Report Period
// =============================================================================

/// Bucketing / window selector for overview and progress reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportPeriod {
    Daily,
    Weekly,
    Monthly,
    Yearly,
    All,
}

impl ReportPeriod {
    /// The window containing `reference`.
    ///
    /// Weeks start on Sunday. `All` spans from the earliest representable
    /// date to `reference`.
    pub fn window(&self, reference: NaiveDate) -> DateRange {
        match self {
            ReportPeriod::Daily => DateRange::single(reference),
            ReportPeriod::Weekly => {
                let back = reference.weekday().num_days_from_sunday() as i64;
                let start = reference - Duration::days(back);
                DateRange {
                    start,
                    end: start + Duration::days(6),
                }
            }
            ReportPeriod::Monthly => {
                let start = reference.with_day(1).unwrap_or(reference);
                let next_month = if reference.month() == 12 {
                    NaiveDate::from_ymd_opt(reference.year() + 1, 1, 1)
                } else {
                    NaiveDate::from_ymd_opt(reference.year(), reference.month() + 1, 1)
                };
                let end = next_month
                    .and_then(|d| d.pred_opt())
                    .unwrap_or(reference);
                DateRange { start, end }
            }
            ReportPeriod::Yearly => DateRange {
                start: NaiveDate::from_ymd_opt(reference.year(), 1, 1).unwrap_or(reference),
                end: NaiveDate::from_ymd_opt(reference.year(), 12, 31).unwrap_or(reference),
            },
            ReportPeriod::All => DateRange {
                start: NaiveDate::from_ymd_opt(1, 1, 1).unwrap_or(NaiveDate::MIN),
                end: reference,
            },
        }
    }

    /// SQLite `strftime` pattern that buckets a date column by this period.
    pub fn bucket_format(&self) -> &'static str {
        match self {
            ReportPeriod::Daily => "%Y-%m-%d",
            ReportPeriod::Weekly => "%Y-W%W",
            ReportPeriod::Monthly => "%Y-%m",
            ReportPeriod::Yearly => "%Y",
            ReportPeriod::All => "all",
        }
    }
}

impl FromStr for ReportPeriod {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(ReportPeriod::Daily),
            "weekly" => Ok(ReportPeriod::Weekly),
            "monthly" => Ok(ReportPeriod::Monthly),
            "yearly" => Ok(ReportPeriod::Yearly),
            "all" => Ok(ReportPeriod::All),
            other => Err(CoreError::InvalidReportType(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_page_request_defaults_and_clamps() {
        assert_eq!(PageRequest::new(None, None), PageRequest::default());
        let p = PageRequest::new(Some(-3), Some(0));
        assert_eq!(p.page, 0);
        assert_eq!(p.limit, DEFAULT_PAGE_LIMIT);
        assert_eq!(PageRequest::new(Some(2), Some(25)).offset(), 50);
        assert_eq!(PageRequest::one_based(Some(1), Some(10)).offset(), 0);
    }

    #[test]
    fn test_parse_range() {
        let today = d(2025, 3, 14);
        let range = DateRange::parse(Some("2025-03-01"), None, today).unwrap();
        assert_eq!(range.start, d(2025, 3, 1));
        assert_eq!(range.end, today);

        assert!(DateRange::parse(Some("03/01/2025"), None, today).is_err());
        assert!(DateRange::parse(Some("2025-03-15"), Some("2025-03-14"), today).is_err());
    }

    #[test]
    fn test_weekly_window_starts_sunday() {
        // 2025-03-14 is a Friday
        let w = ReportPeriod::Weekly.window(d(2025, 3, 14));
        assert_eq!(w.start, d(2025, 3, 9));
        assert_eq!(w.end, d(2025, 3, 15));
    }

    #[test]
    fn test_monthly_window_handles_december() {
        let w = ReportPeriod::Monthly.window(d(2024, 12, 20));
        assert_eq!(w.start, d(2024, 12, 1));
        assert_eq!(w.end, d(2024, 12, 31));

        let feb = ReportPeriod::Monthly.window(d(2024, 2, 10));
        assert_eq!(feb.end, d(2024, 2, 29));
    }

    #[test]
    fn test_period_parse() {
        assert_eq!("Monthly".parse::<ReportPeriod>().unwrap(), ReportPeriod::Monthly);
        assert!(matches!(
            "hourly".parse::<ReportPeriod>(),
            Err(CoreError::InvalidReportType(_))
        ));
    }
}
