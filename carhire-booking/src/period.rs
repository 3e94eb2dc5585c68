use chrono::{DateTime, NaiveDate};
use serde::Serialize;
use std::fmt;

/// A rental date range, half-open: `[pickup, return)`.
///
/// The return date is the first day the car is free again, so a booking
/// ending on the 5th and one starting on the 5th do not overlap.
///
/// Not `Deserialize`; values come from [`RentalPeriod::new`] or from stored bookings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RentalPeriod {
    pickup: NaiveDate,
    #[serde(rename = "return")]
    return_date: NaiveDate,
}

impl RentalPeriod {
    pub fn new(pickup: NaiveDate, return_date: NaiveDate) -> Result<Self, PeriodError> {
        if pickup >= return_date {
            return Err(PeriodError::Empty { pickup, return_date });
        }
        Ok(Self { pickup, return_date })
    }

    /// Parses the two dates as sent by a client: `YYYY-MM-DD`, or an RFC 3339
    /// timestamp whose calendar date is used.
    pub fn parse(pickup: &str, return_date: &str) -> Result<Self, PeriodError> {
        Self::new(parse_date(pickup)?, parse_date(return_date)?)
    }

    pub(crate) fn from_stored(pickup: NaiveDate, return_date: NaiveDate) -> Self {
        Self { pickup, return_date }
    }

    pub fn pickup(&self) -> NaiveDate {
        self.pickup
    }

    pub fn return_date(&self) -> NaiveDate {
        self.return_date
    }

    /// Number of rental days; always at least one.
    pub fn days(&self) -> i64 {
        (self.return_date - self.pickup).num_days()
    }

    pub fn overlaps(&self, other: &RentalPeriod) -> bool {
        self.pickup < other.return_date && self.return_date > other.pickup
    }

    /// Rejects ranges that start before `today`. The return date is always
    /// after the pickup, so checking the pickup covers both.
    pub fn ensure_not_past(&self, today: NaiveDate) -> Result<(), PeriodError> {
        if self.pickup < today {
            return Err(PeriodError::InThePast { pickup: self.pickup, today });
        }
        Ok(())
    }
}

impl fmt::Display for RentalPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.pickup, self.return_date)
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, PeriodError> {
    let trimmed = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(trimmed)
        .map(|ts| ts.date_naive())
        .map_err(|_| PeriodError::Unparseable(value.to_string()))
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PeriodError {
    #[error("'{0}' is not a valid date")]
    Unparseable(String),

    #[error("Return date {return_date} must be after pickup date {pickup}")]
    Empty {
        pickup: NaiveDate,
        return_date: NaiveDate,
    },

    #[error("Pickup date {pickup} is in the past (today is {today})")]
    InThePast {
        pickup: NaiveDate,
        today: NaiveDate,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn period(a: &str, b: &str) -> RentalPeriod {
        RentalPeriod::new(d(a), d(b)).unwrap()
    }

    #[test]
    fn test_return_date_is_exclusive() {
        let existing = period("2025-06-01", "2025-06-05");

        assert!(existing.overlaps(&period("2025-06-04", "2025-06-06")));
        assert!(!existing.overlaps(&period("2025-06-05", "2025-06-07")));
        assert!(!period("2025-05-28", "2025-06-01").overlaps(&existing));
        assert!(period("2025-05-28", "2025-06-02").overlaps(&existing));
    }

    #[test]
    fn test_overlap_is_symmetric_and_covers_containment() {
        let outer = period("2025-06-01", "2025-06-10");
        let inner = period("2025-06-03", "2025-06-04");
        assert!(outer.overlaps(&inner));
        assert!(inner.overlaps(&outer));
        assert!(outer.overlaps(&outer));
    }

    #[test]
    fn test_empty_and_inverted_ranges_are_rejected() {
        assert!(matches!(
            RentalPeriod::new(d("2025-06-05"), d("2025-06-05")),
            Err(PeriodError::Empty { .. })
        ));
        assert!(matches!(
            RentalPeriod::parse("2025-06-05", "2025-06-01"),
            Err(PeriodError::Empty { .. })
        ));
    }

    #[test]
    fn test_parse_accepts_dates_and_timestamps() {
        let p = RentalPeriod::parse("2025-07-01", "2025-07-03T00:00:00.000Z").unwrap();
        assert_eq!(p.pickup(), d("2025-07-01"));
        assert_eq!(p.return_date(), d("2025-07-03"));
        assert_eq!(p.days(), 2);

        assert_eq!(
            RentalPeriod::parse("next tuesday", "2025-07-03"),
            Err(PeriodError::Unparseable("next tuesday".to_string()))
        );
    }

    #[test]
    fn test_past_pickup_is_rejected() {
        let p = period("2025-06-01", "2025-06-05");
        assert!(p.ensure_not_past(d("2025-06-01")).is_ok());
        assert!(p.ensure_not_past(d("2025-05-20")).is_ok());
        assert!(matches!(p.ensure_not_past(d("2025-06-02")), Err(PeriodError::InThePast { .. })));
    }
}
