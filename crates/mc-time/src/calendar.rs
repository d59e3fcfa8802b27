//! `Calendar` trait.
//!
//! A calendar knows which dates are business days. Exchange calendars in
//! `mc-calendars` implement it on top of their weekmask and holiday rules.

use crate::date::Date;
use crate::weekday::Weekday;

/// A business-day calendar.
pub trait Calendar: std::fmt::Debug + Send + Sync {
    /// Human-readable name (e.g. `"EUREX"`).
    fn name(&self) -> &str;

    /// Return `true` if `date` is a business day in this calendar.
    fn is_business_day(&self, date: Date) -> bool;

    /// Return `true` if `date` is a holiday (non-business) day.
    fn is_holiday(&self, date: Date) -> bool {
        !self.is_business_day(date)
    }

    /// Return `true` if `date` is a weekend according to this calendar.
    ///
    /// Most calendars consider Saturday and Sunday as weekends.
    fn is_weekend(&self, date: Date) -> bool {
        matches!(date.weekday(), Weekday::Saturday | Weekday::Sunday)
    }

    /// Advance `date` by `n` business days; `None` if the walk leaves the
    /// valid date range.
    fn advance_business_days(&self, mut date: Date, n: i32) -> Option<Date> {
        let step: i32 = if n >= 0 { 1 } else { -1 };
        let mut remaining = n.abs();
        while remaining > 0 {
            date = date.add_days(step).ok()?;
            if self.is_business_day(date) {
                remaining -= 1;
            }
        }
        Some(date)
    }

    /// Count the number of business days between `d1` (exclusive) and `d2`
    /// (inclusive).  Returns a negative number if `d2 < d1`.
    fn business_days_between(&self, d1: Date, d2: Date) -> i32 {
        if d1 == d2 {
            return 0;
        }
        let sign = if d2 > d1 { 1 } else { -1 };
        let (start, end) = if d2 > d1 { (d1, d2) } else { (d2, d1) };
        let count = start
            .range_inclusive(end)
            .skip(1)
            .filter(|d| self.is_business_day(*d))
            .count() as i32;
        sign * count
    }

    /// Every business day in the inclusive range `[start, end]`.
    fn business_days(&self, start: Date, end: Date) -> Vec<Date> {
        start
            .range_inclusive(end)
            .filter(|d| self.is_business_day(*d))
            .collect()
    }
}

/// A calendar that treats only Saturdays and Sundays as non-business days,
/// with no additional holidays.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeekendsOnly;

impl Calendar for WeekendsOnly {
    fn name(&self) -> &str {
        "Weekends Only"
    }

    fn is_business_day(&self, date: Date) -> bool {
        !self.is_weekend(date)
    }
}
