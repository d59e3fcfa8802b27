//! Holiday rules and rule calendars.
//!
//! A [`Holiday`] describes how to find one holiday in any given year: an
//! anchor ([`HolidayDate`]), an optional weekend [`Observance`], an optional
//! days-of-week filter, and an optional validity window. A
//! [`HolidayCalendar`] is an ordered collection of rules that can list every
//! holiday in a date range.
//!
//! The order of operations for one year is: anchor → observance →
//! days-of-week filter → validity window.

use std::collections::BTreeSet;

use mc_core::config_ensure;
use mc_core::errors::Result;

use crate::date::Date;
use crate::easter;
use crate::weekday::Weekday;

/// How a holiday anchored on a weekend is moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Observance {
    /// Keep the anchor date as is.
    #[default]
    Unadjusted,
    /// Saturday → Friday, Sunday → Monday.
    NearestWorkday,
    /// Saturday or Sunday → following Monday.
    WeekendToMonday,
    /// Saturday or Sunday → preceding Friday.
    PreviousFriday,
    /// Sunday → Monday; Saturday is left alone.
    SundayToMonday,
    /// Saturday → Monday; Sunday or Monday → Tuesday.
    NextMondayOrTuesday,
    /// Any weekend day → preceding weekday.
    PreviousWorkday,
    /// Any weekend day → following weekday.
    NextWorkday,
}

impl Observance {
    /// Apply the observance to `date`.
    pub fn apply(self, date: Date) -> Result<Date> {
        let w = date.weekday();
        let shift = match self {
            Observance::Unadjusted => 0,
            Observance::NearestWorkday => match w {
                Weekday::Saturday => -1,
                Weekday::Sunday => 1,
                _ => 0,
            },
            Observance::WeekendToMonday | Observance::NextWorkday => match w {
                Weekday::Saturday => 2,
                Weekday::Sunday => 1,
                _ => 0,
            },
            Observance::PreviousFriday | Observance::PreviousWorkday => match w {
                Weekday::Saturday => -1,
                Weekday::Sunday => -2,
                _ => 0,
            },
            Observance::SundayToMonday => match w {
                Weekday::Sunday => 1,
                _ => 0,
            },
            Observance::NextMondayOrTuesday => match w {
                Weekday::Saturday | Weekday::Sunday => 2,
                Weekday::Monday => 1,
                _ => 0,
            },
        };
        date.add_days(shift)
    }
}

/// The anchor of a holiday rule within a year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HolidayDate {
    /// A fixed month/day. Years where the day does not exist (Feb 29) have
    /// no holiday.
    Fixed {
        /// Month (1–12).
        month: u8,
        /// Day of month.
        day: u8,
    },
    /// A signed number of days from Easter Sunday (Good Friday = −2).
    Easter {
        /// Days relative to Easter Sunday.
        offset: i16,
    },
    /// The n-th given weekday of a month.
    NthWeekday {
        /// Month (1–12).
        month: u8,
        /// Weekday to count.
        weekday: Weekday,
        /// 1-based occurrence.
        n: u8,
    },
    /// The last given weekday of a month.
    LastWeekday {
        /// Month (1–12).
        month: u8,
        /// Weekday to find.
        weekday: Weekday,
    },
}

impl HolidayDate {
    fn in_year(&self, year: u16) -> Option<Date> {
        match *self {
            HolidayDate::Fixed { month, day } => Date::from_ymd(year, month, day).ok(),
            HolidayDate::Easter { offset } => easter::easter_sunday(year)
                .and_then(|sunday| sunday.add_days(offset as i32))
                .ok(),
            HolidayDate::NthWeekday { month, weekday, n } => {
                Date::nth_weekday(n, weekday, year, month).ok()
            }
            HolidayDate::LastWeekday { month, weekday } => {
                Date::last_weekday(weekday, year, month).ok()
            }
        }
    }
}

/// A single holiday rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Holiday {
    name: String,
    date: HolidayDate,
    observance: Observance,
    days_of_week: Option<u8>,
    start: Option<Date>,
    end: Option<Date>,
}

impl Holiday {
    /// A rule anchored on `date`.
    pub fn new(name: impl Into<String>, date: HolidayDate) -> Self {
        Self {
            name: name.into(),
            date,
            observance: Observance::Unadjusted,
            days_of_week: None,
            start: None,
            end: None,
        }
    }

    /// A rule on a fixed month/day.
    pub fn fixed(name: impl Into<String>, month: u8, day: u8) -> Self {
        Self::new(name, HolidayDate::Fixed { month, day })
    }

    /// A rule `offset` days from Easter Sunday.
    pub fn easter(name: impl Into<String>, offset: i16) -> Self {
        Self::new(name, HolidayDate::Easter { offset })
    }

    /// Move weekend dates according to `observance`.
    pub fn with_observance(mut self, observance: Observance) -> Self {
        self.observance = observance;
        self
    }

    /// Keep the (observed) date only when it falls on one of `days`.
    pub fn on_days(mut self, days: &[Weekday]) -> Self {
        self.days_of_week = Some(days.iter().fold(0, |acc, w| acc | w.mask_bit()));
        self
    }

    /// Restrict the rule to observed dates within `[start, end]`; either
    /// bound may be open.
    pub fn between(mut self, start: Option<Date>, end: Option<Date>) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    /// Rule name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rule anchor.
    pub fn anchor(&self) -> HolidayDate {
        self.date
    }

    /// Check that the anchor can ever produce a date.
    pub fn validate(&self) -> Result<()> {
        let name = &self.name;
        match self.date {
            HolidayDate::Fixed { month, day } => {
                config_ensure!((1..=12).contains(&month), "holiday {name:?}: month {month} out of range");
                config_ensure!((1..=31).contains(&day), "holiday {name:?}: day {day} out of range");
            }
            HolidayDate::NthWeekday { month, n, .. } => {
                config_ensure!((1..=12).contains(&month), "holiday {name:?}: month {month} out of range");
                config_ensure!((1..=5).contains(&n), "holiday {name:?}: occurrence {n} out of range [1, 5]");
            }
            HolidayDate::LastWeekday { month, .. } => {
                config_ensure!((1..=12).contains(&month), "holiday {name:?}: month {month} out of range");
            }
            HolidayDate::Easter { .. } => {}
        }
        config_ensure!(self.days_of_week != Some(0), "holiday {name:?}: empty days-of-week filter");
        if let (Some(start), Some(end)) = (self.start, self.end) {
            config_ensure!(start <= end, "holiday {name:?}: window starts after it ends");
        }
        Ok(())
    }

    /// The holiday in `year`, if the rule produces one.
    ///
    /// Anchors that do not exist in `year` (Feb 29, a fifth weekday) and
    /// observed dates past the edge of the [`Date`] range yield `None`.
    pub fn date_in_year(&self, year: u16) -> Option<Date> {
        let anchor = self.date.in_year(year)?;
        let observed = self.observance.apply(anchor).ok()?;
        if let Some(mask) = self.days_of_week {
            if mask & observed.weekday().mask_bit() == 0 {
                return None;
            }
        }
        if self.start.is_some_and(|s| observed < s) || self.end.is_some_and(|e| observed > e) {
            return None;
        }
        Some(observed)
    }

    /// Return `true` if the rule produces `date`.
    pub fn falls_on(&self, date: Date) -> bool {
        let year = date.year();
        (year.saturating_sub(1).max(1900)..=year.saturating_add(1).min(2199))
            .any(|y| self.date_in_year(y) == Some(date))
    }

    /// Every date the rule produces within `[start, end]`.
    pub fn dates(&self, start: Date, end: Date) -> Vec<Date> {
        if start > end {
            return Vec::new();
        }
        // Observance can push a date across a year boundary (Dec 31 → Jan 2),
        // so look one year either side of the range.
        let first = start.year().saturating_sub(1).max(1900);
        let last = end.year().saturating_add(1).min(2199);
        (first..=last)
            .filter_map(|year| self.date_in_year(year))
            .filter(|d| *d >= start && *d <= end)
            .collect()
    }
}

/// Good Friday rule.
pub fn good_friday() -> Holiday {
    Holiday::easter("Good Friday", -2)
}

/// Easter Monday rule.
pub fn easter_monday() -> Holiday {
    Holiday::easter("Easter Monday", 1)
}

/// An ordered set of holiday rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HolidayCalendar {
    rules: Vec<Holiday>,
}

impl HolidayCalendar {
    /// Combine `rules` into one calendar.
    pub fn new(rules: Vec<Holiday>) -> Self {
        Self { rules }
    }

    /// The rules, in declaration order.
    pub fn rules(&self) -> &[Holiday] {
        &self.rules
    }

    /// Return `true` if no rules are declared.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// All holidays in `[start, end]`, sorted and de-duplicated.
    pub fn holidays(&self, start: Date, end: Date) -> Vec<Date> {
        let set: BTreeSet<Date> = self.rules.iter().flat_map(|r| r.dates(start, end)).collect();
        set.into_iter().collect()
    }

    /// Return `true` if any rule produces `date`.
    pub fn is_holiday(&self, date: Date) -> bool {
        self.rules.iter().any(|r| r.falls_on(date))
    }

    /// Check every rule; see [`Holiday::validate`].
    pub fn validate(&self) -> Result<()> {
        self.rules.iter().try_for_each(Holiday::validate)
    }
}
