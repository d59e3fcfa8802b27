//! Special session times: rule-based and ad-hoc overrides.

use std::collections::BTreeSet;

use chrono::NaiveTime;
use mc_time::{Date, HolidayCalendar};

use crate::time_table::TimeTable;

/// A market time that differs from the regular one on the dates a rule
/// calendar produces (e.g. a 12:30 close on Christmas Eve).
///
/// The special time carries its own [`TimeTable`], so it can change over
/// the years like a regular time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecialTime {
    times: TimeTable,
    dates: HolidayCalendar,
}

impl SpecialTime {
    /// A special time resolved through `times` on the dates of `dates`.
    pub fn new(times: TimeTable, dates: HolidayCalendar) -> Self {
        Self { times, dates }
    }

    /// A special time that never changed.
    pub fn fixed(time: NaiveTime, dates: HolidayCalendar) -> Self {
        Self::new(TimeTable::fixed(time), dates)
    }

    /// The special time's history.
    pub fn times(&self) -> &TimeTable {
        &self.times
    }

    /// The rules producing the special dates.
    pub fn dates(&self) -> &HolidayCalendar {
        &self.dates
    }

    /// Return `true` if the rule applies on `date`.
    pub fn applies_on(&self, date: Date) -> bool {
        self.dates.is_holiday(date)
    }
}

/// A one-off override: `time` on each of an explicit set of dates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdhocTime {
    time: NaiveTime,
    dates: BTreeSet<Date>,
}

impl AdhocTime {
    /// Override with `time` on every date in `dates`.
    pub fn new(time: NaiveTime, dates: impl IntoIterator<Item = Date>) -> Self {
        Self {
            time,
            dates: dates.into_iter().collect(),
        }
    }

    /// The override time.
    pub fn time(&self) -> NaiveTime {
        self.time
    }

    /// The dates it applies on, ascending.
    pub fn dates(&self) -> &BTreeSet<Date> {
        &self.dates
    }

    /// Return `true` if `date` is one of the override dates.
    pub fn applies_on(&self, date: Date) -> bool {
        self.dates.contains(&date)
    }
}
