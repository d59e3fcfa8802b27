//! Historical time-of-day tables and cutoff resolution.
//!
//! A [`TimeTable`] records how one market time changed over the years. Each
//! entry is keyed either by a cutoff date or by `None`, the sentinel for the
//! rule currently in force. An entry keyed by cutoff `c` holds the time that
//! was in force *until* `c`:
//!
//! ```text
//! {None: 13:00, 2015-01-01: 14:00}
//!
//!   ... 2014-12-31 | 2015-01-01 ...
//!        14:00     |     13:00
//! ```
//!
//! Dates before the oldest cutoff resolve to the oldest entry, so the
//! earliest recorded rule also covers everything before it.

use chrono::NaiveTime;
use mc_core::config_ensure;
use mc_core::errors::{Error, Result};
use mc_time::Date;

/// Build a time of day, failing with a configuration error when out of range.
pub fn hm(hour: u32, minute: u32) -> Result<NaiveTime> {
    NaiveTime::from_hms_opt(hour, minute, 0)
        .ok_or_else(|| Error::Configuration(format!("invalid time of day {hour:02}:{minute:02}")))
}

/// Parse `HH:MM` or `HH:MM:SS`.
pub fn parse_time(s: &str) -> Result<NaiveTime> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .map_err(|_| Error::Configuration(format!("cannot parse time of day {s:?} (expected HH:MM)")))
}

/// The history of one market time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeTable {
    current: NaiveTime,
    /// Cutoff dates, strictly descending.
    cutoffs: Vec<Date>,
    /// `times[i]` is the time in force until `cutoffs[i]`.
    times: Vec<NaiveTime>,
}

impl TimeTable {
    /// A table without history.
    pub fn fixed(time: NaiveTime) -> Self {
        Self {
            current: time,
            cutoffs: Vec::new(),
            times: Vec::new(),
        }
    }

    /// Build a table from `(cutoff, time)` entries.
    ///
    /// # Errors
    /// [`Error::Configuration`] unless exactly one entry has a `None` key, or
    /// if two entries share a cutoff date.
    pub fn new<I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Option<Date>, NaiveTime)>,
    {
        let mut current = Vec::new();
        let mut dated = Vec::new();
        for (key, time) in entries {
            match key {
                None => current.push(time),
                Some(date) => dated.push((date, time)),
            }
        }
        config_ensure!(
            current.len() == 1,
            "exactly one entry must have no cutoff date to represent the current time, found {}",
            current.len()
        );
        dated.sort_by(|a, b| b.0.cmp(&a.0));
        if let Some(pair) = dated.windows(2).find(|w| w[0].0 == w[1].0) {
            return Err(Error::Configuration(format!(
                "cutoff date {} appears more than once",
                pair[0].0
            )));
        }
        let (cutoffs, times) = dated.into_iter().unzip();
        Ok(Self {
            current: current[0],
            cutoffs,
            times,
        })
    }

    /// The time currently in force (the sentinel entry).
    pub fn current(&self) -> NaiveTime {
        self.current
    }

    /// Cutoff dates, most recent first.
    pub fn cutoffs(&self) -> &[Date] {
        &self.cutoffs
    }

    /// Return `true` if the time never changed.
    pub fn is_fixed(&self) -> bool {
        self.cutoffs.is_empty()
    }

    /// The time in force on `date`.
    pub fn time_at(&self, date: Date) -> NaiveTime {
        match self.cutoffs.iter().position(|c| date >= *c) {
            Some(0) => self.current,
            Some(k) => self.times[k - 1],
            None => self.times.last().copied().unwrap_or(self.current),
        }
    }

    /// Every entry, the sentinel first and then by descending cutoff.
    pub fn entries(&self) -> impl Iterator<Item = (Option<Date>, NaiveTime)> + '_ {
        std::iter::once((None, self.current)).chain(
            self.cutoffs
                .iter()
                .zip(&self.times)
                .map(|(d, t)| (Some(*d), *t)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: u16, m: u8, d: u8) -> Date {
        Date::from_ymd(y, m, d).unwrap()
    }

    fn t(h: u32, m: u32) -> NaiveTime {
        hm(h, m).unwrap()
    }

    #[test]
    fn single_cutoff_falls_back_to_earliest_rule() {
        let table = TimeTable::new([(None, t(13, 0)), (Some(date(2015, 1, 1)), t(14, 0))]).unwrap();
        assert_eq!(table.time_at(date(2014, 12, 31)), t(14, 0));
        assert_eq!(table.time_at(date(1990, 6, 1)), t(14, 0));
        assert_eq!(table.time_at(date(2015, 1, 1)), t(13, 0));
        assert_eq!(table.time_at(date(2024, 3, 1)), t(13, 0));
    }

    #[test]
    fn several_cutoffs() {
        let table = TimeTable::new([
            (Some(date(2000, 1, 1)), t(10, 0)),
            (None, t(9, 0)),
            (Some(date(2010, 1, 1)), t(9, 30)),
        ])
        .unwrap();
        assert_eq!(table.cutoffs(), &[date(2010, 1, 1), date(2000, 1, 1)]);
        assert_eq!(table.time_at(date(1999, 12, 31)), t(10, 0));
        assert_eq!(table.time_at(date(2000, 1, 1)), t(9, 30));
        assert_eq!(table.time_at(date(2009, 12, 31)), t(9, 30));
        assert_eq!(table.time_at(date(2010, 1, 1)), t(9, 0));
    }

    #[test]
    fn sentinel_only() {
        let table = TimeTable::new([(None, t(12, 30))]).unwrap();
        assert!(table.is_fixed());
        assert_eq!(table, TimeTable::fixed(t(12, 30)));
        assert_eq!(table.time_at(Date::MIN), t(12, 30));
        assert_eq!(table.time_at(Date::MAX), t(12, 30));
    }

    #[test]
    fn missing_sentinel() {
        let err = TimeTable::new([(Some(date(2020, 1, 1)), t(9, 0))]).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn two_sentinels() {
        let err = TimeTable::new([(None, t(9, 0)), (None, t(10, 0))]).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn duplicate_cutoff() {
        let d = date(2020, 1, 1);
        let err = TimeTable::new([(None, t(9, 0)), (Some(d), t(10, 0)), (Some(d), t(11, 0))]).unwrap_err();
        assert!(err.to_string().contains("2020-01-01"));
    }

    #[test]
    fn entries_start_with_sentinel() {
        let table = TimeTable::new([(None, t(13, 0)), (Some(date(2015, 1, 1)), t(14, 0))]).unwrap();
        let entries: Vec<_> = table.entries().collect();
        assert_eq!(entries, vec![(None, t(13, 0)), (Some(date(2015, 1, 1)), t(14, 0))]);
    }

    #[test]
    fn time_parsing() {
        assert_eq!(parse_time("09:15").unwrap(), t(9, 15));
        assert_eq!(parse_time("17:30:00").unwrap(), t(17, 30));
        assert!(parse_time("25:00").is_err());
        assert!(hm(24, 0).is_err());
    }
}
