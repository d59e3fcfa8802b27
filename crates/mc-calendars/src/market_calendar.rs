//! Calendar instances: a shared definition plus constructor options.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::NaiveTime;
use chrono_tz::Tz;
use mc_core::ensure;
use mc_core::errors::Result;
use mc_time::{Calendar, Date};
use tracing::debug;

use crate::definition::CalendarDefinition;
use crate::market_time::MarketTime;
use crate::schedule::{localize, Schedule, Session};

/// Overrides accepted when a calendar is instantiated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CalendarOptions {
    /// Replaces the regular open on days without a special open.
    pub open_time: Option<NaiveTime>,
    /// Replaces the regular close on days without a special close.
    pub close_time: Option<NaiveTime>,
}

impl CalendarOptions {
    /// Override the regular open.
    pub fn with_open_time(mut self, time: NaiveTime) -> Self {
        self.open_time = Some(time);
        self
    }

    /// Override the regular close.
    pub fn with_close_time(mut self, time: NaiveTime) -> Self {
        self.close_time = Some(time);
        self
    }
}

/// An exchange calendar ready for date and session queries.
#[derive(Debug, Clone)]
pub struct MarketCalendar {
    definition: Arc<CalendarDefinition>,
    options: CalendarOptions,
}

impl MarketCalendar {
    /// Instantiate `definition` with `options`.
    pub fn new(definition: Arc<CalendarDefinition>, options: CalendarOptions) -> Self {
        Self {
            definition,
            options,
        }
    }

    /// The shared definition.
    pub fn definition(&self) -> &CalendarDefinition {
        &self.definition
    }

    /// Constructor options in effect.
    pub fn options(&self) -> CalendarOptions {
        self.options
    }

    /// Exchange timezone.
    pub fn timezone(&self) -> Tz {
        self.definition.timezone()
    }

    /// Regular open, honouring the open override.
    pub fn open_time(&self) -> NaiveTime {
        self.options
            .open_time
            .unwrap_or_else(|| self.definition.open_time())
    }

    /// Regular close, honouring the close override.
    pub fn close_time(&self) -> NaiveTime {
        self.options
            .close_time
            .unwrap_or_else(|| self.definition.close_time())
    }

    /// Regular time of `market_time` on `date`, honouring the overrides.
    pub fn regular_time(&self, market_time: &MarketTime, date: Date) -> Result<NaiveTime> {
        let overridden = if market_time.is_open() {
            self.options.open_time
        } else if market_time.is_close() {
            self.options.close_time
        } else {
            None
        };
        match overridden {
            Some(time) => Ok(time),
            None => self.definition.regular_time(market_time, date),
        }
    }

    /// Time of `market_time` on `date`: ad-hoc, then special, then regular.
    pub fn time_on(&self, market_time: &MarketTime, date: Date) -> Result<NaiveTime> {
        match self.definition.special_time(market_time, date)? {
            Some(time) => Ok(time),
            None => self.regular_time(market_time, date),
        }
    }

    /// Rule and ad-hoc holidays in `[start, end]`, sorted.
    pub fn holidays(&self, start: Date, end: Date) -> Vec<Date> {
        if start > end {
            return Vec::new();
        }
        let mut all: BTreeSet<Date> = self
            .definition
            .holidays()
            .holidays(start, end)
            .into_iter()
            .collect();
        all.extend(self.definition.adhoc_holidays().range(start..=end).copied());
        all.into_iter().collect()
    }

    /// Return `true` if `date` is a trading day.
    pub fn is_trading_day(&self, date: Date) -> bool {
        self.definition.is_trading_day(date)
    }

    /// Trading days in `[start, end]`.
    pub fn valid_days(&self, start: Date, end: Date) -> Vec<Date> {
        self.business_days(start, end)
    }

    /// First trading day strictly after `date`.
    pub fn next_trading_day(&self, date: Date) -> Option<Date> {
        self.advance_business_days(date, 1)
    }

    /// The session on `date`, or `None` on a non-trading day.
    pub fn session(&self, date: Date) -> Result<Option<Session>> {
        if !self.is_trading_day(date) {
            return Ok(None);
        }
        let tz = self.timezone();
        let times = self
            .definition
            .market_times()
            .iter()
            .map(|mt| Ok((mt.clone(), localize(tz, date, self.time_on(mt, date)?)?)))
            .collect::<Result<Vec<_>>>()?;
        let late_open = self.time_on(&MarketTime::OPEN, date)?
            > self.regular_time(&MarketTime::OPEN, date)?;
        let early_close = self.time_on(&MarketTime::CLOSE, date)?
            < self.regular_time(&MarketTime::CLOSE, date)?;
        Session::new(date, times, late_open, early_close).map(Some)
    }

    /// Sessions for every trading day in `[start, end]`.
    ///
    /// # Errors
    /// [`Error::Precondition`](mc_core::Error::Precondition) if `start` is
    /// after `end`; [`Error::Date`](mc_core::Error::Date) if a market time
    /// does not exist locally on some day.
    pub fn schedule(&self, start: Date, end: Date) -> Result<Schedule> {
        ensure!(start <= end, "schedule start {start} is after end {end}");
        let mut sessions = Vec::new();
        for date in self.valid_days(start, end) {
            if let Some(session) = self.session(date)? {
                sessions.push(session);
            }
        }
        debug!(
            calendar = %self.definition.name(),
            %start,
            %end,
            sessions = sessions.len(),
            "built schedule"
        );
        Ok(Schedule::new(
            self.definition.name().to_owned(),
            self.timezone(),
            sessions,
        ))
    }
}

impl Calendar for MarketCalendar {
    fn name(&self) -> &str {
        self.definition.name()
    }

    fn is_business_day(&self, date: Date) -> bool {
        self.is_trading_day(date)
    }

    fn is_weekend(&self, date: Date) -> bool {
        !self.definition.trades_on(date.weekday())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time_table::hm;
    use chrono::{DateTime, Utc};
    use mc_time::{Holiday, HolidayCalendar, Weekday};

    fn date(y: u16, m: u8, d: u8) -> Date {
        Date::from_ymd(y, m, d).unwrap()
    }

    fn t(h: u32, m: u32) -> NaiveTime {
        hm(h, m).unwrap()
    }

    fn calendar(options: CalendarOptions) -> MarketCalendar {
        let def = CalendarDefinition::builder("XHKG")
            .timezone("Asia/Hong_Kong")
            .open_time(t(9, 30))
            .close_time(t(16, 0))
            .market_time("break_start", [(None, t(12, 0))])
            .market_time("break_end", [(None, t(13, 0))])
            .holidays([Holiday::fixed("Labour Day", 5, 1)])
            .adhoc_holidays([date(2024, 7, 2)])
            .special_close(
                [(None, t(12, 0))],
                HolidayCalendar::new(vec![
                    Holiday::fixed("Christmas Eve", 12, 24).on_days(&Weekday::WORKWEEK)
                ]),
            )
            .special_open_adhoc(t(14, 0), [date(2024, 7, 3)])
            .build()
            .unwrap();
        MarketCalendar::new(Arc::new(def), options)
    }

    #[test]
    fn holidays_merge_rules_and_adhoc() {
        let cal = calendar(CalendarOptions::default());
        assert_eq!(
            cal.holidays(date(2024, 1, 1), date(2024, 12, 31)),
            vec![date(2024, 5, 1), date(2024, 7, 2)]
        );
        assert!(!cal.is_trading_day(date(2024, 7, 2)));
        assert_eq!(cal.next_trading_day(date(2024, 7, 1)), Some(date(2024, 7, 3)));
        assert_eq!(cal.next_trading_day(date(2024, 4, 30)), Some(date(2024, 5, 2)));
        assert_eq!(cal.valid_days(date(2024, 6, 28), date(2024, 7, 3)).len(), 3);
        assert!(cal.is_weekend(date(2024, 6, 29)));
        assert!(!cal.is_weekend(date(2024, 7, 2)));
    }

    #[test]
    fn sessions_are_localized() {
        let cal = calendar(CalendarOptions::default());
        let session = cal.session(date(2024, 7, 1)).unwrap().unwrap();
        let open: DateTime<Utc> = "2024-07-01T01:30:00Z".parse().unwrap();
        assert_eq!(session.market_open().with_timezone(&Utc), open);
        let names: Vec<&str> = session.times().iter().map(|(m, _)| m.as_str()).collect();
        assert_eq!(names, ["market_open", "break_start", "break_end", "market_close"]);
        assert!(cal.session(date(2024, 7, 2)).unwrap().is_none());
    }

    #[test]
    fn early_closes_and_late_opens() {
        let cal = calendar(CalendarOptions::default());
        let schedule = cal.schedule(date(2024, 7, 1), date(2024, 12, 31)).unwrap();
        let early: Vec<Date> = schedule.early_closes().map(Session::date).collect();
        assert_eq!(early, vec![date(2024, 12, 24)]);
        let late: Vec<Date> = schedule.late_opens().map(Session::date).collect();
        assert_eq!(late, vec![date(2024, 7, 3)]);
    }

    #[test]
    fn overrides_apply_on_regular_days_only() {
        let cal = calendar(CalendarOptions::default().with_close_time(t(15, 0)));
        assert_eq!(cal.close_time(), t(15, 0));
        assert_eq!(cal.open_time(), t(9, 30));
        assert_eq!(cal.time_on(&MarketTime::CLOSE, date(2024, 7, 1)).unwrap(), t(15, 0));
        assert_eq!(cal.time_on(&MarketTime::CLOSE, date(2024, 12, 24)).unwrap(), t(12, 0));
        let session = cal.session(date(2024, 7, 1)).unwrap().unwrap();
        assert!(!session.is_early_close());
    }

    #[test]
    fn schedule_rejects_reversed_range() {
        let cal = calendar(CalendarOptions::default());
        assert!(cal.schedule(date(2024, 2, 1), date(2024, 1, 1)).is_err());
        assert!(cal.schedule(date(2024, 6, 29), date(2024, 6, 30)).unwrap().is_empty());
    }
}
