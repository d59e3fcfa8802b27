//! Trading sessions localized in the exchange timezone.

use chrono::{DateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use mc_core::errors::{Error, Result};
use mc_time::Date;

use crate::market_time::MarketTime;

/// Attach `time` on `date` to the exchange timezone.
///
/// Ambiguous local times (DST fall-back) take the earlier instant; local
/// times skipped by a DST jump are a [`Error::Date`].
pub fn localize(tz: Tz, date: Date, time: NaiveTime) -> Result<DateTime<Tz>> {
    let local = date.to_naive()?.and_time(time);
    tz.from_local_datetime(&local)
        .earliest()
        .ok_or_else(|| Error::Date(format!("{local} does not exist in {}", tz.name())))
}

/// One trading day with every market time resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    date: Date,
    open: DateTime<Tz>,
    close: DateTime<Tz>,
    times: Vec<(MarketTime, DateTime<Tz>)>,
    late_open: bool,
    early_close: bool,
}

impl Session {
    pub(crate) fn new(
        date: Date,
        times: Vec<(MarketTime, DateTime<Tz>)>,
        late_open: bool,
        early_close: bool,
    ) -> Result<Self> {
        let find = |mt: &MarketTime| {
            times
                .iter()
                .find(|(m, _)| m == mt)
                .map(|(_, t)| *t)
                .ok_or_else(|| Error::Runtime(format!("session {date} has no {mt}")))
        };
        let open = find(&MarketTime::OPEN)?;
        let close = find(&MarketTime::CLOSE)?;
        Ok(Self {
            date,
            open,
            close,
            times,
            late_open,
            early_close,
        })
    }

    /// The trading date.
    pub fn date(&self) -> Date {
        self.date
    }

    /// Session open.
    pub fn market_open(&self) -> DateTime<Tz> {
        self.open
    }

    /// Session close.
    pub fn market_close(&self) -> DateTime<Tz> {
        self.close
    }

    /// Every market time of the day, in intraday order.
    pub fn times(&self) -> &[(MarketTime, DateTime<Tz>)] {
        &self.times
    }

    /// The instant of `market_time`, if the calendar declares it.
    pub fn get(&self, market_time: &MarketTime) -> Option<DateTime<Tz>> {
        self.times
            .iter()
            .find(|(m, _)| m == market_time)
            .map(|(_, t)| *t)
    }

    /// The intraday break, when both ends are declared.
    pub fn break_interval(&self) -> Option<(DateTime<Tz>, DateTime<Tz>)> {
        Some((
            self.get(&MarketTime::BREAK_START)?,
            self.get(&MarketTime::BREAK_END)?,
        ))
    }

    /// Return `true` if the open is later than the regular open.
    pub fn is_late_open(&self) -> bool {
        self.late_open
    }

    /// Return `true` if the close is earlier than the regular close.
    pub fn is_early_close(&self) -> bool {
        self.early_close
    }

    /// Return `true` if the market is open at `instant`: on or after the
    /// open, before the close, and outside the break.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        let instant = instant.with_timezone(&self.open.timezone());
        if instant < self.open || instant >= self.close {
            return false;
        }
        match self.break_interval() {
            Some((start, end)) => instant < start || instant >= end,
            None => true,
        }
    }
}

/// Sessions of one calendar over a date range.
#[derive(Debug, Clone)]
pub struct Schedule {
    calendar: String,
    timezone: Tz,
    sessions: Vec<Session>,
}

impl Schedule {
    pub(crate) fn new(calendar: String, timezone: Tz, sessions: Vec<Session>) -> Self {
        Self {
            calendar,
            timezone,
            sessions,
        }
    }

    /// Name of the calendar the schedule was built from.
    pub fn calendar(&self) -> &str {
        &self.calendar
    }

    /// Exchange timezone.
    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Sessions in date order.
    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    /// Number of sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Return `true` if the range holds no trading day.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// The session on `date`, if it is a trading day in range.
    pub fn session_on(&self, date: Date) -> Option<&Session> {
        self.sessions
            .binary_search_by(|s| s.date.cmp(&date))
            .ok()
            .map(|i| &self.sessions[i])
    }

    /// Sessions closing earlier than their regular close.
    pub fn early_closes(&self) -> impl Iterator<Item = &Session> + '_ {
        self.sessions.iter().filter(|s| s.early_close)
    }

    /// Sessions opening later than their regular open.
    pub fn late_opens(&self) -> impl Iterator<Item = &Session> + '_ {
        self.sessions.iter().filter(|s| s.late_open)
    }

    /// Return `true` if any session is open at `instant`.
    pub fn open_at_time(&self, instant: DateTime<Utc>) -> bool {
        self.sessions.iter().any(|s| s.contains(instant))
    }
}

impl<'a> IntoIterator for &'a Schedule {
    type Item = &'a Session;
    type IntoIter = std::slice::Iter<'a, Session>;

    fn into_iter(self) -> Self::IntoIter {
        self.sessions.iter()
    }
}
