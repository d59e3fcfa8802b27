//! Calendar definitions and the session-time resolver.
//!
//! A [`CalendarDefinition`] is the validated, immutable description of one
//! exchange: timezone, weekmask, holiday rules, and for every market time a
//! [`MarketTimeSpec`] holding its regular [`TimeTable`] plus its special and
//! ad-hoc overrides. Definitions are assembled with
//! [`CalendarDefinitionBuilder`], which performs every check up front so a
//! malformed exchange never becomes usable.
//!
//! Resolution of a market time on a date takes, in order:
//! 1. an ad-hoc override listing the date;
//! 2. a special rule whose calendar produces the date, resolved through the
//!    special time's own history;
//! 3. the regular table resolved at the date.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveTime;
use chrono_tz::Tz;
use mc_core::config_ensure;
use mc_core::errors::{Error, Result};
use mc_time::{Date, Holiday, HolidayCalendar, Weekday};
use tracing::{debug, trace};

use crate::market_time::MarketTime;
use crate::special::{AdhocTime, SpecialTime};
use crate::time_table::TimeTable;

type Entries = Vec<(Option<Date>, NaiveTime)>;

/// Everything known about one market time of a calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketTimeSpec {
    regular: TimeTable,
    special: Vec<SpecialTime>,
    adhoc: Vec<AdhocTime>,
}

impl MarketTimeSpec {
    fn new(regular: TimeTable) -> Self {
        Self {
            regular,
            special: Vec::new(),
            adhoc: Vec::new(),
        }
    }

    /// The regular history.
    pub fn regular(&self) -> &TimeTable {
        &self.regular
    }

    /// Rule-based special times.
    pub fn special(&self) -> &[SpecialTime] {
        &self.special
    }

    /// Ad-hoc overrides.
    pub fn adhoc(&self) -> &[AdhocTime] {
        &self.adhoc
    }

    fn special_at(&self, date: Date) -> Option<NaiveTime> {
        if let Some(a) = self.adhoc.iter().find(|a| a.applies_on(date)) {
            return Some(a.time());
        }
        self.special
            .iter()
            .find(|s| s.applies_on(date))
            .map(|s| s.times().time_at(date))
    }
}

/// A validated exchange calendar definition.
#[derive(Debug, Clone)]
pub struct CalendarDefinition {
    name: String,
    aliases: Vec<String>,
    timezone: Tz,
    weekmask: u8,
    holidays: HolidayCalendar,
    adhoc_holidays: BTreeSet<Date>,
    market_times: BTreeMap<MarketTime, MarketTimeSpec>,
    ordered: Vec<MarketTime>,
}

impl CalendarDefinition {
    /// Start declaring a calendar called `name`.
    pub fn builder(name: impl Into<String>) -> CalendarDefinitionBuilder {
        CalendarDefinitionBuilder::new(name)
    }

    /// Exchange name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Alternative names the exchange is known by.
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Exchange timezone.
    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Trading weekdays, Monday first.
    pub fn weekmask(&self) -> Vec<Weekday> {
        Weekday::ALL
            .into_iter()
            .filter(|w| self.weekmask & w.mask_bit() != 0)
            .collect()
    }

    /// Return `true` if the exchange trades on `weekday` absent holidays.
    pub fn trades_on(&self, weekday: Weekday) -> bool {
        self.weekmask & weekday.mask_bit() != 0
    }

    /// Regular holiday rules.
    pub fn holidays(&self) -> &HolidayCalendar {
        &self.holidays
    }

    /// One-off closures outside the rules.
    pub fn adhoc_holidays(&self) -> &BTreeSet<Date> {
        &self.adhoc_holidays
    }

    /// Return `true` if `date` is a trading day.
    pub fn is_trading_day(&self, date: Date) -> bool {
        self.trades_on(date.weekday())
            && !self.adhoc_holidays.contains(&date)
            && !self.holidays.is_holiday(date)
    }

    /// Current regular open time.
    pub fn open_time(&self) -> NaiveTime {
        self.regular_table(&MarketTime::OPEN).current()
    }

    /// Current regular close time.
    pub fn close_time(&self) -> NaiveTime {
        self.regular_table(&MarketTime::CLOSE).current()
    }

    /// Special open rules.
    pub fn special_opens(&self) -> &[SpecialTime] {
        self.special_times(&MarketTime::OPEN)
    }

    /// Ad-hoc open overrides.
    pub fn special_opens_adhoc(&self) -> &[AdhocTime] {
        self.special_times_adhoc(&MarketTime::OPEN)
    }

    /// Special close rules.
    pub fn special_closes(&self) -> &[SpecialTime] {
        self.special_times(&MarketTime::CLOSE)
    }

    /// Ad-hoc close overrides.
    pub fn special_closes_adhoc(&self) -> &[AdhocTime] {
        self.special_times_adhoc(&MarketTime::CLOSE)
    }

    /// Special rules of `market_time`; empty when none were declared.
    pub fn special_times(&self, market_time: &MarketTime) -> &[SpecialTime] {
        self.market_times
            .get(market_time)
            .map(MarketTimeSpec::special)
            .unwrap_or_default()
    }

    /// Ad-hoc overrides of `market_time`; empty when none were declared.
    pub fn special_times_adhoc(&self, market_time: &MarketTime) -> &[AdhocTime] {
        self.market_times
            .get(market_time)
            .map(MarketTimeSpec::adhoc)
            .unwrap_or_default()
    }

    /// Market times in intraday order (by their current regular time).
    pub fn market_times(&self) -> &[MarketTime] {
        &self.ordered
    }

    /// Return `true` if `market_time` is declared.
    pub fn has_market_time(&self, market_time: &MarketTime) -> bool {
        self.market_times.contains_key(market_time)
    }

    /// Full record of `market_time`.
    pub fn spec(&self, market_time: &MarketTime) -> Result<&MarketTimeSpec> {
        self.market_times.get(market_time).ok_or_else(|| {
            Error::not_found(
                "market time",
                market_time.as_str(),
                self.ordered.iter().map(|m| m.as_str()),
            )
        })
    }

    /// Cutoff dates of `market_time`'s regular table, most recent first.
    pub fn cutoffs(&self, market_time: &MarketTime) -> Result<&[Date]> {
        Ok(self.spec(market_time)?.regular().cutoffs())
    }

    /// The regular time of `market_time` in force on `date`.
    pub fn regular_time(&self, market_time: &MarketTime, date: Date) -> Result<NaiveTime> {
        Ok(self.spec(market_time)?.regular().time_at(date))
    }

    /// The ad-hoc or special time of `market_time` on `date`, if any applies.
    pub fn special_time(&self, market_time: &MarketTime, date: Date) -> Result<Option<NaiveTime>> {
        Ok(self.spec(market_time)?.special_at(date))
    }

    /// The time of `market_time` on `date`: ad-hoc, then special, then
    /// regular.
    pub fn resolve_time(&self, market_time: &MarketTime, date: Date) -> Result<NaiveTime> {
        let spec = self.spec(market_time)?;
        let time = spec
            .special_at(date)
            .unwrap_or_else(|| spec.regular().time_at(date));
        trace!(calendar = %self.name, %market_time, %date, %time, "resolved market time");
        Ok(time)
    }

    fn regular_table(&self, market_time: &MarketTime) -> &TimeTable {
        // market_open and market_close are checked by the builder.
        self.market_times[market_time].regular()
    }
}

/// Declarative builder for [`CalendarDefinition`].
///
/// Nothing is validated until [`build`](Self::build).
#[derive(Debug, Clone)]
pub struct CalendarDefinitionBuilder {
    name: String,
    aliases: Vec<String>,
    timezone: String,
    weekmask: Vec<Weekday>,
    holidays: Vec<Holiday>,
    adhoc_holidays: Vec<Date>,
    regular: Vec<(String, Entries)>,
    special: Vec<(String, Entries, HolidayCalendar)>,
    adhoc: Vec<(String, AdhocTime)>,
}

impl CalendarDefinitionBuilder {
    /// Start a definition; the weekmask defaults to Monday–Friday and the
    /// timezone to UTC.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            timezone: "UTC".to_owned(),
            weekmask: Weekday::WORKWEEK.to_vec(),
            holidays: Vec::new(),
            adhoc_holidays: Vec::new(),
            regular: Vec::new(),
            special: Vec::new(),
            adhoc: Vec::new(),
        }
    }

    /// Alternative names.
    pub fn aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases = aliases.into_iter().map(Into::into).collect();
        self
    }

    /// IANA timezone name, e.g. `"Europe/Berlin"`.
    pub fn timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = timezone.into();
        self
    }

    /// Trading weekdays.
    pub fn weekmask(mut self, days: impl IntoIterator<Item = Weekday>) -> Self {
        self.weekmask = days.into_iter().collect();
        self
    }

    /// Add regular holiday rules.
    pub fn holidays(mut self, rules: impl IntoIterator<Item = Holiday>) -> Self {
        self.holidays.extend(rules);
        self
    }

    /// Add one-off closure dates.
    pub fn adhoc_holidays(mut self, dates: impl IntoIterator<Item = Date>) -> Self {
        self.adhoc_holidays.extend(dates);
        self
    }

    /// Declare a market time with its `(cutoff, time)` history.
    pub fn market_time(
        mut self,
        name: impl Into<String>,
        entries: impl IntoIterator<Item = (Option<Date>, NaiveTime)>,
    ) -> Self {
        self.regular.push((name.into(), entries.into_iter().collect()));
        self
    }

    /// Declare a fixed `market_open`.
    pub fn open_time(self, time: NaiveTime) -> Self {
        self.market_time(MarketTime::OPEN.as_str(), [(None, time)])
    }

    /// Declare a fixed `market_close`.
    pub fn close_time(self, time: NaiveTime) -> Self {
        self.market_time(MarketTime::CLOSE.as_str(), [(None, time)])
    }

    /// Add a special-time rule for the market time `name`.
    pub fn special_time(
        mut self,
        name: impl Into<String>,
        entries: impl IntoIterator<Item = (Option<Date>, NaiveTime)>,
        dates: HolidayCalendar,
    ) -> Self {
        self.special.push((name.into(), entries.into_iter().collect(), dates));
        self
    }

    /// Add an ad-hoc override for the market time `name`.
    pub fn special_time_adhoc(
        mut self,
        name: impl Into<String>,
        time: NaiveTime,
        dates: impl IntoIterator<Item = Date>,
    ) -> Self {
        self.adhoc.push((name.into(), AdhocTime::new(time, dates)));
        self
    }

    /// Add a special open rule.
    pub fn special_open(
        self,
        entries: impl IntoIterator<Item = (Option<Date>, NaiveTime)>,
        dates: HolidayCalendar,
    ) -> Self {
        self.special_time(MarketTime::OPEN.as_str(), entries, dates)
    }

    /// Add a special close rule.
    pub fn special_close(
        self,
        entries: impl IntoIterator<Item = (Option<Date>, NaiveTime)>,
        dates: HolidayCalendar,
    ) -> Self {
        self.special_time(MarketTime::CLOSE.as_str(), entries, dates)
    }

    /// Add an ad-hoc open override.
    pub fn special_open_adhoc(self, time: NaiveTime, dates: impl IntoIterator<Item = Date>) -> Self {
        self.special_time_adhoc(MarketTime::OPEN.as_str(), time, dates)
    }

    /// Add an ad-hoc close override.
    pub fn special_close_adhoc(self, time: NaiveTime, dates: impl IntoIterator<Item = Date>) -> Self {
        self.special_time_adhoc(MarketTime::CLOSE.as_str(), time, dates)
    }

    /// Validate and normalize the declaration.
    ///
    /// # Errors
    /// [`Error::Configuration`] for an empty name, an unknown timezone, an
    /// empty weekmask, an impossible holiday rule, a malformed, reserved, or
    /// duplicated market-time name, a time table without exactly one current
    /// entry, a missing `market_open`/`market_close`, or special times for a
    /// market time that was never declared.
    pub fn build(self) -> Result<CalendarDefinition> {
        let Self {
            name,
            aliases,
            timezone,
            weekmask,
            holidays,
            adhoc_holidays,
            regular,
            special,
            adhoc,
        } = self;

        config_ensure!(!name.trim().is_empty(), "calendar name must not be empty");
        if let Some(blank) = aliases.iter().find(|a| a.trim().is_empty()) {
            return Err(Error::Configuration(format!("{name}: blank alias {blank:?}")));
        }
        let timezone: Tz = timezone
            .parse()
            .map_err(|_| Error::Configuration(format!("{name}: unknown timezone {timezone:?}")))?;
        let weekmask = weekmask.iter().fold(0u8, |acc, w| acc | w.mask_bit());
        config_ensure!(weekmask != 0, "{name}: weekmask has no trading days");
        let holidays = HolidayCalendar::new(holidays);
        holidays.validate().map_err(scoped(&name))?;

        let mut market_times: BTreeMap<MarketTime, MarketTimeSpec> = BTreeMap::new();
        for (raw, entries) in regular {
            let mt = MarketTime::new(&raw).map_err(scoped(&name))?;
            let table = TimeTable::new(entries).map_err(scoped(&format!("{name} {mt}")))?;
            config_ensure!(
                market_times.insert(mt.clone(), MarketTimeSpec::new(table)).is_none(),
                "{name}: market time {mt} declared more than once"
            );
        }
        for required in [MarketTime::OPEN, MarketTime::CLOSE] {
            config_ensure!(
                market_times.contains_key(&required),
                "{name}: {required} is not declared"
            );
        }
        for (raw, entries, dates) in special {
            let mt = MarketTime::new(&raw).map_err(scoped(&name))?;
            let scope = format!("{name} special {mt}");
            let table = TimeTable::new(entries).map_err(scoped(&scope))?;
            dates.validate().map_err(scoped(&scope))?;
            let spec = market_times.get_mut(&mt).ok_or_else(|| {
                Error::Configuration(format!("{scope}: market time is not declared"))
            })?;
            spec.special.push(SpecialTime::new(table, dates));
        }
        for (raw, override_) in adhoc {
            let mt = MarketTime::new(&raw).map_err(scoped(&name))?;
            let spec = market_times.get_mut(&mt).ok_or_else(|| {
                Error::Configuration(format!("{name} adhoc {mt}: market time is not declared"))
            })?;
            spec.adhoc.push(override_);
        }

        let mut ordered: Vec<MarketTime> = market_times.keys().cloned().collect();
        ordered.sort_by(|a, b| {
            let ta = market_times[a].regular().current();
            let tb = market_times[b].regular().current();
            ta.cmp(&tb).then_with(|| a.cmp(b))
        });

        debug!(
            calendar = %name,
            timezone = %timezone,
            market_times = ordered.len(),
            rules = holidays.rules().len(),
            "built calendar definition"
        );
        Ok(CalendarDefinition {
            name,
            aliases,
            timezone,
            weekmask,
            holidays,
            adhoc_holidays: adhoc_holidays.into_iter().collect(),
            market_times,
            ordered,
        })
    }
}

/// Prefix configuration errors with `scope`.
fn scoped(scope: &str) -> impl Fn(Error) -> Error + '_ {
    move |err| match err {
        Error::Configuration(msg) => Error::Configuration(format!("{scope}: {msg}")),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time_table::hm;
    use mc_time::holiday::good_friday;

    fn date(y: u16, m: u8, d: u8) -> Date {
        Date::from_ymd(y, m, d).unwrap()
    }

    fn t(h: u32, m: u32) -> NaiveTime {
        hm(h, m).unwrap()
    }

    fn base() -> CalendarDefinitionBuilder {
        CalendarDefinition::builder("TEST")
            .timezone("Asia/Hong_Kong")
            .open_time(t(9, 30))
            .close_time(t(16, 0))
    }

    #[test]
    fn market_times_sorted_by_current_time() {
        let def = base()
            .market_time("break_end", [(None, t(13, 0))])
            .market_time("pre", [(None, t(9, 0))])
            .market_time("break_start", [(None, t(12, 0))])
            .build()
            .unwrap();
        let names: Vec<&str> = def.market_times().iter().map(|m| m.as_str()).collect();
        assert_eq!(names, ["pre", "market_open", "break_start", "break_end", "market_close"]);
    }

    #[test]
    fn undeclared_special_tables_are_empty() {
        let def = base().market_time("break_start", [(None, t(12, 0))]).build().unwrap();
        assert!(def.special_times(&MarketTime::BREAK_START).is_empty());
        assert!(def.special_times_adhoc(&MarketTime::BREAK_START).is_empty());
        assert!(def.special_closes().is_empty());
        assert!(def.special_times(&MarketTime::POST).is_empty());
    }

    #[test]
    fn special_times_declared_by_name_surface_as_special_closes() {
        let rules = HolidayCalendar::new(vec![good_friday()]);
        let def = base()
            .special_time("close", [(None, t(12, 0))], rules.clone())
            .special_time_adhoc("market_open", t(10, 0), [date(2024, 1, 2)])
            .build()
            .unwrap();
        assert_eq!(def.special_closes().len(), 1);
        assert_eq!(def.special_closes()[0].dates(), &rules);
        assert_eq!(def.special_opens_adhoc().len(), 1);
        assert!(def.special_opens().is_empty());
    }

    #[test]
    fn resolution_precedence() {
        let christmas_eve = HolidayCalendar::new(vec![Holiday::fixed("Christmas Eve", 12, 24)]);
        let def = base()
            .market_time(
                "market_close",
                [(None, t(16, 0)), (Some(date(2011, 3, 7)), t(16, 30))],
            )
            .special_close([(None, t(12, 0))], christmas_eve)
            .special_close_adhoc(t(11, 0), [date(2024, 12, 24)])
            .build();
        // market_close declared twice (base + explicit)
        assert!(def.unwrap_err().is_configuration());

        let def = CalendarDefinition::builder("TEST")
            .open_time(t(9, 30))
            .market_time(
                "market_close",
                [(None, t(16, 0)), (Some(date(2011, 3, 7)), t(16, 30))],
            )
            .special_close(
                [(None, t(12, 0))],
                HolidayCalendar::new(vec![Holiday::fixed("Christmas Eve", 12, 24)]),
            )
            .special_close_adhoc(t(11, 0), [date(2024, 12, 24)])
            .build()
            .unwrap();
        let close = MarketTime::CLOSE;
        assert_eq!(def.resolve_time(&close, date(2010, 6, 1)).unwrap(), t(16, 30));
        assert_eq!(def.resolve_time(&close, date(2020, 6, 1)).unwrap(), t(16, 0));
        assert_eq!(def.resolve_time(&close, date(2023, 12, 24)).unwrap(), t(12, 0));
        assert_eq!(def.resolve_time(&close, date(2024, 12, 24)).unwrap(), t(11, 0));
        assert_eq!(def.special_time(&close, date(2020, 6, 1)).unwrap(), None);
        assert_eq!(def.regular_time(&close, date(2024, 12, 24)).unwrap(), t(16, 0));
        assert_eq!(def.cutoffs(&close).unwrap(), &[date(2011, 3, 7)]);
    }

    #[test]
    fn unknown_market_time_lists_declared_ones() {
        let def = base().build().unwrap();
        let err = def.resolve_time(&MarketTime::BREAK_START, date(2024, 1, 2)).unwrap_err();
        match err {
            Error::NotFound { available, .. } => {
                assert_eq!(available, vec!["market_close", "market_open"]);
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn construction_errors() {
        let cases = vec![
            CalendarDefinition::builder("NO_CLOSE").open_time(t(9, 0)),
            base().timezone("Mars/Olympus_Mons"),
            base().weekmask(Vec::<Weekday>::new()),
            base().market_time("special_closes", [(None, t(12, 0))]),
            base().market_time("break_start", [(Some(date(2020, 1, 1)), t(12, 0))]),
            base().special_time("break_start", [(None, t(12, 0))], HolidayCalendar::default()),
            base().special_time("close", [(Some(date(2020, 1, 1)), t(12, 0))], HolidayCalendar::default()),
            base().special_time_adhoc("post", t(18, 0), [date(2024, 1, 2)]),
            base().holidays([Holiday::fixed("Bad", 13, 1)]),
            CalendarDefinition::builder(" ").open_time(t(9, 0)).close_time(t(17, 0)),
            base().aliases(["XT", ""]),
        ];
        for builder in cases {
            let err = builder.build().unwrap_err();
            assert!(err.is_configuration(), "{err}");
        }
    }

    #[test]
    fn missing_sentinel_message_names_the_market_time() {
        let err = base()
            .market_time("break_start", [(Some(date(2020, 1, 1)), t(12, 0))])
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("TEST break_start"), "{err}");
    }

    #[test]
    fn trading_days_respect_weekmask_and_holidays() {
        let def = base()
            .weekmask([Weekday::Monday, Weekday::Tuesday, Weekday::Wednesday, Weekday::Thursday])
            .holidays([good_friday()])
            .adhoc_holidays([date(2024, 1, 3)])
            .build()
            .unwrap();
        assert!(def.is_trading_day(date(2024, 1, 2)));
        assert!(!def.is_trading_day(date(2024, 1, 3)));
        assert!(!def.is_trading_day(date(2024, 1, 5))); // Friday
        assert!(!def.is_trading_day(date(2023, 4, 7))); // Good Friday
        assert_eq!(def.weekmask().len(), 4);
        assert_eq!(def.timezone(), chrono_tz::Asia::Hong_Kong);
    }
}
