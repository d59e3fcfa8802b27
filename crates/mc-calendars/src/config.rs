//! Calendars declared as JSON documents.
//!
//! A document is either one calendar object or an array of them:
//!
//! ```json
//! {
//!   "name": "XTST",
//!   "aliases": ["TST"],
//!   "timezone": "Europe/London",
//!   "weekmask": ["Mon", "Tue", "Wed", "Thu", "Fri"],
//!   "market_times": {
//!     "market_open":  [[null, "08:00"], ["2015-01-01", "08:30"]],
//!     "market_close": [[null, "16:30"]]
//!   },
//!   "holidays": [
//!     { "name": "New Year", "kind": "fixed", "month": 1, "day": 1,
//!       "observance": "weekend_to_monday" },
//!     { "name": "Good Friday", "kind": "easter", "offset": -2 }
//!   ],
//!   "adhoc_holidays": ["2022-09-19"],
//!   "special_times": [
//!     { "market_time": "market_close", "times": [[null, "12:30"]],
//!       "dates": [{ "name": "Christmas Eve", "kind": "fixed", "month": 12, "day": 24 }] }
//!   ],
//!   "special_times_adhoc": [
//!     { "market_time": "market_open", "time": "10:00", "dates": ["2024-01-02"] }
//!   ]
//! }
//! ```
//!
//! [`ConfiguredCalendar`] implements [`CalendarKind`], so configured
//! calendars register exactly like built-in ones.

use std::collections::BTreeMap;

use chrono::NaiveTime;
use mc_core::errors::{Error, Result};
use mc_time::{Date, Holiday, HolidayCalendar, HolidayDate, Observance, Weekday};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::definition::CalendarDefinition;
use crate::registry::{CalendarKind, Registry};
use crate::time_table::parse_time;

/// `(cutoff, "HH:MM")` pairs; a `null` cutoff marks the current time.
pub type TimeEntries = Vec<(Option<String>, String)>;

/// One calendar declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// Exchange name; also the registration name when no aliases are given.
    pub name: String,
    /// Registration names used instead of `name`.
    #[serde(default)]
    pub aliases: Vec<String>,
    /// IANA timezone.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Trading weekdays; Monday–Friday when absent.
    #[serde(default)]
    pub weekmask: Option<Vec<String>>,
    /// Regular time tables by market-time name.
    pub market_times: BTreeMap<String, TimeEntries>,
    /// Holiday rules.
    #[serde(default)]
    pub holidays: Vec<HolidayConfig>,
    /// One-off closures, `YYYY-MM-DD`.
    #[serde(default)]
    pub adhoc_holidays: Vec<String>,
    /// Rule-based special times.
    #[serde(default)]
    pub special_times: Vec<SpecialTimeConfig>,
    /// One-off special times.
    #[serde(default)]
    pub special_times_adhoc: Vec<AdhocTimeConfig>,
}

fn default_timezone() -> String {
    "UTC".to_owned()
}

/// A holiday rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HolidayConfig {
    /// Rule name.
    pub name: String,
    /// How the date is anchored, tagged by `kind`.
    #[serde(flatten)]
    pub date: HolidayDateConfig,
    /// Weekend adjustment.
    #[serde(default)]
    pub observance: ObservanceConfig,
    /// Keep only dates falling on these weekdays.
    #[serde(default)]
    pub days_of_week: Option<Vec<String>>,
    /// First date the rule applies.
    #[serde(default)]
    pub start: Option<String>,
    /// Last date the rule applies.
    #[serde(default)]
    pub end: Option<String>,
}

/// Anchor of a holiday rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum HolidayDateConfig {
    Fixed { month: u8, day: u8 },
    Easter { offset: i16 },
    NthWeekday { month: u8, weekday: String, n: u8 },
    LastWeekday { month: u8, weekday: String },
}

/// Weekend adjustment of a holiday rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum ObservanceConfig {
    #[default]
    Unadjusted,
    NearestWorkday,
    WeekendToMonday,
    PreviousFriday,
    SundayToMonday,
    NextMondayOrTuesday,
    PreviousWorkday,
    NextWorkday,
}

impl From<ObservanceConfig> for Observance {
    fn from(value: ObservanceConfig) -> Self {
        match value {
            ObservanceConfig::Unadjusted => Observance::Unadjusted,
            ObservanceConfig::NearestWorkday => Observance::NearestWorkday,
            ObservanceConfig::WeekendToMonday => Observance::WeekendToMonday,
            ObservanceConfig::PreviousFriday => Observance::PreviousFriday,
            ObservanceConfig::SundayToMonday => Observance::SundayToMonday,
            ObservanceConfig::NextMondayOrTuesday => Observance::NextMondayOrTuesday,
            ObservanceConfig::PreviousWorkday => Observance::PreviousWorkday,
            ObservanceConfig::NextWorkday => Observance::NextWorkday,
        }
    }
}

/// A special time applying on rule-generated dates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecialTimeConfig {
    /// Market time the rule overrides.
    pub market_time: String,
    /// History of the special time.
    pub times: TimeEntries,
    /// Rules producing the dates.
    pub dates: Vec<HolidayConfig>,
}

/// A special time applying on explicit dates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdhocTimeConfig {
    /// Market time the override applies to.
    pub market_time: String,
    /// `HH:MM`.
    pub time: String,
    /// `YYYY-MM-DD` dates.
    pub dates: Vec<String>,
}

impl CalendarConfig {
    /// Parse a single calendar object.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Json(e.to_string()))
    }

    /// Build and validate the definition.
    pub fn to_definition(&self) -> Result<CalendarDefinition> {
        let ctx = self.name.as_str();
        let mut builder = CalendarDefinition::builder(&self.name)
            .aliases(self.aliases.iter().cloned())
            .timezone(&self.timezone);
        if let Some(days) = &self.weekmask {
            builder = builder.weekmask(weekdays(ctx, days)?);
        }
        let rules = self
            .holidays
            .iter()
            .map(|h| h.to_holiday(ctx))
            .collect::<Result<Vec<_>>>()?;
        builder = builder
            .holidays(rules)
            .adhoc_holidays(dates(ctx, &self.adhoc_holidays)?);
        for (name, entries) in &self.market_times {
            builder = builder.market_time(name.as_str(), time_entries(ctx, entries)?);
        }
        for special in &self.special_times {
            let rules = special
                .dates
                .iter()
                .map(|h| h.to_holiday(ctx))
                .collect::<Result<Vec<_>>>()?;
            builder = builder.special_time(
                special.market_time.as_str(),
                time_entries(ctx, &special.times)?,
                HolidayCalendar::new(rules),
            );
        }
        for adhoc in &self.special_times_adhoc {
            builder = builder.special_time_adhoc(
                adhoc.market_time.as_str(),
                time(ctx, &adhoc.time)?,
                dates(ctx, &adhoc.dates)?,
            );
        }
        builder.build()
    }
}

impl HolidayConfig {
    /// Convert to a holiday rule.
    pub fn to_holiday(&self, ctx: &str) -> Result<Holiday> {
        let anchor = match &self.date {
            HolidayDateConfig::Fixed { month, day } => HolidayDate::Fixed {
                month: *month,
                day: *day,
            },
            HolidayDateConfig::Easter { offset } => HolidayDate::Easter { offset: *offset },
            HolidayDateConfig::NthWeekday { month, weekday: w, n } => HolidayDate::NthWeekday {
                month: *month,
                weekday: weekday(ctx, w)?,
                n: *n,
            },
            HolidayDateConfig::LastWeekday { month, weekday: w } => HolidayDate::LastWeekday {
                month: *month,
                weekday: weekday(ctx, w)?,
            },
        };
        let mut holiday = Holiday::new(&self.name, anchor)
            .with_observance(self.observance.into())
            .between(
                self.start.as_deref().map(|s| date(ctx, s)).transpose()?,
                self.end.as_deref().map(|s| date(ctx, s)).transpose()?,
            );
        if let Some(days) = &self.days_of_week {
            holiday = holiday.on_days(&weekdays(ctx, days)?);
        }
        Ok(holiday)
    }
}

fn configuration(ctx: &str, err: Error) -> Error {
    match err {
        Error::Configuration(msg) => Error::Configuration(format!("{ctx}: {msg}")),
        other => Error::Configuration(format!("{ctx}: {other}")),
    }
}

fn date(ctx: &str, s: &str) -> Result<Date> {
    s.parse().map_err(|e| configuration(ctx, e))
}

fn dates(ctx: &str, items: &[String]) -> Result<Vec<Date>> {
    items.iter().map(|s| date(ctx, s)).collect()
}

fn time(ctx: &str, s: &str) -> Result<NaiveTime> {
    parse_time(s).map_err(|e| configuration(ctx, e))
}

fn weekday(ctx: &str, s: &str) -> Result<Weekday> {
    s.parse().map_err(|e| configuration(ctx, e))
}

fn weekdays(ctx: &str, items: &[String]) -> Result<Vec<Weekday>> {
    items.iter().map(|s| weekday(ctx, s)).collect()
}

fn time_entries(ctx: &str, entries: &TimeEntries) -> Result<Vec<(Option<Date>, NaiveTime)>> {
    entries
        .iter()
        .map(|(cutoff, t)| {
            let cutoff = cutoff.as_deref().map(|s| date(ctx, s)).transpose()?;
            Ok((cutoff, time(ctx, t)?))
        })
        .collect()
}

/// Parse a document holding one calendar object or an array of them.
pub fn parse_document(json: &str) -> Result<Vec<CalendarConfig>> {
    let value: serde_json::Value =
        serde_json::from_str(json).map_err(|e| Error::Json(e.to_string()))?;
    let configs = if value.is_array() {
        serde_json::from_value::<Vec<CalendarConfig>>(value)
    } else {
        serde_json::from_value::<CalendarConfig>(value).map(|one| vec![one])
    };
    configs.map_err(|e| Error::Json(e.to_string()))
}

/// A calendar type backed by a [`CalendarConfig`].
#[derive(Debug, Clone)]
pub struct ConfiguredCalendar {
    config: CalendarConfig,
}

impl ConfiguredCalendar {
    /// Wrap `config`.
    pub fn new(config: CalendarConfig) -> Self {
        Self { config }
    }

    /// The underlying declaration.
    pub fn config(&self) -> &CalendarConfig {
        &self.config
    }
}

impl CalendarKind for ConfiguredCalendar {
    fn type_name(&self) -> &str {
        &self.config.name
    }

    fn aliases(&self) -> Option<Vec<String>> {
        Some(self.config.aliases.clone())
    }

    fn definition(&self) -> Result<CalendarDefinition> {
        self.config.to_definition()
    }
}

/// Register every calendar in `json` with `registry`.
///
/// All calendars are validated before any is registered, so a document
/// with one malformed calendar registers nothing. Returns the names the
/// calendars were registered under.
pub fn register_json(registry: &Registry, json: &str) -> Result<Vec<String>> {
    let configs = parse_document(json)?;
    let names = registry.register_all(configs.into_iter().map(ConfiguredCalendar::new))?;
    debug!(calendars = ?names, "loaded calendar configuration");
    Ok(names)
}
