//! # marketcal
//!
//! Exchange trading calendars: which days an exchange trades, when each
//! session opens, breaks and closes, and how those times changed over the
//! years.
//!
//! This crate is a **façade** that re-exports the workspace crates.
//!
//! ```rust
//! use marketcal::calendars::{get_calendar, CalendarOptions, MarketTime};
//! use marketcal::time::Date;
//!
//! let eurex = get_calendar("EUREX", CalendarOptions::default()).unwrap();
//! let christmas_eve = Date::from_ymd(2024, 12, 24).unwrap();
//! let close = eurex.time_on(&MarketTime::CLOSE, christmas_eve).unwrap();
//! assert_eq!(close.to_string(), "12:30:00");
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Error definitions.
pub use mc_core as core;

/// Dates, weekdays, holiday rules, and the `Calendar` trait.
pub use mc_time as time;

/// Exchange calendars, the registry, and schedules.
pub use mc_calendars as calendars;

pub use mc_calendars::{get_calendar, CalendarOptions, MarketCalendar, MarketTime, Registry};
pub use mc_core::{Error, Result};
pub use mc_time::Date;
