//! # mc-time
//!
//! Date arithmetic and holiday rules: the `Date` and `Weekday` types, the
//! `Calendar` trait, Easter computation, and the `Holiday` /
//! `HolidayCalendar` rule evaluator that exchange calendars are built from.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// Calendar trait and the weekends-only calendar.
pub mod calendar;

/// `Date` type.
pub mod date;

/// Easter Sunday and the holidays anchored on it.
pub mod easter;

/// Holiday rules, observances, and rule calendars.
pub mod holiday;

/// `Weekday`: day of the week.
pub mod weekday;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use calendar::{Calendar, WeekendsOnly};
pub use date::Date;
pub use holiday::{Holiday, HolidayCalendar, HolidayDate, Observance};
pub use weekday::Weekday;
