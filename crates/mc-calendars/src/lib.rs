//! # mc-calendars
//!
//! Exchange calendar definitions: named market times with their historical
//! cutoff tables, special and ad-hoc session times, the name → calendar
//! registry, JSON-declared calendars, and session schedules localized in the
//! exchange timezone.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// Calendars declared as JSON documents.
pub mod config;

/// `CalendarDefinition`, its builder, and the session-time resolver.
pub mod definition;

/// Built-in exchanges.
pub mod exchanges;

/// `MarketCalendar` instances and constructor options.
pub mod market_calendar;

/// `MarketTime`: a named point in the trading session.
pub mod market_time;

/// Name → calendar registry.
pub mod registry;

/// Sessions and schedules.
pub mod schedule;

/// Special and ad-hoc session times.
pub mod special;

/// Historical time tables and cutoff resolution.
pub mod time_table;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use config::{register_json, CalendarConfig, ConfiguredCalendar};
pub use definition::{CalendarDefinition, CalendarDefinitionBuilder, MarketTimeSpec};
pub use exchanges::Eurex;
pub use market_calendar::{CalendarOptions, MarketCalendar};
pub use market_time::MarketTime;
pub use registry::{calendar_names, get_calendar, CalendarKind, RegisteredCalendar, Registry};
pub use schedule::{Schedule, Session};
pub use special::{AdhocTime, SpecialTime};
pub use time_table::TimeTable;
