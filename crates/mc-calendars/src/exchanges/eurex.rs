//! EUREX derivatives exchange calendar.

use mc_core::errors::Result;
use mc_time::holiday::{easter_monday, good_friday};
use mc_time::{Holiday, HolidayCalendar, Observance, Weekday};

use crate::definition::CalendarDefinition;
use crate::registry::CalendarKind;
use crate::time_table::hm;

const MON_TUE: [Weekday; 2] = [Weekday::Monday, Weekday::Tuesday];

/// EUREX calendar (Frankfurt).
///
/// Trading 09:00–17:30 Europe/Berlin, Monday to Friday. Closed on:
/// * New Year's Day (weekdays only)
/// * Good Friday
/// * Easter Monday
/// * May 1 (weekdays only)
/// * Christmas Day (weekdays only), with Dec 27 off when it falls on a weekend
/// * Boxing Day, with Dec 28 off when it falls on a weekend
///
/// Closes at 12:30 on Christmas Eve and New Year's Eve, or on the Friday
/// before when those fall on a weekend.
#[derive(Debug, Clone, Copy, Default)]
pub struct Eurex;

impl Eurex {
    /// Regular holiday rules.
    pub fn holidays() -> Vec<Holiday> {
        vec![
            Holiday::fixed("New Year's Day", 1, 1).on_days(&Weekday::WORKWEEK),
            good_friday(),
            easter_monday(),
            Holiday::fixed("Early May Bank Holiday", 5, 1).on_days(&Weekday::WORKWEEK),
            Holiday::fixed("Christmas", 12, 25).on_days(&Weekday::WORKWEEK),
            // Christmas on Saturday gives Monday 27th, on Sunday Tuesday 27th.
            Holiday::fixed("Weekend Christmas", 12, 27).on_days(&MON_TUE),
            Holiday::fixed("Boxing Day", 12, 26),
            Holiday::fixed("Weekend Boxing Day", 12, 28).on_days(&MON_TUE),
        ]
    }

    /// Dates of the 12:30 close.
    pub fn early_close_days() -> HolidayCalendar {
        HolidayCalendar::new(vec![
            Holiday::fixed("Christmas Eve", 12, 24).with_observance(Observance::PreviousFriday),
            Holiday::fixed("New Year's Eve", 12, 31).with_observance(Observance::PreviousFriday),
        ])
    }
}

impl CalendarKind for Eurex {
    fn type_name(&self) -> &str {
        "EUREXExchangeCalendar"
    }

    fn aliases(&self) -> Option<Vec<String>> {
        Some(vec!["EUREX".to_owned()])
    }

    fn definition(&self) -> Result<CalendarDefinition> {
        CalendarDefinition::builder("EUREX")
            .aliases(["EUREX"])
            .timezone("Europe/Berlin")
            .open_time(hm(9, 0)?)
            .close_time(hm(17, 30)?)
            .holidays(Self::holidays())
            .special_close([(None, hm(12, 30)?)], Self::early_close_days())
            .build()
    }
}
