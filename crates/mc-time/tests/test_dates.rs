//! Integration tests for `Date` arithmetic against `chrono`.

use chrono::{Datelike, NaiveDate};
use mc_time::date::{days_in_month, is_leap_year};
use mc_time::{Date, Weekday};
use proptest::prelude::*;

fn date(y: u16, m: u8, d: u8) -> Date {
    Date::from_ymd(y, m, d).unwrap()
}

#[test]
fn leap_years() {
    assert!(is_leap_year(2000));
    assert!(is_leap_year(2024));
    assert!(!is_leap_year(1900));
    assert!(!is_leap_year(2100));
    assert_eq!(days_in_month(2024, 2), 29);
    assert_eq!(days_in_month(2023, 2), 28);
}

#[test]
fn consecutive_days_cycle_weekdays() {
    let mut d = date(1999, 12, 27); // Monday
    for expected in Weekday::ALL.iter().cycle().take(21) {
        assert_eq!(d.weekday(), *expected, "{d}");
        d = d.add_days(1).unwrap();
    }
}

#[test]
fn out_of_range_dates_are_rejected() {
    assert!(Date::from_ymd(1899, 12, 31).is_err());
    assert!(Date::from_ymd(2200, 1, 1).is_err());
    assert!(Date::from_ymd(2023, 2, 29).is_err());
    assert!(Date::from_serial(0).is_err());
    assert!(Date::from_serial(Date::MAX.serial() + 1).is_err());
}

proptest! {
    #[test]
    fn agrees_with_chrono(serial in 1i32..=109_573) {
        let d = Date::from_serial(serial).unwrap();
        let naive = d.to_naive().unwrap();
        let epoch = NaiveDate::from_ymd_opt(1900, 1, 1).unwrap();
        prop_assert_eq!((naive - epoch).num_days() as i32 + 1, serial);
        prop_assert_eq!(d.weekday().ordinal() as u32, naive.weekday().number_from_monday());
        prop_assert_eq!(d.day_of_year() as u32, naive.ordinal());
    }
}
