//! Western (Gregorian) Easter.

use mc_core::errors::Result;

use crate::date::Date;

/// Easter Sunday of `year`.
///
/// Oudin's algorithm; valid for every year the [`Date`] range covers.
pub fn easter_sunday(year: u16) -> Result<Date> {
    let y = year as i32;
    let g = y % 19;
    let c = y / 100;
    let h = (c - c / 4 - (8 * c + 13) / 25 + 19 * g + 15) % 30;
    let i = h - (h / 28) * (1 - (h / 28) * (29 / (h + 1)) * ((21 - g) / 11));
    let j = (y + y / 4 + i + 2 - c + c / 4) % 7;
    let p = i - j;
    let day = 1 + (p + 27 + (p + 6) / 40) % 31;
    let month = 3 + (p + 26) / 30;
    Date::from_ymd(year, month as u8, day as u8)
}

/// Good Friday of `year` (Easter Sunday − 2).
pub fn good_friday(year: u16) -> Result<Date> {
    easter_sunday(year)?.add_days(-2)
}

/// Easter Monday of `year` (Easter Sunday + 1).
pub fn easter_monday(year: u16) -> Result<Date> {
    easter_sunday(year)?.add_days(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: u16, m: u8, d: u8) -> Date {
        Date::from_ymd(y, m, d).unwrap()
    }

    #[test]
    fn known_easter_sundays() {
        assert_eq!(easter_sunday(2000).unwrap(), date(2000, 4, 23));
        assert_eq!(easter_sunday(2019).unwrap(), date(2019, 4, 21));
        assert_eq!(easter_sunday(2023).unwrap(), date(2023, 4, 9));
        assert_eq!(easter_sunday(2024).unwrap(), date(2024, 3, 31));
        assert_eq!(easter_sunday(2025).unwrap(), date(2025, 4, 20));
    }

    #[test]
    fn good_friday_and_easter_monday_2023() {
        assert_eq!(good_friday(2023).unwrap(), date(2023, 4, 7));
        assert_eq!(easter_monday(2023).unwrap(), date(2023, 4, 10));
    }

    #[test]
    fn easter_is_always_a_sunday() {
        for y in 1900..=2199u16 {
            let e = easter_sunday(y).unwrap();
            assert_eq!(e.weekday(), crate::weekday::Weekday::Sunday, "{y}");
        }
    }
}
