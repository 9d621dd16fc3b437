//! Civil date <-> Julian Day Number conversion for the three calendars
//! `DateTime` supports.
//!
//! The proleptic Gregorian calendar is delegated to `chrono::NaiveDate`
//! (shifted onto our own JDN epoch); the Julian calendar uses the classic
//! Fliegel–van Flandern integer formulas directly, since `chrono` has no
//! Julian-calendar support to delegate to.

use chrono::{Datelike, NaiveDate};

use super::Calendar;

/// JDN of the proleptic Gregorian date 0001-01-01, i.e. the offset between
/// `chrono`'s `num_days_from_ce()` (day 1 = 0001-01-01) and our JDN epoch.
const CE_DAY_ONE_JDN: i64 = 1_721_425;

fn floor_div(a: i64, b: i64) -> i64 {
    a.div_euclid(b)
}

pub(super) fn civil_to_jdn(calendar: Calendar, year: i32, month: u32, day: u32) -> i64 {
    match calendar {
        Calendar::Julian => julian_calendar_to_jdn(year, month, day),
        Calendar::ProlepticGregorian => gregorian_calendar_to_jdn(year, month, day),
        Calendar::Gregorian => {
            if (year, month, day) < (1582, 10, 15) {
                julian_calendar_to_jdn(year, month, day)
            } else {
                gregorian_calendar_to_jdn(year, month, day)
            }
        }
    }
}

pub(super) fn jdn_to_civil(calendar: Calendar, jdn: i64) -> (i32, u32, u32) {
    match calendar {
        Calendar::Julian => julian_jdn_to_civil(jdn),
        Calendar::ProlepticGregorian => gregorian_jdn_to_civil(jdn),
        Calendar::Gregorian => {
            if super::is_gregorian_in_force(jdn) {
                gregorian_jdn_to_civil(jdn)
            } else {
                julian_jdn_to_civil(jdn)
            }
        }
    }
}

fn gregorian_calendar_to_jdn(year: i32, month: u32, day: u32) -> i64 {
    match NaiveDate::from_ymd_opt(year, month, day) {
        Some(date) => date.num_days_from_ce() as i64 + CE_DAY_ONE_JDN,
        None => 0,
    }
}

fn gregorian_jdn_to_civil(jdn: i64) -> (i32, u32, u32) {
    let days_from_ce = (jdn - CE_DAY_ONE_JDN) as i32;
    match NaiveDate::from_num_days_from_ce_opt(days_from_ce) {
        Some(date) => (date.year(), date.month(), date.day()),
        None => (0, 1, 1),
    }
}

/// Julian calendar civil date to JDN, following the well-known
/// floor-division formulation of the Fliegel–van Flandern algorithm.
fn julian_calendar_to_jdn(year: i32, month: u32, day: u32) -> i64 {
    let year = year as i64;
    let month = month as i64;
    let day = day as i64;

    let a = floor_div(14 - month, 12);
    let y = year + 4800 - a;
    let m = month + 12 * a - 3;

    day + floor_div(153 * m + 2, 5) + 365 * y + floor_div(y, 4) - 32083
}

/// Inverse of [`julian_calendar_to_jdn`].
fn julian_jdn_to_civil(jdn: i64) -> (i32, u32, u32) {
    let a = jdn + 32082;
    let b = floor_div(4 * a + 3, 1461);
    let c = a - floor_div(1461 * b, 4);
    let m = floor_div(5 * c + 2, 153);
    let day = c - floor_div(153 * m + 2, 5) + 1;
    let month = m + 3 - 12 * floor_div(m, 10);
    let year = b - 4800 + floor_div(m, 10);

    (year as i32, month as u32, day as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn julian_round_trips() {
        let jdn = julian_calendar_to_jdn(2000, 1, 1);
        assert_eq!(julian_jdn_to_civil(jdn), (2000, 1, 1));
    }

    #[test]
    fn julian_and_gregorian_agree_on_jdn_at_reform() {
        // 1582-10-15 Gregorian == 1582-10-05 Julian; both denote the same day.
        let julian_side = julian_calendar_to_jdn(1582, 10, 5);
        let gregorian_side = gregorian_calendar_to_jdn(1582, 10, 15);
        assert_eq!(julian_side, gregorian_side);
    }

    #[test]
    fn gregorian_round_trips() {
        let jdn = gregorian_calendar_to_jdn(2024, 2, 29);
        assert_eq!(gregorian_jdn_to_civil(jdn), (2024, 2, 29));
    }
}
