//! Calendar-aware timestamps and CF-convention ("<unit> since <reference>")
//! time-unit parsing.
//!
//! `DateTime` stores milliseconds since a fixed Julian Day Number epoch
//! rather than wrapping `chrono::NaiveDateTime` directly, because MDAL must
//! represent dates in three different calendars (including the historical
//! Julian/Gregorian cutover) and `chrono` only models the proleptic
//! Gregorian calendar. `chrono::NaiveDate` is still used for the proleptic
//! Gregorian conversion itself (see [`civil_to_jdn`]/[`jdn_to_civil`]) rather
//! than reimplementing that one arithmetic from scratch.

mod julian;

use julian::{civil_to_jdn, jdn_to_civil};

/// Milliseconds in a day, used throughout this module's integer arithmetic.
pub const MS_PER_DAY: i64 = 86_400_000;
const MS_PER_HOUR: i64 = 3_600_000;
const MS_PER_MINUTE: i64 = 60_000;
const MS_PER_SECOND: i64 = 1_000;

/// Average length of a CF "year": 365.242198781 days, the UDUNITS constant
/// used for the "years since" and "months since" reference-time units.
pub const MILLISECONDS_IN_EXACT_YEAR: f64 = 365.242_198_781 * MS_PER_DAY as f64;

/// A CF "month": exactly 1/12 of [`MILLISECONDS_IN_EXACT_YEAR`].
pub const MILLISECONDS_IN_MONTH_CF: f64 = MILLISECONDS_IN_EXACT_YEAR / 12.0;

/// JDN of the first day the Gregorian calendar was in force (1582-10-15).
const GREGORIAN_REFORM_JDN: i64 = 2_299_161;

/// The calendar a civil date/time is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Calendar {
    /// The historical calendar: Julian before 1582-10-15, Gregorian from
    /// that date onward.
    Gregorian,
    /// The Gregorian calendar's rules extended indefinitely backward.
    ProlepticGregorian,
    /// The Julian calendar's rules used for all dates.
    Julian,
}

/// A moment in time, stored as milliseconds since a fixed Julian Day Number
/// epoch (JDN 0, midnight).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct DateTime {
    millis_since_jdn_epoch: i64,
}

impl DateTime {
    /// Builds a `DateTime` from a civil date/time expressed in `calendar`.
    ///
    /// `month` and `day` are 1-based. `millisecond` is added on top of
    /// `second` rather than folded into a fractional second, so callers
    /// never lose precision to floating point.
    #[allow(clippy::too_many_arguments)]
    pub fn from_civil(
        calendar: Calendar,
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
        millisecond: u32,
    ) -> Self {
        let jdn = civil_to_jdn(calendar, year, month, day);
        let ms_of_day = hour as i64 * MS_PER_HOUR
            + minute as i64 * MS_PER_MINUTE
            + second as i64 * MS_PER_SECOND
            + millisecond as i64;
        DateTime {
            millis_since_jdn_epoch: jdn * MS_PER_DAY + ms_of_day,
        }
    }

    /// An invalid/unset reference time, returned by [`parse_cf_reference_time`]
    /// when the string can't be parsed, matching the original source's
    /// "never throw, fall back to an obviously-wrong default" behavior.
    pub fn invalid() -> Self {
        DateTime {
            millis_since_jdn_epoch: i64::MIN,
        }
    }

    /// Whether this is the [`DateTime::invalid`] sentinel.
    pub fn is_valid(&self) -> bool {
        self.millis_since_jdn_epoch != i64::MIN
    }

    /// Milliseconds since the internal JDN epoch, for interop with drivers
    /// that store raw offsets (e.g. Selafin's `"<unit> since <date>"` plus
    /// an integer/float offset per timestep).
    pub fn millis_since_epoch(&self) -> i64 {
        self.millis_since_jdn_epoch
    }

    /// Decomposes this moment back into a civil date/time in `calendar`,
    /// rounding the millisecond-of-day component half-to-even the way
    /// `mdal_date_time.cpp` formats a `DateTime` for display.
    pub fn to_civil(&self, calendar: Calendar) -> (i32, u32, u32, u32, u32, u32, u32) {
        let total = self.millis_since_jdn_epoch;
        let jdn = total.div_euclid(MS_PER_DAY);
        let mut ms_of_day = total.rem_euclid(MS_PER_DAY);

        // Round half-to-even to the nearest millisecond boundary; ms_of_day
        // is already integral, so this only matters when a caller has added
        // a fractional offset upstream and truncated before calling in —
        // kept for symmetry with the original's rounding contract.
        if ms_of_day % 1 != 0 {
            ms_of_day = round_half_to_even(ms_of_day as f64) as i64;
        }

        let (year, month, day) = jdn_to_civil(calendar, jdn);
        let hour = (ms_of_day / MS_PER_HOUR) as u32;
        let minute = ((ms_of_day % MS_PER_HOUR) / MS_PER_MINUTE) as u32;
        let second = ((ms_of_day % MS_PER_MINUTE) / MS_PER_SECOND) as u32;
        let millisecond = (ms_of_day % MS_PER_SECOND) as u32;
        (year, month, day, hour, minute, second, millisecond)
    }

    /// Adds a [`RelativeTimestamp`] to this moment.
    pub fn add(&self, duration: RelativeTimestamp) -> Self {
        DateTime {
            millis_since_jdn_epoch: self.millis_since_jdn_epoch + duration.milliseconds,
        }
    }

    /// The signed duration between two moments.
    pub fn diff(&self, other: &DateTime) -> RelativeTimestamp {
        RelativeTimestamp {
            milliseconds: self.millis_since_jdn_epoch - other.millis_since_jdn_epoch,
        }
    }

    /// Builds a `DateTime` from seconds since the Unix epoch
    /// (1970-01-01T00:00:00, historical/Gregorian calendar).
    pub fn from_unix_epoch_seconds(seconds: i64) -> Self {
        const UNIX_EPOCH_JDN: i64 = 2_440_588;
        DateTime {
            millis_since_jdn_epoch: UNIX_EPOCH_JDN * MS_PER_DAY + seconds * MS_PER_SECOND,
        }
    }

    /// Builds a `DateTime` from a Julian Day number, where the integer part
    /// falls at Greenwich noon (the standard JD convention), e.g.
    /// `2451545.0` is 2000-01-01T12:00:00.
    pub fn from_julian_day(jd: f64) -> Self {
        let millis = (jd + 0.5) * MS_PER_DAY as f64;
        DateTime {
            millis_since_jdn_epoch: round_half_to_even(millis) as i64,
        }
    }

    /// This moment as a Julian Day number (integer part at Greenwich noon),
    /// the inverse of [`DateTime::from_julian_day`].
    pub fn to_julian_day(&self) -> f64 {
        self.millis_since_jdn_epoch as f64 / MS_PER_DAY as f64 - 0.5
    }

    /// Parses an ISO-8601-like `"YYYY-MM-DD[THH:MM:SS[.fff]]"` string in the
    /// historical (Gregorian-from-reform) calendar. Returns `None` rather
    /// than panicking on malformed input.
    pub fn from_iso8601(text: &str) -> Option<Self> {
        parse_iso_like(text)
    }

    /// Formats this moment as `"YYYY-MM-DDTHH:MM:SS[.fff]"`, using the
    /// Gregorian calendar from the 1582-10-15 reform onward and the Julian
    /// calendar before it (i.e. [`Calendar::Gregorian`]'s historical rules).
    /// The millisecond field is omitted when zero.
    pub fn to_standard_calendar_iso8601(&self) -> String {
        if !self.is_valid() {
            return String::new();
        }
        let (year, month, day, hour, minute, second, millisecond) = self.to_civil(Calendar::Gregorian);
        if millisecond == 0 {
            format!(
                "{year:04}-{month:02}-{day:02}T{hour:02}:{minute:02}:{second:02}"
            )
        } else {
            format!(
                "{year:04}-{month:02}-{day:02}T{hour:02}:{minute:02}:{second:02}.{millisecond:03}"
            )
        }
    }
}

fn round_half_to_even(value: f64) -> f64 {
    let floor = value.floor();
    let diff = value - floor;
    if diff < 0.5 {
        floor
    } else if diff > 0.5 {
        floor + 1.0
    } else if (floor as i64) % 2 == 0 {
        floor
    } else {
        floor + 1.0
    }
}

/// Whether `jdn` falls on or after the Gregorian calendar reform.
pub(crate) fn is_gregorian_in_force(jdn: i64) -> bool {
    jdn >= GREGORIAN_REFORM_JDN
}

/// The unit a [`RelativeTimestamp`] (or a CF `"<unit> since <ref>"` string)
/// is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationUnit {
    /// Milliseconds.
    Milliseconds,
    /// Seconds.
    Seconds,
    /// Minutes.
    Minutes,
    /// Hours — the CF default when a unit string can't be recognised.
    Hours,
    /// Days.
    Days,
    /// Weeks (7 days).
    Weeks,
    /// CF "months": [`MILLISECONDS_IN_MONTH_CF`] each.
    Months,
    /// CF "years": [`MILLISECONDS_IN_EXACT_YEAR`] each.
    Years,
}

impl DurationUnit {
    fn milliseconds_per_unit(self) -> f64 {
        match self {
            DurationUnit::Milliseconds => 1.0,
            DurationUnit::Seconds => MS_PER_SECOND as f64,
            DurationUnit::Minutes => MS_PER_MINUTE as f64,
            DurationUnit::Hours => MS_PER_HOUR as f64,
            DurationUnit::Days => MS_PER_DAY as f64,
            DurationUnit::Weeks => 7.0 * MS_PER_DAY as f64,
            DurationUnit::Months => MILLISECONDS_IN_MONTH_CF,
            DurationUnit::Years => MILLISECONDS_IN_EXACT_YEAR,
        }
    }
}

/// A signed duration, stored in whole milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RelativeTimestamp {
    milliseconds: i64,
}

impl RelativeTimestamp {
    /// Builds a duration of `value` `unit`s, rounding to the nearest
    /// millisecond (half-to-even).
    pub fn new(value: f64, unit: DurationUnit) -> Self {
        let ms = round_half_to_even(value * unit.milliseconds_per_unit());
        RelativeTimestamp {
            milliseconds: ms as i64,
        }
    }

    /// This duration expressed as a whole number of milliseconds.
    pub fn as_milliseconds(&self) -> i64 {
        self.milliseconds
    }

    /// This duration expressed as `unit`s (may be fractional).
    pub fn as_unit(&self, unit: DurationUnit) -> f64 {
        self.milliseconds as f64 / unit.milliseconds_per_unit()
    }
}

/// Parses the unit word of a CF `"<unit> since <reference>"` time-units
/// string (e.g. `"hours since 1990-01-01 00:00:00"` -> [`DurationUnit::Hours`]).
///
/// Falls back to [`DurationUnit::Hours`] for anything unrecognised, matching
/// the original's `getDataTimeUnit` default — never fails.
pub fn parse_cf_time_unit(spec: &str) -> DurationUnit {
    let unit_word = spec.split_whitespace().next().unwrap_or("").to_lowercase();
    match unit_word.as_str() {
        "ms" | "millisecond" | "milliseconds" => DurationUnit::Milliseconds,
        "s" | "sec" | "secs" | "second" | "seconds" => DurationUnit::Seconds,
        "min" | "mins" | "minute" | "minutes" => DurationUnit::Minutes,
        "h" | "hr" | "hrs" | "hour" | "hours" => DurationUnit::Hours,
        "d" | "day" | "days" => DurationUnit::Days,
        "week" | "weeks" => DurationUnit::Weeks,
        "month" | "months" => DurationUnit::Months,
        "year" | "years" => DurationUnit::Years,
        _ => DurationUnit::Hours,
    }
}

/// Parses the `<reference>` half of a CF `"<unit> since <reference>"`
/// string, returning [`DateTime::invalid`] rather than failing when the
/// reference can't be parsed.
pub fn parse_cf_reference_time(spec: &str) -> DateTime {
    let Some(idx) = spec.to_lowercase().find("since") else {
        return DateTime::invalid();
    };
    let reference = spec[idx + "since".len()..].trim();
    parse_iso_like(reference).unwrap_or_else(DateTime::invalid)
}

fn parse_iso_like(text: &str) -> Option<DateTime> {
    let mut parts = text.splitn(2, |c| c == 'T' || c == ' ');
    let date_part = parts.next()?;
    let time_part = parts.next().unwrap_or("00:00:00");

    let mut date_fields = date_part.splitn(3, '-');
    let year: i32 = date_fields.next()?.parse().ok()?;
    let month: u32 = date_fields.next()?.parse().ok()?;
    let day: u32 = date_fields.next()?.parse().ok()?;

    let mut time_fields = time_part.trim().splitn(3, ':');
    let hour: u32 = time_fields.next().unwrap_or("0").parse().ok()?;
    let minute: u32 = time_fields.next().unwrap_or("0").parse().ok()?;
    let second_str = time_fields.next().unwrap_or("0");
    let second: f64 = second_str.parse().ok()?;

    Some(DateTime::from_civil(
        Calendar::Gregorian,
        year,
        month,
        day,
        hour,
        minute,
        second as u32,
        ((second.fract()) * 1000.0).round() as u32,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_proleptic_gregorian_date() {
        let dt = DateTime::from_civil(Calendar::ProlepticGregorian, 2021, 3, 15, 12, 30, 0, 0);
        let (y, m, d, h, mi, s, ms) = dt.to_civil(Calendar::ProlepticGregorian);
        assert_eq!((y, m, d, h, mi, s, ms), (2021, 3, 15, 12, 30, 0, 0));
    }

    #[test]
    fn reform_boundary_is_continuous_in_gregorian_calendar() {
        let before = DateTime::from_civil(Calendar::Gregorian, 1582, 10, 4, 0, 0, 0, 0);
        let after = DateTime::from_civil(Calendar::Gregorian, 1582, 10, 15, 0, 0, 0, 0);
        // The historical calendar has no 1582-10-05..1582-10-14: the day
        // after 10-04 is 10-15.
        assert_eq!(
            after.millis_since_epoch() - before.millis_since_epoch(),
            MS_PER_DAY
        );
    }

    #[test]
    fn parses_cf_hours_since_string() {
        assert_eq!(parse_cf_time_unit("hours since 1990-01-01"), DurationUnit::Hours);
        assert_eq!(parse_cf_time_unit("seconds since 1990-01-01"), DurationUnit::Seconds);
        assert_eq!(parse_cf_time_unit("gibberish"), DurationUnit::Hours);
    }

    #[test]
    fn parses_cf_reference_time() {
        let dt = parse_cf_reference_time("hours since 1990-01-01 12:00:00");
        let (y, m, d, h, ..) = dt.to_civil(Calendar::Gregorian);
        assert_eq!((y, m, d, h), (1990, 1, 1, 12));
    }

    #[test]
    fn invalid_reference_time_is_never_a_panic() {
        let dt = parse_cf_reference_time("not a valid unit string");
        assert!(!dt.is_valid());
    }

    #[test]
    fn julian_day_round_trips_through_civil_date() {
        let dt = DateTime::from_civil(Calendar::ProlepticGregorian, 1425, 1, 2, 12, 0, 0, 0);
        assert_eq!(dt.to_julian_day(), 2_241_532.0);

        let from_jd = DateTime::from_julian_day(2_241_532.0);
        assert_eq!(from_jd, dt);

        let julian_side = DateTime::from_civil(Calendar::Julian, 1424, 12, 24, 12, 0, 0, 0);
        assert_eq!(julian_side, dt);
    }

    #[test]
    fn formats_standard_calendar_iso8601() {
        let dt = DateTime::from_civil(Calendar::Gregorian, 2019, 2, 28, 10, 2, 1, 0);
        assert_eq!(dt.to_standard_calendar_iso8601(), "2019-02-28T10:02:01");
    }

    #[test]
    fn unix_epoch_seconds_round_trip() {
        let dt = DateTime::from_unix_epoch_seconds(0);
        assert_eq!(dt.to_standard_calendar_iso8601(), "1970-01-01T00:00:00");
        let dt = DateTime::from_unix_epoch_seconds(86_400);
        assert_eq!(dt.to_standard_calendar_iso8601(), "1970-01-02T00:00:00");
    }

    #[test]
    fn time_algebra_round_trips_add_and_diff() {
        let dt = DateTime::from_civil(Calendar::Gregorian, 2024, 6, 1, 0, 0, 0, 0);
        let delta = RelativeTimestamp::new(90.0, DurationUnit::Minutes);
        assert_eq!(dt.add(delta).diff(&dt), delta);
        assert_eq!(dt.diff(&dt.add(delta)).milliseconds, -delta.milliseconds);
    }

    #[test]
    fn relative_timestamp_unit_equivalence() {
        let a = RelativeTimestamp::new(90.0, DurationUnit::Minutes);
        let b = RelativeTimestamp::new(1.5, DurationUnit::Hours);
        assert_eq!(a, b);

        let sum = RelativeTimestamp::new(
            RelativeTimestamp::new(90.0, DurationUnit::Seconds).as_unit(DurationUnit::Minutes)
                + RelativeTimestamp::new(1.5, DurationUnit::Minutes).as_unit(DurationUnit::Minutes),
            DurationUnit::Minutes,
        );
        assert_eq!(sum, RelativeTimestamp::new(3.0, DurationUnit::Minutes));
    }

    #[test]
    fn months_and_years_use_cf_constants() {
        let one_year = RelativeTimestamp::new(1.0, DurationUnit::Years);
        assert_eq!(one_year.as_milliseconds(), MILLISECONDS_IN_EXACT_YEAR.round() as i64);
        let one_month = RelativeTimestamp::new(1.0, DurationUnit::Months);
        assert_eq!(one_month.as_milliseconds(), MILLISECONDS_IN_MONTH_CF.round() as i64);
    }
}
