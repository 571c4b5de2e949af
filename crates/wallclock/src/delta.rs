//! Durations: fixed elapsed spans and calendar spans.
//!
//! The two kinds compose differently. Calendar components (years, months,
//! weeks, days) move the wall clock of a zone, so "+1 month" lands on the
//! same day of the month and "+1 day" keeps the time of day across a DST
//! change. The fixed part is elapsed time and is added to the absolute
//! instant after the calendar part has been re-anchored.
//!
//! # Text form
//!
//! `[+|-]<n><unit>...` where unit is one of `y`, `mo`, `w`, `d`, `h`, `m`,
//! `s`, `ms`, `us`, `ns`. A sign applies to every following component until
//! the next sign: `+1mo2d`, `-1w`, `+1d-2h`.

use std::fmt;
use std::ops::{Add, Neg};
use std::str::FromStr;

use chrono::{Days, Months, NaiveDateTime, TimeDelta};

use crate::error::{Error, Result};

/// A duration to add to a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delta {
    /// Exact elapsed time.
    Fixed(TimeDelta),
    /// Wall-clock calendar components plus an elapsed remainder.
    Calendar(CalendarSpan),
}

/// Calendar components of a [`Delta`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CalendarSpan {
    pub years: i32,
    pub months: i32,
    pub weeks: i64,
    pub days: i64,
    /// Elapsed time added after the calendar components.
    pub fixed: TimeDelta,
}

impl CalendarSpan {
    /// Move a wall-clock reading by the calendar components.
    ///
    /// Years and months go first and clamp to the end of the month
    /// (January 31 + 1 month is February 28 or 29), then weeks and days.
    pub fn apply_to_wall_clock(&self, local: NaiveDateTime) -> Result<NaiveDateTime> {
        let months = i64::from(self.years) * 12 + i64::from(self.months);
        let days = self
            .weeks
            .checked_mul(7)
            .and_then(|d| d.checked_add(self.days))
            .ok_or_else(|| Error::OutOfRange(format!("{} weeks {} days", self.weeks, self.days)))?;
        let local = shift_months(local, months)?;
        shift_days(local, days)
    }

    fn is_calendar_zero(&self) -> bool {
        self.years == 0 && self.months == 0 && self.weeks == 0 && self.days == 0
    }
}

impl Delta {
    pub fn years(n: i32) -> Self {
        Delta::Calendar(CalendarSpan {
            years: n,
            ..Default::default()
        })
    }

    pub fn months(n: i32) -> Self {
        Delta::Calendar(CalendarSpan {
            months: n,
            ..Default::default()
        })
    }

    pub fn weeks(n: i64) -> Self {
        Delta::Calendar(CalendarSpan {
            weeks: n,
            ..Default::default()
        })
    }

    pub fn days(n: i64) -> Self {
        Delta::Calendar(CalendarSpan {
            days: n,
            ..Default::default()
        })
    }

    /// # Panics
    ///
    /// Panics when `n` hours is out of the range of [`TimeDelta`]; see
    /// [`Delta::try_hours`].
    pub fn hours(n: i64) -> Self {
        Delta::Fixed(TimeDelta::hours(n))
    }

    pub fn try_hours(n: i64) -> Option<Self> {
        TimeDelta::try_hours(n).map(Delta::Fixed)
    }

    /// # Panics
    ///
    /// Panics when `n` minutes is out of the range of [`TimeDelta`]; see
    /// [`Delta::try_minutes`].
    pub fn minutes(n: i64) -> Self {
        Delta::Fixed(TimeDelta::minutes(n))
    }

    pub fn try_minutes(n: i64) -> Option<Self> {
        TimeDelta::try_minutes(n).map(Delta::Fixed)
    }

    /// # Panics
    ///
    /// Panics when `n` seconds is out of the range of [`TimeDelta`]; see
    /// [`Delta::try_seconds`].
    pub fn seconds(n: i64) -> Self {
        Delta::Fixed(TimeDelta::seconds(n))
    }

    pub fn try_seconds(n: i64) -> Option<Self> {
        TimeDelta::try_seconds(n).map(Delta::Fixed)
    }

    /// # Panics
    ///
    /// Panics when `n` milliseconds is out of the range of [`TimeDelta`]; see
    /// [`Delta::try_milliseconds`].
    pub fn milliseconds(n: i64) -> Self {
        Delta::Fixed(TimeDelta::milliseconds(n))
    }

    pub fn try_milliseconds(n: i64) -> Option<Self> {
        TimeDelta::try_milliseconds(n).map(Delta::Fixed)
    }

    pub fn microseconds(n: i64) -> Self {
        Delta::Fixed(TimeDelta::microseconds(n))
    }

    pub fn zero() -> Self {
        Delta::Fixed(TimeDelta::zero())
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Delta::Fixed(td) => td.is_zero(),
            Delta::Calendar(span) => span.is_calendar_zero() && span.fixed.is_zero(),
        }
    }

    /// Component-wise sum, or `None` when a component overflows.
    pub fn checked_add(self, rhs: Delta) -> Option<Delta> {
        let (a, b) = (self.into_span(), rhs.into_span());
        Some(Delta::from_span(CalendarSpan {
            years: a.years.checked_add(b.years)?,
            months: a.months.checked_add(b.months)?,
            weeks: a.weeks.checked_add(b.weeks)?,
            days: a.days.checked_add(b.days)?,
            fixed: a.fixed.checked_add(&b.fixed)?,
        }))
    }

    /// Component-wise sum, clamping each component at its bounds.
    pub fn saturating_add(self, rhs: Delta) -> Delta {
        let (a, b) = (self.into_span(), rhs.into_span());
        let fixed = a.fixed.checked_add(&b.fixed).unwrap_or(if b.fixed < TimeDelta::zero() {
            TimeDelta::MIN
        } else {
            TimeDelta::MAX
        });
        Delta::from_span(CalendarSpan {
            years: a.years.saturating_add(b.years),
            months: a.months.saturating_add(b.months),
            weeks: a.weeks.saturating_add(b.weeks),
            days: a.days.saturating_add(b.days),
            fixed,
        })
    }

    /// The part of the duration that is exact elapsed time.
    pub fn elapsed(&self) -> TimeDelta {
        match self {
            Delta::Fixed(td) => *td,
            Delta::Calendar(span) => span.fixed,
        }
    }

    /// Apply the calendar part to a wall-clock reading. Fixed spans leave
    /// the wall clock alone.
    pub fn apply_to_wall_clock(&self, local: NaiveDateTime) -> Result<NaiveDateTime> {
        match self {
            Delta::Fixed(_) => Ok(local),
            Delta::Calendar(span) => span.apply_to_wall_clock(local),
        }
    }

    fn into_span(self) -> CalendarSpan {
        match self {
            Delta::Fixed(td) => CalendarSpan {
                fixed: td,
                ..Default::default()
            },
            Delta::Calendar(span) => span,
        }
    }

    fn from_span(span: CalendarSpan) -> Self {
        if span.is_calendar_zero() {
            Delta::Fixed(span.fixed)
        } else {
            Delta::Calendar(span)
        }
    }
}

impl Default for Delta {
    fn default() -> Self {
        Delta::zero()
    }
}

impl From<TimeDelta> for Delta {
    fn from(td: TimeDelta) -> Self {
        Delta::Fixed(td)
    }
}

/// Saturates like [`Delta::saturating_add`]. Use [`Delta::checked_add`] to
/// detect overflow.
impl Add for Delta {
    type Output = Delta;

    fn add(self, rhs: Delta) -> Delta {
        self.saturating_add(rhs)
    }
}

impl Neg for Delta {
    type Output = Delta;

    fn neg(self) -> Delta {
        match self {
            Delta::Fixed(td) => Delta::Fixed(-td),
            Delta::Calendar(span) => Delta::Calendar(CalendarSpan {
                years: span.years.saturating_neg(),
                months: span.months.saturating_neg(),
                weeks: span.weeks.saturating_neg(),
                days: span.days.saturating_neg(),
                fixed: -span.fixed,
            }),
        }
    }
}

pub(crate) fn shift_months(local: NaiveDateTime, months: i64) -> Result<NaiveDateTime> {
    let n = u32::try_from(months.unsigned_abs())
        .map_err(|_| Error::OutOfRange(format!("{months} months")))?;
    let shifted = if months >= 0 {
        local.checked_add_months(Months::new(n))
    } else {
        local.checked_sub_months(Months::new(n))
    };
    shifted.ok_or_else(|| Error::OutOfRange(format!("'{local}' {months:+} months")))
}

pub(crate) fn shift_days(local: NaiveDateTime, days: i64) -> Result<NaiveDateTime> {
    let n = Days::new(days.unsigned_abs());
    let shifted = if days >= 0 {
        local.checked_add_days(n)
    } else {
        local.checked_sub_days(n)
    };
    shifted.ok_or_else(|| Error::OutOfRange(format!("'{local}' {days:+} days")))
}

// ── Text form ───────────────────────────────────────────────────────────────

impl FromStr for Delta {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_delta(s)
    }
}

/// Parse a duration string (e.g., "+2h", "-1mo", "+1w2d", "+1d-30m").
fn parse_delta(s: &str) -> Result<Delta> {
    let s = s.trim();
    if s.is_empty() {
        return Err(Error::InvalidDuration("empty duration".to_string()));
    }
    if !s.starts_with(['+', '-']) {
        return Err(Error::InvalidDuration(format!(
            "duration must start with '+' or '-': '{s}'"
        )));
    }

    let mut span = CalendarSpan::default();
    let mut years = 0i64;
    let mut months = 0i64;
    let mut sign = 1i64;
    let mut found_any = false;
    let mut chars = s.chars().peekable();

    while let Some(&ch) = chars.peek() {
        match ch {
            '+' | '-' => {
                sign = if ch == '+' { 1 } else { -1 };
                chars.next();
                if !chars.peek().is_some_and(char::is_ascii_digit) {
                    return Err(Error::InvalidDuration(format!(
                        "sign must be followed by a number in '{s}'"
                    )));
                }
                continue;
            }
            c if c.is_ascii_digit() => {}
            c => {
                return Err(Error::InvalidDuration(format!(
                    "expected number before '{c}' in '{s}'"
                )));
            }
        }

        let mut num_buf = String::new();
        while let Some(&c) = chars.peek().filter(|c| c.is_ascii_digit()) {
            num_buf.push(c);
            chars.next();
        }
        let mut unit = String::new();
        while let Some(&c) = chars.peek().filter(|c| c.is_ascii_alphabetic()) {
            unit.push(c.to_ascii_lowercase());
            chars.next();
        }
        if unit.is_empty() {
            return Err(Error::InvalidDuration(format!(
                "number without unit in '{s}'"
            )));
        }

        let n: i64 = num_buf
            .parse::<i64>()
            .ok()
            .and_then(|n| n.checked_mul(sign))
            .ok_or_else(|| Error::InvalidDuration(format!("invalid number in '{s}'")))?;
        let overflow = || Error::InvalidDuration(format!("'{s}' is out of range"));
        found_any = true;

        let fixed = match unit.as_str() {
            "y" => {
                years = years.checked_add(n).ok_or_else(overflow)?;
                continue;
            }
            "mo" => {
                months = months.checked_add(n).ok_or_else(overflow)?;
                continue;
            }
            "w" => {
                span.weeks = span.weeks.checked_add(n).ok_or_else(overflow)?;
                continue;
            }
            "d" => {
                span.days = span.days.checked_add(n).ok_or_else(overflow)?;
                continue;
            }
            "h" => n.checked_mul(3600).and_then(TimeDelta::try_seconds),
            "m" => n.checked_mul(60).and_then(TimeDelta::try_seconds),
            "s" => TimeDelta::try_seconds(n),
            "ms" => TimeDelta::try_milliseconds(n),
            "us" => Some(TimeDelta::microseconds(n)),
            "ns" => Some(TimeDelta::nanoseconds(n)),
            _ => {
                return Err(Error::InvalidDuration(format!(
                    "unknown unit '{unit}' in '{s}'"
                )));
            }
        };
        span.fixed = fixed
            .and_then(|td| span.fixed.checked_add(&td))
            .ok_or_else(overflow)?;
    }

    if !found_any {
        return Err(Error::InvalidDuration(format!(
            "duration has no components: '{s}'"
        )));
    }

    span.years = i32::try_from(years)
        .map_err(|_| Error::InvalidDuration(format!("'{s}' is out of range")))?;
    span.months = i32::try_from(months)
        .map_err(|_| Error::InvalidDuration(format!("'{s}' is out of range")))?;
    Ok(Delta::from_span(span))
}

impl fmt::Display for Delta {
    /// Normalized text form, e.g. "+1mo2d" or "+1d-30m".
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let span = self.into_span();
        let mut parts: Vec<(i64, &str)> = vec![
            (i64::from(span.years), "y"),
            (i64::from(span.months), "mo"),
            (span.weeks, "w"),
            (span.days, "d"),
        ];

        let negative = span.fixed < TimeDelta::zero();
        let abs = if negative { -span.fixed } else { span.fixed };
        let secs = abs.num_seconds();
        let nanos = i64::from(abs.subsec_nanos());
        let sign = if negative { -1 } else { 1 };
        parts.extend([
            (sign * (secs / 3600), "h"),
            (sign * (secs % 3600 / 60), "m"),
            (sign * (secs % 60), "s"),
            (sign * (nanos / 1_000_000), "ms"),
            (sign * (nanos / 1_000 % 1_000), "us"),
            (sign * (nanos % 1_000), "ns"),
        ]);

        let mut current: Option<bool> = None;
        for (n, unit) in parts.into_iter().filter(|(n, _)| *n != 0) {
            let positive = n > 0;
            if current != Some(positive) {
                f.write_str(if positive { "+" } else { "-" })?;
                current = Some(positive);
            }
            write!(f, "{}{unit}", n.unsigned_abs())?;
        }
        if current.is_none() {
            f.write_str("+0s")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn naive(y: i32, mo: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    // ── wall-clock application ──────────────────────────────────────────

    #[test]
    fn test_month_clamps_to_end_of_month() {
        let out = Delta::months(1).apply_to_wall_clock(naive(2013, 1, 31, 5)).unwrap();
        assert_eq!(out, naive(2013, 2, 28, 5));
    }

    #[test]
    fn test_year_from_leap_day() {
        let out = Delta::years(1).apply_to_wall_clock(naive(2012, 2, 29, 0)).unwrap();
        assert_eq!(out, naive(2013, 2, 28, 0));
    }

    #[test]
    fn test_months_before_days() {
        let delta = Delta::months(1) + Delta::days(1);
        let out = delta.apply_to_wall_clock(naive(2013, 1, 31, 0)).unwrap();
        assert_eq!(out, naive(2013, 3, 1, 0));
    }

    #[test]
    fn test_negative_weeks() {
        let out = Delta::weeks(-4).apply_to_wall_clock(naive(2013, 3, 29, 20)).unwrap();
        assert_eq!(out, naive(2013, 3, 1, 20));
    }

    #[test]
    fn test_fixed_leaves_wall_clock() {
        let out = Delta::hours(5).apply_to_wall_clock(naive(2013, 3, 1, 0)).unwrap();
        assert_eq!(out, naive(2013, 3, 1, 0));
        assert_eq!(Delta::hours(5).elapsed(), TimeDelta::hours(5));
    }

    #[test]
    fn test_out_of_range_month_shift() {
        let err = Delta::years(i32::MAX)
            .apply_to_wall_clock(naive(2013, 1, 1, 0))
            .unwrap_err();
        assert!(matches!(err, Error::OutOfRange(_)), "got: {err}");
    }

    // ── composition ─────────────────────────────────────────────────────

    #[test]
    fn test_add_fixed_stays_fixed() {
        assert_eq!(
            Delta::hours(1) + Delta::minutes(30),
            Delta::Fixed(TimeDelta::minutes(90))
        );
    }

    #[test]
    fn test_add_calendar_and_fixed() {
        let delta = Delta::days(1) + Delta::hours(2);
        assert_eq!(
            delta,
            Delta::Calendar(CalendarSpan {
                days: 1,
                fixed: TimeDelta::hours(2),
                ..Default::default()
            })
        );
        assert_eq!(delta.elapsed(), TimeDelta::hours(2));
    }

    #[test]
    fn test_neg() {
        assert_eq!(-Delta::weeks(2), Delta::weeks(-2));
        assert_eq!(-Delta::hours(2), Delta::hours(-2));
    }

    #[test]
    fn test_neg_saturates() {
        assert_eq!(-Delta::years(i32::MIN), Delta::years(i32::MAX));
        assert_eq!(-Delta::days(i64::MIN), Delta::days(i64::MAX));
    }

    #[test]
    fn test_checked_add_overflow() {
        let most: Delta = "+2147483647mo".parse().unwrap();
        assert_eq!(most.checked_add(Delta::months(1)), None);
        assert_eq!(
            Delta::hours(1).checked_add(Delta::Fixed(TimeDelta::MAX)),
            None
        );
        assert_eq!(
            Delta::days(1).checked_add(Delta::hours(2)),
            Some(Delta::days(1) + Delta::hours(2))
        );
    }

    #[test]
    fn test_add_saturates() {
        let most: Delta = "+2147483647mo".parse().unwrap();
        assert_eq!(most + Delta::months(1), Delta::months(i32::MAX));
        assert_eq!(
            Delta::Fixed(TimeDelta::MIN) + Delta::hours(-1),
            Delta::Fixed(TimeDelta::MIN)
        );
    }

    #[test]
    fn test_try_fixed_constructors() {
        assert_eq!(Delta::try_hours(i64::MAX / 1000), None);
        assert_eq!(Delta::try_minutes(i64::MAX), None);
        assert_eq!(Delta::try_seconds(i64::MAX), None);
        assert_eq!(Delta::try_milliseconds(i64::MIN), None);
        assert_eq!(Delta::try_hours(2), Some(Delta::hours(2)));
    }

    #[test]
    fn test_zero() {
        assert!(Delta::zero().is_zero());
        assert!(Delta::default().is_zero());
        assert!(!Delta::days(1).is_zero());
    }

    // ── text form ───────────────────────────────────────────────────────

    #[test]
    fn test_parse_hours() {
        assert_eq!("+2h".parse::<Delta>().unwrap(), Delta::hours(2));
    }

    #[test]
    fn test_parse_compound() {
        let delta: Delta = "+1mo2w3d4h5m6s".parse().unwrap();
        let expected = Delta::months(1)
            + Delta::weeks(2)
            + Delta::days(3)
            + Delta::hours(4)
            + Delta::minutes(5)
            + Delta::seconds(6);
        assert_eq!(delta, expected);
    }

    #[test]
    fn test_parse_negative() {
        assert_eq!("-1y".parse::<Delta>().unwrap(), Delta::years(-1));
        assert_eq!("-30m".parse::<Delta>().unwrap(), Delta::minutes(-30));
    }

    #[test]
    fn test_parse_mixed_signs() {
        let delta: Delta = "+1d-30m".parse().unwrap();
        assert_eq!(delta, Delta::days(1) + Delta::minutes(-30));
    }

    #[test]
    fn test_parse_sub_second_units() {
        let delta: Delta = "+1s250ms10us".parse().unwrap();
        assert_eq!(delta, Delta::Fixed(TimeDelta::microseconds(1_250_010)));
    }

    #[test]
    fn test_parse_errors() {
        for input in [
            "", "2h", "+", "+h", "+2", "+2x", "+99999999999y", "+1d+", "+1d-", "+-1d",
        ] {
            let err = input.parse::<Delta>().unwrap_err();
            assert!(
                matches!(err, Error::InvalidDuration(_)),
                "input {input:?} got: {err}"
            );
        }
    }

    #[test]
    fn test_display_normalized() {
        assert_eq!(Delta::hours(26).to_string(), "+26h");
        assert_eq!((Delta::weeks(2) + Delta::days(1)).to_string(), "+2w1d");
        assert_eq!(Delta::minutes(-90).to_string(), "-1h30m");
        assert_eq!((Delta::days(1) + Delta::minutes(-30)).to_string(), "+1d-30m");
        assert_eq!(Delta::zero().to_string(), "+0s");
    }

    #[test]
    fn test_display_parses_back() {
        let delta = Delta::years(1) + Delta::months(-2) + Delta::milliseconds(1500);
        assert_eq!(delta.to_string().parse::<Delta>().unwrap(), delta);
    }
}
