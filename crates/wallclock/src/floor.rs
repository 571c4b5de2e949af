//! Rounding down and up to interval boundaries.
//!
//! An [`Interval`] maps units to strides: `month=3` means "every third
//! month, counted from January", `day=4` means "days 1, 5, 9, ... of the
//! month". Flooring walks the fields of the wall clock from year down to
//! microsecond:
//!
//! - a field with a stride is rounded down to a multiple of the stride,
//!   counted from the field's first value (1 for month and day, 0 otherwise);
//! - a field without a stride below one that was rounded is reset to its
//!   first value;
//! - a field without a stride above every rounded one is kept.
//!
//! `week` always has stride 1 and moves back to Monday 00:00. It replaces
//! the year, month and day fields, so strides for those are ignored when a
//! week is given; smaller units still apply.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike};
use serde::{Deserialize, Serialize};

use crate::convert::{Within, ZoneOptions};
use crate::delta::{shift_days, shift_months};
use crate::error::{Error, Result};
use crate::moment::{AwareOp, Moment, Point};
use crate::normalize::{dst_normalize, Reading};
use crate::zone::ZoneRule;

/// A unit of an [`Interval`], ordered from largest to smallest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Year,
    Month,
    Week,
    Day,
    Hour,
    Minute,
    Second,
    Microsecond,
}

impl Unit {
    pub const ALL: [Unit; 8] = [
        Unit::Year,
        Unit::Month,
        Unit::Week,
        Unit::Day,
        Unit::Hour,
        Unit::Minute,
        Unit::Second,
        Unit::Microsecond,
    ];

    /// Units that are fields of a wall-clock reading, largest first.
    const FIELDS: [Unit; 7] = [
        Unit::Year,
        Unit::Month,
        Unit::Day,
        Unit::Hour,
        Unit::Minute,
        Unit::Second,
        Unit::Microsecond,
    ];

    /// The first value of the field: 1 for month and day, 0 otherwise.
    pub fn epoch(self) -> i64 {
        match self {
            Unit::Month | Unit::Day => 1,
            _ => 0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Unit::Year => "year",
            Unit::Month => "month",
            Unit::Week => "week",
            Unit::Day => "day",
            Unit::Hour => "hour",
            Unit::Minute => "minute",
            Unit::Second => "second",
            Unit::Microsecond => "microsecond",
        }
    }

    /// Move a wall-clock reading by `n` of this unit.
    pub fn advance(self, local: NaiveDateTime, n: i64) -> Result<NaiveDateTime> {
        let overflow = || Error::OutOfRange(format!("'{local}' + {n} {}", self.name()));
        let elapsed = match self {
            Unit::Year => return shift_months(local, n.checked_mul(12).ok_or_else(overflow)?),
            Unit::Month => return shift_months(local, n),
            Unit::Week => return shift_days(local, n.checked_mul(7).ok_or_else(overflow)?),
            Unit::Day => return shift_days(local, n),
            Unit::Hour => TimeDelta::try_hours(n),
            Unit::Minute => TimeDelta::try_minutes(n),
            Unit::Second => TimeDelta::try_seconds(n),
            Unit::Microsecond => Some(TimeDelta::microseconds(n)),
        };
        elapsed
            .and_then(|td| local.checked_add_signed(td))
            .ok_or_else(overflow)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Unit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "year" | "years" => Ok(Unit::Year),
            "month" | "months" => Ok(Unit::Month),
            "week" | "weeks" => Ok(Unit::Week),
            "day" | "days" => Ok(Unit::Day),
            "hour" | "hours" => Ok(Unit::Hour),
            "minute" | "minutes" => Ok(Unit::Minute),
            "second" | "seconds" => Ok(Unit::Second),
            "microsecond" | "microseconds" => Ok(Unit::Microsecond),
            _ => Err(Error::InvalidInterval(format!("unknown unit '{}'", s.trim()))),
        }
    }
}

/// Strides per unit for [`floor`] and [`ceil`].
///
/// Serializes as a map, e.g. `{"month": 3, "day": 1}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Interval {
    strides: BTreeMap<Unit, i64>,
}

impl Interval {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn of(unit: Unit, stride: i64) -> Self {
        Self::new().with(unit, stride)
    }

    pub fn with(mut self, unit: Unit, stride: i64) -> Self {
        self.strides.insert(unit, stride);
        self
    }

    pub fn year(self, stride: i64) -> Self {
        self.with(Unit::Year, stride)
    }

    pub fn month(self, stride: i64) -> Self {
        self.with(Unit::Month, stride)
    }

    pub fn week(self, stride: i64) -> Self {
        self.with(Unit::Week, stride)
    }

    pub fn day(self, stride: i64) -> Self {
        self.with(Unit::Day, stride)
    }

    pub fn hour(self, stride: i64) -> Self {
        self.with(Unit::Hour, stride)
    }

    pub fn minute(self, stride: i64) -> Self {
        self.with(Unit::Minute, stride)
    }

    pub fn second(self, stride: i64) -> Self {
        self.with(Unit::Second, stride)
    }

    pub fn microsecond(self, stride: i64) -> Self {
        self.with(Unit::Microsecond, stride)
    }

    pub fn get(&self, unit: Unit) -> Option<i64> {
        self.strides.get(&unit).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.strides.is_empty()
    }

    /// Units and strides, largest unit first.
    pub fn iter(&self) -> impl Iterator<Item = (Unit, i64)> + '_ {
        self.strides.iter().map(|(unit, stride)| (*unit, *stride))
    }

    /// The largest unit with its stride.
    pub fn largest(&self) -> Option<(Unit, i64)> {
        self.iter().next()
    }

    /// Strides must be positive and a week stride must be 1.
    pub fn validate(&self) -> Result<()> {
        for (unit, stride) in self.iter() {
            if stride <= 0 {
                return Err(Error::InvalidInterval(format!(
                    "{unit} stride must be positive, got {stride}"
                )));
            }
            if unit == Unit::Week && stride != 1 {
                return Err(Error::InvalidInterval(format!(
                    "week stride can only be 1, got {stride}"
                )));
            }
        }
        Ok(())
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .iter()
            .map(|(unit, stride)| format!("{unit}={stride}"))
            .collect();
        f.write_str(&parts.join(","))
    }
}

impl FromStr for Interval {
    type Err = Error;

    /// Parse `unit=stride` pairs separated by commas, e.g. `month=3,day=1`.
    /// A bare unit means stride 1.
    fn from_str(s: &str) -> Result<Self> {
        let mut interval = Interval::new();
        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (unit, stride) = match part.split_once('=') {
                Some((unit, stride)) => {
                    let stride = stride.trim().parse::<i64>().map_err(|_| {
                        Error::InvalidInterval(format!("invalid stride in '{part}'"))
                    })?;
                    (unit.parse::<Unit>()?, stride)
                }
                None => (part.parse::<Unit>()?, 1),
            };
            if interval.get(unit).is_some() {
                return Err(Error::InvalidInterval(format!("duplicate unit '{unit}'")));
            }
            interval = interval.with(unit, stride);
        }
        interval.validate()?;
        Ok(interval)
    }
}

/// Round `point` down to the start of `interval`.
///
/// With `options.within`, the wall clock of that zone is rounded and the
/// boundary is converted back to the point's zone. An empty interval
/// returns the point unchanged.
///
/// # Errors
///
/// Returns [`Error::InvalidInterval`] for a non-positive stride or a week
/// stride other than 1, and [`Error::InvalidDatetime`] when the rounded
/// fields name a day that does not exist (e.g. April 31).
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use wallclock::{floor, Interval, Moment, ZoneOptions};
///
/// let may = NaiveDate::from_ymd_opt(2013, 5, 2).unwrap().and_hms_opt(7, 30, 0).unwrap();
/// let quarter = floor(may, &Interval::new().month(3), &ZoneOptions::new()).unwrap();
/// let april = NaiveDate::from_ymd_opt(2013, 4, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
/// assert_eq!(quarter, Moment::Naive(april));
/// ```
pub fn floor<P: Point>(
    point: P,
    interval: &Interval,
    options: &ZoneOptions,
) -> Result<Moment<P::Zone>> {
    interval.validate()?;
    let op = FloorOp {
        interval,
        step: None,
    };
    point.into_moment().apply(
        &Within {
            zone: options.within,
            op: &op,
        },
        options.return_naive,
    )
}

/// Round `point` up to the next boundary of `interval`.
///
/// A point already on a boundary is returned unchanged. Otherwise the
/// floor is moved forward by the stride of the largest unit on the wall
/// clock before being re-anchored.
///
/// # Errors
///
/// Same as [`floor`].
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use wallclock::{ceil, Interval, Moment, ZoneOptions};
///
/// let new_year = NaiveDate::from_ymd_opt(2013, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
/// let out = ceil(new_year, &Interval::new().year(1), &ZoneOptions::new()).unwrap();
/// assert_eq!(out, Moment::Naive(new_year));
/// ```
pub fn ceil<P: Point>(
    point: P,
    interval: &Interval,
    options: &ZoneOptions,
) -> Result<Moment<P::Zone>> {
    interval.validate()?;
    let op = FloorOp {
        interval,
        step: interval.largest(),
    };
    point.into_moment().apply(
        &Within {
            zone: options.within,
            op: &op,
        },
        options.return_naive,
    )
}

struct FloorOp<'a> {
    interval: &'a Interval,
    /// Wall-clock step added when flooring moved the reading.
    step: Option<(Unit, i64)>,
}

impl AwareOp for FloorOp<'_> {
    fn apply<A: ZoneRule>(&self, dt: &DateTime<A>) -> Result<DateTime<A>> {
        let local = dt.naive_local();
        let mut floored = floor_wall_clock(local, self.interval)?;
        if let Some((unit, stride)) = self.step {
            if floored != local {
                floored = unit.advance(floored, stride)?;
            }
        }
        dst_normalize(&Reading::of(dt).with_local(floored))
    }
}

/// Floor the fields of a wall-clock reading. Strides must be validated.
pub(crate) fn floor_wall_clock(local: NaiveDateTime, interval: &Interval) -> Result<NaiveDateTime> {
    if interval.is_empty() {
        return Ok(local);
    }

    let mut local = local;
    let mut floor_seen = false;
    let mut first_field = 0;
    if interval.get(Unit::Week).is_some() {
        let since_monday = local.weekday().num_days_from_monday();
        local = shift_days(local, -i64::from(since_monday))?;
        floor_seen = true;
        first_field = 3;
    }

    let mut fields = [
        i64::from(local.year()),
        i64::from(local.month()),
        i64::from(local.day()),
        i64::from(local.hour()),
        i64::from(local.minute()),
        i64::from(local.second()),
        i64::from(local.nanosecond() / 1_000),
    ];
    for (i, unit) in Unit::FIELDS.iter().enumerate().skip(first_field) {
        match interval.get(*unit) {
            Some(stride) => {
                floor_seen = true;
                fields[i] -= (fields[i] - unit.epoch()).rem_euclid(stride);
            }
            None if floor_seen => fields[i] = unit.epoch(),
            None => {}
        }
    }

    let [year, month, day, hour, minute, second, micro] = fields;
    let invalid = || {
        Error::InvalidDatetime(format!(
            "{year:04}-{month:02}-{day:02} {hour:02}:{minute:02}:{second:02}.{micro:06} does not exist"
        ))
    };
    let date = i32::try_from(year)
        .ok()
        .zip(u32::try_from(month).ok())
        .zip(u32::try_from(day).ok())
        .and_then(|((y, m), d)| NaiveDate::from_ymd_opt(y, m, d))
        .ok_or_else(invalid)?;
    let time = NaiveTime::from_hms_micro_opt(
        u32::try_from(hour).map_err(|_| invalid())?,
        u32::try_from(minute).map_err(|_| invalid())?,
        u32::try_from(second).map_err(|_| invalid())?,
        u32::try_from(micro).map_err(|_| invalid())?,
    )
    .ok_or_else(invalid)?;
    Ok(date.and_time(time))
}
