//! Point-in-time values in their three shapes: calendar date, naive
//! wall-clock reading, and zone-aware datetime.
//!
//! Naive readings and dates carry no zone. Every operation in this crate
//! reads them as UTC and hands them back in the same shape they came in.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

use crate::convert::strip_if_requested;
use crate::error::Result;
use crate::zone::ZoneRule;

/// A point in time, naive or aware.
#[derive(Debug, Clone, PartialEq)]
pub enum Moment<Z: TimeZone = Utc> {
    /// A calendar date, read as midnight UTC.
    Date(NaiveDate),
    /// A wall-clock reading without a zone, read as UTC.
    Naive(NaiveDateTime),
    /// A reading anchored in a zone.
    Aware(DateTime<Z>),
}

impl<Z: TimeZone> Moment<Z> {
    /// True for dates and naive readings.
    pub fn is_naive(&self) -> bool {
        !matches!(self, Moment::Aware(_))
    }

    pub fn aware(&self) -> Option<&DateTime<Z>> {
        match self {
            Moment::Aware(dt) => Some(dt),
            _ => None,
        }
    }

    /// The wall-clock reading, in the moment's own zone when aware.
    pub fn naive_local(&self) -> NaiveDateTime {
        match self {
            Moment::Date(date) => midnight(*date),
            Moment::Naive(local) => *local,
            Moment::Aware(dt) => dt.naive_local(),
        }
    }

    /// The absolute instant this moment denotes.
    pub fn instant(&self) -> DateTime<Utc> {
        match self {
            Moment::Date(date) => midnight(*date).and_utc(),
            Moment::Naive(local) => local.and_utc(),
            Moment::Aware(dt) => dt.with_timezone(&Utc),
        }
    }
}

impl<Z: ZoneRule> Moment<Z> {
    /// Run `op` on the aware form of this moment and restore the shape.
    ///
    /// Naive readings and dates are anchored in UTC for the duration of the
    /// operation and come back naive. Aware results are stripped only when
    /// `return_naive` is set.
    pub(crate) fn apply<O: AwareOp>(self, op: &O, return_naive: bool) -> Result<Self> {
        match self {
            Moment::Aware(dt) => op
                .apply(&dt)
                .map(|out| strip_if_requested(Moment::Aware(out), return_naive)),
            Moment::Naive(local) => op
                .apply(&local.and_utc())
                .map(|out| Moment::Naive(out.naive_utc())),
            Moment::Date(date) => op
                .apply(&midnight(date).and_utc())
                .map(|out| Moment::Date(out.date_naive())),
        }
    }
}

/// An operation over aware datetimes that keeps the input's zone.
pub(crate) trait AwareOp {
    fn apply<A: ZoneRule>(&self, dt: &DateTime<A>) -> Result<DateTime<A>>;
}

impl<Z: TimeZone> From<NaiveDateTime> for Moment<Z> {
    fn from(local: NaiveDateTime) -> Self {
        Moment::Naive(local)
    }
}

impl<Z: TimeZone> From<NaiveDate> for Moment<Z> {
    fn from(date: NaiveDate) -> Self {
        Moment::Date(date)
    }
}

impl<Z: TimeZone> From<DateTime<Z>> for Moment<Z> {
    fn from(dt: DateTime<Z>) -> Self {
        Moment::Aware(dt)
    }
}

impl<Z: TimeZone> fmt::Display for Moment<Z>
where
    Z::Offset: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Moment::Date(date) => write!(f, "{date}"),
            Moment::Naive(local) => write!(f, "{local}"),
            Moment::Aware(dt) => write!(f, "{dt}"),
        }
    }
}

/// Anything the arithmetic operations accept as input.
///
/// Naive inputs use [`Utc`] as their zone, which is the naive-as-UTC
/// contract expressed in the type system.
pub trait Point {
    type Zone: ZoneRule;

    fn into_moment(self) -> Moment<Self::Zone>;
}

impl Point for NaiveDateTime {
    type Zone = Utc;

    fn into_moment(self) -> Moment<Utc> {
        Moment::Naive(self)
    }
}

impl Point for NaiveDate {
    type Zone = Utc;

    fn into_moment(self) -> Moment<Utc> {
        Moment::Date(self)
    }
}

impl<Z: ZoneRule> Point for DateTime<Z> {
    type Zone = Z;

    fn into_moment(self) -> Moment<Z> {
        Moment::Aware(self)
    }
}

impl<Z: ZoneRule> Point for Moment<Z> {
    type Zone = Z;

    fn into_moment(self) -> Moment<Z> {
        self
    }
}

pub(crate) fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}
