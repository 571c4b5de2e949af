//! Adding durations on the wall clock of a zone.

use chrono::DateTime;

use crate::convert::{Within, ZoneOptions};
use crate::delta::Delta;
use crate::error::{Error, Result};
use crate::moment::{AwareOp, Moment, Point};
use crate::normalize::{dst_normalize, Reading};
use crate::zone::ZoneRule;

/// Add `delta` to `point`.
///
/// The calendar part of `delta` moves the wall clock of the point's zone,
/// or of `options.within` when given, and the result is re-anchored there
/// before the fixed part is added as elapsed time. Adding two weeks to
/// midnight therefore lands on midnight even when a DST change lies in
/// between.
///
/// Naive inputs are read as UTC and returned naive.
///
/// # Errors
///
/// Returns [`Error::OutOfRange`] if the result does not fit in a datetime.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use chrono_tz::US::Eastern;
/// use wallclock::{add_timedelta, Delta, Moment, ZoneOptions};
///
/// // Midnight in New York, as naive UTC
/// let start = NaiveDate::from_ymd_opt(2013, 3, 1).unwrap().and_hms_opt(5, 0, 0).unwrap();
/// let out = add_timedelta(start, &Delta::weeks(2), &ZoneOptions::new().within(Eastern)).unwrap();
///
/// // Still midnight in New York, which is now UTC-4
/// let expected = NaiveDate::from_ymd_opt(2013, 3, 15).unwrap().and_hms_opt(4, 0, 0).unwrap();
/// assert_eq!(out, Moment::Naive(expected));
/// ```
pub fn add_timedelta<P: Point>(
    point: P,
    delta: &Delta,
    options: &ZoneOptions,
) -> Result<Moment<P::Zone>> {
    let op = AddDelta { delta };
    point.into_moment().apply(
        &Within {
            zone: options.within,
            op: &op,
        },
        options.return_naive,
    )
}

struct AddDelta<'a> {
    delta: &'a Delta,
}

impl AwareOp for AddDelta<'_> {
    fn apply<A: ZoneRule>(&self, dt: &DateTime<A>) -> Result<DateTime<A>> {
        let wall = self.delta.apply_to_wall_clock(dt.naive_local())?;
        let anchored = dst_normalize(&Reading::of(dt).with_local(wall))?;
        anchored
            .checked_add_signed(self.delta.elapsed())
            .ok_or_else(|| Error::OutOfRange(format!("'{}' + {}", dt.naive_utc(), self.delta)))
    }
}
