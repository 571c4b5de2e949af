//! Attaching, stripping and converting zones.
//!
//! Every operation that crosses a zone boundary goes through
//! [`convert_to_tz`], so naive inputs are always read as UTC and aware
//! inputs keep their absolute instant.

use chrono::{DateTime, TimeZone};
use chrono_tz::Tz;

use crate::error::Result;
use crate::moment::{midnight, AwareOp, Moment, Point};
use crate::zone::ZoneRule;

/// Options shared by [`add_timedelta`](crate::add_timedelta),
/// [`floor`](fn@crate::floor) and [`ceil`](fn@crate::ceil).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ZoneOptions {
    /// Do the arithmetic on the wall clock of this zone instead of the
    /// input's own zone.
    pub within: Option<Tz>,
    /// Strip the zone from aware results. Naive inputs always come back naive.
    pub return_naive: bool,
}

impl ZoneOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn within(mut self, zone: Tz) -> Self {
        self.within = Some(zone);
        self
    }

    pub fn naive(mut self) -> Self {
        self.return_naive = true;
        self
    }
}

/// Attach `zone` to a naive reading; aware inputs are returned unchanged.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use wallclock::attach_tz_if_none;
///
/// let local = NaiveDate::from_ymd_opt(2013, 2, 4).unwrap().and_hms_opt(0, 0, 0).unwrap();
/// let dt = attach_tz_if_none(local, &chrono_tz::US::Eastern).unwrap();
/// assert_eq!(dt.to_rfc3339(), "2013-02-04T00:00:00-05:00");
/// ```
pub fn attach_tz_if_none<Z: ZoneRule>(
    point: impl Into<Moment<Z>>,
    zone: &Z,
) -> Result<DateTime<Z>> {
    match point.into() {
        Moment::Aware(dt) => Ok(dt),
        Moment::Naive(local) => zone.localize(&local),
        Moment::Date(date) => zone.localize(&midnight(date)),
    }
}

/// Drop the zone of an aware moment when `want_naive` is set.
///
/// The wall-clock reading is kept as is.
pub fn strip_if_requested<Z: TimeZone>(point: Moment<Z>, want_naive: bool) -> Moment<Z> {
    match point {
        Moment::Aware(dt) if want_naive => Moment::Naive(dt.naive_local()),
        other => other,
    }
}

/// Express `point` in `zone`.
///
/// Naive inputs (and dates) are read as UTC. The result is aware unless
/// `return_naive` is set, in which case it is the wall-clock reading in
/// `zone`.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use chrono_tz::US::{Central, Eastern};
/// use wallclock::{convert_to_tz, Moment};
///
/// let utc = NaiveDate::from_ymd_opt(2013, 2, 4).unwrap().and_hms_opt(0, 0, 0).unwrap();
/// let est = convert_to_tz(utc, &Eastern, false);
/// assert_eq!(est.to_string(), "2013-02-03 19:00:00 EST");
///
/// let cst = convert_to_tz(est, &Central, true);
/// assert_eq!(cst, Moment::Naive(utc - chrono::TimeDelta::hours(6)));
/// ```
pub fn convert_to_tz<P: Point, T: ZoneRule>(point: P, zone: &T, return_naive: bool) -> Moment<T> {
    let dt = match point.into_moment() {
        Moment::Aware(dt) => dt.with_timezone(zone),
        naive => naive.instant().with_timezone(zone),
    };
    strip_if_requested(Moment::Aware(dt), return_naive)
}

/// Runs an operation on the wall clock of another zone and converts the
/// result back to the input's zone.
pub(crate) struct Within<'a, O> {
    pub zone: Option<Tz>,
    pub op: &'a O,
}

impl<O: AwareOp> AwareOp for Within<'_, O> {
    fn apply<A: ZoneRule>(&self, dt: &DateTime<A>) -> Result<DateTime<A>> {
        match self.zone {
            Some(zone) => {
                let out = self.op.apply(&dt.with_timezone(&zone))?;
                Ok(out.with_timezone(&dt.timezone()))
            }
            None => self.op.apply(dt),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime, Utc};
    use chrono_tz::US::{Central, Eastern};

    fn naive(y: i32, mo: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_attach_naive_utc() {
        let dt = attach_tz_if_none(naive(2013, 2, 4, 0), &Utc).unwrap();
        assert_eq!(dt.naive_utc(), naive(2013, 2, 4, 0));
    }

    #[test]
    fn test_attach_naive_eastern_localizes() {
        let dt = attach_tz_if_none(naive(2013, 2, 4, 0), &Eastern).unwrap();
        assert_eq!(dt.naive_local(), naive(2013, 2, 4, 0));
        assert_eq!(dt.naive_utc(), naive(2013, 2, 4, 5));
    }

    #[test]
    fn test_attach_existing_zone_unchanged() {
        let dt = Eastern.with_ymd_and_hms(2013, 2, 4, 0, 0, 0).unwrap();
        let out = attach_tz_if_none(dt, &Eastern).unwrap();
        assert_eq!(out, dt);
        assert_eq!(out.offset(), dt.offset());
    }

    #[test]
    fn test_strip_keeps_wall_clock() {
        let dt = Eastern.with_ymd_and_hms(2013, 2, 3, 19, 0, 0).unwrap();
        assert_eq!(
            strip_if_requested(Moment::Aware(dt), true),
            Moment::Naive(naive(2013, 2, 3, 19))
        );
        assert_eq!(strip_if_requested(Moment::Aware(dt), false), Moment::Aware(dt));
    }

    #[test]
    fn test_strip_naive_is_noop() {
        let moment: Moment<Utc> = Moment::Naive(naive(2013, 2, 3, 19));
        assert_eq!(strip_if_requested(moment.clone(), true), moment);
    }

    #[test]
    fn test_convert_naive_utc_to_est_return_aware() {
        let out = convert_to_tz(naive(2013, 2, 4, 0), &Eastern, false);
        let dt = out.aware().unwrap();
        assert_eq!(dt.naive_local(), naive(2013, 2, 3, 19));
        assert_eq!(Eastern.offset_at(dt), chrono::TimeDelta::hours(-5));
    }

    #[test]
    fn test_convert_naive_utc_to_est_return_naive() {
        let out = convert_to_tz(naive(2013, 2, 4, 0), &Eastern, true);
        assert_eq!(out, Moment::Naive(naive(2013, 2, 3, 19)));
    }

    #[test]
    fn test_convert_aware_est_to_cst() {
        let est = Eastern.with_ymd_and_hms(2013, 2, 3, 19, 0, 0).unwrap();
        let out = convert_to_tz(est, &Central, false);
        assert_eq!(out.naive_local(), naive(2013, 2, 3, 18));
        assert_eq!(out.instant(), est.with_timezone(&Utc));
    }

    #[test]
    fn test_convert_back_to_naive_utc() {
        let cst = Central.with_ymd_and_hms(2013, 2, 3, 18, 0, 0).unwrap();
        assert_eq!(
            convert_to_tz(cst, &Utc, true),
            Moment::Naive(naive(2013, 2, 4, 0))
        );
    }

    #[test]
    fn test_convert_date_reads_midnight_utc() {
        let date = NaiveDate::from_ymd_opt(2013, 2, 4).unwrap();
        let out = convert_to_tz(date, &Eastern, true);
        assert_eq!(out, Moment::Naive(naive(2013, 2, 3, 19)));
    }

    #[test]
    fn test_options_builder() {
        let opts = ZoneOptions::new().within(Eastern).naive();
        assert_eq!(opts.within, Some(Eastern));
        assert!(opts.return_naive);
        assert_eq!(ZoneOptions::default().within, None);
    }
}
