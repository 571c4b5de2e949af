//! Lazy sequences of points spaced by a [`Delta`].

use std::iter::FusedIterator;
use std::mem;

use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::trace;

use crate::arith::add_timedelta;
use crate::convert::{strip_if_requested, ZoneOptions};
use crate::delta::Delta;
use crate::error::{Error, Result};
use crate::moment::{midnight, Moment, Point};
use crate::zone::ZoneRule;

/// Points `start`, `start + delta`, `start + 2 * delta`, ...
///
/// Each point is computed from the previous one with
/// [`add_timedelta`] when it is requested, so calendar deltas keep the wall
/// clock of the zone across DST changes. Without a stop point or a limit the
/// sequence is unbounded.
///
/// A step that overflows the representable range ends the sequence when a
/// stop point is set and the delta moves forward, since the stop has then
/// been passed. Otherwise the overflow is yielded as an error.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use wallclock::{intervals, Delta, Moment};
///
/// let start = NaiveDate::from_ymd_opt(2013, 3, 9).unwrap();
/// let stop = NaiveDate::from_ymd_opt(2013, 3, 23).unwrap();
/// let weeks: Vec<_> = intervals(start, Delta::weeks(1))
///     .stop(stop)
///     .inclusive(true)
///     .collect::<Result<_, _>>()
///     .unwrap();
/// assert_eq!(weeks.len(), 3);
/// assert_eq!(weeks[2], Moment::Date(stop));
/// ```
pub fn intervals<P: Point>(start: P, delta: Delta) -> Intervals<P::Zone> {
    let (start, as_date) = match start.into_moment() {
        Moment::Date(date) => (Moment::Naive(midnight(date)), true),
        other => (other, false),
    };
    Intervals {
        cursor: Cursor::Start(start),
        delta,
        options: ZoneOptions::new(),
        return_naive: false,
        as_date,
        stop: None,
        inclusive: false,
        limit: None,
        emitted: 0,
    }
}

/// Iterator returned by [`intervals`].
///
/// Yields `Err` at most once, after which it is exhausted.
#[derive(Debug, Clone)]
pub struct Intervals<Z: TimeZone> {
    cursor: Cursor<Z>,
    delta: Delta,
    options: ZoneOptions,
    return_naive: bool,
    as_date: bool,
    stop: Option<DateTime<Utc>>,
    inclusive: bool,
    limit: Option<usize>,
    emitted: usize,
}

#[derive(Debug, Clone)]
enum Cursor<Z: TimeZone> {
    Start(Moment<Z>),
    /// The last point yielded. The one after it is computed on demand.
    After(Moment<Z>),
    Done,
}

impl<Z: ZoneRule> Intervals<Z> {
    /// Step on the wall clock of `zone`.
    pub fn within(mut self, zone: Tz) -> Self {
        self.options = self.options.within(zone);
        self
    }

    /// End before `stop`, or at it when [`inclusive`](Self::inclusive).
    /// Naive stop points are read as UTC.
    pub fn stop<S: Point>(mut self, stop: S) -> Self {
        self.stop = Some(stop.into_moment().instant());
        self
    }

    pub fn inclusive(mut self, inclusive: bool) -> Self {
        self.inclusive = inclusive;
        self
    }

    /// Yield at most `limit` points. Ignored when a stop point is set.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Strip the zone from aware points as they are yielded.
    pub fn naive(mut self) -> Self {
        self.return_naive = true;
        self
    }

    fn reached_end(&self, current: &Moment<Z>) -> bool {
        match (self.stop, self.limit) {
            (Some(stop), _) if self.inclusive => current.instant() > stop,
            (Some(stop), _) => current.instant() >= stop,
            (None, Some(limit)) => self.emitted >= limit,
            (None, None) => false,
        }
    }

    fn limit_reached(&self) -> bool {
        self.stop.is_none() && self.limit.is_some_and(|limit| self.emitted >= limit)
    }

    fn finish(&self) -> Option<Result<Moment<Z>>> {
        trace!(emitted = self.emitted, "intervals exhausted");
        None
    }

    fn shape(&self, moment: Moment<Z>) -> Moment<Z> {
        match moment {
            Moment::Naive(local) if self.as_date => Moment::Date(local.date()),
            other => strip_if_requested(other, self.return_naive),
        }
    }
}

impl<Z: ZoneRule> Iterator for Intervals<Z> {
    type Item = Result<Moment<Z>>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = match mem::replace(&mut self.cursor, Cursor::Done) {
            Cursor::Done => return None,
            Cursor::Start(start) => start,
            Cursor::After(_) if self.limit_reached() => return self.finish(),
            Cursor::After(previous) => {
                match add_timedelta(previous, &self.delta, &self.options) {
                    Ok(following) => following,
                    Err(Error::OutOfRange(_))
                        if self.stop.is_some() && moves_forward(&self.delta) =>
                    {
                        return self.finish()
                    }
                    Err(err) => return Some(Err(err)),
                }
            }
        };
        if self.reached_end(&current) {
            return self.finish();
        }
        self.emitted += 1;
        self.cursor = Cursor::After(current.clone());
        Some(Ok(self.shape(current)))
    }
}

/// Whether `delta` moves a point later, judged at the unix epoch.
fn moves_forward(delta: &Delta) -> bool {
    let epoch = DateTime::<Utc>::UNIX_EPOCH;
    add_timedelta(epoch, delta, &ZoneOptions::new()).is_ok_and(|moved| moved.instant() > epoch)
}

impl<Z: ZoneRule> FusedIterator for Intervals<Z> {}
