//! Re-anchoring wall-clock readings after raw field arithmetic.
//!
//! Arithmetic on civil fields ("+7 days", "set day to 1") does not consult
//! the zone, so the offset a reading was labelled with before the
//! arithmetic may be wrong afterwards, e.g. still EST after moving into
//! EDT. A [`Reading`] carries that possibly stale label and
//! [`dst_normalize`] replaces it with the one the zone assigns.

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDateTime, Offset, TimeZone};
use tracing::trace;

use crate::error::Result;
use crate::zone::ZoneRule;

/// A wall-clock reading in a zone, labelled with an offset that may no
/// longer match the reading.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading<Z: TimeZone> {
    zone: Z,
    local: NaiveDateTime,
    offset: FixedOffset,
}

impl<Z: TimeZone> Reading<Z> {
    pub fn new(zone: Z, local: NaiveDateTime, offset: FixedOffset) -> Self {
        Self {
            zone,
            local,
            offset,
        }
    }

    /// The reading and label of an aware datetime. Always consistent.
    pub fn of(dt: &DateTime<Z>) -> Self {
        Self::new(dt.timezone(), dt.naive_local(), dt.offset().fix())
    }

    /// Replace the wall clock, keeping the old label.
    pub fn with_local(mut self, local: NaiveDateTime) -> Self {
        self.local = local;
        self
    }

    pub fn zone(&self) -> &Z {
        &self.zone
    }

    pub fn local(&self) -> NaiveDateTime {
        self.local
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }
}

impl<Z: TimeZone> fmt::Display for Reading<Z> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.local, self.offset)
    }
}

/// Correct the offset of `reading` for the DST state of its wall clock.
///
/// The wall-clock fields are kept. Only a reading inside a spring-forward
/// gap moves, because no offset makes it exist; see [`ZoneRule`] for how
/// the zone resolves it. Applying this to its own result is a no-op.
///
/// # Examples
///
/// ```
/// use chrono::{NaiveDate, TimeZone};
/// use chrono_tz::US::Eastern;
/// use wallclock::{dst_normalize, Reading};
///
/// // Midnight EST on March 1, moved two weeks on the wall clock.
/// let start = Eastern.with_ymd_and_hms(2013, 3, 1, 0, 0, 0).unwrap();
/// let moved = NaiveDate::from_ymd_opt(2013, 3, 15).unwrap().and_hms_opt(0, 0, 0).unwrap();
/// let stale = Reading::of(&start).with_local(moved);
/// assert_eq!(stale.offset().to_string(), "-05:00");
///
/// let fixed = dst_normalize(&stale).unwrap();
/// assert_eq!(fixed.to_rfc3339(), "2013-03-15T00:00:00-04:00");
/// ```
pub fn dst_normalize<Z: ZoneRule>(reading: &Reading<Z>) -> Result<DateTime<Z>> {
    let anchored = reading.zone.normalize(&reading.local, reading.offset)?;
    let offset = anchored.offset().fix();
    if offset != reading.offset {
        trace!(local = %reading.local, from = %reading.offset, to = %offset, "re-anchored offset");
    }
    Ok(anchored)
}
