//! The timezone capability used by every arithmetic operation.
//!
//! A [`ZoneRule`] answers three questions about a zone: which instant a
//! wall-clock reading denotes ([`ZoneRule::localize`]), which offset a
//! reading with a possibly stale label should carry ([`ZoneRule::normalize`]),
//! and what the offset is at an instant ([`ZoneRule::offset_at`]).
//!
//! Readings that are ambiguous (fall back) or nonexistent (spring forward)
//! are resolved here and nowhere else:
//!
//! - ambiguous: the candidate matching the stale label if one is given,
//!   otherwise the later (standard-time) candidate;
//! - nonexistent: the reading is read with the offset in force before the
//!   gap, which moves it forward by the length of the gap.

use chrono::{DateTime, FixedOffset, LocalResult, NaiveDateTime, Offset, TimeDelta, TimeZone, Utc};
use chrono_tz::{OffsetComponents, Tz};
use tracing::debug;

use crate::error::{Error, Result};

/// Zone-offset rules for a fixed offset or a named zone.
pub trait ZoneRule: TimeZone {
    /// Attach this zone to a wall-clock reading.
    fn localize(&self, local: &NaiveDateTime) -> Result<DateTime<Self>> {
        resolve(self, local, None)
    }

    /// Re-derive the offset for `local`, a reading previously labelled
    /// `stale`. The label only matters when the reading is ambiguous.
    fn normalize(&self, local: &NaiveDateTime, stale: FixedOffset) -> Result<DateTime<Self>> {
        resolve(self, local, Some(stale))
    }

    /// The signed UTC offset in effect at `dt`.
    fn offset_at(&self, dt: &DateTime<Self>) -> TimeDelta {
        TimeDelta::seconds(i64::from(dt.offset().fix().local_minus_utc()))
    }

    /// The daylight-saving component of the offset at `dt`.
    fn dst_at(&self, _dt: &DateTime<Self>) -> TimeDelta {
        TimeDelta::zero()
    }

    /// Whether daylight saving time is in effect at `dt`.
    fn is_dst(&self, dt: &DateTime<Self>) -> bool {
        !self.dst_at(dt).is_zero()
    }
}

impl ZoneRule for Utc {}

impl ZoneRule for FixedOffset {}

impl ZoneRule for Tz {
    fn dst_at(&self, dt: &DateTime<Self>) -> TimeDelta {
        dt.offset().dst_offset()
    }
}

/// Parse an IANA timezone string into `Tz`.
pub fn parse_timezone(s: &str) -> Result<Tz> {
    s.parse::<Tz>()
        .map_err(|_| Error::InvalidTimezone(format!("'{}'", s)))
}

fn resolve<Z: TimeZone>(
    zone: &Z,
    local: &NaiveDateTime,
    stale: Option<FixedOffset>,
) -> Result<DateTime<Z>> {
    match zone.from_local_datetime(local) {
        LocalResult::Single(dt) => Ok(dt),
        LocalResult::Ambiguous(earliest, latest) => {
            let picked = if stale == Some(earliest.offset().fix()) {
                earliest
            } else {
                latest
            };
            debug!(%local, offset = %picked.offset().fix(), "resolved ambiguous local time");
            Ok(picked)
        }
        LocalResult::None => {
            let before = local
                .checked_sub_signed(TimeDelta::days(1))
                .map(|probe| zone.offset_from_utc_datetime(&probe).fix())
                .ok_or_else(|| Error::OutOfRange(format!("'{}'", local)))?;
            let utc = local
                .checked_sub_signed(TimeDelta::seconds(i64::from(before.local_minus_utc())))
                .ok_or_else(|| Error::OutOfRange(format!("'{}'", local)))?;
            let shifted = zone.from_utc_datetime(&utc);
            debug!(%local, shifted = %shifted.naive_local(), "local time falls in a gap");
            Ok(shifted)
        }
    }
}
