//! Unix timestamps.

use chrono_tz::Tz;

use crate::moment::Point;
use crate::zone::ZoneRule;

/// Seconds (or milliseconds with `return_ms`) since 1970-01-01 00:00 UTC.
///
/// Naive inputs are read as UTC. With `within`, the UTC offset of that zone
/// at the instant is added, giving a "local" timestamp whose UTC reading
/// equals the wall clock of `within`. Fractions are truncated toward zero.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use chrono_tz::US::Eastern;
/// use wallclock::unix_time;
///
/// let local = NaiveDate::from_ymd_opt(2013, 4, 2).unwrap().and_hms_opt(0, 0, 0).unwrap();
/// assert_eq!(unix_time(local, None, false), 1_364_860_800);
/// assert_eq!(unix_time(local, None, true), 1_364_860_800_000);
///
/// // Midnight UTC on February 1 is 19:00 the day before in New York
/// let feb = NaiveDate::from_ymd_opt(2013, 2, 1).unwrap().and_hms_opt(5, 0, 0).unwrap();
/// assert_eq!(unix_time(feb, Some(Eastern), false), 1_359_676_800);
/// ```
pub fn unix_time<P: Point>(point: P, within: Option<Tz>, return_ms: bool) -> i64 {
    let instant = point.into_moment().instant();
    let offset_micros = within
        .map(|zone| zone.offset_at(&instant.with_timezone(&zone)))
        .and_then(|offset| offset.num_microseconds())
        .unwrap_or(0);
    let micros = instant.timestamp_micros() + offset_micros;
    if return_ms {
        micros / 1_000
    } else {
        micros / 1_000_000
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime, TimeDelta, TimeZone, Utc};
    use chrono_tz::US::Eastern;

    fn naive(y: i32, mo: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_unix_time_epoch() {
        assert_eq!(unix_time(naive(1970, 1, 1, 0), None, false), 0);
    }

    #[test]
    fn test_unix_time_arbitrary() {
        assert_eq!(unix_time(naive(2013, 4, 1, 2), None, false), 1_364_781_600);
        assert_eq!(unix_time(naive(2013, 12, 1, 2), None, false), 1_385_863_200);
    }

    #[test]
    fn test_unix_time_return_ms() {
        assert_eq!(unix_time(naive(2013, 12, 1, 2), None, true), 1_385_863_200_000);
    }

    #[test]
    fn test_unix_time_date() {
        let date = NaiveDate::from_ymd_opt(2013, 12, 1).unwrap();
        assert_eq!(unix_time(date, None, false), 1_385_856_000);
    }

    #[test]
    fn test_unix_time_aware() {
        let t = Eastern.with_ymd_and_hms(2013, 12, 1, 2, 0, 0).unwrap();
        assert_eq!(unix_time(t, None, false), 1_385_881_200);
        assert_eq!(unix_time(t, None, true), 1_385_881_200_000);

        let t = Eastern.with_ymd_and_hms(2013, 4, 2, 0, 0, 0).unwrap();
        assert_eq!(unix_time(t, None, false), 1_364_875_200);
    }

    #[test]
    fn test_unix_time_within_tz() {
        let t = Utc.with_ymd_and_hms(2013, 12, 1, 5, 0, 0).unwrap();
        assert_eq!(unix_time(t, Some(Eastern), false), 1_385_856_000);
        assert_eq!(unix_time(naive(2013, 12, 1, 5), Some(Eastern), false), 1_385_856_000);
        assert_eq!(unix_time(t, Some(Eastern), true), 1_385_856_000_000);

        // Reads back as midnight in New York
        let back = chrono::DateTime::from_timestamp(1_385_856_000, 0).unwrap();
        assert_eq!(back.naive_utc(), naive(2013, 12, 1, 0));
    }

    #[test]
    fn test_unix_time_truncates_toward_zero() {
        let before_epoch = naive(1970, 1, 1, 0) - TimeDelta::microseconds(1_500);
        assert_eq!(unix_time(before_epoch, None, false), 0);
        assert_eq!(unix_time(before_epoch, None, true), -1);

        let after = naive(2013, 4, 1, 2) + TimeDelta::milliseconds(999);
        assert_eq!(unix_time(after, None, false), 1_364_781_600);
        assert_eq!(unix_time(after, None, true), 1_364_781_600_999);
    }

    #[test]
    fn test_unix_time_ignores_zone_of_input() {
        let t = Eastern.with_ymd_and_hms(2013, 7, 4, 9, 30, 0).unwrap();
        assert_eq!(
            unix_time(t, None, false),
            unix_time(t.with_timezone(&Utc), None, false)
        );
    }
}
