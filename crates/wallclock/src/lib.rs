//! # wallclock
//!
//! Timezone-aware datetime arithmetic on the wall clock.
//!
//! Adding a day, flooring to the start of a month or stepping through a
//! range of weeks is done on the local reading of a zone, and the result is
//! re-anchored so its UTC offset matches the DST state it landed in. Naive
//! inputs are read as UTC and come back naive.
//!
//! ## Modules
//!
//! - [`zone`]: the timezone capability and how ambiguous or missing local
//!   times are resolved
//! - [`moment`]: dates, naive readings and aware datetimes as one input type
//! - [`convert`]: attaching, stripping and converting zones
//! - [`normalize`]: re-anchoring a reading after field arithmetic
//! - [`delta`]: fixed and calendar durations
//! - [`arith`]: adding durations
//! - [`floor`](mod@floor): rounding to interval boundaries
//! - [`intervals`](mod@intervals): stepping through a range
//! - [`unix`]: unix timestamps
//! - [`error`]: error types

pub mod arith;
pub mod convert;
pub mod delta;
pub mod error;
pub mod floor;
pub mod intervals;
pub mod moment;
pub mod normalize;
pub mod unix;
pub mod zone;

pub use arith::add_timedelta;
pub use convert::{attach_tz_if_none, convert_to_tz, strip_if_requested, ZoneOptions};
pub use delta::{CalendarSpan, Delta};
pub use error::{Error, Result};
pub use floor::{ceil, floor, Interval, Unit};
pub use intervals::{intervals, Intervals};
pub use moment::{Moment, Point};
pub use normalize::{dst_normalize, Reading};
pub use unix::unix_time;
pub use zone::{parse_timezone, ZoneRule};
