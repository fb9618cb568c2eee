//! Wall-clock time strings
//!
//! Converts Unix epoch instants into ISO 8601 extended date-times carrying
//! an explicit zone designator, e.g. `2026-10-16T09:30:00+13:00` or
//! `2026-10-15T20:30:00Z`.

use chrono::{DateTime, FixedOffset, Local, Offset, TimeZone, Utc};
use std::fmt;

/// Converts Unix epoch seconds into a wall-clock time string
pub trait WallClock: Send + Sync + fmt::Debug {
    fn time_string(&self, unix_time: f64) -> String;
}

/// Renders instants in the system local time zone
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalWallClock;

impl WallClock for LocalWallClock {
    fn time_string(&self, unix_time: f64) -> String {
        match to_utc(unix_time) {
            Some(dt) => render(dt.with_timezone(&Local)),
            None => unix_time.to_string(),
        }
    }
}

/// Renders instants at a fixed UTC offset
#[derive(Debug, Clone, Copy)]
pub struct FixedOffsetWallClock {
    offset: FixedOffset,
}

impl FixedOffsetWallClock {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Clock rendering UTC, with a `Z` designator
    pub fn utc() -> Self {
        Self::new(Utc.fix())
    }

    /// Clock at `seconds` east of UTC, or `None` if out of range
    pub fn east(seconds: i32) -> Option<Self> {
        FixedOffset::east_opt(seconds).map(Self::new)
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }
}

impl WallClock for FixedOffsetWallClock {
    fn time_string(&self, unix_time: f64) -> String {
        match to_utc(unix_time) {
            Some(dt) => render(dt.with_timezone(&self.offset)),
            None => unix_time.to_string(),
        }
    }
}

fn to_utc(unix_time: f64) -> Option<DateTime<Utc>> {
    if !unix_time.is_finite() {
        return None;
    }
    let secs = unix_time.floor();
    let nanos = ((unix_time - secs) * 1e9) as u32;
    DateTime::<Utc>::from_timestamp(secs as i64, nanos.min(999_999_999))
}

fn render<Tz: TimeZone>(dt: DateTime<Tz>) -> String
where
    Tz::Offset: fmt::Display,
{
    let zone = if dt.offset().fix().local_minus_utc() == 0 {
        "Z".to_string()
    } else {
        dt.format("%:z").to_string()
    };
    format!("{}{}", dt.format("%Y-%m-%dT%H:%M:%S"), zone)
}
