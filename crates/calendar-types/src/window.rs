//! The "tomorrow" window events are matched against.
//!
//! The window is anchored to a fixed UTC offset rather than a named zone, so
//! every day is exactly 24 hours long.

use chrono::{DateTime, FixedOffset, NaiveTime, TimeDelta, TimeZone, Utc};
use thiserror::Error;

const SECONDS_PER_HOUR: i32 = 3600;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WindowError {
    #[error("UTC offset of {0} hours is out of range")]
    InvalidOffset(i32),

    #[error("cannot compute the day after {0}")]
    OutOfRange(DateTime<Utc>),
}

/// Build the fixed offset `hours` east of UTC.
pub fn fixed_offset(hours: i32) -> Result<FixedOffset, WindowError> {
    hours
        .checked_mul(SECONDS_PER_HOUR)
        .and_then(FixedOffset::east_opt)
        .ok_or(WindowError::InvalidOffset(hours))
}

/// Half-open interval `[start, end)` covering one local day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetWindow {
    start: DateTime<FixedOffset>,
    end: DateTime<FixedOffset>,
}

impl TargetWindow {
    /// The local day after `now`, from midnight to the next midnight.
    pub fn tomorrow(now: DateTime<Utc>, offset: FixedOffset) -> Result<Self, WindowError> {
        let today = now.with_timezone(&offset).date_naive();
        let tomorrow = today.succ_opt().ok_or(WindowError::OutOfRange(now))?;

        let start = offset
            .from_local_datetime(&tomorrow.and_time(NaiveTime::MIN))
            .single()
            .ok_or(WindowError::OutOfRange(now))?;
        let end = start
            .checked_add_signed(TimeDelta::hours(24))
            .ok_or(WindowError::OutOfRange(now))?;

        Ok(Self { start, end })
    }

    pub fn start(&self) -> DateTime<FixedOffset> {
        self.start
    }

    pub fn end(&self) -> DateTime<FixedOffset> {
        self.end
    }

    pub fn offset(&self) -> FixedOffset {
        *self.start.offset()
    }

    /// Strictly inside the window: an instant equal to either bound is
    /// outside, including the opening midnight.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        let local = instant.with_timezone(&self.offset());
        local > self.start && local < self.end
    }
}
