use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod window;

pub use window::{fixed_offset, TargetWindow, WindowError};

/// One end of an event as reported by the calendar provider.
///
/// Timed events carry `date_time`, all-day events carry `date`. Exactly one
/// of the two is expected to be set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventBoundary {
    pub date_time: Option<DateTime<Utc>>,
    pub date: Option<NaiveDate>,
}

impl EventBoundary {
    pub fn at(date_time: DateTime<Utc>) -> Self {
        Self {
            date_time: Some(date_time),
            date: None,
        }
    }

    pub fn on(date: NaiveDate) -> Self {
        Self {
            date_time: None,
            date: Some(date),
        }
    }
}

/// Calendar event fetched from the provider, before any window filtering
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start: Option<EventBoundary>,
    pub end: Option<EventBoundary>,
}

impl CalendarEvent {
    /// Title used in logs and messages; empty when the event has none.
    pub fn title(&self) -> &str {
        self.summary.as_deref().unwrap_or_default()
    }

    pub fn schedule(&self) -> Result<EventSchedule, ScheduleError> {
        EventSchedule::from_boundaries(self.start.as_ref(), self.end.as_ref())
    }
}

/// When an event happens, resolved from its start/end boundaries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventSchedule {
    Timed {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    AllDay {
        start: NaiveDate,
        end: NaiveDate,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("event has no start time or date")]
    MissingStart,

    #[error("event starts with a {start} but ends without one")]
    MismatchedEnd { start: &'static str },

    #[error("event {side} sets both a date and a date-time")]
    AmbiguousBoundary { side: &'static str },
}

impl EventSchedule {
    pub fn from_boundaries(
        start: Option<&EventBoundary>,
        end: Option<&EventBoundary>,
    ) -> Result<Self, ScheduleError> {
        let start = start.ok_or(ScheduleError::MissingStart)?;
        reject_ambiguous(start, "start")?;
        if let Some(end) = end {
            reject_ambiguous(end, "end")?;
        }

        if let Some(start_at) = start.date_time {
            let end_at = end
                .and_then(|b| b.date_time)
                .ok_or(ScheduleError::MismatchedEnd { start: "date-time" })?;
            return Ok(EventSchedule::Timed {
                start: start_at,
                end: end_at,
            });
        }

        if let Some(start_day) = start.date {
            let end_day = end
                .and_then(|b| b.date)
                .ok_or(ScheduleError::MismatchedEnd { start: "date" })?;
            return Ok(EventSchedule::AllDay {
                start: start_day,
                end: end_day,
            });
        }

        Err(ScheduleError::MissingStart)
    }

    pub fn is_all_day(&self) -> bool {
        matches!(self, EventSchedule::AllDay { .. })
    }

    /// Start as an instant. All-day dates count from midnight UTC.
    pub fn start_instant(&self) -> DateTime<Utc> {
        match *self {
            EventSchedule::Timed { start, .. } => start,
            EventSchedule::AllDay { start, .. } => utc_midnight(start),
        }
    }

    pub fn end_instant(&self) -> DateTime<Utc> {
        match *self {
            EventSchedule::Timed { end, .. } => end,
            EventSchedule::AllDay { end, .. } => utc_midnight(end),
        }
    }
}

fn reject_ambiguous(boundary: &EventBoundary, side: &'static str) -> Result<(), ScheduleError> {
    if boundary.date_time.is_some() && boundary.date.is_some() {
        return Err(ScheduleError::AmbiguousBoundary { side });
    }
    Ok(())
}

fn utc_midnight(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}
