//! One notification run: fetch, filter to tomorrow, format, notify.

use calendar_types::{CalendarEvent, EventSchedule, ScheduleError, TargetWindow, WindowError};
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::calendar_client::{CalendarError, EventSource};
use crate::config::Config;
use crate::message::format_notification;
use crate::webhook::Notifier;

/// Errors that end a run before any event is processed
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Calendar(#[from] CalendarError),

    #[error(transparent)]
    Window(#[from] WindowError),
}

/// Per-run tallies. Every fetched event lands in exactly one bucket.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunStats {
    pub fetched: usize,
    pub malformed: usize,
    pub outside_window: usize,
    pub notified: usize,
    pub failed: usize,
}

/// Decision for a single event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    Notify(String),
    OutsideWindow,
}

/// Decide whether `event` falls inside `window` and, if so, build its
/// message.
pub fn evaluate(
    event: &CalendarEvent,
    window: &TargetWindow,
) -> Result<EventOutcome, ScheduleError> {
    let schedule = event.schedule()?;

    if !window.contains(schedule.start_instant()) {
        return Ok(EventOutcome::OutsideWindow);
    }

    log_event_details(event, &schedule, window);
    Ok(EventOutcome::Notify(format_notification(
        event,
        &schedule,
        window.offset(),
    )))
}

/// Run once against `source`, sending one message per event that starts
/// tomorrow. Failures on individual events are logged and counted; only
/// setup failures are returned.
pub async fn run<S, N>(
    config: &Config,
    source: &S,
    notifier: &N,
    now: DateTime<Utc>,
) -> Result<RunStats, RunError>
where
    S: EventSource + ?Sized,
    N: Notifier + ?Sized,
{
    let window = TargetWindow::tomorrow(now, config.utc_offset)?;
    tracing::info!(
        "Looking for events between {} and {}",
        window.start(),
        window.end()
    );

    let events = source.upcoming_events(now).await?;
    let mut stats = RunStats {
        fetched: events.len(),
        ..Default::default()
    };

    for event in &events {
        let message = match evaluate(event, &window) {
            Ok(EventOutcome::Notify(message)) => message,
            Ok(EventOutcome::OutsideWindow) => {
                stats.outside_window += 1;
                continue;
            }
            Err(e) => {
                tracing::warn!("Skipping event '{}': {}", event.title(), e);
                stats.malformed += 1;
                continue;
            }
        };

        match notifier.send(&message).await {
            Ok(()) => {
                tracing::info!("Notification sent for event: {}", event.title());
                stats.notified += 1;
            }
            Err(e) => {
                tracing::error!(
                    "Error sending notification for event '{}': {}",
                    event.title(),
                    e
                );
                stats.failed += 1;
            }
        }
    }

    Ok(stats)
}

fn log_event_details(event: &CalendarEvent, schedule: &EventSchedule, window: &TargetWindow) {
    tracing::info!("イベント名: {}", event.title());
    tracing::info!("説明: {}", event.description.as_deref().unwrap_or_default());
    tracing::info!("場所: {}", event.location.as_deref().unwrap_or_default());

    if schedule.is_all_day() {
        tracing::info!("終日イベント: {}", event.title());
    } else {
        let offset = window.offset();
        let start = schedule.start_instant().with_timezone(&offset);
        let end = schedule.end_instant().with_timezone(&offset);
        tracing::info!("開始時間: {}", start.format("%Y-%m-%d %H:%M:%S"));
        tracing::info!("終了時間: {}", end.format("%Y-%m-%d %H:%M:%S"));
    }
}
