//! Notification text for a single event.

use calendar_types::{CalendarEvent, EventSchedule};
use chrono::FixedOffset;

/// Mention that pings everyone currently in the channel.
pub const BROADCAST_MENTION: &str = "@here";

const ALL_DAY_MARKER: &str = "終日イベント";
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Build the message posted for `event`. Timed events show start and end
/// in `offset`, to the minute.
pub fn format_notification(
    event: &CalendarEvent,
    schedule: &EventSchedule,
    offset: FixedOffset,
) -> String {
    let mut message = format!(
        "{}\nイベント名: {}\n場所: {}",
        BROADCAST_MENTION,
        event.title(),
        event.location.as_deref().unwrap_or_default()
    );

    if schedule.is_all_day() {
        message.push('\n');
        message.push_str(ALL_DAY_MARKER);
    } else {
        let start = schedule.start_instant().with_timezone(&offset);
        let end = schedule.end_instant().with_timezone(&offset);
        message.push_str(&format!(
            "\n開始時間: {}\n終了時間: {}",
            start.format(TIME_FORMAT),
            end.format(TIME_FORMAT)
        ));
    }

    message
}
