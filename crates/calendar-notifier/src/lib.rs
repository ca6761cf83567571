//! Posts tomorrow's calendar events to a chat webhook.
//!
//! A run reads upcoming events from Google Calendar, keeps those starting
//! strictly inside tomorrow's window (in a fixed UTC offset), and sends one
//! webhook message per event.

pub mod calendar_client;
pub mod config;
pub mod message;
pub mod pipeline;
pub mod webhook;

pub use calendar_client::{CalendarClient, CalendarError, EventSource};
pub use config::{Cli, Config, Delivery};
pub use pipeline::{run, RunError, RunStats};
pub use webhook::{DryRunNotifier, Notifier, NotifyError, WebhookNotifier};
