use calendar_types::{fixed_offset, WindowError};
use chrono::FixedOffset;
use clap::Parser;
use thiserror::Error;

/// Command-line arguments. Every flag falls back to an environment variable,
/// so a `.env` file is enough for scheduled runs.
#[derive(Debug, Clone, Parser)]
#[command(name = "calendar-notifier")]
#[command(about = "Post tomorrow's Google Calendar events to a chat webhook")]
pub struct Cli {
    /// Google credential JSON (service account or authorized user).
    #[arg(long, env = "GOOGLE_CREDENTIALS", hide_env_values = true)]
    pub credentials: Option<String>,

    /// Calendar to read events from.
    #[arg(long, env = "GOOGLE_CALENDAR_ID")]
    pub calendar_id: Option<String>,

    /// Webhook that receives one message per event.
    #[arg(long, env = "DISCORD_WEBHOOK_URL", hide_env_values = true)]
    pub webhook_url: Option<String>,

    /// Fixed offset east of UTC that defines "tomorrow".
    #[arg(
        long,
        env = "NOTIFY_UTC_OFFSET_HOURS",
        default_value_t = 9,
        allow_negative_numbers = true
    )]
    pub utc_offset_hours: i32,

    /// Log the messages instead of posting them.
    #[arg(long, env = "NOTIFY_DRY_RUN")]
    pub dry_run: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} environment variable not set")]
    Missing(&'static str),

    #[error(transparent)]
    Offset(#[from] WindowError),
}

/// Where notifications go
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Webhook(String),
    DryRun,
}

/// Settings for one run, built once at startup
#[derive(Clone)]
pub struct Config {
    pub credentials: String,
    pub calendar_id: String,
    pub delivery: Delivery,
    pub utc_offset: FixedOffset,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("credentials", &"<redacted>")
            .field("calendar_id", &self.calendar_id)
            .field("delivery", &self.delivery)
            .field("utc_offset", &self.utc_offset)
            .finish()
    }
}

impl TryFrom<Cli> for Config {
    type Error = ConfigError;

    fn try_from(cli: Cli) -> Result<Self, Self::Error> {
        let credentials =
            non_empty(cli.credentials).ok_or(ConfigError::Missing("GOOGLE_CREDENTIALS"))?;
        let calendar_id =
            non_empty(cli.calendar_id).ok_or(ConfigError::Missing("GOOGLE_CALENDAR_ID"))?;

        let delivery = if cli.dry_run {
            Delivery::DryRun
        } else {
            let url =
                non_empty(cli.webhook_url).ok_or(ConfigError::Missing("DISCORD_WEBHOOK_URL"))?;
            Delivery::Webhook(url)
        };

        Ok(Config {
            credentials,
            calendar_id,
            delivery,
            utc_offset: fixed_offset(cli.utc_offset_hours)?,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
