use anyhow::{Context, Result};
use calendar_notifier::{
    run, CalendarClient, Cli, Config, Delivery, DryRunNotifier, Notifier, WebhookNotifier,
};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "calendar_notifier=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    // hyper-rustls needs a process-wide crypto provider.
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        tracing::debug!("rustls crypto provider already installed");
    }

    let config = Config::try_from(Cli::parse()).context("Invalid configuration")?;
    tracing::debug!("Loaded configuration: {:?}", config);

    let calendar = CalendarClient::new(&config.credentials, config.calendar_id.clone())
        .await
        .context("Unable to retrieve Calendar client")?;

    let notifier: Box<dyn Notifier> = match &config.delivery {
        Delivery::Webhook(url) => Box::new(WebhookNotifier::new(url.clone())),
        Delivery::DryRun => Box::new(DryRunNotifier),
    };

    let stats = run(&config, &calendar, notifier.as_ref(), chrono::Utc::now())
        .await
        .context("Notification run failed")?;

    tracing::info!(
        "Run complete: {} fetched, {} notified, {} failed, {} skipped, {} not tomorrow",
        stats.fetched,
        stats.notified,
        stats.failed,
        stats.malformed,
        stats.outside_window
    );

    Ok(())
}
