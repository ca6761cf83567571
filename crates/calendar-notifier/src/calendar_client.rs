//! Google Calendar reader.

use async_trait::async_trait;
use calendar_types::{CalendarEvent, EventBoundary};
use chrono::{DateTime, Utc};
use google_calendar3::api::{Event, EventDateTime};
use google_calendar3::hyper_rustls::HttpsConnector;
use google_calendar3::yup_oauth2::authorized_user::AuthorizedUserSecret;
use google_calendar3::yup_oauth2::{
    AuthorizedUserAuthenticator, ServiceAccountAuthenticator, ServiceAccountKey,
};
use google_calendar3::CalendarHub;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CalendarError {
    #[error("unable to parse GOOGLE_CREDENTIALS: {0}")]
    MalformedCredentials(#[source] serde_json::Error),

    #[error("unsupported credential type {0:?}, expected service_account or authorized_user")]
    UnsupportedCredentialType(String),

    #[error("failed to load native TLS roots")]
    TlsRoots(#[source] std::io::Error),

    #[error("failed to build authenticator")]
    Authenticator(#[source] std::io::Error),

    #[error("unable to retrieve events")]
    Provider(#[source] google_calendar3::Error),
}

/// Anything that can list the upcoming events of one calendar
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Events starting at or after `now`, ordered by start time.
    async fn upcoming_events(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<CalendarEvent>, CalendarError>;
}

/// Parsed credential blob
pub enum GoogleCredentials {
    ServiceAccount(ServiceAccountKey),
    AuthorizedUser(AuthorizedUserSecret),
}

impl GoogleCredentials {
    /// Parse the credential JSON. No network access happens here, so a bad
    /// blob fails before any request is made.
    pub fn parse(raw: &str) -> Result<Self, CalendarError> {
        let value: serde_json::Value =
            serde_json::from_str(raw).map_err(CalendarError::MalformedCredentials)?;

        let kind = value
            .get("type")
            .and_then(|t| t.as_str())
            .unwrap_or_default()
            .to_string();

        match kind.as_str() {
            "service_account" => serde_json::from_value(value)
                .map(GoogleCredentials::ServiceAccount)
                .map_err(CalendarError::MalformedCredentials),
            "authorized_user" => serde_json::from_value(value)
                .map(GoogleCredentials::AuthorizedUser)
                .map_err(CalendarError::MalformedCredentials),
            _ => Err(CalendarError::UnsupportedCredentialType(kind)),
        }
    }
}

/// Client for reading events from Google Calendar API
pub struct CalendarClient {
    hub: CalendarHub<HttpsConnector<HttpConnector>>,
    calendar_id: String,
}

impl CalendarClient {
    pub async fn new(
        credentials: &str,
        calendar_id: impl Into<String>,
    ) -> Result<Self, CalendarError> {
        let credentials = GoogleCredentials::parse(credentials)?;

        let auth = match credentials {
            GoogleCredentials::ServiceAccount(key) => {
                ServiceAccountAuthenticator::builder(key).build().await
            }
            GoogleCredentials::AuthorizedUser(secret) => {
                AuthorizedUserAuthenticator::builder(secret).build().await
            }
        }
        .map_err(CalendarError::Authenticator)?;

        let connector = google_calendar3::hyper_rustls::HttpsConnectorBuilder::new()
            .with_native_roots()
            .map_err(CalendarError::TlsRoots)?
            .https_or_http()
            .enable_http1()
            .build();

        let client = Client::builder(TokioExecutor::new()).build(connector);
        let hub = CalendarHub::new(client, auth);

        Ok(Self {
            hub,
            calendar_id: calendar_id.into(),
        })
    }
}

#[async_trait]
impl EventSource for CalendarClient {
    async fn upcoming_events(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<CalendarEvent>, CalendarError> {
        let (_, events) = self
            .hub
            .events()
            .list(&self.calendar_id)
            .show_deleted(false)
            .single_events(true)
            .time_min(now)
            .order_by("startTime")
            .doit()
            .await
            .map_err(CalendarError::Provider)?;

        // Only the first page is read.
        if events.next_page_token.is_some() {
            tracing::warn!(
                "Calendar {} has more upcoming events than one page; later events are ignored",
                self.calendar_id
            );
        }

        let items = events.items.unwrap_or_default();
        tracing::debug!("Fetched {} upcoming events", items.len());

        Ok(items.into_iter().map(to_calendar_event).collect())
    }
}

fn to_calendar_event(event: Event) -> CalendarEvent {
    CalendarEvent {
        id: event.id,
        summary: event.summary,
        description: event.description,
        location: event.location,
        start: event.start.map(to_boundary),
        end: event.end.map(to_boundary),
    }
}

fn to_boundary(value: EventDateTime) -> EventBoundary {
    EventBoundary {
        date_time: value.date_time,
        date: value.date,
    }
}
