//! Webhook delivery for notification messages.
//!
//! The payload is `{"content": "<message>"}`, the shape Discord-compatible
//! webhooks accept.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("webhook request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed to send notification: {status} {body}")]
    UnexpectedStatus { status: StatusCode, body: String },
}

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    content: &'a str,
}

/// 200 and 204 are the only statuses counted as delivered.
pub fn is_delivered(status: StatusCode) -> bool {
    status == StatusCode::OK || status == StatusCode::NO_CONTENT
}

/// Destination for notification messages
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &str) -> Result<(), NotifyError>;
}

/// Posts each message to a webhook URL
pub struct WebhookNotifier {
    client: Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), url)
    }

    pub fn with_client(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn send(&self, message: &str) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(&self.url)
            .json(&WebhookPayload { content: message })
            .send()
            .await?;

        let status = response.status();
        if is_delivered(status) {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(NotifyError::UnexpectedStatus { status, body })
    }
}

/// Logs messages instead of posting them
pub struct DryRunNotifier;

#[async_trait]
impl Notifier for DryRunNotifier {
    async fn send(&self, message: &str) -> Result<(), NotifyError> {
        tracing::info!("[dry run] would post:\n{}", message);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Accept one request, answer with `status_line`, and hand back the raw
    /// request text.
    async fn respond_once(
        status_line: &'static str,
        body: &'static str,
    ) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut received = Vec::new();
            let mut buf = [0u8; 4096];
            while !request_complete(&received) {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                received.extend_from_slice(&buf[..n]);
            }

            let response = if body.is_empty() {
                format!("HTTP/1.1 {}\r\nconnection: close\r\n\r\n", status_line)
            } else {
                format!(
                    "HTTP/1.1 {}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                    status_line,
                    body.len(),
                    body
                )
            };
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();

            String::from_utf8_lossy(&received).into_owned()
        });

        (format!("http://{}/api/webhooks/1/token", addr), handle)
    }

    fn request_complete(received: &[u8]) -> bool {
        let text = String::from_utf8_lossy(received);
        let Some(header_end) = text.find("\r\n\r\n") else {
            return false;
        };
        let content_length = text[..header_end]
            .lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        received.len() >= header_end + 4 + content_length
    }

    fn notifier(url: String) -> WebhookNotifier {
        let client = Client::builder().no_proxy().build().unwrap();
        WebhookNotifier::with_client(client, url)
    }

    #[test]
    fn test_delivered_statuses() {
        assert!(is_delivered(StatusCode::OK));
        assert!(is_delivered(StatusCode::NO_CONTENT));
        assert!(!is_delivered(StatusCode::CREATED));
        assert!(!is_delivered(StatusCode::BAD_REQUEST));
        assert!(!is_delivered(StatusCode::INTERNAL_SERVER_ERROR));
    }

    #[test]
    fn test_payload_shape() {
        let payload = serde_json::to_value(WebhookPayload {
            content: "@here\nhello",
        })
        .unwrap();
        assert_eq!(payload, serde_json::json!({ "content": "@here\nhello" }));
    }

    #[tokio::test]
    async fn test_posts_json_content() {
        let (url, server) = respond_once("204 No Content", "").await;

        notifier(url)
            .send("@here\nイベント名: Holiday")
            .await
            .expect("204 should count as delivered");

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /api/webhooks/1/token HTTP/1.1"));
        assert!(request
            .to_ascii_lowercase()
            .contains("content-type: application/json"));
        let body = &request[request.find("\r\n\r\n").unwrap() + 4..];
        let payload: serde_json::Value = serde_json::from_str(body).unwrap();
        assert_eq!(payload["content"], "@here\nイベント名: Holiday");
    }

    #[tokio::test]
    async fn test_ok_is_delivered() {
        let (url, server) = respond_once("200 OK", "{}").await;
        assert!(notifier(url).send("hi").await.is_ok());
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_server_error_reported() {
        let (url, server) = respond_once("500 Internal Server Error", "boom").await;

        let err = notifier(url).send("hi").await.unwrap_err();
        match err {
            NotifyError::UnexpectedStatus { status, body } => {
                assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
                assert_eq!(body, "boom");
            }
            other => panic!("unexpected error: {}", other),
        }
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_connection_refused_reported() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = notifier(format!("http://{}/hook", addr))
            .send("hi")
            .await
            .unwrap_err();
        assert!(matches!(err, NotifyError::Transport(_)));
    }

    #[test]
    fn test_dry_run_always_succeeds() {
        tokio_test::assert_ok!(tokio_test::block_on(
            DryRunNotifier.send("@here\nanything")
        ));
    }
}
