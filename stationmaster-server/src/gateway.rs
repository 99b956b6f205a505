//! Messaging gateway boundary.
//!
//! All transport concerns live behind the [`Messenger`] trait: the production
//! implementation speaks the chat gateway's HTTP API, and tests use the
//! in-process [`RecordingMessenger`]. Delivery reliability is the gateway's
//! problem, not ours; callers log failures and move on.

use std::fmt;
use std::sync::Mutex;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde_json::json;

/// Newtype for a chat identifier: the session key for one conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChatId(pub i64);

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ChatId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Formatting applied to outbound text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextFormat {
    Plain,
    Html,
}

/// Outbound messaging operations the bot needs from the chat platform.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Send text to a chat, optionally rich-formatted.
    async fn send_text(&self, chat: ChatId, text: &str, format: TextFormat) -> Result<()>;

    /// Send an image asset (referenced by name, resolved by the gateway).
    async fn send_image(&self, chat: ChatId, asset: &str) -> Result<()>;

    /// Send fixed coordinates.
    async fn send_location(&self, chat: ChatId, latitude: f64, longitude: f64) -> Result<()>;
}

/// HTTP messenger speaking the gateway's bot API.
///
/// Methods are exposed as JSON endpoints under `{base_url}/bot{token}/`:
/// `sendMessage`, `sendPhoto`, `sendLocation`.
pub struct HttpMessenger {
    http: reqwest::Client,
    endpoint_base: String,
}

impl HttpMessenger {
    pub fn new(base_url: &str, bot_token: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint_base: format!("{}/bot{}", base_url.trim_end_matches('/'), bot_token),
        }
    }

    async fn post(&self, method: &str, payload: serde_json::Value) -> Result<()> {
        let url = format!("{}/{}", self.endpoint_base, method);
        let response = self
            .http
            .post(&url)
            .json(&payload)
            .send()
            .await
            .with_context(|| format!("gateway call {} failed to send", method))?;

        let status = response.status();
        if !status.is_success() {
            bail!("gateway call {} returned {}", method, status);
        }
        Ok(())
    }
}

#[async_trait]
impl Messenger for HttpMessenger {
    async fn send_text(&self, chat: ChatId, text: &str, format: TextFormat) -> Result<()> {
        let mut payload = json!({
            "chat_id": chat.0,
            "text": text,
        });
        if format == TextFormat::Html {
            payload["parse_mode"] = json!("HTML");
        }
        self.post("sendMessage", payload).await
    }

    async fn send_image(&self, chat: ChatId, asset: &str) -> Result<()> {
        self.post(
            "sendPhoto",
            json!({
                "chat_id": chat.0,
                "photo": asset,
            }),
        )
        .await
    }

    async fn send_location(&self, chat: ChatId, latitude: f64, longitude: f64) -> Result<()> {
        self.post(
            "sendLocation",
            json!({
                "chat_id": chat.0,
                "latitude": latitude,
                "longitude": longitude,
            }),
        )
        .await
    }
}

/// One message captured by [`RecordingMessenger`].
#[derive(Debug, Clone, PartialEq)]
pub enum SentMessage {
    Text {
        chat: ChatId,
        text: String,
        format: TextFormat,
    },
    Image {
        chat: ChatId,
        asset: String,
    },
    Location {
        chat: ChatId,
        latitude: f64,
        longitude: f64,
    },
}

/// Messenger that records every send instead of talking to a gateway.
///
/// Used by the test suites to assert on outbound traffic without HTTP.
#[derive(Default)]
pub struct RecordingMessenger {
    sent: Mutex<Vec<SentMessage>>,
}

impl RecordingMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything sent so far, in order.
    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().expect("recording lock poisoned").clone()
    }

    /// Drop everything recorded so far.
    pub fn clear(&self) {
        self.sent.lock().expect("recording lock poisoned").clear();
    }

    fn record(&self, message: SentMessage) {
        self.sent.lock().expect("recording lock poisoned").push(message);
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send_text(&self, chat: ChatId, text: &str, format: TextFormat) -> Result<()> {
        self.record(SentMessage::Text {
            chat,
            text: text.to_string(),
            format,
        });
        Ok(())
    }

    async fn send_image(&self, chat: ChatId, asset: &str) -> Result<()> {
        self.record(SentMessage::Image {
            chat,
            asset: asset.to_string(),
        });
        Ok(())
    }

    async fn send_location(&self, chat: ChatId, latitude: f64, longitude: f64) -> Result<()> {
        self.record(SentMessage::Location {
            chat,
            latitude,
            longitude,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_base_strips_trailing_slash() {
        let messenger = HttpMessenger::new("https://gateway.example/", "abc123");
        assert_eq!(messenger.endpoint_base, "https://gateway.example/botabc123");
    }

    #[tokio::test]
    async fn test_recording_messenger_captures_in_order() {
        let messenger = RecordingMessenger::new();
        let chat = ChatId(42);

        messenger
            .send_text(chat, "hello", TextFormat::Plain)
            .await
            .unwrap();
        messenger.send_image(chat, "map.jpg").await.unwrap();

        assert_eq!(
            messenger.sent(),
            vec![
                SentMessage::Text {
                    chat,
                    text: "hello".to_string(),
                    format: TextFormat::Plain,
                },
                SentMessage::Image {
                    chat,
                    asset: "map.jpg".to_string(),
                },
            ]
        );
    }
}
