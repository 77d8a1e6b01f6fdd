use crate::errors::{ExportError, ExportResult};
use crate::export::ChatClient;
use crate::model::{Channel, ChannelId, Message, MessageId};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

const API_BASE: &str = "https://discord.com/api/v10";
const CONNECT_TIMEOUT_SECS: u64 = 10;
const REQUEST_TIMEOUT_SECS: u64 = 30;
/// Discord caps the messages endpoint at 100 per page.
const PAGE_LIMIT: usize = 100;

/// REST client for the Discord HTTP API. Owns its connection pool; dropping
/// the client (on any exit path of an export) releases it.
pub struct DiscordClient {
    client: Client,
    base_url: String,
    token: String,
}

impl DiscordClient {
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_base_url(token, API_BASE.to_string())
    }

    /// Point the client at a different API base (mock servers, proxies).
    pub fn with_base_url(token: impl Into<String>, base_url: String) -> Self {
        Self {
            client: Client::builder()
                .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
                .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .unwrap_or_else(|_| Client::new()),
            base_url,
            token: token.into(),
        }
    }

    /// GET a JSON payload; failures come back as a one-line reason the
    /// caller wraps into its typed error.
    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, String> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self
            .client
            .get(&url)
            .header("Authorization", format!("Bot {}", self.token))
            .send()
            .await
            .map_err(|e| format!("request failed: {e}"))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(describe_status(status, &body));
        }

        resp.json::<T>()
            .await
            .map_err(|e| format!("invalid response body: {e}"))
    }
}

/// Condense an error response into one diagnosable line, preferring the
/// `message` field Discord puts in its error bodies.
fn describe_status(status: StatusCode, body: &str) -> String {
    let detail = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("message")
                .and_then(serde_json::Value::as_str)
                .map(str::to_string)
        });
    match detail {
        Some(message) => format!("HTTP {status}: {message}"),
        None => format!("HTTP {status}"),
    }
}

#[async_trait]
impl ChatClient for DiscordClient {
    async fn resolve_channel(&self, channel_id: ChannelId) -> ExportResult<Channel> {
        debug!("resolving channel {}", channel_id);
        self.get(&format!("/channels/{channel_id}"))
            .await
            .map_err(|reason| ExportError::ChannelResolution { channel_id, reason })
    }

    async fn fetch_message(
        &self,
        channel: &Channel,
        message_id: MessageId,
    ) -> ExportResult<Message> {
        debug!("fetching message {} from channel {}", message_id, channel.id);
        self.get(&format!("/channels/{}/messages/{}", channel.id, message_id))
            .await
            .map_err(|reason| ExportError::MessageResolution {
                channel_id: channel.id,
                message_id,
                reason,
            })
    }

    /// Walks the history with an `after` cursor until `hi` is reached or the
    /// channel runs out. Pages arrive newest-first and are consumed
    /// oldest-first; only messages strictly inside the boundary interval are
    /// kept.
    async fn messages_between(
        &self,
        channel: &Channel,
        lo: &Message,
        hi: &Message,
    ) -> ExportResult<Vec<Message>> {
        let mut interior = Vec::new();
        let mut cursor = lo.id;

        loop {
            let path = format!(
                "/channels/{}/messages?after={}&limit={}",
                channel.id, cursor, PAGE_LIMIT
            );
            let page: Vec<Message> =
                self.get(&path)
                    .await
                    .map_err(|reason| ExportError::HistoryFetch {
                        channel_id: channel.id,
                        reason,
                    })?;
            if page.is_empty() {
                break;
            }
            let page_len = page.len();

            let mut ascending = page;
            ascending.reverse();
            // Newest id in the page drives the next request.
            if let Some(newest) = ascending.last() {
                cursor = newest.id;
            }

            let mut reached_hi = false;
            for msg in ascending {
                if msg.id == hi.id || msg.timestamp >= hi.timestamp {
                    reached_hi = true;
                    break;
                }
                // `after` is exclusive by id, but a message can still share
                // lo's timestamp; the interval is open on both ends.
                if msg.id == lo.id || msg.timestamp <= lo.timestamp {
                    continue;
                }
                interior.push(msg);
            }

            if reached_hi || page_len < PAGE_LIMIT {
                break;
            }
        }

        debug!(
            "collected {} interior messages for channel {}",
            interior.len(),
            channel.id
        );
        Ok(interior)
    }
}
