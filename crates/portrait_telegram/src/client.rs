use anyhow::{Context, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use url::Url;

use crate::types::{ApiResponse, File, Message, Update};

/// Telegram's hard limit on one text message, in characters.
pub const MAX_MESSAGE_CHARS: usize = 4096;

/// HTTP client for the Bot API methods the bot needs.
///
/// Method URLs embed the bot token, so transport errors are stripped of
/// their URL before they reach a log line.
#[derive(Clone)]
pub struct TelegramClient {
    client: Client,
    api_base: Url,
    token: String,
}

impl TelegramClient {
    /// `api_base` is normally `https://api.telegram.org`; tests point it at a mock server.
    pub fn new(api_base: &str, token: &str) -> Result<Self> {
        let api_base = Url::parse(api_base).context("Invalid Telegram API base URL")?;
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            api_base,
            token: token.to_string(),
        })
    }

    fn method_url(&self, method: &str) -> Result<Url> {
        self.api_base
            .join(&format!("bot{}/{}", self.token, method))
            .context("Failed to build Telegram method URL")
    }

    async fn call<P: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: &str,
        params: &P,
        timeout: Duration,
    ) -> Result<T> {
        let response = self
            .client
            .post(self.method_url(method)?)
            .json(params)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| e.without_url())
            .with_context(|| format!("Telegram {} request failed", method))?;

        // The API reports errors in the JSON body alongside non-2xx statuses.
        let status = response.status();
        let body: ApiResponse<T> = response
            .json()
            .await
            .map_err(|e| e.without_url())
            .with_context(|| {
                format!("Telegram {} returned an unreadable body (HTTP {})", method, status)
            })?;
        body.into_result()
    }

    /// Long-poll for updates after `offset`. Blocks server-side for up to `timeout_secs`.
    pub async fn get_updates(&self, offset: Option<i64>, timeout_secs: u64) -> Result<Vec<Update>> {
        let params = serde_json::json!({
            "offset": offset,
            "timeout": timeout_secs,
            "allowed_updates": ["message"],
        });
        self.call("getUpdates", &params, Duration::from_secs(timeout_secs + 10))
            .await
    }

    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<Message> {
        let params = serde_json::json!({ "chat_id": chat_id, "text": text });
        self.call("sendMessage", &params, Duration::from_secs(30)).await
    }

    /// Send `text` as consecutive messages of at most `chunk_chars` characters.
    pub async fn send_long_message(
        &self,
        chat_id: i64,
        text: &str,
        chunk_chars: usize,
    ) -> Result<usize> {
        let chunks = split_chunks(text, chunk_chars.min(MAX_MESSAGE_CHARS));
        for chunk in &chunks {
            self.send_message(chat_id, chunk).await?;
        }
        tracing::debug!("Sent {} message chunk(s) to chat {}", chunks.len(), chat_id);
        Ok(chunks.len())
    }

    pub async fn get_file(&self, file_id: &str) -> Result<File> {
        let params = serde_json::json!({ "file_id": file_id });
        self.call("getFile", &params, Duration::from_secs(30)).await
    }

    /// Download the content behind a `File::file_path`.
    pub async fn download_file(&self, file_path: &str) -> Result<Vec<u8>> {
        let url = self
            .api_base
            .join(&format!("file/bot{}/{}", self.token, file_path))
            .context("Failed to build Telegram file URL")?;
        let response = self
            .client
            .get(url)
            .timeout(Duration::from_secs(60))
            .send()
            .await
            .map_err(|e| e.without_url())
            .context("Telegram file download failed")?;
        if !response.status().is_success() {
            anyhow::bail!("Telegram file download returned HTTP {}", response.status());
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| e.without_url())
            .context("Failed to read downloaded file")?;
        Ok(bytes.to_vec())
    }
}

/// Split on character boundaries into pieces of at most `max_chars` characters.
/// Empty input gives no chunks; a zero limit is treated as one.
pub fn split_chunks(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut count = 0;
    for ch in text.chars() {
        if count == max_chars {
            chunks.push(std::mem::take(&mut current));
            count = 0;
        }
        current.push(ch);
        count += 1;
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
