//! The subset of Bot API objects the bot reads.
//!
//! Unknown fields are ignored, so newer API versions deserialize fine.

use serde::{Deserialize, Serialize};

/// Envelope around every Bot API response.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
    pub error_code: Option<i32>,
}

impl<T> ApiResponse<T> {
    /// The payload of a successful response, or the API's own error text.
    pub fn into_result(self) -> anyhow::Result<T> {
        match (self.ok, self.result) {
            (true, Some(result)) => Ok(result),
            (true, None) => anyhow::bail!("Telegram API returned ok without a result"),
            (false, _) => anyhow::bail!(
                "Telegram API error {}: {}",
                self.error_code.unwrap_or_default(),
                self.description.unwrap_or_else(|| "Unknown".to_string())
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub from: Option<User>,
    pub chat: Chat,
    #[serde(default)]
    pub date: i64,
    pub text: Option<String>,
    /// Available sizes of the same photo, smallest first
    pub photo: Option<Vec<PhotoSize>>,
}

impl Message {
    /// The largest available rendition of an attached photo.
    pub fn largest_photo(&self) -> Option<&PhotoSize> {
        self.photo.as_ref()?.iter().max_by_key(|p| (p.width as u64) * (p.height as u64))
    }

    pub fn sender_id(&self) -> Option<i64> {
        self.from.as_ref().map(|u| u.id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    #[serde(default)]
    pub first_name: String,
    pub username: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
    #[serde(rename = "type", default)]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoSize {
    pub file_id: String,
    pub file_unique_id: Option<String>,
    pub width: u32,
    pub height: u32,
    pub file_size: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct File {
    pub file_id: String,
    pub file_size: Option<u64>,
    /// Relative path for the file download endpoint
    pub file_path: Option<String>,
}
