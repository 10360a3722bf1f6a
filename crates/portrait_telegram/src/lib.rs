pub mod client;
pub mod command;
pub mod types;

pub use client::{split_chunks, TelegramClient};
pub use command::Command;
pub use types::{ApiResponse, Chat, File, Message, PhotoSize, Update, User};
