//! Telegram-side operations used while uploading.

use std::path::Path;

use async_trait::async_trait;
use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::{FileId, MessageId, ReactionType};
use teloxide::{DownloadError, RequestError};
use thiserror::Error;

use crate::bot::ThrottledBot;

#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("Telegram request failed: {0}")]
    Request(#[from] RequestError),

    #[error("file download failed: {0}")]
    Download(#[from] DownloadError),
}

/// A file fetched from the chat platform.
#[derive(Debug, Clone)]
pub struct FetchedFile {
    pub bytes: Vec<u8>,
    /// Server-side path, e.g. `photos/file_12.jpg`.
    pub path: String,
}

impl FetchedFile {
    /// Last component of the server-side path.
    pub fn base_name(&self) -> String {
        Path::new(&self.path)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.clone())
    }
}

/// Fetching files and reacting to messages.
#[async_trait]
pub trait ChatPlatform: Send + Sync {
    async fn fetch_file(&self, file_id: &FileId) -> Result<FetchedFile, PlatformError>;

    async fn react(&self, chat_id: i64, message_id: i32, emoji: &str) -> Result<(), PlatformError>;
}

#[derive(Clone)]
pub struct TelegramPlatform {
    bot: ThrottledBot,
}

impl TelegramPlatform {
    pub fn new(bot: ThrottledBot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl ChatPlatform for TelegramPlatform {
    async fn fetch_file(&self, file_id: &FileId) -> Result<FetchedFile, PlatformError> {
        let file = self.bot.get_file(file_id.clone()).await?;

        let mut bytes = Vec::new();
        self.bot.inner().download_file(&file.path, &mut bytes).await?;

        Ok(FetchedFile {
            bytes,
            path: file.path,
        })
    }

    async fn react(&self, chat_id: i64, message_id: i32, emoji: &str) -> Result<(), PlatformError> {
        self.bot
            .set_message_reaction(ChatId(chat_id), MessageId(message_id))
            .reaction(vec![ReactionType::Emoji {
                emoji: emoji.to_string(),
            }])
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_name() {
        let file = FetchedFile {
            bytes: Vec::new(),
            path: "photos/file_12.jpg".into(),
        };
        assert_eq!(file.base_name(), "file_12.jpg");

        let file = FetchedFile {
            bytes: Vec::new(),
            path: "video.mp4".into(),
        };
        assert_eq!(file.base_name(), "video.mp4");
    }
}
