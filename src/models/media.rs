//! Media messages accepted for upload.

use chrono::{DateTime, Utc};
use teloxide::types::{FileId, Message};

use super::ChatInfo;

/// A single photo, video or image/video document attached to a message.
#[derive(Clone, Debug)]
pub struct MediaItem {
    pub file_id: FileId,
    /// Original file name, when Telegram kept one (videos and documents).
    pub file_name: Option<String>,
}

impl MediaItem {
    /// Pick the uploadable media of a message.
    ///
    /// Photos use their largest size. Documents are only accepted when they
    /// are images or videos.
    pub fn from_message(msg: &Message) -> Option<Self> {
        if let Some(best) = msg.photo().and_then(|sizes| sizes.last()) {
            return Some(Self {
                file_id: best.file.id.clone(),
                file_name: None,
            });
        }

        if let Some(video) = msg.video() {
            return Some(Self {
                file_id: video.file.id.clone(),
                file_name: video.file_name.clone(),
            });
        }

        if let Some(doc) = msg.document()
            && is_supported_mime(doc.mime_type.as_ref().map(|m| m.essence_str()))
        {
            return Some(Self {
                file_id: doc.file.id.clone(),
                file_name: doc.file_name.clone(),
            });
        }

        None
    }
}

/// Only images and videos are forwarded.
pub fn is_supported_mime(mime: Option<&str>) -> bool {
    mime.is_some_and(|m| m.starts_with("image/") || m.starts_with("video/"))
}

/// Everything the bridge needs from one incoming media message.
#[derive(Clone, Debug)]
pub struct IncomingMedia {
    pub chat: ChatInfo,
    pub message_id: i32,
    pub sender_id: i64,
    pub media_group_id: Option<String>,
    pub caption: Option<String>,
    pub date: DateTime<Utc>,
    pub item: MediaItem,
}

impl IncomingMedia {
    /// Returns `None` for messages without a sender or without usable media.
    pub fn from_message(msg: &Message) -> Option<Self> {
        let sender = msg.from.as_ref()?;
        let sender_id = i64::try_from(sender.id.0).ok()?;
        let item = MediaItem::from_message(msg)?;

        Some(Self {
            chat: ChatInfo::from(&msg.chat),
            message_id: msg.id.0,
            sender_id,
            media_group_id: msg.media_group_id().map(ToString::to_string),
            caption: msg.caption().map(str::to_string),
            date: msg.date,
            item,
        })
    }

    /// Stable key Immich uses to recognise re-uploads of the same message.
    pub fn device_asset_id(&self) -> String {
        format!("tg-{}-{}", self.chat.id, self.message_id)
    }
}
