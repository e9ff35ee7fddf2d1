//! Download from Telegram, upload to Immich, file into an album.

use std::sync::Arc;

use anyhow::{Context, bail};
use tracing::{debug, info, warn};

use super::ChatPlatform;
use crate::immich::{AssetUpload, MediaLibrary};
use crate::models::IncomingMedia;

/// Reaction for a freshly uploaded asset.
pub const REACTION_UPLOADED: &str = "👌";
/// Reaction for an asset Immich already had.
pub const REACTION_DUPLICATE: &str = "👀";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Uploaded { asset_id: String, attached: bool },
    Duplicate,
}

/// Runs the upload sequence for one approved message.
#[derive(Clone)]
pub struct Uploader {
    platform: Arc<dyn ChatPlatform>,
    library: Arc<dyn MediaLibrary>,
}

impl Uploader {
    pub fn new(platform: Arc<dyn ChatPlatform>, library: Arc<dyn MediaLibrary>) -> Self {
        Self { platform, library }
    }

    /// Upload `media` into `album`.
    ///
    /// Each remote call is tried once. A failed album attach is logged and the
    /// upload kept. Failures before the upload leave the message without a
    /// reaction.
    pub async fn upload(&self, media: &IncomingMedia, album: &str) -> anyhow::Result<UploadOutcome> {
        debug!("Processing message {} in chat {} (album: {})", media.message_id, media.chat.id, album);

        let album_id = self
            .library
            .find_or_create_album(album)
            .await
            .with_context(|| format!("resolving album '{album}'"))?;

        let file = self
            .platform
            .fetch_file(&media.item.file_id)
            .await
            .context("downloading file from Telegram")?;

        let file_name = media
            .item
            .file_name
            .clone()
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| file.base_name());

        let uploaded = self
            .library
            .upload_asset(AssetUpload {
                bytes: file.bytes,
                file_name: file_name.clone(),
                created_at: media.date,
                device_asset_id: media.device_asset_id(),
            })
            .await
            .with_context(|| format!("uploading '{file_name}'"))?;

        if uploaded.id.is_empty() {
            if !uploaded.duplicate {
                bail!("'{file_name}' uploaded but Immich returned no asset id");
            }
            info!("'{}' already exists in Immich (duplicate)", file_name);
            self.react(media, REACTION_DUPLICATE).await;
            return Ok(UploadOutcome::Duplicate);
        }

        let attached = match self.library.add_asset_to_album(&album_id, &uploaded.id).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Uploaded '{}' but could not add it to album '{}': {}", file_name, album, e);
                false
            }
        };

        self.react(media, REACTION_UPLOADED).await;
        info!("Uploaded '{}' -> album '{}'", file_name, album);

        Ok(UploadOutcome::Uploaded {
            asset_id: uploaded.id,
            attached,
        })
    }

    async fn react(&self, media: &IncomingMedia, emoji: &str) {
        if let Err(e) = self
            .platform
            .react(media.chat.id, media.message_id, emoji)
            .await
        {
            debug!("Could not react to message {}: {}", media.message_id, e);
        }
    }
}
