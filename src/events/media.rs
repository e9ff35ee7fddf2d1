//! Media event handler.
//!
//! Every photo, video or image/video document goes through
//! permission check → album resolution → upload. Work runs on its own task
//! so a slow upload or a media-group wait never blocks the chat's update queue.

use teloxide::prelude::*;
use tracing::{debug, error};

use crate::bot::dispatcher::AppState;
use crate::models::IncomingMedia;
use crate::upload::UploadOutcome;

/// Whether a message carries something we might upload.
pub fn has_media(msg: &Message) -> bool {
    msg.photo().is_some() || msg.video().is_some() || msg.document().is_some()
}

/// Dispatcher endpoint: extract the media and hand it to a worker task.
pub async fn handle_media(msg: Message, state: AppState) -> anyhow::Result<()> {
    let Some(media) = IncomingMedia::from_message(&msg) else {
        return Ok(());
    };

    // Waits here when the pool is full.
    let permit = state.limiter.clone().acquire_owned().await?;

    tokio::spawn(async move {
        let _permit = permit;
        process_media(&state, media).await;
    });

    Ok(())
}

/// Permission check, album resolution and upload for one message.
pub async fn process_media(state: &AppState, media: IncomingMedia) {
    if !state.permissions.decide(&media.chat, media.sender_id).await {
        debug!(
            "Ignoring media from user {} in chat {}",
            media.sender_id, media.chat.id
        );
        return;
    }

    let album = state
        .resolver
        .resolve(
            &media.chat,
            media.media_group_id.as_deref(),
            media.caption.as_deref(),
        )
        .await;

    match state.uploader.upload(&media, &album).await {
        Ok(UploadOutcome::Uploaded { asset_id, attached }) => {
            debug!("Message {} stored as asset {} (in album: {})", media.message_id, asset_id, attached);
        }
        Ok(UploadOutcome::Duplicate) => {}
        Err(e) => {
            error!(
                "Upload of message {} in chat {} failed: {:#}",
                media.message_id, media.chat.id, e
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::Utc;
    use parking_lot::Mutex;
    use teloxide::types::FileId;
    use tokio_util::sync::CancellationToken;

    use super::*;
    use crate::album::{AlbumResolver, GroupCache, PollPolicy};
    use crate::immich::{AssetUpload, ImmichError, MediaLibrary, UploadedAsset};
    use crate::models::{ChatInfo, ChatKind, MediaItem};
    use crate::permissions::{
        AuthorizationCache, MemberStatus, MembershipProbe, Permissions, ProbeError,
    };
    use crate::upload::{ChatPlatform, FetchedFile, PlatformError, Uploader};

    struct NobodyProbe;

    #[async_trait]
    impl MembershipProbe for NobodyProbe {
        async fn member_status(&self, _chat_id: i64, _user_id: i64) -> Result<MemberStatus, ProbeError> {
            Ok(MemberStatus::Left)
        }
    }

    struct QuietPlatform;

    #[async_trait]
    impl ChatPlatform for QuietPlatform {
        async fn fetch_file(&self, _file_id: &FileId) -> Result<FetchedFile, PlatformError> {
            Ok(FetchedFile {
                bytes: vec![0],
                path: "photos/p.jpg".into(),
            })
        }

        async fn react(&self, _chat_id: i64, _message_id: i32, _emoji: &str) -> Result<(), PlatformError> {
            Ok(())
        }
    }

    /// Records which album every upload was filed under.
    #[derive(Default)]
    struct RecordingLibrary {
        albums: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl MediaLibrary for RecordingLibrary {
        async fn find_or_create_album(&self, name: &str) -> Result<String, ImmichError> {
            self.albums.lock().push(name.to_string());
            Ok(name.to_string())
        }

        async fn upload_asset(&self, _upload: AssetUpload) -> Result<UploadedAsset, ImmichError> {
            Ok(UploadedAsset {
                id: "a".into(),
                duplicate: false,
            })
        }

        async fn add_asset_to_album(&self, _album_id: &str, _asset_id: &str) -> Result<(), ImmichError> {
            Ok(())
        }
    }

    fn state(library: Arc<RecordingLibrary>) -> AppState {
        let permissions = Permissions::new(
            [1i64].into_iter().collect(),
            AuthorizationCache::new(),
            Arc::new(NobodyProbe),
            Duration::from_secs(5),
        );
        let resolver = AlbumResolver::new(
            GroupCache::new(),
            PollPolicy::default(),
            CancellationToken::new(),
        );
        let uploader = Uploader::new(Arc::new(QuietPlatform), library);
        AppState::new(permissions, resolver, uploader, 4)
    }

    fn media(sender_id: i64, group: Option<&str>, caption: Option<&str>) -> IncomingMedia {
        IncomingMedia {
            chat: ChatInfo {
                id: -1001,
                kind: ChatKind::Group,
                title: Some("Family".into()),
                ..Default::default()
            },
            message_id: 1,
            sender_id,
            media_group_id: group.map(str::to_string),
            caption: caption.map(str::to_string),
            date: Utc::now(),
            item: MediaItem {
                file_id: FileId("f".to_string()),
                file_name: None,
            },
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_unauthorized_chat_is_ignored() {
        let library = Arc::new(RecordingLibrary::default());
        let state = state(library.clone());

        process_media(&state, media(42, None, None)).await;
        assert!(library.albums.lock().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_shares_directive_album() {
        let library = Arc::new(RecordingLibrary::default());
        let state = state(library.clone());

        // The sibling starts first; the directive-bearing message lands later.
        let sibling = {
            let state = state.clone();
            tokio::spawn(async move { process_media(&state, media(1, Some("g"), None)).await })
        };
        tokio::time::sleep(Duration::from_millis(300)).await;
        process_media(&state, media(1, Some("g"), Some("!папка Trip"))).await;
        sibling.await.unwrap();

        let mut albums = library.albums.lock().clone();
        albums.sort();
        assert_eq!(albums, vec!["Trip".to_string(), "Trip".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_admin_media_without_directive_uses_chat_title() {
        let library = Arc::new(RecordingLibrary::default());
        let state = state(library.clone());

        process_media(&state, media(1, None, Some("sunset"))).await;
        assert_eq!(*library.albums.lock(), vec!["Family".to_string()]);
    }
}
