//! Album name resolution for incoming media.

use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::{GroupCache, PollPolicy};
use crate::models::ChatInfo;

/// Caption marker selecting the target album: `!папка <album name>`.
pub const DIRECTIVE_TRIGGER: &str = "!папка";

/// Extract the album name following [`DIRECTIVE_TRIGGER`] in a caption.
///
/// The name runs to the end of the line and is trimmed; an empty name counts
/// as no directive.
pub fn parse_directive(caption: &str) -> Option<&str> {
    let (_, rest) = caption.split_once(DIRECTIVE_TRIGGER)?;
    let line = rest.split('\n').next().unwrap_or("");
    let name = line.trim();
    (!name.is_empty()).then_some(name)
}

/// Maps a message to the album it should be filed under.
#[derive(Clone, Debug)]
pub struct AlbumResolver {
    groups: GroupCache,
    poll: PollPolicy,
    shutdown: CancellationToken,
}

impl AlbumResolver {
    pub fn new(groups: GroupCache, poll: PollPolicy, shutdown: CancellationToken) -> Self {
        Self {
            groups,
            poll,
            shutdown,
        }
    }

    #[allow(dead_code)]
    pub fn groups(&self) -> &GroupCache {
        &self.groups
    }

    /// Resolve the album name for a message.
    ///
    /// An explicit directive wins and is shared with the rest of its media
    /// group. Siblings without a directive wait briefly for it, since Telegram
    /// delivers the group as separate messages in no particular order. Anything
    /// left falls back to the chat's display name.
    pub async fn resolve(
        &self,
        chat: &ChatInfo,
        group_id: Option<&str>,
        caption: Option<&str>,
    ) -> String {
        if let Some(album) = caption.and_then(parse_directive) {
            if let Some(group_id) = group_id {
                self.groups.remember(group_id, album);
            }
            return album.to_string();
        }

        if let Some(group_id) = group_id {
            let cached = self
                .poll
                .poll(&self.shutdown, || self.groups.lookup(group_id))
                .await;
            if let Some(album) = cached {
                return album;
            }
            debug!(
                "No album directive for media group {} within {:?}",
                group_id,
                self.poll.budget()
            );
        }

        chat.display_name()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::Instant;

    use super::*;
    use crate::models::ChatKind;

    fn chat() -> ChatInfo {
        ChatInfo {
            id: -1001,
            kind: ChatKind::Group,
            title: Some("Family".into()),
            ..Default::default()
        }
    }

    fn resolver() -> AlbumResolver {
        AlbumResolver::new(
            GroupCache::new(),
            PollPolicy::default(),
            CancellationToken::new(),
        )
    }

    #[test]
    fn test_parse_directive_stops_at_newline() {
        assert_eq!(
            parse_directive("hello !папка Vacation2024\nmore text"),
            Some("Vacation2024")
        );
    }

    #[test]
    fn test_parse_directive_keeps_inner_spaces() {
        assert_eq!(
            parse_directive("!папка   Summer at the lake  "),
            Some("Summer at the lake")
        );
    }

    #[test]
    fn test_parse_directive_empty_or_missing() {
        assert_eq!(parse_directive("!папка   \nTrip"), None);
        assert_eq!(parse_directive("!папка"), None);
        assert_eq!(parse_directive("just a photo"), None);
        assert_eq!(parse_directive(""), None);
    }

    #[test]
    fn test_parse_directive_uses_first_trigger() {
        assert_eq!(parse_directive("!папка A !папка B"), Some("A !папка B"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fallback_is_stable_without_group() {
        let resolver = resolver();
        let start = Instant::now();

        let first = resolver.resolve(&chat(), None, Some("nice view")).await;
        let second = resolver.resolve(&chat(), None, Some("nice view")).await;

        assert_eq!(first, "Family");
        assert_eq!(first, second);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_directive_is_shared_with_group() {
        let resolver = resolver();

        let album = resolver
            .resolve(&chat(), Some("g1"), Some("!папка Trip"))
            .await;
        assert_eq!(album, "Trip");

        let sibling = resolver.resolve(&chat(), Some("g1"), None).await;
        assert_eq!(sibling, "Trip");
    }

    #[tokio::test(start_paused = true)]
    async fn test_directive_without_group_is_not_cached() {
        let resolver = resolver();

        let album = resolver.resolve(&chat(), None, Some("!папка Trip")).await;
        assert_eq!(album, "Trip");
        assert_eq!(resolver.groups().len(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sibling_waits_for_late_directive() {
        let resolver = resolver();
        let groups = resolver.groups().clone();

        let writer = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(450)).await;
            groups.remember("g1", "Trip");
        });

        let album = resolver.resolve(&chat(), Some("g1"), None).await;
        assert_eq!(album, "Trip");
        writer.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_group_without_directive_falls_back_after_budget() {
        let resolver = resolver();
        let start = Instant::now();

        let album = resolver.resolve(&chat(), Some("g2"), Some("no marker")).await;

        assert_eq!(album, "Family");
        assert_eq!(start.elapsed(), Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_group_falls_back() {
        let resolver = resolver();
        resolver.groups().remember("g1", "Trip");

        tokio::time::advance(Duration::from_secs(121)).await;
        let album = resolver.resolve(&chat(), Some("g1"), None).await;
        assert_eq!(album, "Family");
    }
}
