//! Permission decision engine.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::{AdminSet, AuthorizationCache, MembershipProbe};
use crate::models::{ChatInfo, ChatKind};

/// Decides whether media from a chat may be forwarded.
///
/// Cheap local checks run first; Telegram is only asked about admin
/// membership when the chat is not in the authorization cache.
#[derive(Clone)]
pub struct Permissions {
    admins: AdminSet,
    cache: AuthorizationCache,
    probe: Arc<dyn MembershipProbe>,
    /// Bound for the whole membership fan-out of one decision.
    probe_timeout: Duration,
}

impl Permissions {
    pub fn new(
        admins: AdminSet,
        cache: AuthorizationCache,
        probe: Arc<dyn MembershipProbe>,
        probe_timeout: Duration,
    ) -> Self {
        Self {
            admins,
            cache,
            probe,
            probe_timeout,
        }
    }

    #[inline]
    pub fn is_admin(&self, user_id: i64) -> bool {
        self.admins.contains(user_id)
    }

    #[allow(dead_code)]
    pub fn cache(&self) -> &AuthorizationCache {
        &self.cache
    }

    /// Decide whether `sender_id` posting in `chat` may forward media.
    pub async fn decide(&self, chat: &ChatInfo, sender_id: i64) -> bool {
        // Private chats: only admins, and never remembered.
        if chat.kind == ChatKind::Private {
            return self.is_admin(sender_id);
        }

        if self.is_admin(sender_id) {
            debug!("Admin {} posted in chat {}, authorizing", sender_id, chat.id);
            self.cache.grant(chat.id);
            return true;
        }

        if self.cache.is_authorized(chat.id) {
            return true;
        }

        match tokio::time::timeout(self.probe_timeout, self.find_present_admin(chat.id)).await {
            Ok(Some(admin_id)) => {
                info!(
                    "Chat '{}' ({}) authorized by presence of admin {}",
                    chat.display_name(),
                    chat.id,
                    admin_id
                );
                self.cache.grant(chat.id);
                true
            }
            Ok(None) => {
                debug!("No admin present in chat {}, ignoring", chat.id);
                false
            }
            Err(_) => {
                warn!(
                    "Admin membership check for chat {} exceeded {:?}, ignoring",
                    chat.id, self.probe_timeout
                );
                false
            }
        }
    }

    /// Ask Telegram about each admin in turn; stop at the first one present.
    async fn find_present_admin(&self, chat_id: i64) -> Option<i64> {
        for admin_id in self.admins.iter() {
            match self.probe.member_status(chat_id, admin_id).await {
                Ok(status) if status.is_present() => return Some(admin_id),
                Ok(status) => {
                    debug!("Admin {} in chat {}: {:?}", admin_id, chat_id, status);
                }
                Err(e) => {
                    debug!("Membership probe for admin {} in chat {} failed: {}", admin_id, chat_id, e);
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use teloxide::ApiError;
    use teloxide::RequestError;

    use super::*;
    use crate::permissions::{MemberStatus, ProbeError};

    /// Scripted probe: answers from a table, errors for unknown users.
    #[derive(Default)]
    struct FakeProbe {
        statuses: HashMap<i64, MemberStatus>,
        calls: AtomicUsize,
        delay: Option<Duration>,
    }

    impl FakeProbe {
        fn with(statuses: &[(i64, MemberStatus)]) -> Self {
            Self {
                statuses: statuses.iter().copied().collect(),
                ..Default::default()
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl MembershipProbe for FakeProbe {
        async fn member_status(&self, _chat_id: i64, user_id: i64) -> Result<MemberStatus, ProbeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.statuses
                .get(&user_id)
                .copied()
                .ok_or_else(|| ProbeError::Telegram(RequestError::Api(ApiError::UserNotFound)))
        }
    }

    fn group() -> ChatInfo {
        ChatInfo {
            id: -1001,
            kind: ChatKind::Group,
            title: Some("Family".into()),
            ..Default::default()
        }
    }

    fn private(id: i64) -> ChatInfo {
        ChatInfo {
            id,
            kind: ChatKind::Private,
            first_name: Some("Ann".into()),
            ..Default::default()
        }
    }

    fn engine(admins: &[i64], probe: Arc<FakeProbe>) -> Permissions {
        Permissions::new(
            admins.iter().copied().collect(),
            AuthorizationCache::new(),
            probe,
            Duration::from_secs(15),
        )
    }

    #[tokio::test]
    async fn test_private_chat_admin_only_and_uncached() {
        let probe = Arc::new(FakeProbe::with(&[(1, MemberStatus::Member)]));
        let perms = engine(&[1], probe.clone());

        assert!(perms.decide(&private(1), 1).await);
        assert!(!perms.decide(&private(2), 2).await);

        assert_eq!(probe.calls(), 0);
        assert!(!perms.cache().is_authorized(1));
        assert!(!perms.cache().is_authorized(2));
    }

    #[tokio::test]
    async fn test_admin_in_group_authorizes_chat() {
        let probe = Arc::new(FakeProbe::default());
        let perms = engine(&[1], probe.clone());

        assert!(perms.decide(&group(), 1).await);
        assert!(perms.cache().is_authorized(-1001));
        assert_eq!(probe.calls(), 0);

        // Other members now pass without probing.
        assert!(perms.decide(&group(), 42).await);
        assert_eq!(probe.calls(), 0);
    }

    #[tokio::test]
    async fn test_present_admin_authorizes_cold_chat() {
        let probe = Arc::new(FakeProbe::with(&[(1, MemberStatus::Administrator)]));
        let perms = engine(&[1], probe.clone());

        assert!(perms.decide(&group(), 42).await);
        assert!(perms.cache().is_authorized(-1001));
        assert_eq!(probe.calls(), 1);

        assert!(perms.decide(&group(), 43).await);
        assert_eq!(probe.calls(), 1);
    }

    #[tokio::test]
    async fn test_probing_stops_at_first_present_admin() {
        let probe = Arc::new(FakeProbe::with(&[
            (1, MemberStatus::Member),
            (2, MemberStatus::Creator),
        ]));
        let perms = engine(&[1, 2], probe.clone());

        assert!(perms.decide(&group(), 42).await);
        assert_eq!(probe.calls(), 1);
    }

    #[tokio::test]
    async fn test_failed_probe_is_skipped() {
        // Admin 1 errors out, admin 2 is a member.
        let probe = Arc::new(FakeProbe::with(&[(2, MemberStatus::Member)]));
        let perms = engine(&[1, 2], probe.clone());

        assert!(perms.decide(&group(), 42).await);
        assert!(perms.cache().is_authorized(-1001));
    }

    #[tokio::test]
    async fn test_no_admin_present_denies_without_caching() {
        let probe = Arc::new(FakeProbe::with(&[
            (1, MemberStatus::Left),
            (2, MemberStatus::Restricted),
        ]));
        let perms = engine(&[1, 2, 3], probe.clone());

        assert!(!perms.decide(&group(), 42).await);
        assert_eq!(probe.calls(), 3);
        assert!(!perms.cache().is_authorized(-1001));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_probes_are_bounded() {
        let probe = Arc::new(FakeProbe {
            statuses: [(1, MemberStatus::Member)].into_iter().collect(),
            calls: AtomicUsize::new(0),
            delay: Some(Duration::from_secs(60)),
        });
        let perms = Permissions::new(
            [1i64].into_iter().collect(),
            AuthorizationCache::new(),
            probe,
            Duration::from_secs(5),
        );

        assert!(!perms.decide(&group(), 42).await);
        assert!(!perms.cache().is_authorized(-1001));
    }
}
