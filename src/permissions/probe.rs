//! Chat membership lookups against Telegram.

use async_trait::async_trait;
use teloxide::RequestError;
use teloxide::prelude::*;
use teloxide::types::{ChatId, ChatMemberKind, UserId};
use thiserror::Error;

/// Membership status of a user in a chat, as reported by Telegram.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemberStatus {
    Creator,
    Administrator,
    Member,
    Restricted,
    Left,
    Banned,
}

impl MemberStatus {
    /// Whether this status counts as the user being in the chat.
    pub fn is_present(self) -> bool {
        matches!(self, Self::Creator | Self::Administrator | Self::Member)
    }
}

impl From<&ChatMemberKind> for MemberStatus {
    fn from(kind: &ChatMemberKind) -> Self {
        match kind {
            ChatMemberKind::Owner(_) => Self::Creator,
            ChatMemberKind::Administrator(_) => Self::Administrator,
            ChatMemberKind::Member(_) => Self::Member,
            ChatMemberKind::Restricted(_) => Self::Restricted,
            ChatMemberKind::Left => Self::Left,
            ChatMemberKind::Banned(_) => Self::Banned,
        }
    }
}

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("getChatMember failed: {0}")]
    Telegram(#[from] RequestError),

    #[error("{0} is not a valid Telegram user id")]
    InvalidUserId(i64),
}

/// Answers "what is this user's status in this chat".
#[async_trait]
pub trait MembershipProbe: Send + Sync {
    async fn member_status(&self, chat_id: i64, user_id: i64) -> Result<MemberStatus, ProbeError>;
}

/// Probe backed by the Bot API `getChatMember` call.
#[derive(Clone)]
pub struct TelegramProbe {
    bot: Bot,
}

impl TelegramProbe {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl MembershipProbe for TelegramProbe {
    async fn member_status(&self, chat_id: i64, user_id: i64) -> Result<MemberStatus, ProbeError> {
        let user = u64::try_from(user_id).map_err(|_| ProbeError::InvalidUserId(user_id))?;
        let member = self
            .bot
            .get_chat_member(ChatId(chat_id), UserId(user))
            .await?;
        Ok(MemberStatus::from(&member.kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_present_statuses() {
        assert!(MemberStatus::Creator.is_present());
        assert!(MemberStatus::Administrator.is_present());
        assert!(MemberStatus::Member.is_present());

        assert!(!MemberStatus::Restricted.is_present());
        assert!(!MemberStatus::Left.is_present());
        assert!(!MemberStatus::Banned.is_present());
    }

    #[tokio::test]
    async fn test_negative_user_id_is_rejected_locally() {
        let telegram = TelegramProbe::new(Bot::new("0:test"));

        let err = telegram.member_status(-1001, -5).await.unwrap_err();
        assert!(matches!(err, ProbeError::InvalidUserId(-5)));
    }
}
