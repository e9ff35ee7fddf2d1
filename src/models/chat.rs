//! Chat identity as seen by the bridge.

use teloxide::types::Chat;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ChatKind {
    /// One-to-one conversation with the bot.
    Private,
    /// Group, supergroup or channel.
    #[default]
    Group,
}

/// The parts of a Telegram chat the bridge cares about.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChatInfo {
    pub id: i64,
    pub kind: ChatKind,
    pub title: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
}

impl ChatInfo {
    /// Human-readable name for the chat, used as the default album name.
    ///
    /// Priority: title, then "first last", then username, then `Chat_<id>`.
    pub fn display_name(&self) -> String {
        if let Some(title) = non_empty(self.title.as_deref()) {
            return title.to_string();
        }

        let full_name = format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or(""),
            self.last_name.as_deref().unwrap_or("")
        );
        let full_name = full_name.trim();
        if !full_name.is_empty() {
            return full_name.to_string();
        }

        if let Some(username) = non_empty(self.username.as_deref()) {
            return username.to_string();
        }

        format!("Chat_{}", self.id)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

impl From<&Chat> for ChatInfo {
    fn from(chat: &Chat) -> Self {
        Self {
            id: chat.id.0,
            kind: if chat.is_private() {
                ChatKind::Private
            } else {
                ChatKind::Group
            },
            title: chat.title().map(str::to_string),
            first_name: chat.first_name().map(str::to_string),
            last_name: chat.last_name().map(str::to_string),
            username: chat.username().map(str::to_string),
        }
    }
}
