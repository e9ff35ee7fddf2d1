//! Domain types extracted from Telegram updates.

mod chat;
mod media;

pub use chat::{ChatInfo, ChatKind};
pub use media::IncomingMedia;
#[cfg_attr(not(test), allow(unused_imports))]
pub use media::MediaItem;
