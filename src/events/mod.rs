//! Event handler system.
//!
//! The bridge only observes messages; it never answers commands.

pub mod media;

use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;

/// Build the message handler for incoming media.
pub fn media_handler() -> UpdateHandler<anyhow::Error> {
    dptree::filter(|msg: Message| media::has_media(&msg)).endpoint(media::handle_media)
}
