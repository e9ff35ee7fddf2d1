//! Message dispatcher setup.
//!
//! Builds the dispatcher and the state shared by every handler.

use std::sync::Arc;

use teloxide::adaptors::Throttle;
use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use tokio::sync::Semaphore;

use crate::album::AlbumResolver;
use crate::events;
use crate::permissions::Permissions;
use crate::upload::Uploader;

/// Bot type with Throttle adaptor for automatic rate limiting.
pub type ThrottledBot = Throttle<Bot>;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Decides which chats may forward media.
    pub permissions: Permissions,

    /// Picks the target album for each message.
    pub resolver: AlbumResolver,

    /// Telegram → Immich upload pipeline.
    pub uploader: Uploader,

    /// Bounds the number of media messages processed at once.
    pub limiter: Arc<Semaphore>,
}

impl AppState {
    pub fn new(
        permissions: Permissions,
        resolver: AlbumResolver,
        uploader: Uploader,
        max_concurrent: usize,
    ) -> Self {
        Self {
            permissions,
            resolver,
            uploader,
            limiter: Arc::new(Semaphore::new(max_concurrent)),
        }
    }
}

/// Build the dispatcher with all handlers.
pub fn build_dispatcher(
    bot: ThrottledBot,
    state: AppState,
) -> Dispatcher<ThrottledBot, anyhow::Error, teloxide::dispatching::DefaultKey> {
    Dispatcher::builder(bot, schema())
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
}

/// Build the handler schema.
fn schema() -> UpdateHandler<anyhow::Error> {
    dptree::entry().branch(Update::filter_message().branch(events::media_handler()))
}
