//! tg-immich-bridge - Telegram to Immich media forwarder
//!
//! Watches chats for photos and videos and files them into Immich albums.
//!
//! ## Architecture
//!
//! - `config` - Environment configuration
//! - `permissions` - Admin registry and per-chat authorization
//! - `album` - Album name resolution and media-group memo
//! - `immich` - Immich API client
//! - `upload` - Download/upload/attach pipeline
//! - `cache` - Typed Moka caches
//! - `bot` - Dispatcher and runtime (with Throttle for API rate limiting)
//! - `events` - Media message handler
//! - `models` - Domain types extracted from updates

mod album;
mod bot;
mod cache;
mod config;
mod events;
mod immich;
mod models;
mod permissions;
mod upload;

use std::sync::Arc;
use std::time::Duration;

use teloxide::adaptors::throttle::Limits;
use teloxide::prelude::*;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

use album::{AlbumResolver, GroupCache, PollPolicy};
use bot::AppState;
use config::Config;
use immich::ImmichClient;
use permissions::{AuthorizationCache, Permissions, TelegramProbe};
use upload::{TelegramPlatform, Uploader};

/// How often expired media-group entries are dropped.
const GROUP_SWEEP_INTERVAL: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file first (before anything else)
    dotenvy::dotenv().ok();

    // If RUST_LOG is not set, default to "info" level for our crate
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("tg_immich_bridge=info,teloxide=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting tg-immich-bridge...");

    let config = Config::from_env()?;
    info!("Configuration loaded successfully");
    info!("Bot mode: {:?}", config.bot_mode);

    // Immich must be reachable before we accept any media
    let immich = ImmichClient::new(
        &config.immich_url,
        &config.immich_api_key,
        config.immich_timeout,
    )?;
    let owner = immich
        .ping()
        .await
        .map_err(|e| anyhow::anyhow!("cannot reach Immich at {}: {}", config.immich_url, e))?;
    info!("Immich connection OK (user: {})", owner);

    // Throttle keeps reactions within Telegram's rate limits
    let bot = Bot::new(&config.telegram_token).throttle(Limits::default());
    let me = bot.get_me().await?;
    info!("Bot username: @{}", me.username());

    let shutdown = CancellationToken::new();

    let permissions = Permissions::new(
        config.admins.clone(),
        AuthorizationCache::new(),
        Arc::new(TelegramProbe::new(bot.inner().clone())),
        config.probe_timeout,
    );

    let groups = GroupCache::new();
    let sweeper = groups.spawn_sweeper(GROUP_SWEEP_INTERVAL, shutdown.clone());
    let resolver = AlbumResolver::new(groups, PollPolicy::default(), shutdown.clone());

    let uploader = Uploader::new(
        Arc::new(TelegramPlatform::new(bot.clone())),
        Arc::new(immich),
    );

    let state = AppState::new(
        permissions,
        resolver,
        uploader,
        config.max_concurrent_handlers,
    );
    info!(
        "Restricted mode: {} admin(s), up to {} concurrent uploads",
        config.admins.len(),
        config.max_concurrent_handlers
    );

    let dispatcher = bot::build_dispatcher(bot.clone(), state);
    let result = bot::run(&config, bot, dispatcher).await;

    shutdown.cancel();
    let _ = sweeper.await;
    info!("Stopped");

    result
}
