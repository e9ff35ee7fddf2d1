//! Configuration module for the bridge.
//!
//! Loads configuration from environment variables once at startup.

use std::env;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::permissions::AdminSet;

/// Default number of media messages handled at the same time.
const DEFAULT_MAX_CONCURRENT: usize = 20;

/// Default overall bound for the admin membership probe fan-out.
const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 15;

/// Default HTTP timeout for Immich requests (uploads can be large).
const DEFAULT_IMMICH_TIMEOUT_SECS: u64 = 300;

const DEFAULT_WEBHOOK_PORT: u16 = 8443;

/// Bot running mode
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BotMode {
    #[default]
    Polling,
    Webhook,
}

/// Fatal configuration problems. Any of these aborts startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {reason}")]
    Invalid { name: &'static str, reason: String },

    #[error("TELEGRAM_ADMINS contains no valid user id")]
    NoAdmins,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    // Telegram
    pub telegram_token: String,
    pub bot_mode: BotMode,
    pub webhook_url: Option<Url>,
    pub webhook_port: u16,
    pub webhook_secret: Option<String>,

    /// Users allowed to forward media, and whose presence authorizes a group.
    pub admins: AdminSet,

    // Immich
    pub immich_url: Url,
    pub immich_api_key: String,
    pub immich_timeout: Duration,

    /// Maximum number of media messages processed concurrently.
    pub max_concurrent_handlers: usize,

    /// Upper bound for probing admin membership in a cold chat.
    pub probe_timeout: Duration,
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// `.env` is not read here; `main` loads it before logging is set up.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let telegram_token = required("TELEGRAM_TOKEN")?;
        let immich_api_key = required("IMMICH_API_KEY")?;
        let immich_url = parse_immich_url(&required("IMMICH_URL")?)?;

        let admins = AdminSet::load(&required("TELEGRAM_ADMINS")?);
        if admins.is_empty() {
            return Err(ConfigError::NoAdmins);
        }

        let bot_mode = match lookup("BOT_MODE")
            .unwrap_or_else(|| "polling".to_string())
            .to_lowercase()
            .as_str()
        {
            "webhook" => BotMode::Webhook,
            _ => BotMode::Polling,
        };

        let webhook_url = lookup("WEBHOOK_URL")
            .filter(|s| !s.trim().is_empty())
            .map(|s| {
                Url::parse(s.trim()).map_err(|e| ConfigError::Invalid {
                    name: "WEBHOOK_URL",
                    reason: e.to_string(),
                })
            })
            .transpose()?;

        // Validate webhook URL is set if mode is webhook
        if bot_mode == BotMode::Webhook && webhook_url.is_none() {
            return Err(ConfigError::Missing("WEBHOOK_URL"));
        }

        let webhook_secret = lookup("WEBHOOK_SECRET").filter(|s| !s.is_empty());

        Ok(Self {
            telegram_token,
            bot_mode,
            webhook_url,
            webhook_port: parse_or(&lookup, "WEBHOOK_PORT", DEFAULT_WEBHOOK_PORT)?,
            webhook_secret,
            admins,
            immich_url,
            immich_api_key,
            immich_timeout: Duration::from_secs(parse_or(
                &lookup,
                "IMMICH_TIMEOUT_SECS",
                DEFAULT_IMMICH_TIMEOUT_SECS,
            )?),
            max_concurrent_handlers: parse_or(
                &lookup,
                "MAX_CONCURRENT_HANDLERS",
                DEFAULT_MAX_CONCURRENT,
            )?
            .max(1),
            probe_timeout: Duration::from_secs(parse_or(
                &lookup,
                "PROBE_TIMEOUT_SECS",
                DEFAULT_PROBE_TIMEOUT_SECS,
            )?),
        })
    }
}

/// Parse an optional numeric variable, falling back to `default` when unset.
fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name).filter(|s| !s.trim().is_empty()) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

/// Normalize the Immich base URL: users often paste it with `/api` or a trailing slash.
fn parse_immich_url(raw: &str) -> Result<Url, ConfigError> {
    let trimmed = raw.trim_end_matches('/');
    let trimmed = trimmed.strip_suffix("/api").unwrap_or(trimmed);

    Url::parse(trimmed).map_err(|e| ConfigError::Invalid {
        name: "IMMICH_URL",
        reason: e.to_string(),
    })
}
