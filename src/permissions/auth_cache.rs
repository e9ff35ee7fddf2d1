//! Per-chat authorization memo.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::time::Instant;

/// How long a granted chat stays authorized.
pub const AUTHORIZATION_TTL: Duration = Duration::from_secs(3600);

/// Remembers which group chats were recently authorized.
///
/// Entries expire lazily: nothing sweeps the map, an expired entry just reads
/// as unauthorized until the next grant overwrites it. Time comes from the
/// tokio clock.
#[derive(Clone, Debug)]
pub struct AuthorizationCache {
    expiries: Arc<RwLock<HashMap<i64, Instant>>>,
    ttl: Duration,
}

impl AuthorizationCache {
    pub fn new() -> Self {
        Self::with_ttl(AUTHORIZATION_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            expiries: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Authorize a chat until `now + ttl`. A repeated grant restarts the window.
    pub fn grant(&self, chat_id: i64) {
        let expiry = Instant::now() + self.ttl;
        self.expiries.write().insert(chat_id, expiry);
    }

    pub fn is_authorized(&self, chat_id: i64) -> bool {
        let now = Instant::now();
        self.expiries
            .read()
            .get(&chat_id)
            .is_some_and(|expiry| now <= *expiry)
    }
}

impl Default for AuthorizationCache {
    fn default() -> Self {
        Self::new()
    }
}
