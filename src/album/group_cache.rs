//! Media-group → album name memo with a fixed lifetime.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// How long a media group keeps its album after the directive was seen.
pub const GROUP_TTL: Duration = Duration::from_secs(120);

#[derive(Debug)]
struct GroupEntry {
    album: String,
    expires_at: Instant,
}

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<String, GroupEntry>,
    /// Min-heap of (deadline, group id). May hold stale deadlines for
    /// overwritten groups; those are skipped on purge.
    deadlines: BinaryHeap<Reverse<(Instant, String)>>,
}

/// Album names chosen for Telegram media groups.
///
/// Every write lives exactly `ttl` regardless of reads. Expired entries are
/// never returned by [`lookup`](Self::lookup) and are physically dropped by
/// [`purge_expired`](Self::purge_expired).
#[derive(Clone, Debug)]
pub struct GroupCache {
    inner: Arc<RwLock<Inner>>,
    ttl: Duration,
}

impl GroupCache {
    pub fn new() -> Self {
        Self::with_ttl(GROUP_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner::default())),
            ttl,
        }
    }

    /// Store the album for a media group. The last write wins.
    pub fn remember(&self, group_id: &str, album: &str) {
        let expires_at = Instant::now() + self.ttl;
        let mut inner = self.inner.write();

        inner.entries.insert(
            group_id.to_string(),
            GroupEntry {
                album: album.to_string(),
                expires_at,
            },
        );
        inner
            .deadlines
            .push(Reverse((expires_at, group_id.to_string())));
    }

    pub fn lookup(&self, group_id: &str) -> Option<String> {
        let now = Instant::now();
        self.inner
            .read()
            .entries
            .get(group_id)
            .filter(|entry| now < entry.expires_at)
            .map(|entry| entry.album.clone())
    }

    /// Drop every entry whose deadline has passed. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut inner = self.inner.write();
        let mut removed = 0;

        while inner
            .deadlines
            .peek()
            .is_some_and(|Reverse((deadline, _))| *deadline <= now)
        {
            let Some(Reverse((deadline, group_id))) = inner.deadlines.pop() else {
                break;
            };

            // A later remember() for the same group pushed a newer deadline.
            let current = inner
                .entries
                .get(&group_id)
                .is_some_and(|entry| entry.expires_at == deadline);
            if current {
                inner.entries.remove(&group_id);
                removed += 1;
            }
        }

        removed
    }

    pub fn len(&self) -> usize {
        self.inner.read().entries.len()
    }

    /// Run [`purge_expired`](Self::purge_expired) every `every` until cancelled.
    pub fn spawn_sweeper(&self, every: Duration, cancel: CancellationToken) -> JoinHandle<()> {
        let cache = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        let removed = cache.purge_expired();
                        if removed > 0 {
                            debug!(
                                "Swept {} expired media group(s), {} left",
                                removed,
                                cache.len()
                            );
                        }
                    }
                }
            }
        })
    }
}

impl Default for GroupCache {
    fn default() -> Self {
        Self::new()
    }
}
