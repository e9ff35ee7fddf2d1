//! Admin registry loaded from `TELEGRAM_ADMINS`.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::warn;

/// Immutable set of privileged Telegram user IDs.
///
/// IDs are signed 64-bit, as the Bot API documents them.
///
/// Cloning is cheap; all clones share the same set.
#[derive(Clone, Debug, Default)]
pub struct AdminSet {
    ids: Arc<HashSet<i64>>,
}

impl AdminSet {
    /// Parse a comma-separated list of user IDs.
    ///
    /// Blank tokens are ignored, malformed ones are logged and skipped.
    /// An empty result is left for the caller to reject.
    pub fn load(raw: &str) -> Self {
        let mut ids = HashSet::new();

        for token in raw.split(',') {
            let trimmed = token.trim();
            if trimmed.is_empty() {
                continue;
            }
            match trimmed.parse::<i64>() {
                Ok(id) => {
                    ids.insert(id);
                }
                Err(e) => warn!("Skipping invalid admin id '{}': {}", trimmed, e),
            }
        }

        Self { ids: Arc::new(ids) }
    }

    #[inline]
    pub fn contains(&self, user_id: i64) -> bool {
        self.ids.contains(&user_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = i64> + '_ {
        self.ids.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl FromIterator<i64> for AdminSet {
    fn from_iter<I: IntoIterator<Item = i64>>(iter: I) -> Self {
        Self {
            ids: Arc::new(iter.into_iter().collect()),
        }
    }
}
