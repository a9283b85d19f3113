//! TTL-bounded memo of probe outcomes.

use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use parking_lot::RwLock;
use url::Url;

/// Default time a probe outcome stays valid.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(6 * 60 * 60);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProbeCacheEntry {
    pub ok: bool,
    pub observed_at: Instant,
}

impl ProbeCacheEntry {
    /// Valid iff strictly less than `ttl` has elapsed since observation.
    pub fn is_fresh(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.observed_at) < ttl
    }
}

/// Positive and negative probe results keyed by candidate URL.
///
/// Expiry is lazy: stale entries are dropped when read, or in bulk by
/// [`ProbeCache::purge_expired`].
#[derive(Debug)]
pub struct ProbeCache {
    ttl: Duration,
    entries: RwLock<HashMap<Url, ProbeCacheEntry>>,
}

impl ProbeCache {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn get(&self, url: &Url) -> Option<bool> {
        self.get_at(url, Instant::now())
    }

    /// Cached outcome as seen at `now`. A stale entry counts as absent and is
    /// removed.
    pub fn get_at(&self, url: &Url, now: Instant) -> Option<bool> {
        {
            let entries = self.entries.read();
            match entries.get(url) {
                None => return None,
                Some(entry) if entry.is_fresh(now, self.ttl) => return Some(entry.ok),
                Some(_) => {}
            }
        }

        let mut entries = self.entries.write();
        // Re-check: a concurrent put may have refreshed it.
        match entries.get(url) {
            Some(entry) if entry.is_fresh(now, self.ttl) => Some(entry.ok),
            Some(_) => {
                entries.remove(url);
                None
            }
            None => None,
        }
    }

    pub fn put(&self, url: Url, ok: bool) {
        self.put_at(url, ok, Instant::now());
    }

    /// Record an outcome observed at `now`, replacing any previous entry.
    pub fn put_at(&self, url: Url, ok: bool, now: Instant) {
        self.entries.write().insert(
            url,
            ProbeCacheEntry {
                ok,
                observed_at: now,
            },
        );
    }

    /// Raw entry regardless of freshness.
    pub fn entry(&self, url: &Url) -> Option<ProbeCacheEntry> {
        self.entries.read().get(url).copied()
    }

    /// Drop every stale entry, returning how many were removed.
    pub fn purge_expired(&self) -> usize {
        self.purge_expired_at(Instant::now())
    }

    pub fn purge_expired_at(&self, now: Instant) -> usize {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| entry.is_fresh(now, self.ttl));
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }
}

impl Default for ProbeCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TTL)
    }
}
