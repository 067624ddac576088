//! In-memory caching of fetched listening data.
//!
//! Each kind of fetched resource has a time-to-live. [`TtlCache`] keeps values
//! until their TTL elapses; the clock is always passed in so callers (and
//! tests) control "now".

use std::collections::HashMap;
use std::hash::Hash;

use chrono::{DateTime, TimeDelta, Utc};

use crate::config::CacheConfig;

/// User profile and follower counts
pub const PROFILE_TTL: TimeDelta = TimeDelta::minutes(5);

/// Hourly and daily listening history feeding the charts
pub const LISTENING_HISTORY_TTL: TimeDelta = TimeDelta::minutes(10);

/// Top artists, albums and tracks
pub const TOP_ITEMS_TTL: TimeDelta = TimeDelta::minutes(30);

/// Search results
pub const SEARCH_TTL: TimeDelta = TimeDelta::minutes(1);

/// Cover art and avatars
pub const ARTWORK_TTL: TimeDelta = TimeDelta::hours(24);

/// Resources the app caches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKind {
    Profile,
    ListeningHistory,
    TopItems,
    Search,
    Artwork,
}

impl CacheKind {
    pub fn default_ttl(&self) -> TimeDelta {
        match self {
            CacheKind::Profile => PROFILE_TTL,
            CacheKind::ListeningHistory => LISTENING_HISTORY_TTL,
            CacheKind::TopItems => TOP_ITEMS_TTL,
            CacheKind::Search => SEARCH_TTL,
            CacheKind::Artwork => ARTWORK_TTL,
        }
    }
}

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    inserted_at: DateTime<Utc>,
}

/// A map whose entries expire after a fixed TTL.
#[derive(Debug, Clone)]
pub struct TtlCache<K, V> {
    ttl: TimeDelta,
    entries: HashMap<K, Entry<V>>,
}

impl<K: Eq + Hash, V> TtlCache<K, V> {
    pub fn new(ttl: TimeDelta) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    pub fn for_kind(kind: CacheKind) -> Self {
        Self::new(kind.default_ttl())
    }

    /// Cache for `kind` using the configured TTL override, if any.
    pub fn for_kind_in(config: &CacheConfig, kind: CacheKind) -> Self {
        Self::new(config.ttl(kind))
    }

    pub fn ttl(&self) -> TimeDelta {
        self.ttl
    }

    /// Insert or replace a value, stamping it with `now`.
    pub fn insert(&mut self, key: K, value: V, now: DateTime<Utc>) -> Option<V> {
        self.entries
            .insert(
                key,
                Entry {
                    value,
                    inserted_at: now,
                },
            )
            .map(|e| e.value)
    }

    /// Fresh value for `key`, or `None` if missing or expired.
    pub fn get(&self, key: &K, now: DateTime<Utc>) -> Option<&V> {
        self.entries
            .get(key)
            .filter(|e| self.is_fresh(e.inserted_at, now))
            .map(|e| &e.value)
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.entries.remove(key).map(|e| e.value)
    }

    /// Drop expired entries, returning how many were removed.
    pub fn purge_expired(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        let ttl = self.ttl;
        self.entries
            .retain(|_, e| now.signed_duration_since(e.inserted_at) < ttl);
        let purged = before - self.entries.len();
        if purged > 0 {
            tracing::debug!(purged, remaining = self.entries.len(), "Purged expired cache entries");
        }
        purged
    }

    /// Number of stored entries, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn is_fresh(&self, inserted_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(inserted_at) < self.ttl
    }
}
