//! # Signature Cache (Bounded LRU)
//!
//! Hot path for `get_signature`: avoids re-signing on every query.
//!
//! ## Consistency Contract
//!
//! The cache is never the source of truth. Every entry can be recomputed
//! from the message store plus the signer, so dropping entries (eviction,
//! restart, key rotation) only costs a re-sign.

use lru::LruCache;
use parking_lot::Mutex;
use shared_types::{MessageId, SignatureShare};
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Default number of cached signature shares.
pub const DEFAULT_SIGNATURE_CACHE_SIZE: usize = 500;

/// Thread-safe LRU cache `MessageId → SignatureShare`.
pub struct SignatureCache {
    entries: Mutex<LruCache<MessageId, SignatureShare>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl SignatureCache {
    /// Create a cache holding at most `capacity` shares (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(cap)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Look up a share, marking it most recently used.
    pub fn get(&self, id: &MessageId) -> Option<SignatureShare> {
        let found = self.entries.lock().get(id).copied();
        let counter = if found.is_some() {
            &self.hits
        } else {
            &self.misses
        };
        counter.fetch_add(1, Ordering::Relaxed);
        found
    }

    /// Insert a share, evicting the least recently used entry when full.
    pub fn put(&self, id: MessageId, share: SignatureShare) {
        self.entries.lock().put(id, share);
    }

    /// Drop every entry (restart semantics, key rotation).
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        let entries = self.entries.lock();
        CacheStats {
            entries: entries.len(),
            capacity: entries.cap().get(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

impl Default for SignatureCache {
    fn default() -> Self {
        Self::new(DEFAULT_SIGNATURE_CACHE_SIZE)
    }
}

/// Cache statistics for monitoring.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub capacity: usize,
    pub hits: u64,
    pub misses: u64,
}
