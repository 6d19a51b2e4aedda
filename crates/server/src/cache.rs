//! The query cache: memoizes pure-read query output, keyed by the
//! normalized token list. Any mutating query clears it entirely; that full
//! invalidation, not the eviction policy, is the whole correctness
//! argument.

use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;

/// Default entry cap.
pub const DEFAULT_CAPACITY: usize = 1024;

/// A bounded memo of pure-read query output: an `lru::LruCache` behind a
/// `parking_lot::Mutex`. The mutex here is never contended in practice
/// because the engine's single exclusive lock already serializes every
/// query; it exists only because `LruCache::get` takes `&mut self` (it
/// reorders the LRU list on every hit).
pub struct QueryCache {
  inner: Mutex<LruCache<Vec<String>, String>>,
}

impl QueryCache {
  pub fn new(capacity: usize) -> Self {
    let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::new(1).unwrap());
    Self {
      inner: Mutex::new(LruCache::new(capacity)),
    }
  }

  /// Looks up `key` (already-normalized tokens). A hit returns the exact
  /// output produced the moment it was inserted; that is only safe
  /// because the caller holds the store's lock across both the lookup
  /// and, on a miss, the eventual insert, so no write can have slipped in
  /// between and gone uncleared.
  pub fn get(&self, key: &[String]) -> Option<String> {
    self.inner.lock().get(key).cloned()
  }

  pub fn insert(&self, key: Vec<String>, output: String) {
    self.inner.lock().put(key, output);
  }

  /// Clears every entry. Called on every mutating query, regardless of
  /// whether the mutation succeeded, before that query acknowledges
  /// completion.
  pub fn clear(&self) {
    self.inner.lock().clear();
  }

  pub fn len(&self) -> usize {
    self.inner.lock().len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

impl Default for QueryCache {
  fn default() -> Self {
    Self::new(DEFAULT_CAPACITY)
  }
}
