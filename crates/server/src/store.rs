//! The root document and the single lock that serializes every query.
//!
//! One process-wide exclusive lock protects the root mapping, the dirty
//! flag, the generation counter, and the query cache. `Store` bundles
//! exactly those four under one `parking_lot::Mutex`, and `Store::evaluate`
//! is the only way in: it holds the lock for a query's entire lifetime and
//! releases it before returning, so no suspension ever occurs between lock
//! acquisition and release.

use std::path::PathBuf;

use apocrypha_types::Mapping;
use parking_lot::Mutex;

use crate::cache::QueryCache;
use crate::engine::{self, EngineError};

struct Inner {
  root: Mapping,
  dirty: bool,
  generation: u64,
  cache: QueryCache,
}

/// The in-memory document plus its concurrency envelope.
pub struct Store {
  inner: Mutex<Inner>,
  pub db_path: PathBuf,
}

impl Store {
  pub fn new(root: Mapping, db_path: PathBuf, cache_capacity: usize) -> Self {
    Self {
      inner: Mutex::new(Inner {
        root,
        dirty: false,
        generation: 0,
        cache: QueryCache::new(cache_capacity),
      }),
      db_path,
    }
  }

  /// Evaluates one query under the single exclusive lock. A pure-read
  /// query is served from (and, on a miss, inserted into) the query
  /// cache; a mutating query, success or failure, always clears the
  /// cache, and on success bumps the generation counter and sets dirty
  /// (invariants A and C).
  pub fn evaluate(&self, tokens: &[String]) -> Result<String, EngineError> {
    let mut inner = self.inner.lock();

    let cache_key = engine::normalize_tokens(tokens);
    if let Some(hit) = inner.cache.get(&cache_key) {
      return Ok(hit);
    }

    let result = engine::evaluate(tokens, &mut inner.root);

    let output = match result {
      Ok(eval) => {
        if eval.mutated {
          inner.cache.clear();
          inner.dirty = true;
          inner.generation += 1;
        } else {
          inner.cache.insert(cache_key, eval.output.clone());
        }
        Ok(eval.output)
      }
      Err(e) => {
        // A failed mutation never touched root, but clearing the cache
        // here too is the conservative, always-safe choice: clearing it
        // unnecessarily never causes a stale read, missing a clear could.
        inner.cache.clear();
        Err(e)
      }
    };

    output
  }

  /// Snapshots the root to a JSON byte buffer under the lock and clears
  /// the dirty flag, returning `None` if nothing changed since the last
  /// snapshot. Used by the persistence loop; never touches the query
  /// engine.
  pub fn snapshot_if_dirty(&self) -> Option<Vec<u8>> {
    let mut inner = self.inner.lock();
    if !inner.dirty {
      return None;
    }
    let bytes = serde_json::to_vec(&inner.root).expect("Mapping always serializes");
    inner.dirty = false;
    Some(bytes)
  }

  /// Re-marks the document dirty after a failed flush attempt, so the
  /// next persistence tick retries.
  pub fn mark_dirty(&self) {
    self.inner.lock().dirty = true;
  }

  pub fn generation(&self) -> u64 {
    self.inner.lock().generation
  }

  pub fn is_dirty(&self) -> bool {
    self.inner.lock().dirty
  }
}
