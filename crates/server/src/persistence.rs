//! The write-behind persistence loop: sleep, snapshot the root under the
//! lock, write to a temp file in the target's directory, fsync, atomically
//! rename over the target. The persisted format is the root mapping
//! serialized directly as a JSON object, so an operator can `cat` the
//! database file.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use apocrypha_types::Mapping;
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::store::Store;

/// Loads the root mapping from `path` at startup. An absent or empty
/// file starts with an empty mapping; a malformed file refuses to start.
pub async fn load_root(path: &Path) -> anyhow::Result<Mapping> {
  let contents = match fs::read(path).await {
    Ok(bytes) => bytes,
    Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Mapping::new()),
    Err(e) => return Err(e.into()),
  };

  if contents.is_empty() {
    return Ok(Mapping::new());
  }

  let value: apocrypha_types::Datum = serde_json::from_slice(&contents)
    .map_err(|e| anyhow::anyhow!("database file {} is malformed: {e}", path.display()))?;
  match value {
    apocrypha_types::Datum::Mapping(m) => Ok(m),
    _ => Err(anyhow::anyhow!(
      "database file {} does not contain a JSON object",
      path.display()
    )),
  }
}

#[derive(Debug, Error)]
pub enum SnapshotError {
  #[error("writing temp snapshot file: {0}")]
  Write(#[source] std::io::Error),
  #[error("fsyncing temp snapshot file: {0}")]
  Sync(#[source] std::io::Error),
  #[error("renaming temp snapshot file over target: {0}")]
  Rename(#[source] std::io::Error),
}

/// Writes `bytes` to a `.tmp` sibling of `target`, fsyncs it, then
/// atomically renames it over `target`.
async fn write_atomic(target: &Path, bytes: &[u8]) -> Result<(), SnapshotError> {
  let temp_path = target.with_extension("tmp");
  let mut file = fs::File::create(&temp_path)
    .await
    .map_err(SnapshotError::Write)?;
  file.write_all(bytes).await.map_err(SnapshotError::Write)?;
  file.sync_all().await.map_err(SnapshotError::Sync)?;
  drop(file);
  fs::rename(&temp_path, target)
    .await
    .map_err(SnapshotError::Rename)?;
  Ok(())
}

/// One flush attempt: snapshot under the lock if dirty, then write
/// outside it. Returns whether a snapshot was actually taken (i.e. the
/// document was dirty), so callers can log accordingly.
pub async fn flush_once(store: &Store) -> Result<bool, SnapshotError> {
  let Some(bytes) = store.snapshot_if_dirty() else {
    return Ok(false);
  };

  if let Err(e) = write_atomic(&store.db_path, &bytes).await {
    // The snapshot was taken and dirty was cleared inside the lock;
    // since the write failed, re-mark dirty so the next tick retries
    // rather than silently losing the pending write.
    store.mark_dirty();
    return Err(e);
  }
  Ok(true)
}

/// Runs the periodic flush loop until `shutdown` fires, then performs one
/// final flush pass before returning.
pub async fn run(store: Arc<Store>, interval: Duration, mut shutdown: tokio::sync::watch::Receiver<bool>) {
  let mut ticker = tokio::time::interval(interval);
  ticker.tick().await; // first tick fires immediately; skip it

  loop {
    tokio::select! {
      _ = ticker.tick() => {
        match flush_once(&store).await {
          Ok(true) => tracing::debug!("persistence: flushed {}", store.db_path.display()),
          Ok(false) => {}
          Err(e) => tracing::error!("persistence: flush failed, will retry: {}", e),
        }
      }
      _ = shutdown.changed() => {
        tracing::info!("persistence: shutting down, running final flush");
        break;
      }
    }
  }

  match flush_once(&store).await {
    Ok(_) => tracing::info!("persistence: final flush complete"),
    Err(e) => tracing::error!("persistence: final flush failed: {}", e),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use apocrypha_types::Mapping;
  use tempfile::tempdir;

  #[tokio::test]
  async fn flush_writes_json_and_clears_dirty() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("db.json");
    let store = Store::new(Mapping::new(), path.clone(), 16);
    store.evaluate(&["a".into(), "=".into(), "b".into()]).unwrap();
    assert!(store.is_dirty());

    assert!(flush_once(&store).await.unwrap());
    assert!(!store.is_dirty());

    let contents = tokio::fs::read_to_string(&path).await.unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(parsed["a"], serde_json::json!("b"));
  }

  #[tokio::test]
  async fn flush_on_clean_store_is_a_no_op() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("db.json");
    let store = Store::new(Mapping::new(), path, 16);
    assert!(!flush_once(&store).await.unwrap());
  }

  #[tokio::test]
  async fn load_root_missing_file_is_empty_mapping() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("missing.json");
    assert_eq!(load_root(&path).await.unwrap(), Mapping::new());
  }

  #[tokio::test]
  async fn load_root_round_trips_a_snapshot() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("db.json");
    let store = Store::new(Mapping::new(), path.clone(), 16);
    store.evaluate(&["a".into(), "=".into(), "b".into()]).unwrap();
    flush_once(&store).await.unwrap();

    let loaded = load_root(&path).await.unwrap();
    assert_eq!(loaded.get("a"), Some(&apocrypha_types::Datum::String("b".into())));
  }

  #[tokio::test]
  async fn load_root_rejects_malformed_json() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("db.json");
    tokio::fs::write(&path, b"not json").await.unwrap();
    assert!(load_root(&path).await.is_err());
  }
}
