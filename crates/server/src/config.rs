//! Startup configuration, read once into a `ServerConfig`. Every field has
//! an environment-variable fallback and a flag override, parsed once at
//! process start.

use std::path::PathBuf;

use clap::Parser;

use crate::cache::DEFAULT_CAPACITY;

const DEFAULT_PORT: u16 = 9999;
const DEFAULT_FLUSH_INTERVAL_SECS: u64 = 1;

#[derive(Debug, Clone, Parser)]
#[command(name = "apocryphad", about = "Apocrypha document store", version)]
pub struct ServerConfig {
  /// Advertised host (clustering only; the core never reads this itself).
  #[arg(long, env = "AP_HOST", default_value = "localhost")]
  pub host: String,

  /// TCP listen port.
  #[arg(long, env = "AP_PORT", default_value_t = DEFAULT_PORT)]
  pub port: u16,

  /// Database file path.
  #[arg(long, env = "AP_CNFG")]
  pub db_path: Option<PathBuf>,

  /// Seconds between persistence flushes.
  #[arg(long, default_value_t = DEFAULT_FLUSH_INTERVAL_SECS)]
  pub flush_interval_secs: u64,

  /// Maximum query-cache entries.
  #[arg(long, default_value_t = DEFAULT_CAPACITY)]
  pub cache_size: usize,
}

impl ServerConfig {
  /// Resolves `AP_CNFG`'s default of `~/.db.json` against the running
  /// user's home directory.
  pub fn resolved_db_path(&self) -> PathBuf {
    self.db_path.clone().unwrap_or_else(|| {
      dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".db.json")
    })
  }

  pub fn listen_addr(&self) -> String {
    format!("0.0.0.0:{}", self.port)
  }
}
