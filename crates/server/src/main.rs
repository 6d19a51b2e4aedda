use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use apocryphad::{config::ServerConfig, persistence, store::Store, tcp};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .init();

  let config = ServerConfig::parse();
  let db_path = config.resolved_db_path();

  tracing::info!(
    "apocryphad starting: host={} port={} db={} flush={}s cache={}",
    config.host,
    config.port,
    db_path.display(),
    config.flush_interval_secs,
    config.cache_size,
  );

  let root = persistence::load_root(&db_path).await?;
  let store = Arc::new(Store::new(root, db_path, config.cache_size));

  let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);

  let persistence_store = store.clone();
  let persistence_shutdown = shutdown_rx.clone();
  let persistence_task = tokio::spawn(async move {
    persistence::run(
      persistence_store,
      Duration::from_secs(config.flush_interval_secs),
      persistence_shutdown,
    )
    .await;
  });

  let tcp_store = store.clone();
  let tcp_addr = config.listen_addr();
  let tcp_shutdown = shutdown_rx.clone();
  let tcp_task = tokio::spawn(async move { tcp::run(tcp_store, &tcp_addr, tcp_shutdown).await });

  tokio::signal::ctrl_c().await?;
  tracing::info!("shutdown signal received");
  let _ = shutdown_tx.send(true);

  let _ = tcp_task.await;
  persistence_task.await?;

  tracing::info!("apocryphad stopped cleanly");
  Ok(())
}
