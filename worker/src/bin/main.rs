use anyhow::Result;
use env_logger::Env;
use log::info;
use worker::config::WatcherConfig;
use worker::Worker;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = WatcherConfig::from_env()?;
    info!(
        "Starting account watcher for {} accounts in {:?} mode",
        config.accounts.len(),
        config.mode
    );

    let mut worker = Worker::new(config);
    worker.run().await
}
