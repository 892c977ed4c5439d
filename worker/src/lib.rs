pub mod config;

use anyhow::Result;
use common_rpc::{SolanaClient, CONNECTION_POOL};
use config::{WatchMode, WatcherConfig};
use log::{debug, error, info};
use sol_account::{follow_accounts, update_accounts, SolanaAccount};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::commitment_config::CommitmentConfig;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler};

pub struct Worker {
    config: WatcherConfig,
    client: Arc<dyn SolanaClient>,
    /// Set when `client` was taken from the connection pool
    pooled: Option<Arc<RpcClient>>,
}

impl Worker {
    pub fn new(config: WatcherConfig) -> Self {
        info!("Using RPC endpoint {}", config.rpc_url);
        let client = CONNECTION_POOL.get_client(&config.rpc_url);
        Self { config, client: client.clone(), pooled: Some(client) }
    }

    pub fn with_client(config: WatcherConfig, client: Arc<dyn SolanaClient>) -> Self {
        Self { config, client, pooled: None }
    }

    /// Hand the pooled RPC client back once the worker is done with it
    pub fn release_client(&mut self) {
        if let Some(client) = self.pooled.take() {
            debug!("Returning RPC client for {} to the pool", self.config.rpc_url);
            CONNECTION_POOL.return_client(&self.config.rpc_url, client);
        }
    }

    fn accounts(&self) -> Vec<SolanaAccount> {
        self.config
            .accounts
            .iter()
            .map(|key| SolanaAccount::new(*key, self.client.clone()))
            .collect()
    }

    /// Watch accounts until the node disconnects or the process gets ctrl-c
    pub async fn run(&mut self) -> Result<()> {
        let result = match self.config.mode {
            WatchMode::Poll => self.start_account_sync().await,
            WatchMode::Subscribe => self.start_account_subscription().await,
        };
        self.release_client();
        result
    }

    /// Refresh every watched account once
    pub async fn sync_once(&self, accounts: &mut [SolanaAccount]) -> usize {
        let updated = update_accounts(self.client.as_ref(), accounts).await;
        accounts.iter().for_each(log_snapshot);
        updated
    }

    pub async fn start_account_sync(&self) -> Result<()> {
        let mut accounts = self.accounts();
        self.sync_once(&mut accounts).await;

        let accounts = Arc::new(Mutex::new(accounts));
        let client = self.client.clone();
        let mut scheduler = JobScheduler::new().await?;

        let job = Job::new_async(self.config.schedule.as_str(), move |_, _| {
            let accounts = accounts.clone();
            let client = client.clone();

            Box::pin(async move {
                debug!("Refreshing watched accounts...");
                let mut accounts = accounts.lock().await;
                update_accounts(client.as_ref(), &mut accounts).await;
                accounts.iter().for_each(log_snapshot);
            })
        })?;

        scheduler.add(job).await?;
        info!("Starting account sync scheduler with schedule: {}", self.config.schedule);
        scheduler.start().await?;

        // Keep the scheduler running until shutdown is requested
        tokio::signal::ctrl_c().await?;
        info!("Stopping account sync scheduler");
        scheduler.shutdown().await?;
        Ok(())
    }

    /// Load every account once, then follow websocket notifications until the node disconnects
    pub async fn start_account_subscription(&self) -> Result<()> {
        let mut accounts = self.accounts();
        self.sync_once(&mut accounts).await;

        let accounts: Vec<_> =
            accounts.into_iter().map(|account| Arc::new(Mutex::new(account))).collect();

        info!("Subscribing to {} accounts on {}", accounts.len(), self.config.ws_url);
        follow_accounts(&self.config.ws_url, &accounts, CommitmentConfig::confirmed()).await?;

        for account in &accounts {
            log_snapshot(&*account.lock().await);
        }
        Ok(())
    }
}

fn log_snapshot(account: &SolanaAccount) {
    match account.snapshot() {
        Some(snapshot) => match serde_json::to_string(&snapshot) {
            Ok(json) => info!("{}: {:.9} SOL {}", account, snapshot.sol(), json),
            Err(e) => error!("Failed to serialize snapshot for {}: {}", account, e),
        },
        None => debug!("{} not loaded yet", account),
    }
}
