use anyhow::{anyhow, bail, Context, Result};
use common_rpc::parse_pubkey_list;
use solana_sdk::pubkey::Pubkey;
use std::env;

/// Every 30 seconds
pub const DEFAULT_SCHEDULE: &str = "*/30 * * * * *";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchMode {
    /// Refresh all accounts with `getMultipleAccounts` on a cron schedule
    Poll,
    /// Follow accounts with `accountSubscribe` notifications
    Subscribe,
}

impl std::str::FromStr for WatchMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "poll" => Ok(WatchMode::Poll),
            "subscribe" | "ws" => Ok(WatchMode::Subscribe),
            other => bail!("unknown WATCH_MODE {:?}, expected poll or subscribe", other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct WatcherConfig {
    pub rpc_url: String,
    pub ws_url: String,
    pub accounts: Vec<Pubkey>,
    pub schedule: String,
    pub mode: WatchMode,
}

impl WatcherConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the config from any variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let rpc_url = lookup("RPC_URL")
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| anyhow!("Missing RPC_URL environment variable"))?;
        let rpc_url = rpc_url.trim().trim_end_matches('/').to_string();

        let ws_url = match lookup("WS_URL") {
            Some(url) if !url.trim().is_empty() => url.trim().to_string(),
            _ => websocket_url(&rpc_url)?,
        };

        let accounts = parse_pubkey_list(&lookup("ACCOUNTS").unwrap_or_default())
            .context("ACCOUNTS must be a comma separated list of base58 addresses")?;
        if accounts.is_empty() {
            bail!("ACCOUNTS must name at least one account");
        }

        let schedule = lookup("SCHEDULE").unwrap_or_else(|| DEFAULT_SCHEDULE.to_string());
        let mode = match lookup("WATCH_MODE") {
            Some(mode) => mode.parse()?,
            None => WatchMode::Poll,
        };

        Ok(Self { rpc_url, ws_url, accounts, schedule, mode })
    }
}

/// Websocket endpoint served next to an HTTP RPC endpoint
pub fn websocket_url(rpc_url: &str) -> Result<String> {
    if let Some(rest) = rpc_url.strip_prefix("https://") {
        Ok(format!("wss://{}", rest))
    } else if let Some(rest) = rpc_url.strip_prefix("http://") {
        Ok(format!("ws://{}", rest))
    } else {
        bail!("cannot derive websocket url from {:?}, set WS_URL", rpc_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const KEY: &str = "AHtgzX45WTKfkPG53L6WYhGEXwQkN1BVknET3sVsLL8J";

    fn config(vars: &[(&str, &str)]) -> Result<WatcherConfig> {
        let vars: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        WatcherConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config =
            config(&[("RPC_URL", "https://api.mainnet-beta.solana.com/"), ("ACCOUNTS", KEY)])
                .unwrap();
        assert_eq!(config.rpc_url, "https://api.mainnet-beta.solana.com");
        assert_eq!(config.ws_url, "wss://api.mainnet-beta.solana.com");
        assert_eq!(config.accounts.len(), 1);
        assert_eq!(config.accounts[0].to_string(), KEY);
        assert_eq!(config.schedule, DEFAULT_SCHEDULE);
        assert_eq!(config.mode, WatchMode::Poll);
    }

    #[test]
    fn test_overrides() {
        let accounts = format!("{},11111111111111111111111111111111", KEY);
        let config = config(&[
            ("RPC_URL", "http://localhost:8899"),
            ("WS_URL", "ws://localhost:8900"),
            ("ACCOUNTS", accounts.as_str()),
            ("SCHEDULE", "0 * * * * *"),
            ("WATCH_MODE", "Subscribe"),
        ])
        .unwrap();
        assert_eq!(config.ws_url, "ws://localhost:8900");
        assert_eq!(config.accounts.len(), 2);
        assert_eq!(config.schedule, "0 * * * * *");
        assert_eq!(config.mode, WatchMode::Subscribe);
    }

    #[test]
    fn test_invalid_config() {
        assert!(config(&[("ACCOUNTS", KEY)]).is_err());
        assert!(config(&[("RPC_URL", "http://localhost:8899")]).is_err());
        assert!(config(&[("RPC_URL", "http://localhost:8899"), ("ACCOUNTS", "nope")]).is_err());
        assert!(config(&[("RPC_URL", "localhost:8899"), ("ACCOUNTS", KEY)]).is_err());
        assert!(config(&[
            ("RPC_URL", "http://localhost:8899"),
            ("ACCOUNTS", KEY),
            ("WATCH_MODE", "push"),
        ])
        .is_err());
    }

    #[test]
    fn test_websocket_url() {
        assert_eq!(websocket_url("http://127.0.0.1:8899").unwrap(), "ws://127.0.0.1:8899");
        assert_eq!(websocket_url("https://rpc.example.com").unwrap(), "wss://rpc.example.com");
        assert!(websocket_url("ftp://rpc.example.com").is_err());
    }
}
