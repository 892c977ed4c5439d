use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of lamports in one SOL
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// Point-in-time view of an on-chain account, as last observed over RPC
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    /// Base58 account address
    pub key: String,
    pub slot: u64,
    pub lamports: u64,
    /// Length of the decoded account data, 0 when the RPC node sent none
    pub data_len: usize,
    pub observed_at: DateTime<Utc>,
}

impl AccountSnapshot {
    pub fn new(key: String, slot: u64, lamports: u64, data_len: usize) -> Self {
        Self { key, slot, lamports, data_len, observed_at: Utc::now() }
    }

    /// Balance in SOL, for display only
    pub fn sol(&self) -> f64 {
        lamports_to_sol(self.lamports)
    }
}

pub fn lamports_to_sol(lamports: u64) -> f64 {
    lamports as f64 / LAMPORTS_PER_SOL as f64
}
