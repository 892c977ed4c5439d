use common_rpc::RpcError;
use serde_json::Value;
use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AccountError {
    #[error(transparent)]
    Rpc(#[from] RpcError),

    #[error("got null value from Solana getAccountInfo for {key}; non-existent account? {response}")]
    NullValue { key: Pubkey, response: Value },

    #[error("missing value in response for {key}: {response}")]
    MissingValue { key: Pubkey, response: Value },

    #[error("missing context.slot in response for {key}: {response}")]
    MissingSlot { key: Pubkey, response: Value },

    #[error("missing lamports in account value for {key}: {value}")]
    MissingLamports { key: Pubkey, value: Value },
}

impl AccountError {
    /// True when the node answered but has no such account
    pub fn is_not_found(&self) -> bool {
        matches!(self, AccountError::NullValue { .. })
    }
}
