use async_trait::async_trait;
use serde_json::{json, Value};
use solana_account_decoder::UiAccountEncoding;
use solana_client::client_error::ClientError;
use solana_client::nonblocking::pubsub_client::PubsubClientError;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_config::RpcAccountInfoConfig;
use solana_client::rpc_request::RpcRequest;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("RPC error: {0}")]
    RpcError(#[from] Box<ClientError>),

    #[error("Pubsub error: {0}")]
    PubsubError(#[from] Box<PubsubClientError>),

    #[error("Account deserialization error: {0}")]
    DeserializationError(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),
}

/// The slice of the Solana JSON-RPC API that account tracking needs.
///
/// Both methods return the raw `result` object of the call, i.e. the
/// `{"context": {"slot": ..}, "value": ..}` envelope, so callers can tell a
/// `null` value apart from a missing one.
#[async_trait]
pub trait SolanaClient: Send + Sync {
    /// `getAccountInfo` for a single key
    async fn get_account_info(&self, pubkey: &Pubkey) -> Result<Value, RpcError>;

    /// `getMultipleAccounts`; `value` is an array in the same order as `pubkeys`
    async fn get_multiple_accounts(&self, pubkeys: &[Pubkey]) -> Result<Value, RpcError>;
}

/// Account info config used for every request: base64 data at the client's commitment
pub fn account_info_config(commitment: CommitmentConfig) -> RpcAccountInfoConfig {
    RpcAccountInfoConfig {
        encoding: Some(UiAccountEncoding::Base64),
        commitment: Some(commitment),
        ..Default::default()
    }
}

#[async_trait]
impl SolanaClient for RpcClient {
    async fn get_account_info(&self, pubkey: &Pubkey) -> Result<Value, RpcError> {
        let config = account_info_config(self.commitment());
        self.send(RpcRequest::GetAccountInfo, json!([pubkey.to_string(), config]))
            .await
            .map_err(|e| RpcError::RpcError(Box::new(e)))
    }

    async fn get_multiple_accounts(&self, pubkeys: &[Pubkey]) -> Result<Value, RpcError> {
        let config = account_info_config(self.commitment());
        let keys: Vec<String> = pubkeys.iter().map(|k| k.to_string()).collect();
        self.send(RpcRequest::GetMultipleAccounts, json!([keys, config]))
            .await
            .map_err(|e| RpcError::RpcError(Box::new(e)))
    }
}

/// Parse a base58 account address
pub fn parse_pubkey(address: &str) -> Result<Pubkey, RpcError> {
    Pubkey::from_str(address.trim())
        .map_err(|e| RpcError::InvalidAddress(format!("{}: {}", address, e)))
}

/// Parse a comma separated list of base58 addresses, skipping empty entries
pub fn parse_pubkey_list(addresses: &str) -> Result<Vec<Pubkey>, RpcError> {
    addresses.split(',').filter(|s| !s.trim().is_empty()).map(parse_pubkey).collect()
}
