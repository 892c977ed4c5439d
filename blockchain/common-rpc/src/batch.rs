use crate::{RpcError, SolanaClient};
use log::debug;
use serde_json::Value;
use solana_sdk::pubkey::Pubkey;

/// Maximum number of keys a `getMultipleAccounts` request accepts
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// One `getMultipleAccounts` request and its raw result
pub struct BatchChunk<'a> {
    pub keys: &'a [Pubkey],
    pub result: Result<Value, RpcError>,
}

/// Fetch multiple accounts in batches to stay under the RPC request size limit
///
/// Chunks are requested one after another. A failed chunk does not stop the
/// remaining ones; its error is returned alongside the keys it covered.
pub async fn get_multiple_accounts_batched<'a>(
    client: &dyn SolanaClient,
    pubkeys: &'a [Pubkey],
    batch_size: usize,
) -> Vec<BatchChunk<'a>> {
    let mut chunks = Vec::with_capacity(pubkeys.len().div_ceil(batch_size.max(1)));

    for keys in pubkeys.chunks(batch_size.max(1)) {
        debug!("requesting {} accounts via getMultipleAccounts", keys.len());
        let result = client.get_multiple_accounts(keys).await;
        chunks.push(BatchChunk { keys, result });
    }

    chunks
}

/// Fetch multiple accounts in batches with the default batch size
pub async fn get_multiple_accounts<'a>(
    client: &dyn SolanaClient,
    pubkeys: &'a [Pubkey],
) -> Vec<BatchChunk<'a>> {
    get_multiple_accounts_batched(client, pubkeys, DEFAULT_BATCH_SIZE).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingClient {
        requests: Mutex<Vec<usize>>,
        fail_on_request: Option<usize>,
    }

    #[async_trait]
    impl SolanaClient for RecordingClient {
        async fn get_account_info(&self, _pubkey: &Pubkey) -> Result<Value, RpcError> {
            unreachable!("batch helpers only use getMultipleAccounts")
        }

        async fn get_multiple_accounts(&self, pubkeys: &[Pubkey]) -> Result<Value, RpcError> {
            let mut requests = self.requests.lock().unwrap();
            requests.push(pubkeys.len());
            if self.fail_on_request == Some(requests.len()) {
                return Err(RpcError::DeserializationError("boom".to_string()));
            }
            let values: Vec<Value> =
                pubkeys.iter().map(|_| json!({ "lamports": 1 })).collect();
            Ok(json!({ "context": { "slot": 7 }, "value": values }))
        }
    }

    fn keys(n: usize) -> Vec<Pubkey> {
        (0..n).map(|_| Pubkey::new_unique()).collect()
    }

    #[tokio::test]
    async fn test_batches_are_split_at_batch_size() {
        let client = RecordingClient::default();
        let pubkeys = keys(250);

        let chunks = get_multiple_accounts(&client, &pubkeys).await;

        assert_eq!(*client.requests.lock().unwrap(), vec![100, 100, 50]);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[2].keys, &pubkeys[200..]);
        assert!(chunks.iter().all(|c| c.result.is_ok()));
    }

    #[tokio::test]
    async fn test_failed_chunk_does_not_stop_the_rest() {
        let client = RecordingClient { fail_on_request: Some(1), ..Default::default() };
        let pubkeys = keys(5);

        let chunks = get_multiple_accounts_batched(&client, &pubkeys, 2).await;

        assert_eq!(chunks.len(), 3);
        assert!(chunks[0].result.is_err());
        assert!(chunks[1].result.is_ok());
        assert_eq!(chunks[2].keys.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_input_issues_no_requests() {
        let client = RecordingClient::default();
        let chunks = get_multiple_accounts_batched(&client, &[], 0).await;
        assert!(chunks.is_empty());
        assert!(client.requests.lock().unwrap().is_empty());
    }
}
