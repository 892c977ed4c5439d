use crate::account::log_update_error;
use crate::{AccountError, SolanaAccount};
use common_rpc::{get_multiple_accounts_batched, RpcError, SolanaClient, DEFAULT_BATCH_SIZE};
use log::{error, info};
use serde_json::Value;
use solana_sdk::pubkey::Pubkey;

/// Refresh `accounts` with `getMultipleAccounts`, [`DEFAULT_BATCH_SIZE`] keys per request.
///
/// Every account gets the same treatment as [`SolanaAccount::update`]:
/// failures are logged per account and leave its state unchanged.
/// Returns the number of accounts that were updated.
pub async fn update_accounts(client: &dyn SolanaClient, accounts: &mut [SolanaAccount]) -> usize {
    update_accounts_batched(client, accounts, DEFAULT_BATCH_SIZE).await
}

pub async fn update_accounts_batched(
    client: &dyn SolanaClient,
    accounts: &mut [SolanaAccount],
    batch_size: usize,
) -> usize {
    let keys: Vec<Pubkey> = accounts.iter().map(|account| *account.key()).collect();
    let chunks = get_multiple_accounts_batched(client, &keys, batch_size).await;

    let mut updated = 0;
    let mut offset = 0;
    for chunk in chunks {
        let chunk_accounts = &mut accounts[offset..offset + chunk.keys.len()];
        offset += chunk.keys.len();

        let response = match chunk.result {
            Ok(response) => response,
            Err(e) => {
                let e = AccountError::Rpc(e);
                chunk_accounts.iter().for_each(|account| log_update_error(account.key(), &e));
                continue;
            }
        };

        let (slot, values) = match split_multiple_accounts(&response, chunk_accounts.len()) {
            Ok(parts) => parts,
            Err(reason) => {
                error!("malformed getMultipleAccounts response: {}", reason);
                let e = AccountError::Rpc(RpcError::DeserializationError(reason));
                chunk_accounts.iter().for_each(|account| log_update_error(account.key(), &e));
                continue;
            }
        };

        for (account, value) in chunk_accounts.iter_mut().zip(values) {
            match account.try_update_with_rpc_response(slot, value) {
                Ok(()) => updated += 1,
                Err(e) => log_update_error(account.key(), &e),
            }
        }
    }

    info!("updated {} of {} accounts", updated, accounts.len());
    updated
}

/// Pull `context.slot` and the `value` array out of a `getMultipleAccounts` result
fn split_multiple_accounts(response: &Value, expected: usize) -> Result<(u64, &[Value]), String> {
    let slot = response
        .get("context")
        .and_then(|context| context.get("slot"))
        .and_then(Value::as_u64)
        .ok_or_else(|| format!("missing context.slot in {}", response))?;

    let values = response
        .get("value")
        .and_then(Value::as_array)
        .ok_or_else(|| format!("missing value array in {}", response))?;

    if values.len() != expected {
        return Err(format!("expected {} accounts, got {}", expected, values.len()));
    }

    Ok((slot, values))
}
