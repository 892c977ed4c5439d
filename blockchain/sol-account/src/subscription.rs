use crate::SolanaAccount;
use common_rpc::{account_info_config, RpcError};
use futures::stream::{select_all, StreamExt};
use log::{info, warn};
use serde_json::Value;
use solana_account_decoder::UiAccount;
use solana_client::nonblocking::pubsub_client::PubsubClient;
use solana_client::rpc_response::Response;
use solana_sdk::commitment_config::CommitmentConfig;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Turn an `accountNotification` into the `(slot, value)` pair accepted by
/// [`SolanaAccount::update_with_rpc_response`]
pub fn notification_to_update(
    notification: &Response<UiAccount>,
) -> Result<(u64, Value), RpcError> {
    let value = serde_json::to_value(&notification.value)
        .map_err(|e| RpcError::DeserializationError(e.to_string()))?;
    Ok((notification.context.slot, value))
}

/// Follow `accounts` over a single websocket connection until the node closes
/// every subscription.
///
/// Each notification is applied with [`SolanaAccount::update_with_rpc_response`].
pub async fn follow_accounts(
    ws_url: &str,
    accounts: &[Arc<Mutex<SolanaAccount>>],
    commitment: CommitmentConfig,
) -> Result<(), RpcError> {
    let pubsub =
        PubsubClient::new(ws_url).await.map_err(|e| RpcError::PubsubError(Box::new(e)))?;

    let mut streams = Vec::with_capacity(accounts.len());
    let mut unsubscribes = Vec::with_capacity(accounts.len());
    for (index, account) in accounts.iter().enumerate() {
        let key = *account.lock().await.key();
        let (stream, unsubscribe) = pubsub
            .account_subscribe(&key, Some(account_info_config(commitment)))
            .await
            .map_err(|e| RpcError::PubsubError(Box::new(e)))?;
        info!("subscribed to account {}", key);
        streams.push(stream.map(move |notification| (index, notification)));
        unsubscribes.push(unsubscribe);
    }

    let mut notifications = select_all(streams);
    while let Some((index, notification)) = notifications.next().await {
        let mut account = accounts[index].lock().await;
        match notification_to_update(&notification) {
            Ok((slot, value)) => account.update_with_rpc_response(slot, &value),
            Err(e) => warn!("dropping notification for {}: {}", account, e),
        }
    }
    drop(notifications);

    for unsubscribe in unsubscribes {
        unsubscribe().await;
    }
    warn!("account subscriptions on {} closed", ws_url);
    Ok(())
}
